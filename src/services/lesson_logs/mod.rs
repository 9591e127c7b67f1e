pub mod create;
pub mod detail;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::SchoolContext;
use crate::models::lesson_logs::{
    entities::LessonLog,
    requests::{CreateLessonLogRequest, LessonLogQueryParams, UpdateLessonLogRequest},
};

crate::services::define_service!(LessonLogService);

impl LessonLogService {
    pub async fn list_lesson_logs(
        &self,
        request: &HttpRequest,
        query: LessonLogQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_lesson_logs(self, request, query).await
    }

    // 教师记录自己的课，管理员代录时需指定教师
    pub async fn create_lesson_log(
        &self,
        request: &HttpRequest,
        log: CreateLessonLogRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_lesson_log(self, request, log).await
    }

    pub async fn get_lesson_log(
        &self,
        request: &HttpRequest,
        log_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_lesson_log(self, request, log_id).await
    }

    pub async fn update_lesson_log(
        &self,
        request: &HttpRequest,
        log_id: i64,
        update: UpdateLessonLogRequest,
    ) -> ActixResult<HttpResponse> {
        detail::update_lesson_log(self, request, log_id, update).await
    }

    pub async fn delete_lesson_log(
        &self,
        request: &HttpRequest,
        log_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::delete_lesson_log(self, request, log_id).await
    }
}

/// 管理员或授课教师本人
pub(crate) fn can_edit_lesson_log(ctx: &SchoolContext, log: &LessonLog) -> bool {
    ctx.is_admin() || ctx.profile_id() == Some(log.teacher_id)
}
