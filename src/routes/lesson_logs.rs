use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::lesson_logs::requests::{
    CreateLessonLogRequest, LessonLogQueryParams, UpdateLessonLogRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::LessonLogService;
use crate::utils::SafeLessonLogIdI64;

static LESSON_LOG_SERVICE: Lazy<LessonLogService> = Lazy::new(LessonLogService::new_lazy);

pub async fn list_lesson_logs(
    req: HttpRequest,
    query: web::Query<LessonLogQueryParams>,
) -> ActixResult<HttpResponse> {
    LESSON_LOG_SERVICE
        .list_lesson_logs(&req, query.into_inner())
        .await
}

pub async fn create_lesson_log(
    req: HttpRequest,
    log_data: web::Json<CreateLessonLogRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_LOG_SERVICE
        .create_lesson_log(&req, log_data.into_inner())
        .await
}

pub async fn get_lesson_log(
    req: HttpRequest,
    lesson_log_id: SafeLessonLogIdI64,
) -> ActixResult<HttpResponse> {
    LESSON_LOG_SERVICE.get_lesson_log(&req, lesson_log_id.0).await
}

pub async fn update_lesson_log(
    req: HttpRequest,
    lesson_log_id: SafeLessonLogIdI64,
    update_data: web::Json<UpdateLessonLogRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_LOG_SERVICE
        .update_lesson_log(&req, lesson_log_id.0, update_data.into_inner())
        .await
}

pub async fn delete_lesson_log(
    req: HttpRequest,
    lesson_log_id: SafeLessonLogIdI64,
) -> ActixResult<HttpResponse> {
    LESSON_LOG_SERVICE
        .delete_lesson_log(&req, lesson_log_id.0)
        .await
}

pub fn configure_lesson_log_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/lesson-logs")
            .service(
                web::resource("")
                    .route(web::get().to(list_lesson_logs))
                    .route(
                        web::post()
                            .to(create_lesson_log)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    ),
            )
            .service(
                web::resource("/{lesson_log_id}")
                    .route(web::get().to(get_lesson_log))
                    .route(
                        web::put()
                            .to(update_lesson_log)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_lesson_log)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    ),
            ),
    );
}
