use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::exams::requests::{CreateExamRequest, ExamQueryParams, UpdateExamRequest};
use crate::models::users::entities::UserRole;
use crate::services::ExamService;
use crate::utils::SafeExamIdI64;

static EXAM_SERVICE: Lazy<ExamService> = Lazy::new(ExamService::new_lazy);

pub async fn list_exams(
    req: HttpRequest,
    query: web::Query<ExamQueryParams>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.list_exams(&req, query.into_inner()).await
}

pub async fn create_exam(
    req: HttpRequest,
    exam_data: web::Json<CreateExamRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.create_exam(&req, exam_data.into_inner()).await
}

pub async fn get_exam(req: HttpRequest, exam_id: SafeExamIdI64) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.get_exam(&req, exam_id.0).await
}

pub async fn update_exam(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
    update_data: web::Json<UpdateExamRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .update_exam(&req, exam_id.0, update_data.into_inner())
        .await
}

pub async fn delete_exam(req: HttpRequest, exam_id: SafeExamIdI64) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.delete_exam(&req, exam_id.0).await
}

// 教师只能管理自己任教科目的考试，在服务层判断
pub fn configure_exam_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/exams")
            .service(
                web::resource("").route(web::get().to(list_exams)).route(
                    web::post()
                        .to(create_exam)
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            )
            .service(
                web::resource("/{exam_id}")
                    .route(web::get().to(get_exam))
                    .route(
                        web::put()
                            .to(update_exam)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_exam)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    ),
            ),
    );
}
