use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grades::requests::{
    BulkUpsertGradesRequest, GradeQueryParams, UpdateGradeRequest, UpsertGradeRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::GradeService;
use crate::utils::SafeGradeIdI64;

static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn list_grades(
    req: HttpRequest,
    query: web::Query<GradeQueryParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.list_grades(&req, query.into_inner()).await
}

pub async fn upsert_grade(
    req: HttpRequest,
    grade_data: web::Json<UpsertGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .upsert_grade(&req, grade_data.into_inner())
        .await
}

pub async fn bulk_upsert_grades(
    req: HttpRequest,
    bulk_data: web::Json<BulkUpsertGradesRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .bulk_upsert_grades(&req, bulk_data.into_inner())
        .await
}

pub async fn get_grade(req: HttpRequest, grade_id: SafeGradeIdI64) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.get_grade(&req, grade_id.0).await
}

pub async fn update_grade(
    req: HttpRequest,
    grade_id: SafeGradeIdI64,
    update_data: web::Json<UpdateGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .update_grade(&req, grade_id.0, update_data.into_inner())
        .await
}

pub async fn delete_grade(req: HttpRequest, grade_id: SafeGradeIdI64) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.delete_grade(&req, grade_id.0).await
}

pub fn configure_grade_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/grades")
            .service(
                // 学生与家长只能看到自己或孩子的成绩
                web::resource("").route(web::get().to(list_grades)).route(
                    web::post()
                        .to(upsert_grade)
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            )
            .service(
                // 整场考试的成绩一次录入
                web::resource("/bulk").route(
                    web::post()
                        .to(bulk_upsert_grades)
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            )
            .service(
                web::resource("/{grade_id}")
                    .route(web::get().to(get_grade))
                    .route(
                        web::put()
                            .to(update_grade)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_grade)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    ),
            ),
    );
}
