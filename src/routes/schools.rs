use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::identifiers::requests::SyncIdentifiersRequest;
use crate::models::schools::requests::{
    CreateSchoolRequest, SchoolQueryParams, UpdateSchoolRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::{IdentifierService, SchoolService};

use super::{
    accounts, announcements, classes, exams, grades, lesson_logs, payments, schedules, subjects,
};

static SCHOOL_SERVICE: Lazy<SchoolService> = Lazy::new(SchoolService::new_lazy);
static IDENTIFIER_SERVICE: Lazy<IdentifierService> = Lazy::new(IdentifierService::new_lazy);

pub async fn list_schools(
    req: HttpRequest,
    query: web::Query<SchoolQueryParams>,
) -> ActixResult<HttpResponse> {
    SCHOOL_SERVICE.list_schools(&req, query.into_inner()).await
}

pub async fn create_school(
    req: HttpRequest,
    school_data: web::Json<CreateSchoolRequest>,
) -> ActixResult<HttpResponse> {
    SCHOOL_SERVICE
        .create_school(&req, school_data.into_inner())
        .await
}

pub async fn get_school(req: HttpRequest) -> ActixResult<HttpResponse> {
    SCHOOL_SERVICE.get_school(&req).await
}

pub async fn update_school(
    req: HttpRequest,
    update_data: web::Json<UpdateSchoolRequest>,
) -> ActixResult<HttpResponse> {
    SCHOOL_SERVICE
        .update_school(&req, update_data.into_inner())
        .await
}

pub async fn delete_school(req: HttpRequest) -> ActixResult<HttpResponse> {
    SCHOOL_SERVICE.delete_school(&req).await
}

pub async fn get_school_stats(req: HttpRequest) -> ActixResult<HttpResponse> {
    SCHOOL_SERVICE.get_school_stats(&req).await
}

pub async fn sync_identifiers(
    req: HttpRequest,
    sync_data: web::Json<SyncIdentifiersRequest>,
) -> ActixResult<HttpResponse> {
    IDENTIFIER_SERVICE
        .sync_identifiers(&req, sync_data.into_inner())
        .await
}

// 配置路由
pub fn configure_school_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/schools")
            // 先认证再限流，按用户计数
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireJWT)
            .service(
                // 学校的创建与列表仅平台管理员可用
                web::resource("")
                    .route(
                        web::get()
                            .to(list_schools)
                            .wrap(middlewares::RequireRole::new(&UserRole::SuperAdmin)),
                    )
                    .route(
                        web::post()
                            .to(create_school)
                            .wrap(middlewares::RequireRole::new(&UserRole::SuperAdmin)),
                    ),
            )
            .service(
                web::scope("/{school_id}")
                    .wrap(middlewares::RequireSchoolAccess)
                    .service(
                        web::resource("")
                            .route(web::get().to(get_school))
                            .route(
                                web::put()
                                    .to(update_school)
                                    .wrap(middlewares::RequireRole::new_any(
                                        UserRole::admin_roles(),
                                    )),
                            )
                            .route(
                                web::delete()
                                    .to(delete_school)
                                    // 整个租户级联删除
                                    .wrap(middlewares::RequireRole::new(&UserRole::SuperAdmin)),
                            ),
                    )
                    .service(
                        web::resource("/stats").route(
                            web::get()
                                .to(get_school_stats)
                                .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                        ),
                    )
                    .service(
                        web::resource("/identifiers/sync").route(
                            web::post()
                                .to(sync_identifiers)
                                .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                        ),
                    )
                    .configure(accounts::configure_account_routes)
                    .configure(classes::configure_class_routes)
                    .configure(subjects::configure_subject_routes)
                    .configure(exams::configure_exam_routes)
                    .configure(grades::configure_grade_routes)
                    .configure(announcements::configure_announcement_routes)
                    .configure(schedules::configure_schedule_routes)
                    .configure(lesson_logs::configure_lesson_log_routes)
                    .configure(payments::configure_school_payment_routes),
            ),
    );
}
