use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::classes::requests::{ClassQueryParams, CreateClassRequest, UpdateClassRequest};
use crate::models::results::requests::ResultsQuery;
use crate::models::users::entities::UserRole;
use crate::services::{ClassService, ResultService};
use crate::utils::SafeClassIdI64;

// 懒加载的全局 CLASS_SERVICE 实例
static CLASS_SERVICE: Lazy<ClassService> = Lazy::new(ClassService::new_lazy);
static RESULT_SERVICE: Lazy<ResultService> = Lazy::new(ResultService::new_lazy);

// HTTP处理程序
pub async fn list_classes(
    req: HttpRequest,
    query: web::Query<ClassQueryParams>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_classes(&req, query.into_inner()).await
}

pub async fn create_class(
    req: HttpRequest,
    class_data: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .create_class(&req, class_data.into_inner())
        .await
}

pub async fn get_class(req: HttpRequest, class_id: SafeClassIdI64) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.get_class(&req, class_id.0).await
}

pub async fn update_class(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    update_data: web::Json<UpdateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .update_class(&req, class_id.0, update_data.into_inner())
        .await
}

pub async fn delete_class(req: HttpRequest, class_id: SafeClassIdI64) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.delete_class(&req, class_id.0).await
}

pub async fn term_results(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    query: web::Query<ResultsQuery>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE
        .term_results(&req, class_id.0, query.into_inner())
        .await
}

pub async fn annual_results(
    req: HttpRequest,
    class_id: SafeClassIdI64,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.annual_results(&req, class_id.0).await
}

pub async fn export_term_bulletin(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    query: web::Query<ResultsQuery>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE
        .export_term_bulletin(&req, class_id.0, query.into_inner())
        .await
}

pub async fn export_annual_bulletin(
    req: HttpRequest,
    class_id: SafeClassIdI64,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.export_annual_bulletin(&req, class_id.0).await
}

// 挂在 /api/v1/schools/{school_id} 作用域下
pub fn configure_class_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/classes")
            .service(
                web::resource("").route(web::get().to(list_classes)).route(
                    web::post()
                        .to(create_class)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/{class_id}")
                    .route(web::get().to(get_class))
                    .route(
                        web::put()
                            .to(update_class)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_class)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                // 成绩汇总与排名仅教职工可见
                web::scope("/{class_id}")
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
                    .route("/results", web::get().to(term_results))
                    .route("/results/annual", web::get().to(annual_results))
                    .service(
                        web::scope("/bulletins")
                            .wrap(middlewares::RateLimit::export())
                            .route("", web::get().to(export_term_bulletin))
                            .route("/annual", web::get().to(export_annual_bulletin)),
                    ),
            ),
    );
}
