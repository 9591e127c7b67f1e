use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::profiles::requests::{
    AccountQueryParams, CreateAccountRequest, UpdateAccountRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AccountService;
use crate::utils::SafeProfileIdI64;

static ACCOUNT_SERVICE: Lazy<AccountService> = Lazy::new(AccountService::new_lazy);

pub async fn list_accounts(
    req: HttpRequest,
    query: web::Query<AccountQueryParams>,
) -> ActixResult<HttpResponse> {
    ACCOUNT_SERVICE.list_accounts(&req, query.into_inner()).await
}

pub async fn create_account(
    req: HttpRequest,
    account_data: web::Json<CreateAccountRequest>,
) -> ActixResult<HttpResponse> {
    ACCOUNT_SERVICE
        .create_account(&req, account_data.into_inner())
        .await
}

pub async fn get_account(
    req: HttpRequest,
    profile_id: SafeProfileIdI64,
) -> ActixResult<HttpResponse> {
    ACCOUNT_SERVICE.get_account(&req, profile_id.0).await
}

pub async fn update_account(
    req: HttpRequest,
    profile_id: SafeProfileIdI64,
    update_data: web::Json<UpdateAccountRequest>,
) -> ActixResult<HttpResponse> {
    ACCOUNT_SERVICE
        .update_account(&req, profile_id.0, update_data.into_inner())
        .await
}

pub async fn delete_account(
    req: HttpRequest,
    profile_id: SafeProfileIdI64,
) -> ActixResult<HttpResponse> {
    ACCOUNT_SERVICE.delete_account(&req, profile_id.0).await
}

// 挂在 /api/v1/schools/{school_id} 作用域下
pub fn configure_account_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/accounts")
            .service(
                web::resource("")
                    // 家长只能列出自己的孩子，在服务层过滤
                    .route(web::get().to(list_accounts))
                    .route(
                        web::post()
                            .to(create_account)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{profile_id}")
                    .route(web::get().to(get_account))
                    .route(
                        web::put()
                            .to(update_account)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_account)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}
