/*!
 * 学校（租户）隔离中间件
 *
 * 必须在 RequireJWT 之后、挂在 `/api/v1/schools/{school_id}` 作用域上使用。
 *
 * - 平台管理员可访问任意学校，不携带档案
 * - 其他用户只能访问自己所属的学校，并要求存在成员档案
 *
 * 通过后把 [`SchoolContext`] 写入请求扩展，服务层据此做行级权限判断。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{error, info};

use crate::models::{
    ErrorCode,
    profiles::entities::Profile,
    users::entities::{User, UserRole},
};
use crate::storage::Storage;
use crate::utils::extractor::school_id_from_path;

use super::create_error_response;

/// 当前请求的学校上下文
#[derive(Debug, Clone)]
pub struct SchoolContext {
    pub school_id: i64,
    pub user: User,
    /// 平台管理员没有档案
    pub profile: Option<Profile>,
}

impl SchoolContext {
    pub fn role(&self) -> UserRole {
        self.user.role
    }

    /// 学校管理员或平台管理员
    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    pub fn profile_id(&self) -> Option<i64> {
        self.profile.as_ref().map(|p| p.id)
    }
}

#[derive(Clone)]
pub struct RequireSchoolAccess;

impl RequireSchoolAccess {
    /// 从请求扩展中提取学校上下文
    pub fn extract_context(req: &HttpRequest) -> Option<SchoolContext> {
        req.extensions().get::<SchoolContext>().cloned()
    }
}

enum AccessDenied {
    Unauthenticated,
    BadPath,
    OtherSchool,
    NoProfile,
    Backend,
}

impl AccessDenied {
    fn into_response(self) -> actix_web::HttpResponse {
        match self {
            AccessDenied::Unauthenticated => create_error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "Authentication required",
            ),
            AccessDenied::BadPath => create_error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                "Invalid school id in path",
            ),
            AccessDenied::OtherSchool => create_error_response(
                StatusCode::FORBIDDEN,
                ErrorCode::SchoolPermissionDenied,
                "You do not belong to this school",
            ),
            AccessDenied::NoProfile => create_error_response(
                StatusCode::FORBIDDEN,
                ErrorCode::SchoolPermissionDenied,
                "No member profile in this school",
            ),
            AccessDenied::Backend => create_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Failed to resolve school membership",
            ),
        }
    }
}

async fn resolve_context(req: &ServiceRequest) -> Result<SchoolContext, AccessDenied> {
    let user = req
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or(AccessDenied::Unauthenticated)?;
    let school_id = school_id_from_path(req).ok_or(AccessDenied::BadPath)?;

    if user.role == UserRole::SuperAdmin {
        return Ok(SchoolContext {
            school_id,
            user,
            profile: None,
        });
    }

    if user.school_id != Some(school_id) {
        info!(
            "User {} (school {:?}) denied access to school {}",
            user.id, user.school_id, school_id
        );
        return Err(AccessDenied::OtherSchool);
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or(AccessDenied::Backend)?;

    let profile = storage
        .get_profile_by_user_id(user.id)
        .await
        .map_err(|e| {
            error!("Failed to load profile for user {}: {}", user.id, e);
            AccessDenied::Backend
        })?
        .filter(|p| p.school_id == school_id)
        .ok_or(AccessDenied::NoProfile)?;

    Ok(SchoolContext {
        school_id,
        user,
        profile: Some(profile),
    })
}

impl<S, B> Transform<S, ServiceRequest> for RequireSchoolAccess
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireSchoolAccessMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSchoolAccessMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireSchoolAccessMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireSchoolAccessMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            match resolve_context(&req).await {
                Ok(context) => {
                    req.extensions_mut().insert(context);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(denied) => {
                    Ok(req.into_response(denied.into_response().map_into_right_body()))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserStatus;
    use actix_web::{App, HttpResponse, test};

    fn user(role: UserRole, school_id: Option<i64>) -> User {
        let now = chrono::Utc::now();
        User {
            id: 1,
            login: "root@platform".to_string(),
            email: None,
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            school_id,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn echo_school(req: HttpRequest) -> HttpResponse {
        match RequireSchoolAccess::extract_context(&req) {
            Some(ctx) => HttpResponse::Ok().body(ctx.school_id.to_string()),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    #[actix_web::test]
    async fn test_super_admin_reaches_any_school() {
        let app = test::init_service(
            App::new().service(
                web::scope("/schools/{school_id}")
                    .wrap(RequireSchoolAccess)
                    .wrap_fn(|req, srv| {
                        req.extensions_mut().insert(user(UserRole::SuperAdmin, None));
                        srv.call(req)
                    })
                    .route("/ping", web::get().to(echo_school)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/schools/42/ping").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "42");
    }

    #[actix_web::test]
    async fn test_member_of_other_school_is_forbidden() {
        let app = test::init_service(
            App::new().service(
                web::scope("/schools/{school_id}")
                    .wrap(RequireSchoolAccess)
                    .wrap_fn(|req, srv| {
                        req.extensions_mut().insert(user(UserRole::Admin, Some(7)));
                        srv.call(req)
                    })
                    .route("/ping", web::get().to(echo_school)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/schools/8/ping").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_missing_user_is_unauthorized() {
        let app = test::init_service(
            App::new().service(
                web::scope("/schools/{school_id}")
                    .wrap(RequireSchoolAccess)
                    .route("/ping", web::get().to(echo_school)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/schools/1/ping").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
