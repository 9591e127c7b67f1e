use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::auth::responses::{RefreshTokenResponse, UserInfoResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::utils::jwt::{self, TokenSubject};

use super::AuthService;

fn login_expired() -> HttpResponse {
    // 清除无效的 refresh token cookie
    let empty_cookie = jwt::JwtUtils::create_empty_refresh_token_cookie();
    HttpResponse::Unauthorized()
        .cookie(empty_cookie)
        .json(ApiResponse::error_empty(
            ErrorCode::TokenInvalid,
            "Login expired or invalid, please login again",
        ))
}

pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();
    let storage = service.get_storage(request)?;

    let Some(refresh_token) = jwt::JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    let claims = match jwt::JwtUtils::verify_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("Refresh token rejected: {}", e);
            return Ok(login_expired());
        }
    };
    let Some(user_id) = claims.user_id() else {
        return Ok(login_expired());
    };

    // 以当前账号状态与角色重新签发
    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.is_active() => user,
        Ok(_) => return Ok(login_expired()),
        Err(e) => return Ok(error_response("Failed to refresh token", &e)),
    };

    let role = user.role.to_string();
    match jwt::JwtUtils::generate_access_token(TokenSubject {
        user_id: user.id,
        role: &role,
        school_id: user.school_id,
    }) {
        Ok(access_token) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RefreshTokenResponse {
                access_token,
                expires_in: config.jwt.access_token_expiry * 60,
            },
            "Token refreshed successfully",
        ))),
        Err(e) => {
            tracing::error!("Refresh token failed: {}", e);
            Ok(login_expired())
        }
    }
}

pub async fn handle_get_user(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    match storage.get_profile_by_user_id(user.id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserInfoResponse { user, profile },
            "User information retrieved successfully",
        ))),
        Err(e) => Ok(error_response("Failed to load profile", &e)),
    }
}
