use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, auth::ChangePasswordRequest};
use crate::services::{bad_request, error_response};
use crate::utils::password::{hash_password_with, verify_password};
use crate::utils::validate::validate_password_simple;

use super::AuthService;

pub async fn handle_change_password(
    service: &AuthService,
    change_request: ChangePasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    // 缓存中的用户不含密码哈希，从存储重新读取
    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AccountNotFound,
                "Account not found",
            )));
        }
        Err(e) => return Ok(error_response("Failed to change password", &e)),
    };

    if !verify_password(&change_request.current_password, &user.password_hash) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::PasswordChangeFailed,
            "Current password is incorrect",
        )));
    }
    if let Err(msg) = validate_password_simple(&change_request.new_password) {
        return Ok(bad_request(msg));
    }

    let password_hash =
        match hash_password_with(&change_request.new_password, &service.get_config().argon2) {
            Ok(hash) => hash,
            Err(e) => return Ok(error_response("Failed to change password", &e)),
        };

    match storage.update_user_password(user.id, &password_hash).await {
        Ok(true) => {
            info!("User {} changed password", user.login);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Password changed successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AccountNotFound,
            "Account not found",
        ))),
        Err(e) => Ok(error_response("Failed to change password", &e)),
    }
}
