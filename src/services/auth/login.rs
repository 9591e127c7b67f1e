use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
    users::entities::User,
};
use crate::services::error_response;
use crate::storage::Storage;
use crate::utils::jwt;
use crate::utils::password::verify_password;

use super::AuthService;

/// 按学号或邮箱查找用户，管理员邮箱不区分大小写
async fn find_user(storage: &dyn Storage, identifier: &str) -> crate::errors::Result<Option<User>> {
    if let Some(user) = storage.get_user_by_identifier(identifier).await? {
        return Ok(Some(user));
    }
    let lowered = identifier.to_lowercase();
    if lowered != identifier {
        return storage.get_user_by_identifier(&lowered).await;
    }
    Ok(None)
}

fn login_failed() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::LoginFailed,
        "Identifier or password is incorrect",
    ))
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let config = service.get_config();
    let identifier = login_request.identifier.trim();

    // 1. 根据学号或邮箱获取用户
    let user = match find_user(storage.as_ref(), identifier).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(login_failed()),
        Err(e) => return Ok(error_response("Login failed", &e)),
    };

    // 2. 验证密码
    if !verify_password(&login_request.password, &user.password_hash) {
        warn!("Failed login attempt for {}", user.login);
        return Ok(login_failed());
    }

    // 3. 停用或暂停的账号不能登录
    if !user.is_active() {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::AccountInactive,
            format!("Account is {}", user.status),
        )));
    }

    // 4. 更新最后登录时间
    if let Err(e) = storage.update_last_login(user.id).await {
        warn!("Failed to update last login of user {}: {}", user.id, e);
    }

    let profile = match storage.get_profile_by_user_id(user.id).await {
        Ok(profile) => profile,
        Err(e) => return Ok(error_response("Login failed", &e)),
    };

    // 5. 生成令牌对
    let refresh_expiry = if login_request.remember_me {
        chrono::Duration::days(config.jwt.refresh_token_remember_me_expiry)
    } else {
        chrono::Duration::days(config.jwt.refresh_token_expiry)
    };
    let token_pair = match user.generate_token_pair(Some(refresh_expiry)) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            );
        }
    };

    info!("User {} logged in successfully", user.login);

    // 6. refresh token 放入 HttpOnly cookie
    let refresh_cookie =
        jwt::JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token, refresh_expiry);

    let response = LoginResponse {
        access_token: token_pair.access_token,
        expires_in: config.jwt.access_token_expiry * 60, // 转换为秒
        user,
        profile,
        created_at: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie)
        .json(ApiResponse::success(response, "Login successful")))
}
