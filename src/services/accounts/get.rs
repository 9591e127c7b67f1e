use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AccountService, can_view_profile};
use crate::models::{
    ApiResponse, ErrorCode,
    profiles::{entities::Account, responses::AccountResponse},
};
use crate::services::{
    error_response, forbidden, not_found, school_context, scoped, try_response,
};

pub async fn get_account(
    service: &AccountService,
    request: &HttpRequest,
    profile_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let profile = try_response!(scoped(
        storage.get_profile_by_id(profile_id).await,
        ctx.school_id,
        ErrorCode::AccountNotFound,
        "Account",
    ));

    if !can_view_profile(&ctx, &profile) {
        return Ok(forbidden("You cannot view this account"));
    }

    let user = match storage.get_user_by_id(profile.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::AccountNotFound,
                "Authentication record not found",
            ));
        }
        Err(e) => return Ok(error_response("Failed to load account", &e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AccountResponse {
            account: Account { user, profile },
            initial_password: None,
        },
        "Account retrieved successfully",
    )))
}
