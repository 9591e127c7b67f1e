use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AccountService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{
    bad_request, error_response, forbidden, not_found, school_context, scoped, try_response,
};

pub async fn delete_account(
    service: &AccountService,
    request: &HttpRequest,
    profile_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if !ctx.is_admin() {
        return Ok(forbidden("Only administrators can delete accounts"));
    }
    if ctx.profile_id() == Some(profile_id) {
        return Ok(bad_request("You cannot delete your own account"));
    }

    let profile = try_response!(scoped(
        storage.get_profile_by_id(profile_id).await,
        ctx.school_id,
        ErrorCode::AccountNotFound,
        "Account",
    ));

    match storage.delete_account(profile.id).await {
        Ok(true) => {
            info!(
                "Account {:?} (profile {}) deleted from school {}",
                profile.matricule, profile.id, ctx.school_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Account deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::AccountNotFound, "Account not found")),
        Err(e) => Ok(error_response("Failed to delete account", &e)),
    }
}
