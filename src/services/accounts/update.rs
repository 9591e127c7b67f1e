use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AccountService;
use super::create::check_student_links;
use crate::config::AppConfig;
use crate::errors::{Result, SchoolHubError};
use crate::models::{
    ApiResponse, ErrorCode,
    profiles::{
        entities::{Account, Profile},
        requests::{UpdateAccountRequest, UpdateProfile},
        responses::AccountResponse,
    },
    users::entities::UserRole,
};
use crate::services::{
    error_response, forbidden, not_found, school_context, scoped, try_response,
};
use crate::storage::Storage;
use crate::utils::password::hash_password_with;
use crate::utils::validate::{validate_name, validate_password_simple};

pub async fn update_account(
    service: &AccountService,
    request: &HttpRequest,
    profile_id: i64,
    update_request: UpdateAccountRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if !ctx.is_admin() {
        return Ok(forbidden("Only administrators can update accounts"));
    }

    let profile = try_response!(scoped(
        storage.get_profile_by_id(profile_id).await,
        ctx.school_id,
        ErrorCode::AccountNotFound,
        "Account",
    ));

    match apply_update(storage.as_ref(), &profile, update_request).await {
        Ok(Some(account)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AccountResponse {
                account,
                initial_password: None,
            },
            "Account updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::AccountNotFound, "Account not found")),
        Err(e) => Ok(error_response("Failed to update account", &e)),
    }
}

async fn apply_update(
    storage: &dyn Storage,
    profile: &Profile,
    req: UpdateAccountRequest,
) -> Result<Option<Account>> {
    for name in [&req.first_name, &req.last_name].into_iter().flatten() {
        validate_name(name).map_err(SchoolHubError::validation)?;
    }

    if profile.role != UserRole::Student && (req.class_id.is_some() || req.parent_id.is_some()) {
        return Err(SchoolHubError::validation(
            "Only student accounts can be linked to a class or a parent",
        ));
    }
    if let Some(school) = storage.get_school_by_id(profile.school_id).await? {
        check_student_links(storage, &school, req.class_id, req.parent_id).await?;
    }

    // 写入前完成全部校验
    let password_hash = match &req.password {
        Some(password) => {
            validate_password_simple(password).map_err(SchoolHubError::validation)?;
            Some(hash_password_with(password, &AppConfig::get().argon2)?)
        }
        None => None,
    };

    let Some(updated) = storage
        .update_profile(
            profile.id,
            UpdateProfile {
                first_name: req.first_name.map(|n| n.trim().to_string()),
                last_name: req.last_name.map(|n| n.trim().to_string()),
                phone: req.phone,
                class_id: req.class_id,
                parent_id: req.parent_id,
            },
        )
        .await?
    else {
        return Ok(None);
    };

    if let Some(status) = req.status {
        storage.update_user_status(updated.user_id, status).await?;
        info!("Account {} status set to {}", updated.id, status);
    }
    if let Some(password_hash) = password_hash {
        storage
            .update_user_password(updated.user_id, &password_hash)
            .await?;
        info!("Password of account {} reset by administrator", updated.id);
    }

    Ok(storage
        .get_user_by_id(updated.user_id)
        .await?
        .map(|user| Account {
            user,
            profile: updated,
        }))
}
