use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SchoolService;
use crate::errors::SchoolHubError;
use crate::models::{
    ApiResponse, ErrorCode,
    schools::{requests::UpdateSchoolRequest, responses::SchoolResponse},
};
use crate::services::identifiers::sync_school_identifiers;
use crate::services::{
    bad_request, error_response, forbidden, not_found, school_context, try_response,
};
use crate::utils::validate::{validate_email, validate_name};

pub async fn update_school(
    service: &SchoolService,
    request: &HttpRequest,
    mut update_request: UpdateSchoolRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if !ctx.is_admin() {
        return Ok(forbidden("Only administrators can update the school"));
    }

    if let Some(name) = &update_request.name
        && let Err(msg) = validate_name(name)
    {
        return Ok(bad_request(msg));
    }
    if let Some(email) = &update_request.email
        && let Err(msg) = validate_email(email)
    {
        return Ok(bad_request(msg));
    }

    let school = match storage.get_school_by_id(ctx.school_id).await {
        Ok(Some(school)) => school,
        Ok(None) => return Ok(not_found(ErrorCode::SchoolNotFound, "School not found")),
        Err(e) => return Ok(error_response("Failed to load school", &e)),
    };

    // 后缀变化时先完成标识同步
    let mut identifier_sync = None;
    if let Some(suffix) = update_request.suffix.take().map(|s| s.trim().to_string())
        && suffix != school.suffix
    {
        match sync_school_identifiers(storage.as_ref(), &school, &suffix, None).await {
            Ok((_, report)) => identifier_sync = Some(report),
            Err(e @ SchoolHubError::Validation(_)) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
                    ErrorCode::SchoolSuffixInvalid,
                    e.message(),
                )));
            }
            Err(e) => return Ok(error_response("Failed to change school suffix", &e)),
        }
    }

    match storage.update_school(ctx.school_id, update_request).await {
        Ok(Some(school)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SchoolResponse {
                school,
                identifier_sync,
            },
            "School updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::SchoolNotFound, "School not found")),
        Err(e) => Ok(error_response("Failed to update school", &e)),
    }
}
