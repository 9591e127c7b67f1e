use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SchoolService;
use crate::models::{
    ApiResponse, ErrorCode,
    schools::{requests::CreateSchoolRequest, responses::SchoolResponse},
};
use crate::services::{bad_request, error_response, failure};
use crate::utils::validate::{validate_email, validate_name, validate_suffix};

pub async fn create_school(
    service: &SchoolService,
    request: &HttpRequest,
    mut create_request: CreateSchoolRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    create_request.name = create_request.name.trim().to_string();
    create_request.suffix = create_request.suffix.trim().to_string();

    if let Err(msg) = validate_name(&create_request.name) {
        return Ok(bad_request(msg));
    }
    if let Err(msg) = validate_suffix(&create_request.suffix) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
            ErrorCode::SchoolSuffixInvalid,
            msg,
        )));
    }
    if let Some(email) = &create_request.email
        && let Err(msg) = validate_email(email)
    {
        return Ok(bad_request(msg));
    }

    match storage.get_school_by_suffix(&create_request.suffix).await {
        Ok(Some(_)) => {
            return Ok(failure(
                actix_web::http::StatusCode::CONFLICT,
                ErrorCode::Conflict,
                format!("Suffix '{}' is already in use", create_request.suffix),
            ));
        }
        Ok(None) => {}
        Err(e) => return Ok(error_response("Failed to check suffix", &e)),
    }

    match storage.create_school(create_request).await {
        Ok(school) => {
            info!("School {} created with suffix {}", school.id, school.suffix);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                SchoolResponse {
                    school,
                    identifier_sync: None,
                },
                "School created successfully",
            )))
        }
        Err(e) => Ok(error_response("Failed to create school", &e)),
    }
}
