use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SchoolService;
use crate::models::{ApiResponse, ErrorCode, schools::responses::SchoolResponse};
use crate::services::{error_response, forbidden, not_found, school_context, try_response};

pub async fn get_school(
    service: &SchoolService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    match storage.get_school_by_id(ctx.school_id).await {
        Ok(Some(school)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SchoolResponse {
                school,
                identifier_sync: None,
            },
            "School retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::SchoolNotFound, "School not found")),
        Err(e) => Ok(error_response("Failed to retrieve school", &e)),
    }
}

pub async fn get_school_stats(
    service: &SchoolService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if !ctx.is_admin() {
        return Ok(forbidden("Only administrators can view school statistics"));
    }

    match storage.get_school_stats(ctx.school_id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            stats,
            "School statistics retrieved successfully",
        ))),
        Err(e) => Ok(error_response("Failed to retrieve school statistics", &e)),
    }
}
