use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::SchoolService;
use crate::models::{ApiResponse, ErrorCode, users::entities::UserRole};
use crate::services::{error_response, forbidden, not_found, school_context, try_response};

pub async fn delete_school(
    service: &SchoolService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if ctx.role() != UserRole::SuperAdmin {
        return Ok(forbidden("Only platform administrators can delete schools"));
    }

    match storage.delete_school_cascade(ctx.school_id).await {
        Ok(Some(report)) => {
            warn!(
                "School {} deleted by user {}: {} profiles, {} grades, {} payments",
                ctx.school_id, ctx.user.id, report.profiles, report.grades, report.payments
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                report,
                "School and all its data deleted successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::SchoolNotFound, "School not found")),
        Err(e) => Ok(error_response("Failed to delete school", &e)),
    }
}
