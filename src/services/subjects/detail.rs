use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{SubjectService, validate_coefficient};
use crate::models::{ApiResponse, ErrorCode, subjects::requests::UpdateSubjectRequest};
use crate::services::access::{ensure_teacher, require_admin};
use crate::services::{check, error_response, not_found, school_context, scoped, try_response};
use crate::utils::validate::validate_name;

pub async fn get_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let subject = try_response!(scoped(
        storage.get_subject_by_id(subject_id).await,
        ctx.school_id,
        ErrorCode::SubjectNotFound,
        "Subject",
    ));
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        subject,
        "Subject retrieved successfully",
    )))
}

pub async fn update_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
    mut update_data: UpdateSubjectRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    try_response!(require_admin(&ctx, "update subjects"));

    try_response!(scoped(
        storage.get_subject_by_id(subject_id).await,
        ctx.school_id,
        ErrorCode::SubjectNotFound,
        "Subject",
    ));

    if let Some(name) = update_data.name.as_mut() {
        *name = name.trim().to_string();
        try_response!(check(validate_name(name)));
    }
    if let Some(coefficient) = update_data.coefficient {
        try_response!(check(validate_coefficient(coefficient)));
    }
    if let Some(teacher_id) = update_data.teacher_id
        && let Err(e) = ensure_teacher(storage.as_ref(), ctx.school_id, teacher_id).await
    {
        return Ok(error_response("Invalid teacher", &e));
    }

    match storage.update_subject(subject_id, update_data).await {
        Ok(Some(subject)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            subject,
            "Subject updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::SubjectNotFound, "Subject not found")),
        Err(e) => Ok(error_response("Failed to update subject", &e)),
    }
}

pub async fn delete_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    try_response!(require_admin(&ctx, "delete subjects"));

    let subject = try_response!(scoped(
        storage.get_subject_by_id(subject_id).await,
        ctx.school_id,
        ErrorCode::SubjectNotFound,
        "Subject",
    ));

    match storage.delete_subject(subject.id).await {
        Ok(true) => {
            info!("Subject {} deleted from school {}", subject.id, ctx.school_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Subject deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::SubjectNotFound, "Subject not found")),
        Err(e) => Ok(error_response("Failed to delete subject", &e)),
    }
}
