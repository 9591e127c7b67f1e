use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GradeService, validate_score};
use crate::models::{ApiResponse, ErrorCode, grades::requests::UpdateGradeRequest};
use crate::services::access::visible_student_ids;
use crate::services::exams::authorize_exam_writer;
use crate::services::{
    bad_request, error_response, not_found, school_context, scoped, try_response,
};

pub async fn get_grade(
    service: &GradeService,
    request: &HttpRequest,
    grade_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let grade = try_response!(scoped(
        storage.get_grade_by_id(grade_id).await,
        ctx.school_id,
        ErrorCode::GradeNotFound,
        "Grade",
    ));
    if let Some(allowed) = try_response!(visible_student_ids(storage.as_ref(), &ctx).await)
        && !allowed.contains(&grade.student_id)
    {
        return Ok(not_found(ErrorCode::GradeNotFound, "Grade not found"));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(grade, "Grade retrieved successfully")))
}

pub async fn update_grade(
    service: &GradeService,
    request: &HttpRequest,
    grade_id: i64,
    update_data: UpdateGradeRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let grade = try_response!(scoped(
        storage.get_grade_by_id(grade_id).await,
        ctx.school_id,
        ErrorCode::GradeNotFound,
        "Grade",
    ));
    let (exam, _) =
        try_response!(authorize_exam_writer(storage.as_ref(), &ctx, grade.exam_id).await);
    if let Err(msg) = validate_score(update_data.score, exam.max_score) {
        return Ok(bad_request(msg));
    }

    match storage.update_grade(grade.id, update_data).await {
        Ok(Some(grade)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            grade,
            "Grade updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::GradeNotFound, "Grade not found")),
        Err(e) => Ok(error_response("Failed to update grade", &e)),
    }
}

pub async fn delete_grade(
    service: &GradeService,
    request: &HttpRequest,
    grade_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let grade = try_response!(scoped(
        storage.get_grade_by_id(grade_id).await,
        ctx.school_id,
        ErrorCode::GradeNotFound,
        "Grade",
    ));
    try_response!(authorize_exam_writer(storage.as_ref(), &ctx, grade.exam_id).await);

    match storage.delete_grade(grade.id).await {
        Ok(true) => {
            info!(
                "Grade {} (exam {}, student {}) deleted",
                grade.id, grade.exam_id, grade.student_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Grade deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::GradeNotFound, "Grade not found")),
        Err(e) => Ok(error_response("Failed to delete grade", &e)),
    }
}
