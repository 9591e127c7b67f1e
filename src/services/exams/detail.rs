use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ExamService, authorize_exam_writer, validate_max_score};
use crate::models::{ApiResponse, ErrorCode, exams::requests::UpdateExamRequest};
use crate::services::{
    bad_request, check, error_response, not_found, school_context, scoped, try_response,
};
use crate::utils::validate::{validate_date, validate_term};

pub async fn get_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let exam = try_response!(scoped(
        storage.get_exam_by_id(exam_id).await,
        ctx.school_id,
        ErrorCode::ExamNotFound,
        "Exam",
    ));
    Ok(HttpResponse::Ok().json(ApiResponse::success(exam, "Exam retrieved successfully")))
}

pub async fn update_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
    mut update_data: UpdateExamRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    let (exam, _) = try_response!(authorize_exam_writer(storage.as_ref(), &ctx, exam_id).await);

    if let Some(title) = update_data.title.as_mut() {
        *title = title.trim().to_string();
        if title.is_empty() {
            return Ok(bad_request("Exam title cannot be empty"));
        }
    }
    if let Some(term) = update_data.term {
        try_response!(check(validate_term(term)));
    }
    if let Some(date) = &update_data.exam_date {
        try_response!(check(validate_date(date)));
    }
    if let Some(max_score) = update_data.max_score {
        try_response!(check(validate_max_score(max_score)));
        // 已录入的分数不能超过新的满分
        let grades = match storage.list_grades_for_exams(&[exam.id]).await {
            Ok(grades) => grades,
            Err(e) => return Ok(error_response("Failed to load grades", &e)),
        };
        if grades
            .iter()
            .filter_map(|g| g.score)
            .any(|score| score > max_score)
        {
            return Ok(bad_request(
                "Max score is lower than an already recorded score",
            ));
        }
    }

    match storage.update_exam(exam.id, update_data).await {
        Ok(Some(exam)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            exam,
            "Exam updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::ExamNotFound, "Exam not found")),
        Err(e) => Ok(error_response("Failed to update exam", &e)),
    }
}

pub async fn delete_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    let (exam, _) = try_response!(authorize_exam_writer(storage.as_ref(), &ctx, exam_id).await);

    match storage.delete_exam(exam.id).await {
        Ok(true) => {
            info!("Exam {} deleted from school {}", exam.id, ctx.school_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Exam deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::ExamNotFound, "Exam not found")),
        Err(e) => Ok(error_response("Failed to delete exam", &e)),
    }
}
