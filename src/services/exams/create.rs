use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ExamService, validate_max_score};
use crate::models::{
    ApiResponse,
    exams::{entities::DEFAULT_MAX_SCORE, requests::CreateExamRequest},
};
use crate::services::access::{can_teach, ensure_subject_of_class};
use crate::services::{
    bad_request, check, error_response, forbidden, school_context, try_response,
};
use crate::utils::validate::{validate_date, validate_term};

pub async fn create_exam(
    service: &ExamService,
    request: &HttpRequest,
    mut exam_data: CreateExamRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let subject = match ensure_subject_of_class(
        storage.as_ref(),
        ctx.school_id,
        exam_data.class_id,
        exam_data.subject_id,
    )
    .await
    {
        Ok(subject) => subject,
        Err(e) => return Ok(error_response("Invalid exam", &e)),
    };
    if !can_teach(&ctx, &subject) {
        return Ok(forbidden(
            "Only administrators or the subject teacher can create exams",
        ));
    }

    exam_data.title = exam_data.title.trim().to_string();
    if exam_data.title.is_empty() {
        return Ok(bad_request("Exam title cannot be empty"));
    }
    try_response!(check(validate_term(exam_data.term)));
    if let Some(date) = &exam_data.exam_date {
        try_response!(check(validate_date(date)));
    }
    let max_score = exam_data.max_score.unwrap_or(DEFAULT_MAX_SCORE);
    try_response!(check(validate_max_score(max_score)));
    exam_data.max_score = Some(max_score);

    match storage.create_exam(ctx.school_id, exam_data).await {
        Ok(exam) => {
            info!(
                "Exam {} created for subject {} (term {}) in school {}",
                exam.id, exam.subject_id, exam.term, ctx.school_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(exam, "Exam created successfully")))
        }
        Err(e) => Ok(error_response("Exam creation failed", &e)),
    }
}
