use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ExamService;
use crate::models::{
    ApiResponse,
    exams::requests::{ExamListQuery, ExamQueryParams},
};
use crate::services::{check, error_response, school_context, try_response};
use crate::utils::validate::validate_term;

pub async fn list_exams(
    service: &ExamService,
    request: &HttpRequest,
    query: ExamQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if let Some(term) = query.term {
        try_response!(check(validate_term(term)));
    }

    let list_query = ExamListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        class_id: query.class_id,
        subject_id: query.subject_id,
        term: query.term,
    };

    match storage
        .list_exams_with_pagination(ctx.school_id, list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Exam list retrieved successfully",
        ))),
        Err(e) => Ok(error_response("Failed to retrieve exam list", &e)),
    }
}
