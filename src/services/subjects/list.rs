use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubjectService;
use crate::models::{
    ApiResponse,
    subjects::requests::{SubjectListQuery, SubjectQueryParams},
};
use crate::services::{error_response, school_context, try_response};

pub async fn list_subjects(
    service: &SubjectService,
    request: &HttpRequest,
    query: SubjectQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let list_query = SubjectListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        class_id: query.class_id,
        teacher_id: query.teacher_id,
    };

    match storage
        .list_subjects_with_pagination(ctx.school_id, list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Subject list retrieved successfully",
        ))),
        Err(e) => Ok(error_response("Failed to retrieve subject list", &e)),
    }
}
