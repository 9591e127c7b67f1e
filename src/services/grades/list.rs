use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::models::{
    ApiResponse,
    grades::requests::{GradeListQuery, GradeQueryParams},
};
use crate::services::access::visible_student_ids;
use crate::services::{error_response, school_context, try_response};

pub async fn list_grades(
    service: &GradeService,
    request: &HttpRequest,
    query: GradeQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    // 学生只看自己，家长只看孩子
    let student_ids = try_response!(visible_student_ids(storage.as_ref(), &ctx).await);

    let list_query = GradeListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        exam_id: query.exam_id,
        student_id: query.student_id,
        student_ids,
    };

    match storage
        .list_grades_with_pagination(ctx.school_id, list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Grade list retrieved successfully",
        ))),
        Err(e) => Ok(error_response("Failed to retrieve grade list", &e)),
    }
}
