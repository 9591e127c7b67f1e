use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LessonLogService;
use crate::models::{
    ApiResponse,
    lesson_logs::requests::{LessonLogListQuery, LessonLogQueryParams},
};
use crate::services::access::member_class_ids;
use crate::services::{check, error_response, forbidden, school_context, try_response};
use crate::utils::validate::validate_date;

pub async fn list_lesson_logs(
    service: &LessonLogService,
    request: &HttpRequest,
    query: LessonLogQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    for date in [&query.from, &query.to].into_iter().flatten() {
        try_response!(check(validate_date(date)));
    }

    let class_id = if ctx.role().is_staff() {
        query.class_id
    } else {
        let member_classes = match member_class_ids(storage.as_ref(), &ctx).await {
            Ok(ids) => ids,
            Err(e) => return Ok(error_response("Failed to load classes", &e)),
        };
        // 学生与家长只能查看关联班级的日志
        match query.class_id.or_else(|| member_classes.first().copied()) {
            Some(id) if member_classes.contains(&id) => Some(id),
            _ => return Ok(forbidden("You can only view lesson logs of your classes")),
        }
    };

    let list_query = LessonLogListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        class_id,
        subject_id: query.subject_id,
        from: query.from,
        to: query.to,
    };

    match storage
        .list_lesson_logs_with_pagination(ctx.school_id, list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Lesson log list retrieved successfully",
        ))),
        Err(e) => Ok(error_response("Failed to retrieve lesson log list", &e)),
    }
}
