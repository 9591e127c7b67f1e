use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ScheduleService;
use crate::models::{
    ApiResponse,
    schedules::requests::{ScheduleListQuery, ScheduleQueryParams},
};
use crate::services::{check, error_response, school_context, try_response};
use crate::utils::validate::validate_weekday;

pub async fn list_schedules(
    service: &ScheduleService,
    request: &HttpRequest,
    query: ScheduleQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if let Some(weekday) = query.weekday {
        try_response!(check(validate_weekday(weekday)));
    }

    let list_query = ScheduleListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        class_id: query.class_id,
        teacher_id: query.teacher_id,
        weekday: query.weekday,
    };

    match storage
        .list_schedules_with_pagination(ctx.school_id, list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Schedule list retrieved successfully",
        ))),
        Err(e) => Ok(error_response("Failed to retrieve schedule list", &e)),
    }
}
