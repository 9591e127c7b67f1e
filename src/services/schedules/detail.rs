use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ScheduleService;
use crate::models::{ApiResponse, ErrorCode, schedules::requests::UpdateScheduleRequest};
use crate::services::access::{ensure_teacher, require_admin};
use crate::services::{check, error_response, not_found, school_context, scoped, try_response};
use crate::utils::validate::{validate_time_range, validate_weekday};

pub async fn get_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
    schedule_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let schedule = try_response!(scoped(
        storage.get_schedule_by_id(schedule_id).await,
        ctx.school_id,
        ErrorCode::ScheduleNotFound,
        "Schedule",
    ));
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        schedule,
        "Schedule retrieved successfully",
    )))
}

pub async fn update_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
    schedule_id: i64,
    update: UpdateScheduleRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    try_response!(require_admin(&ctx, "manage schedules"));

    let current = try_response!(scoped(
        storage.get_schedule_by_id(schedule_id).await,
        ctx.school_id,
        ErrorCode::ScheduleNotFound,
        "Schedule",
    ));

    if let Some(weekday) = update.weekday {
        try_response!(check(validate_weekday(weekday)));
    }
    // 只改一端时与现有时间一起校验
    let start = update.start_time.as_deref().unwrap_or(&current.start_time);
    let end = update.end_time.as_deref().unwrap_or(&current.end_time);
    try_response!(check(validate_time_range(start, end)));
    if let Some(teacher_id) = update.teacher_id
        && let Err(e) = ensure_teacher(storage.as_ref(), ctx.school_id, teacher_id).await
    {
        return Ok(error_response("Invalid teacher", &e));
    }

    match storage.update_schedule(current.id, update).await {
        Ok(Some(schedule)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            schedule,
            "Schedule updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::ScheduleNotFound, "Schedule not found")),
        Err(e) => Ok(error_response("Failed to update schedule", &e)),
    }
}

pub async fn delete_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
    schedule_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    try_response!(require_admin(&ctx, "manage schedules"));

    let schedule = try_response!(scoped(
        storage.get_schedule_by_id(schedule_id).await,
        ctx.school_id,
        ErrorCode::ScheduleNotFound,
        "Schedule",
    ));

    match storage.delete_schedule(schedule.id).await {
        Ok(true) => {
            info!("Schedule {} deleted from school {}", schedule.id, ctx.school_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Schedule deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::ScheduleNotFound, "Schedule not found")),
        Err(e) => Ok(error_response("Failed to delete schedule", &e)),
    }
}
