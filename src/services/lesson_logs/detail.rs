use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{LessonLogService, can_edit_lesson_log};
use crate::models::{ApiResponse, ErrorCode, lesson_logs::requests::UpdateLessonLogRequest};
use crate::services::access::member_class_ids;
use crate::services::{
    bad_request, check, error_response, forbidden, not_found, school_context, scoped,
    try_response,
};
use crate::utils::validate::validate_date;

pub async fn get_lesson_log(
    service: &LessonLogService,
    request: &HttpRequest,
    log_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let log = try_response!(scoped(
        storage.get_lesson_log_by_id(log_id).await,
        ctx.school_id,
        ErrorCode::LessonLogNotFound,
        "Lesson log",
    ));
    if !ctx.role().is_staff() {
        match member_class_ids(storage.as_ref(), &ctx).await {
            Ok(classes) if classes.contains(&log.class_id) => {}
            Ok(_) => return Ok(not_found(ErrorCode::LessonLogNotFound, "Lesson log not found")),
            Err(e) => return Ok(error_response("Failed to load classes", &e)),
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        log,
        "Lesson log retrieved successfully",
    )))
}

pub async fn update_lesson_log(
    service: &LessonLogService,
    request: &HttpRequest,
    log_id: i64,
    mut update: UpdateLessonLogRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let log = try_response!(scoped(
        storage.get_lesson_log_by_id(log_id).await,
        ctx.school_id,
        ErrorCode::LessonLogNotFound,
        "Lesson log",
    ));
    if !can_edit_lesson_log(&ctx, &log) {
        return Ok(forbidden(
            "Only administrators or the teacher can edit this lesson log",
        ));
    }

    if let Some(date) = &update.lesson_date {
        try_response!(check(validate_date(date)));
    }
    if let Some(topic) = update.topic.as_mut() {
        *topic = topic.trim().to_string();
        if topic.is_empty() {
            return Ok(bad_request("Lesson topic cannot be empty"));
        }
    }

    match storage.update_lesson_log(log.id, update).await {
        Ok(Some(log)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            log,
            "Lesson log updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::LessonLogNotFound, "Lesson log not found")),
        Err(e) => Ok(error_response("Failed to update lesson log", &e)),
    }
}

pub async fn delete_lesson_log(
    service: &LessonLogService,
    request: &HttpRequest,
    log_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let log = try_response!(scoped(
        storage.get_lesson_log_by_id(log_id).await,
        ctx.school_id,
        ErrorCode::LessonLogNotFound,
        "Lesson log",
    ));
    if !can_edit_lesson_log(&ctx, &log) {
        return Ok(forbidden(
            "Only administrators or the teacher can delete this lesson log",
        ));
    }

    match storage.delete_lesson_log(log.id).await {
        Ok(true) => {
            info!("Lesson log {} deleted from school {}", log.id, ctx.school_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Lesson log deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(ErrorCode::LessonLogNotFound, "Lesson log not found")),
        Err(e) => Ok(error_response("Failed to delete lesson log", &e)),
    }
}
