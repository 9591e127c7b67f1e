use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::models::{ApiResponse, ErrorCode, classes::requests::UpdateClassRequest};
use crate::services::access::{ensure_teacher, require_admin};
use crate::services::{
    check, error_response, not_found, school_context, scoped, try_response,
};
use crate::utils::validate::{validate_academic_year, validate_name};

pub async fn get_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let class = try_response!(scoped(
        storage.get_class_by_id(class_id).await,
        ctx.school_id,
        ErrorCode::ClassNotFound,
        "Class",
    ));
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        class,
        "Class information retrieved successfully",
    )))
}

pub async fn update_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    mut update_data: UpdateClassRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    try_response!(require_admin(&ctx, "update classes"));

    try_response!(scoped(
        storage.get_class_by_id(class_id).await,
        ctx.school_id,
        ErrorCode::ClassNotFound,
        "Class",
    ));

    if let Some(name) = update_data.name.as_mut() {
        *name = name.trim().to_string();
        try_response!(check(validate_name(name)));
    }
    if let Some(year) = &update_data.academic_year {
        try_response!(check(validate_academic_year(year)));
    }
    if let Some(teacher_id) = update_data.homeroom_teacher_id
        && let Err(e) = ensure_teacher(storage.as_ref(), ctx.school_id, teacher_id).await
    {
        return Ok(error_response("Invalid homeroom teacher", &e));
    }

    match storage.update_class(class_id, update_data).await {
        Ok(Some(class)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            class,
            "Class updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Ok(error_response("Failed to update class", &e)),
    }
}

pub async fn delete_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    try_response!(require_admin(&ctx, "delete classes"));

    let class = try_response!(scoped(
        storage.get_class_by_id(class_id).await,
        ctx.school_id,
        ErrorCode::ClassNotFound,
        "Class",
    ));

    match storage.delete_class(class.id).await {
        Ok(true) => {
            info!("Class {} deleted from school {}", class.id, ctx.school_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Class deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Ok(error_response("Failed to delete class", &e)),
    }
}
