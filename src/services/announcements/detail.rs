use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AnnouncementService, can_edit_announcement, can_view_announcement};
use crate::models::{ApiResponse, ErrorCode, announcements::requests::UpdateAnnouncementRequest};
use crate::services::access::member_class_ids;
use crate::services::{
    bad_request, error_response, forbidden, not_found, school_context, scoped, try_response,
};

pub async fn get_announcement(
    service: &AnnouncementService,
    request: &HttpRequest,
    announcement_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let announcement = try_response!(scoped(
        storage.get_announcement_by_id(announcement_id).await,
        ctx.school_id,
        ErrorCode::AnnouncementNotFound,
        "Announcement",
    ));
    let member_classes = match member_class_ids(storage.as_ref(), &ctx).await {
        Ok(ids) => ids,
        Err(e) => return Ok(error_response("Failed to load classes", &e)),
    };
    if !can_view_announcement(&ctx, &announcement, &member_classes) {
        return Ok(not_found(
            ErrorCode::AnnouncementNotFound,
            "Announcement not found",
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        announcement,
        "Announcement retrieved successfully",
    )))
}

pub async fn update_announcement(
    service: &AnnouncementService,
    request: &HttpRequest,
    announcement_id: i64,
    mut update: UpdateAnnouncementRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let announcement = try_response!(scoped(
        storage.get_announcement_by_id(announcement_id).await,
        ctx.school_id,
        ErrorCode::AnnouncementNotFound,
        "Announcement",
    ));
    if !can_edit_announcement(&ctx, &announcement) {
        return Ok(forbidden(
            "Only administrators or the author can edit this announcement",
        ));
    }

    if let Some(title) = update.title.as_mut() {
        *title = title.trim().to_string();
        if title.is_empty() {
            return Ok(bad_request("Announcement title cannot be empty"));
        }
    }
    if update.body.as_deref().is_some_and(|b| b.trim().is_empty()) {
        return Ok(bad_request("Announcement body cannot be empty"));
    }

    match storage.update_announcement(announcement.id, update).await {
        Ok(Some(announcement)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            announcement,
            "Announcement updated successfully",
        ))),
        Ok(None) => Ok(not_found(
            ErrorCode::AnnouncementNotFound,
            "Announcement not found",
        )),
        Err(e) => Ok(error_response("Failed to update announcement", &e)),
    }
}

pub async fn delete_announcement(
    service: &AnnouncementService,
    request: &HttpRequest,
    announcement_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let announcement = try_response!(scoped(
        storage.get_announcement_by_id(announcement_id).await,
        ctx.school_id,
        ErrorCode::AnnouncementNotFound,
        "Announcement",
    ));
    if !can_edit_announcement(&ctx, &announcement) {
        return Ok(forbidden(
            "Only administrators or the author can delete this announcement",
        ));
    }

    match storage.delete_announcement(announcement.id).await {
        Ok(true) => {
            info!(
                "Announcement {} deleted from school {}",
                announcement.id, ctx.school_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Announcement deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::AnnouncementNotFound,
            "Announcement not found",
        )),
        Err(e) => Ok(error_response("Failed to delete announcement", &e)),
    }
}
