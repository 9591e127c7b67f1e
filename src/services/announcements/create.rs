use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AnnouncementService;
use crate::models::{ApiResponse, announcements::requests::CreateAnnouncementRequest};
use crate::services::access::{ensure_class, require_staff};
use crate::services::{bad_request, error_response, school_context, try_response};

pub async fn create_announcement(
    service: &AnnouncementService,
    request: &HttpRequest,
    mut announcement: CreateAnnouncementRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    try_response!(require_staff(&ctx, "publish announcements"));

    announcement.title = announcement.title.trim().to_string();
    if announcement.title.is_empty() || announcement.body.trim().is_empty() {
        return Ok(bad_request("Announcement title and body cannot be empty"));
    }
    if let Some(class_id) = announcement.class_id
        && let Err(e) = ensure_class(storage.as_ref(), ctx.school_id, class_id).await
    {
        return Ok(error_response("Invalid announcement class", &e));
    }

    match storage
        .create_announcement(ctx.school_id, ctx.user.id, announcement)
        .await
    {
        Ok(announcement) => {
            info!(
                "Announcement {} ({}) published in school {} by user {}",
                announcement.id, announcement.audience, ctx.school_id, ctx.user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                announcement,
                "Announcement published successfully",
            )))
        }
        Err(e) => Ok(error_response("Failed to publish announcement", &e)),
    }
}
