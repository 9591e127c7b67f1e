use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AnnouncementService;
use crate::models::{
    ApiResponse,
    announcements::{
        entities::Audience,
        requests::{AnnouncementListQuery, AnnouncementQueryParams},
    },
};
use crate::services::access::member_class_ids;
use crate::services::{error_response, school_context, try_response};

pub async fn list_announcements(
    service: &AnnouncementService,
    request: &HttpRequest,
    query: AnnouncementQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    let role = ctx.role();

    let class_ids = if role.is_staff() {
        query.class_id.map(|id| vec![id])
    } else {
        let member_classes = match member_class_ids(storage.as_ref(), &ctx).await {
            Ok(ids) => ids,
            Err(e) => return Ok(error_response("Failed to load classes", &e)),
        };
        // 学生与家长只能在自己关联的班级中筛选
        match query.class_id {
            Some(id) if member_classes.contains(&id) => Some(vec![id]),
            _ => Some(member_classes),
        }
    };

    let list_query = AnnouncementListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        class_ids,
        search: query.search,
        audiences: Audience::visible_to(&role),
    };

    match storage
        .list_announcements_with_pagination(ctx.school_id, list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Announcement list retrieved successfully",
        ))),
        Err(e) => Ok(error_response("Failed to retrieve announcement list", &e)),
    }
}
