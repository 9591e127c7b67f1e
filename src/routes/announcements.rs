use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::announcements::requests::{
    AnnouncementQueryParams, CreateAnnouncementRequest, UpdateAnnouncementRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AnnouncementService;
use crate::utils::SafeAnnouncementIdI64;

static ANNOUNCEMENT_SERVICE: Lazy<AnnouncementService> =
    Lazy::new(AnnouncementService::new_lazy);

pub async fn list_announcements(
    req: HttpRequest,
    query: web::Query<AnnouncementQueryParams>,
) -> ActixResult<HttpResponse> {
    ANNOUNCEMENT_SERVICE
        .list_announcements(&req, query.into_inner())
        .await
}

pub async fn create_announcement(
    req: HttpRequest,
    announcement_data: web::Json<CreateAnnouncementRequest>,
) -> ActixResult<HttpResponse> {
    ANNOUNCEMENT_SERVICE
        .create_announcement(&req, announcement_data.into_inner())
        .await
}

pub async fn get_announcement(
    req: HttpRequest,
    announcement_id: SafeAnnouncementIdI64,
) -> ActixResult<HttpResponse> {
    ANNOUNCEMENT_SERVICE
        .get_announcement(&req, announcement_id.0)
        .await
}

pub async fn update_announcement(
    req: HttpRequest,
    announcement_id: SafeAnnouncementIdI64,
    update_data: web::Json<UpdateAnnouncementRequest>,
) -> ActixResult<HttpResponse> {
    ANNOUNCEMENT_SERVICE
        .update_announcement(&req, announcement_id.0, update_data.into_inner())
        .await
}

pub async fn delete_announcement(
    req: HttpRequest,
    announcement_id: SafeAnnouncementIdI64,
) -> ActixResult<HttpResponse> {
    ANNOUNCEMENT_SERVICE
        .delete_announcement(&req, announcement_id.0)
        .await
}

pub fn configure_announcement_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/announcements")
            .service(
                web::resource("")
                    .route(web::get().to(list_announcements))
                    .route(
                        web::post()
                            .to(create_announcement)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    ),
            )
            .service(
                web::resource("/{announcement_id}")
                    .route(web::get().to(get_announcement))
                    .route(
                        web::put()
                            .to(update_announcement)
                            // 教师只能修改自己发布的公告
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_announcement)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    ),
            ),
    );
}
