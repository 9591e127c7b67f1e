use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::schedules::requests::{
    CreateScheduleRequest, ScheduleQueryParams, UpdateScheduleRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::ScheduleService;
use crate::utils::SafeScheduleIdI64;

static SCHEDULE_SERVICE: Lazy<ScheduleService> = Lazy::new(ScheduleService::new_lazy);

pub async fn list_schedules(
    req: HttpRequest,
    query: web::Query<ScheduleQueryParams>,
) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE
        .list_schedules(&req, query.into_inner())
        .await
}

pub async fn create_schedule(
    req: HttpRequest,
    schedule_data: web::Json<CreateScheduleRequest>,
) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE
        .create_schedule(&req, schedule_data.into_inner())
        .await
}

pub async fn get_schedule(
    req: HttpRequest,
    schedule_id: SafeScheduleIdI64,
) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE.get_schedule(&req, schedule_id.0).await
}

pub async fn update_schedule(
    req: HttpRequest,
    schedule_id: SafeScheduleIdI64,
    update_data: web::Json<UpdateScheduleRequest>,
) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE
        .update_schedule(&req, schedule_id.0, update_data.into_inner())
        .await
}

pub async fn delete_schedule(
    req: HttpRequest,
    schedule_id: SafeScheduleIdI64,
) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE.delete_schedule(&req, schedule_id.0).await
}

pub fn configure_schedule_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/schedules")
            .service(
                web::resource("").route(web::get().to(list_schedules)).route(
                    web::post()
                        .to(create_schedule)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/{schedule_id}")
                    .route(web::get().to(get_schedule))
                    .route(
                        web::put()
                            .to(update_schedule)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_schedule)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}
