pub mod create;
pub mod detail;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::schedules::requests::{
    CreateScheduleRequest, ScheduleQueryParams, UpdateScheduleRequest,
};

crate::services::define_service!(ScheduleService);

impl ScheduleService {
    pub async fn list_schedules(
        &self,
        request: &HttpRequest,
        query: ScheduleQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_schedules(self, request, query).await
    }

    pub async fn create_schedule(
        &self,
        request: &HttpRequest,
        schedule: CreateScheduleRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_schedule(self, request, schedule).await
    }

    pub async fn get_schedule(
        &self,
        request: &HttpRequest,
        schedule_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_schedule(self, request, schedule_id).await
    }

    pub async fn update_schedule(
        &self,
        request: &HttpRequest,
        schedule_id: i64,
        update: UpdateScheduleRequest,
    ) -> ActixResult<HttpResponse> {
        detail::update_schedule(self, request, schedule_id, update).await
    }

    pub async fn delete_schedule(
        &self,
        request: &HttpRequest,
        schedule_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::delete_schedule(self, request, schedule_id).await
    }
}
