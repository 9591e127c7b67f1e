use super::entities::Schedule;
use crate::models::common::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ScheduleListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Schedule>,
}
