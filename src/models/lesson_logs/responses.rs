use super::entities::LessonLog;
use crate::models::common::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LessonLogListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<LessonLog>,
}
