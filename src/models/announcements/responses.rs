use super::entities::Announcement;
use crate::models::common::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AnnouncementListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Announcement>,
}
