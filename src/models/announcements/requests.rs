use super::entities::Audience;
use crate::models::common::PaginationQuery;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AnnouncementQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub class_id: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub body: String,
    pub audience: Audience,
    pub class_id: Option<i64>,
    #[serde(default)]
    pub pinned: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAnnouncementRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub audience: Option<Audience>,
    pub pinned: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct AnnouncementListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    /// 只看这些班级的公告与全校公告，空集合表示只看全校公告
    pub class_ids: Option<Vec<i64>>,
    pub search: Option<String>,
    pub audiences: Vec<Audience>,
}
