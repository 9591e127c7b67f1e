use crate::models::common::PaginationQuery;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LessonLogQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub class_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLessonLogRequest {
    pub class_id: i64,
    pub subject_id: i64,
    /// 管理员代录时指定；教师默认为自己
    pub teacher_id: Option<i64>,
    pub lesson_date: String,
    pub topic: String,
    pub homework: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLessonLogRequest {
    pub lesson_date: Option<String>,
    pub topic: Option<String>,
    pub homework: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LessonLogListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub from: Option<String>,
    pub to: Option<String>,
}
