use crate::models::common::PaginationQuery;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SubjectQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub class_id: Option<i64>,
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubjectRequest {
    pub class_id: i64,
    pub name: String,
    pub coefficient: f64,
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub coefficient: Option<f64>,
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_id: Option<i64>,
    pub teacher_id: Option<i64>,
}
