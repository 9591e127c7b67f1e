use crate::models::common::PaginationQuery;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ExamQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub class_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub term: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExamRequest {
    pub class_id: i64,
    pub subject_id: i64,
    pub title: String,
    pub term: i32,
    pub exam_date: Option<String>,
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateExamRequest {
    pub title: Option<String>,
    pub term: Option<i32>,
    pub exam_date: Option<String>,
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExamListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub term: Option<i32>,
}
