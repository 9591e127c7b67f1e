use super::entities::Exam;
use crate::models::common::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ExamListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Exam>,
}
