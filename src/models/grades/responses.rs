use super::entities::Grade;
use crate::models::common::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GradeListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Grade>,
}

#[derive(Debug, Serialize)]
pub struct BulkGradeResponse {
    pub exam_id: i64,
    pub saved: usize,
    pub items: Vec<Grade>,
}
