use crate::models::common::PaginationQuery;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GradeQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub exam_id: Option<i64>,
    pub student_id: Option<i64>,
}

// 录入或覆盖单个成绩（按 exam_id + student_id 唯一）
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertGradeRequest {
    pub exam_id: i64,
    pub student_id: i64,
    pub score: Option<f64>,
    pub comment: Option<String>,
}

// 批量录入某次考试的成绩
#[derive(Debug, Clone, Deserialize)]
pub struct BulkGradeEntry {
    pub student_id: i64,
    pub score: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpsertGradesRequest {
    pub exam_id: i64,
    pub grades: Vec<BulkGradeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGradeRequest {
    pub score: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub exam_id: Option<i64>,
    pub student_id: Option<i64>,
    /// 家长只能看到自己孩子的成绩
    #[serde(skip)]
    pub student_ids: Option<Vec<i64>>,
}
