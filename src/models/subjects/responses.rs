use super::entities::Subject;
use crate::models::common::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SubjectListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Subject>,
}
