use crate::models::common::PaginationQuery;
use serde::Deserialize;

// 班级查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct ClassQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub academic_year: Option<String>,
    pub search: Option<String>,
}

// 创建班级请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassRequest {
    pub name: String,
    pub level: Option<String>,
    pub academic_year: String,
    pub homeroom_teacher_id: Option<i64>,
}

// 更新班级请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub level: Option<String>,
    pub academic_year: Option<String>,
    pub homeroom_teacher_id: Option<i64>,
}

// 班级列表查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub academic_year: Option<String>,
    pub search: Option<String>,
}
