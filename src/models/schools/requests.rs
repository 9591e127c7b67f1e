use crate::models::common::PaginationQuery;
use serde::Deserialize;

// 学校查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct SchoolQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 创建学校请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSchoolRequest {
    pub name: String,
    pub suffix: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

// 更新学校请求
//
// suffix 发生变化时会触发全校登录标识的同步
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSchoolRequest {
    pub name: Option<String>,
    pub suffix: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

// 学校列表查询参数（用于存储层）
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
}
