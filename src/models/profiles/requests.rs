use crate::models::common::PaginationQuery;
use crate::models::users::entities::{UserRole, UserStatus};
use serde::Deserialize;

// 账号查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct AccountQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub role: Option<UserRole>,
    pub class_id: Option<i64>,
    pub search: Option<String>,
}

// 创建账号请求
//
// - 管理员必须提供 email，登录标识即 email
// - 其他角色自动分配学号作为登录标识
// - password 为空时生成随机初始密码并在响应中返回一次
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub class_id: Option<i64>,
    pub parent_id: Option<i64>,
}

// 更新账号请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub class_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub status: Option<UserStatus>,
    /// 管理员重置密码
    pub password: Option<String>,
}

// 档案字段更新（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub class_id: Option<i64>,
    pub parent_id: Option<i64>,
}

// 账号列表查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub role: Option<UserRole>,
    pub class_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub search: Option<String>,
}
