use super::entities::{Account, Profile};
use crate::models::common::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub account: Account,
    /// 仅在创建或重置时返回一次
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_password: Option<String>,
}

// 档案列表响应
#[derive(Debug, Serialize)]
pub struct ProfileListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Profile>,
}
