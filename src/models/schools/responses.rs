use super::entities::School;
use crate::models::common::PaginationInfo;
use crate::models::identifiers::responses::RenameReport;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SchoolResponse {
    pub school: School,
    /// 后缀变更时附带的登录标识同步报告
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_sync: Option<RenameReport>,
}

// 学校列表响应
#[derive(Debug, Serialize)]
pub struct SchoolListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<School>,
}

/// 删除学校时各表的删除行数
#[derive(Debug, Clone, Default, Serialize)]
pub struct TenantDeletionReport {
    pub school_id: i64,
    pub grades: u64,
    pub exams: u64,
    pub schedules: u64,
    pub lesson_logs: u64,
    pub subjects: u64,
    pub announcements: u64,
    pub payments: u64,
    pub profiles: u64,
    pub users: u64,
    pub matricule_counters: u64,
    pub classes: u64,
}

/// 学校概览统计
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchoolStats {
    pub students: u64,
    pub teachers: u64,
    pub parents: u64,
    pub classes: u64,
    pub pending_payments: u64,
    pub paid_amount_cents: i64,
}
