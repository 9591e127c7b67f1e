use serde::Serialize;

/// 单个成员同步失败的记录
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenameFailure {
    pub profile_id: i64,
    pub user_id: i64,
    pub identifier: Option<String>,
    pub message: String,
}

/// 登录标识同步报告
///
/// 逐个成员处理，失败不回滚已处理成员
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenameReport {
    pub old_suffix: String,
    pub new_suffix: String,
    pub total: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub errors: Vec<RenameFailure>,
}

impl RenameReport {
    pub fn new(old_suffix: &str, new_suffix: &str) -> Self {
        Self {
            old_suffix: old_suffix.to_string(),
            new_suffix: new_suffix.to_string(),
            total: 0,
            updated: 0,
            unchanged: 0,
            failed: 0,
            errors: Vec::new(),
        }
    }

    pub fn record_failure(
        &mut self,
        profile_id: i64,
        user_id: i64,
        identifier: Option<String>,
        message: impl Into<String>,
    ) {
        self.failed += 1;
        self.errors.push(RenameFailure {
            profile_id,
            user_id,
            identifier,
            message: message.into(),
        });
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}
