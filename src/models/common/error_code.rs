use serde::{Deserialize, Serialize};

use crate::errors::SchoolHubError;

/// 业务错误码
///
/// 0 表示成功；1xxx 通用错误；2xxx 认证；3xxx 学校；4xxx 账号与学号；
/// 5xxx 教学数据；6xxx 缴费。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    ValidationFailed = 1001,
    Unauthorized = 1002,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1005,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证
    LoginFailed = 2000,
    AccountInactive = 2001,
    TokenInvalid = 2002,
    PasswordChangeFailed = 2003,

    // 学校
    SchoolNotFound = 3000,
    SchoolSuffixInvalid = 3001,
    SchoolPermissionDenied = 3002,

    // 账号与学号
    AccountNotFound = 4000,
    AccountCreationFailed = 4001,
    MatriculeIssueFailed = 4002,

    // 教学数据
    ClassNotFound = 5000,
    SubjectNotFound = 5001,
    ExamNotFound = 5002,
    GradeNotFound = 5003,
    AnnouncementNotFound = 5004,
    ScheduleNotFound = 5005,
    LessonLogNotFound = 5006,
    ExportFailed = 5007,

    // 缴费
    PaymentNotFound = 6000,
    PaymentGatewayError = 6001,
    WebhookSignatureInvalid = 6002,
}

impl From<&SchoolHubError> for ErrorCode {
    fn from(err: &SchoolHubError) -> Self {
        match err {
            SchoolHubError::Validation(_) | SchoolHubError::DateParse(_) => {
                ErrorCode::ValidationFailed
            }
            SchoolHubError::NotFound(_) => ErrorCode::NotFound,
            SchoolHubError::Authentication(_) => ErrorCode::Unauthorized,
            SchoolHubError::Authorization(_) => ErrorCode::Forbidden,
            SchoolHubError::Conflict(_) => ErrorCode::Conflict,
            SchoolHubError::PaymentGateway(_) => ErrorCode::PaymentGatewayError,
            SchoolHubError::Export(_) => ErrorCode::ExportFailed,
            _ => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_to_code() {
        assert_eq!(
            ErrorCode::from(&SchoolHubError::validation("x")),
            ErrorCode::ValidationFailed
        );
        assert_eq!(
            ErrorCode::from(&SchoolHubError::conflict("x")),
            ErrorCode::Conflict
        );
        assert_eq!(
            ErrorCode::from(&SchoolHubError::database_operation("x")),
            ErrorCode::InternalServerError
        );
        assert_eq!(ErrorCode::MatriculeIssueFailed as i32, 4002);
    }
}
