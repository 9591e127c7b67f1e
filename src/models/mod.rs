pub mod announcements;
pub mod auth;
pub mod classes;
pub mod common;
pub mod exams;
pub mod grades;
pub mod identifiers;
pub mod lesson_logs;
pub mod payments;
pub mod profiles;
pub mod results;
pub mod schedules;
pub mod schools;
pub mod subjects;
pub mod users;

pub use common::error_code::ErrorCode;
pub use common::pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

/// 程序启动时间，用于健康检查输出运行时长
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
