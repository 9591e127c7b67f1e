//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码、类型名称和 HTTP 状态映射。

use actix_web::http::StatusCode;
use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_schoolhub_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum SchoolHubError {
            $($variant(String),)*
        }

        impl SchoolHubError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(SchoolHubError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(SchoolHubError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(SchoolHubError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl SchoolHubError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        SchoolHubError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_schoolhub_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    DateParse("E010", "Date Parse Error"),
    Authentication("E011", "Authentication Error"),
    Authorization("E012", "Authorization Error"),
    Conflict("E013", "Resource Conflict"),
    PaymentGateway("E014", "Payment Gateway Error"),
    Export("E015", "Export Error"),
}

impl SchoolHubError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl SchoolHubError {
    /// 映射为 HTTP 状态码，服务层据此构造错误响应
    pub fn http_status(&self) -> StatusCode {
        match self {
            SchoolHubError::Validation(_) | SchoolHubError::DateParse(_) => {
                StatusCode::BAD_REQUEST
            }
            SchoolHubError::NotFound(_) => StatusCode::NOT_FOUND,
            SchoolHubError::Authentication(_) => StatusCode::UNAUTHORIZED,
            SchoolHubError::Authorization(_) => StatusCode::FORBIDDEN,
            SchoolHubError::Conflict(_) => StatusCode::CONFLICT,
            SchoolHubError::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for SchoolHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SchoolHubError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for SchoolHubError {
    fn from(err: sea_orm::DbErr) -> Self {
        let msg = err.to_string();
        // 唯一约束冲突单独归类，便于返回 409
        if msg.contains("UNIQUE constraint failed")
            || msg.contains("duplicate key value")
            || msg.contains("Duplicate entry")
        {
            SchoolHubError::Conflict(msg)
        } else {
            SchoolHubError::DatabaseOperation(msg)
        }
    }
}

impl From<std::io::Error> for SchoolHubError {
    fn from(err: std::io::Error) -> Self {
        SchoolHubError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SchoolHubError {
    fn from(err: serde_json::Error) -> Self {
        SchoolHubError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for SchoolHubError {
    fn from(err: chrono::ParseError) -> Self {
        SchoolHubError::DateParse(err.to_string())
    }
}

impl From<reqwest::Error> for SchoolHubError {
    fn from(err: reqwest::Error) -> Self {
        SchoolHubError::PaymentGateway(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for SchoolHubError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        SchoolHubError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SchoolHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchoolHubError::cache_connection("test").code(), "E001");
        assert_eq!(SchoolHubError::database_config("test").code(), "E003");
        assert_eq!(SchoolHubError::validation("test").code(), "E007");
        assert_eq!(SchoolHubError::authentication("test").code(), "E011");
        assert_eq!(SchoolHubError::conflict("test").code(), "E013");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            SchoolHubError::cache_connection("test").error_type(),
            "Cache Connection Error"
        );
        assert_eq!(
            SchoolHubError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = SchoolHubError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            SchoolHubError::validation("bad suffix").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SchoolHubError::not_found("school").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            SchoolHubError::conflict("suffix taken").http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            SchoolHubError::database_operation("boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err: SchoolHubError = sea_orm::DbErr::Custom(
            "UNIQUE constraint failed: users.login".to_string(),
        )
        .into();
        assert_eq!(err.code(), "E013");
    }

    #[test]
    fn test_format_simple() {
        let err = SchoolHubError::validation("Invalid URL");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Invalid URL"));
    }
}
