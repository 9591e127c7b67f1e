//! 业务逻辑层
//!
//! 路由层持有各服务的懒加载单例，服务从 `app_data` 取得存储实例。
//! 校内资源的处理函数统一从 [`SchoolContext`] 读取当前学校与调用者档案。

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use tracing::error;

use crate::errors::{Result, SchoolHubError};
use crate::middlewares::{RequireSchoolAccess, SchoolContext};
use crate::models::{
    ApiResponse, ErrorCode,
    announcements::entities::Announcement,
    classes::entities::Class,
    exams::entities::Exam,
    grades::entities::Grade,
    lesson_logs::entities::LessonLog,
    payments::entities::Payment,
    profiles::entities::Profile,
    schedules::entities::Schedule,
    subjects::entities::Subject,
};
use crate::storage::Storage;

/// 生成持有存储的服务结构体
macro_rules! define_service {
    ($name:ident) => {
        pub struct $name {
            storage: Option<std::sync::Arc<dyn crate::storage::Storage>>,
        }

        impl $name {
            pub fn new_lazy() -> Self {
                Self { storage: None }
            }

            #[allow(dead_code)]
            pub fn with_storage(storage: std::sync::Arc<dyn crate::storage::Storage>) -> Self {
                Self {
                    storage: Some(storage),
                }
            }

            pub(crate) fn get_storage(
                &self,
                request: &actix_web::HttpRequest,
            ) -> actix_web::Result<std::sync::Arc<dyn crate::storage::Storage>> {
                match &self.storage {
                    Some(storage) => Ok(storage.clone()),
                    None => crate::services::storage_from_request(request),
                }
            }
        }
    };
}

/// 取出 `Result<T, HttpResponse>` 的值，错误时直接返回该响应
macro_rules! try_response {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(response) => return Ok(response),
        }
    };
}

pub(crate) use define_service;
pub(crate) use try_response;

pub(crate) mod access;
pub mod accounts;
pub mod announcements;
pub mod auth;
pub mod classes;
pub mod exams;
pub mod grades;
pub mod identifiers;
pub mod lesson_logs;
pub mod payments;
pub mod results;
pub mod schedules;
pub mod schools;
pub mod subjects;

pub use accounts::AccountService;
pub use announcements::AnnouncementService;
pub use auth::AuthService;
pub use classes::ClassService;
pub use exams::ExamService;
pub use grades::GradeService;
pub use identifiers::IdentifierService;
pub use lesson_logs::LessonLogService;
pub use payments::PaymentService;
pub use results::ResultService;
pub use schedules::ScheduleService;
pub use schools::SchoolService;
pub use subjects::SubjectService;

pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage not found in app data");
            actix_web::error::ErrorInternalServerError("Storage not configured")
        })
}

/// 将业务错误转为统一响应，服务端错误记录日志
pub(crate) fn error_response(context: &str, err: &SchoolHubError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("{context}: {err}");
    }
    HttpResponse::build(status).json(ApiResponse::<()>::from_error(context, err))
}

pub(crate) fn failure(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::<()>::error_empty(code, message))
}

pub(crate) fn forbidden(message: impl Into<String>) -> HttpResponse {
    failure(StatusCode::FORBIDDEN, ErrorCode::Forbidden, message)
}

pub(crate) fn not_found(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    failure(StatusCode::NOT_FOUND, code, message)
}

pub(crate) fn bad_request(message: impl Into<String>) -> HttpResponse {
    failure(StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed, message)
}

/// 读取学校上下文，缺失说明路由未挂 RequireSchoolAccess
pub(crate) fn school_context(request: &HttpRequest) -> std::result::Result<SchoolContext, HttpResponse> {
    RequireSchoolAccess::extract_context(request).ok_or_else(|| {
        error!("SchoolContext missing for {}", request.path());
        failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            "School context unavailable",
        )
    })
}

/// 属于某个学校的资源
pub(crate) trait SchoolScoped {
    fn owner_school_id(&self) -> i64;
}

macro_rules! impl_school_scoped {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SchoolScoped for $ty {
                fn owner_school_id(&self) -> i64 {
                    self.school_id
                }
            }
        )*
    };
}

impl_school_scoped!(
    Announcement,
    Class,
    Exam,
    Grade,
    LessonLog,
    Payment,
    Profile,
    Schedule,
    Subject,
);

/// 读取当前学校内的资源
///
/// 其他学校的资源与不存在的资源一样返回 404。
pub(crate) fn scoped<T: SchoolScoped>(
    result: Result<Option<T>>,
    school_id: i64,
    code: ErrorCode,
    what: &str,
) -> std::result::Result<T, HttpResponse> {
    match result {
        Ok(Some(item)) if item.owner_school_id() == school_id => Ok(item),
        Ok(_) => Err(not_found(code, format!("{what} not found"))),
        Err(e) => Err(error_response(&format!("Failed to load {what}"), &e)),
    }
}

/// 校验结果转为 400 响应
pub(crate) fn check(result: std::result::Result<(), &'static str>) -> std::result::Result<(), HttpResponse> {
    result.map_err(bad_request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(school_id: i64) -> Class {
        let now = chrono::Utc::now();
        Class {
            id: 1,
            school_id,
            name: "6e A".to_string(),
            level: None,
            academic_year: "2025-2026".to_string(),
            homeroom_teacher_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_scoped_hides_other_schools() {
        assert!(scoped(Ok(Some(class(1))), 1, ErrorCode::ClassNotFound, "Class").is_ok());

        let resp = scoped(Ok(Some(class(2))), 1, ErrorCode::ClassNotFound, "Class").unwrap_err();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = scoped::<Class>(Ok(None), 1, ErrorCode::ClassNotFound, "Class").unwrap_err();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_response_uses_error_status() {
        let resp = error_response("x", &SchoolHubError::conflict("dup"));
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let resp = error_response("x", &SchoolHubError::database_operation("boom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_check_maps_to_bad_request() {
        assert!(check(Ok(())).is_ok());
        assert_eq!(
            check(Err("bad")).unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
