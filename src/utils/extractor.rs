//! 路径参数提取器
//!
//! 从 `match_info` 读取正整数 ID，非法时直接返回 400 统一响应。

use actix_web::dev::Payload;
use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn parse_positive_i64(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(name).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => {
            let response = HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
                ErrorCode::BadRequest,
                format!("路径参数 {name} 无效: '{raw}'"),
            ));
            Err(InternalError::from_response(format!("invalid path parameter {name}"), response).into())
        }
    }
}

macro_rules! define_safe_id_extractor {
    ($($name:ident => $param:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
                    ready(parse_positive_i64(req, $param).map($name))
                }
            }
        )*
    };
}

define_safe_id_extractor! {
    SafeSchoolIdI64 => "school_id",
    SafeProfileIdI64 => "profile_id",
    SafeClassIdI64 => "class_id",
    SafeSubjectIdI64 => "subject_id",
    SafeExamIdI64 => "exam_id",
    SafeGradeIdI64 => "grade_id",
    SafeAnnouncementIdI64 => "announcement_id",
    SafePaymentIdI64 => "payment_id",
    SafeScheduleIdI64 => "schedule_id",
    SafeLessonLogIdI64 => "lesson_log_id",
}

/// 从路径读取学校 ID（中间件使用，不生成响应）
pub fn school_id_from_path(req: &actix_web::dev::ServiceRequest) -> Option<i64> {
    req.match_info()
        .get("school_id")
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_valid_id_extracted() {
        let (req, mut payload) = TestRequest::default()
            .param("class_id", "12")
            .to_http_parts();
        let id = SafeClassIdI64::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(id, SafeClassIdI64(12));
    }

    #[actix_web::test]
    async fn test_invalid_id_rejected() {
        for raw in ["0", "-3", "abc"] {
            let (req, mut payload) = TestRequest::default()
                .param("exam_id", raw)
                .to_http_parts();
            assert!(SafeExamIdI64::from_request(&req, &mut payload).await.is_err());
        }
    }

    #[actix_web::test]
    async fn test_missing_param_rejected() {
        let (req, mut payload) = TestRequest::default().to_http_parts();
        assert!(SafeSchoolIdI64::from_request(&req, &mut payload).await.is_err());
    }
}
