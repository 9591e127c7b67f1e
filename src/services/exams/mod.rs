pub mod create;
pub mod detail;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::SchoolContext;
use crate::models::{
    ErrorCode,
    exams::{
        entities::Exam,
        requests::{CreateExamRequest, ExamQueryParams, UpdateExamRequest},
    },
    subjects::entities::Subject,
};
use crate::services::access::can_teach;
use crate::services::{error_response, forbidden, not_found, scoped};
use crate::storage::Storage;

crate::services::define_service!(ExamService);

impl ExamService {
    pub async fn list_exams(
        &self,
        request: &HttpRequest,
        query: ExamQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_exams(self, request, query).await
    }

    pub async fn create_exam(
        &self,
        request: &HttpRequest,
        exam_data: CreateExamRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_exam(self, request, exam_data).await
    }

    pub async fn get_exam(&self, request: &HttpRequest, exam_id: i64) -> ActixResult<HttpResponse> {
        detail::get_exam(self, request, exam_id).await
    }

    pub async fn update_exam(
        &self,
        request: &HttpRequest,
        exam_id: i64,
        update_data: UpdateExamRequest,
    ) -> ActixResult<HttpResponse> {
        detail::update_exam(self, request, exam_id, update_data).await
    }

    pub async fn delete_exam(
        &self,
        request: &HttpRequest,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::delete_exam(self, request, exam_id).await
    }
}

/// 满分必须为正
pub(crate) fn validate_max_score(max_score: f64) -> Result<(), &'static str> {
    if max_score.is_finite() && max_score > 0.0 {
        Ok(())
    } else {
        Err("Max score must be a positive number")
    }
}

/// 读取考试及其科目，并确认调用者可以修改该考试
///
/// 考试、成绩的写操作共用这一检查：管理员或该科目的任课教师。
pub(crate) async fn authorize_exam_writer(
    storage: &dyn Storage,
    ctx: &SchoolContext,
    exam_id: i64,
) -> Result<(Exam, Subject), HttpResponse> {
    let exam = scoped(
        storage.get_exam_by_id(exam_id).await,
        ctx.school_id,
        ErrorCode::ExamNotFound,
        "Exam",
    )?;
    let subject = match storage.get_subject_by_id(exam.subject_id).await {
        Ok(Some(subject)) => subject,
        Ok(None) => return Err(not_found(ErrorCode::SubjectNotFound, "Subject not found")),
        Err(e) => return Err(error_response("Failed to load subject", &e)),
    };
    if !can_teach(ctx, &subject) {
        return Err(forbidden("Only administrators or the subject teacher can modify this exam"));
    }
    Ok((exam, subject))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_score() {
        assert!(validate_max_score(20.0).is_ok());
        assert!(validate_max_score(0.0).is_err());
        assert!(validate_max_score(f64::INFINITY).is_err());
    }
}
