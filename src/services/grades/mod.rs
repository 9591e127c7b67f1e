pub mod detail;
pub mod list;
pub mod record;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::grades::requests::{
    BulkUpsertGradesRequest, GradeQueryParams, UpdateGradeRequest, UpsertGradeRequest,
};

pub use record::record_grades;

crate::services::define_service!(GradeService);

impl GradeService {
    pub async fn list_grades(
        &self,
        request: &HttpRequest,
        query: GradeQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_grades(self, request, query).await
    }

    // 录入或覆盖单个成绩
    pub async fn upsert_grade(
        &self,
        request: &HttpRequest,
        grade_data: UpsertGradeRequest,
    ) -> ActixResult<HttpResponse> {
        record::upsert_grade(self, request, grade_data).await
    }

    // 批量录入某次考试的成绩，任一条目无效则全部不写入
    pub async fn bulk_upsert_grades(
        &self,
        request: &HttpRequest,
        bulk: BulkUpsertGradesRequest,
    ) -> ActixResult<HttpResponse> {
        record::bulk_upsert_grades(self, request, bulk).await
    }

    pub async fn get_grade(
        &self,
        request: &HttpRequest,
        grade_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_grade(self, request, grade_id).await
    }

    pub async fn update_grade(
        &self,
        request: &HttpRequest,
        grade_id: i64,
        update_data: UpdateGradeRequest,
    ) -> ActixResult<HttpResponse> {
        detail::update_grade(self, request, grade_id, update_data).await
    }

    pub async fn delete_grade(
        &self,
        request: &HttpRequest,
        grade_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::delete_grade(self, request, grade_id).await
    }
}

/// 分数为空表示缺考，否则必须落在 `0..=max_score`
pub(crate) fn validate_score(score: Option<f64>, max_score: f64) -> Result<(), String> {
    match score {
        None => Ok(()),
        Some(score) if score.is_finite() && (0.0..=max_score).contains(&score) => Ok(()),
        Some(score) => Err(format!("Score {score} must be between 0 and {max_score}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_score() {
        assert!(validate_score(None, 20.0).is_ok());
        assert!(validate_score(Some(0.0), 20.0).is_ok());
        assert!(validate_score(Some(20.0), 20.0).is_ok());
        assert!(validate_score(Some(20.5), 20.0).is_err());
        assert!(validate_score(Some(-1.0), 20.0).is_err());
        assert!(validate_score(Some(f64::NAN), 20.0).is_err());
    }
}
