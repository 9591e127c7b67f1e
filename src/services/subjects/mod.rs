pub mod create;
pub mod detail;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::subjects::requests::{
    CreateSubjectRequest, SubjectQueryParams, UpdateSubjectRequest,
};

crate::services::define_service!(SubjectService);

impl SubjectService {
    pub async fn list_subjects(
        &self,
        request: &HttpRequest,
        query: SubjectQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_subjects(self, request, query).await
    }

    pub async fn create_subject(
        &self,
        request: &HttpRequest,
        subject_data: CreateSubjectRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_subject(self, request, subject_data).await
    }

    pub async fn get_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_subject(self, request, subject_id).await
    }

    pub async fn update_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
        update_data: UpdateSubjectRequest,
    ) -> ActixResult<HttpResponse> {
        detail::update_subject(self, request, subject_id, update_data).await
    }

    // 删除科目，其考试与成绩随之删除
    pub async fn delete_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::delete_subject(self, request, subject_id).await
    }
}

/// 系数必须为正
pub(crate) fn validate_coefficient(coefficient: f64) -> Result<(), &'static str> {
    if coefficient.is_finite() && coefficient > 0.0 {
        Ok(())
    } else {
        Err("Coefficient must be a positive number")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficient() {
        assert!(validate_coefficient(1.0).is_ok());
        assert!(validate_coefficient(0.5).is_ok());
        assert!(validate_coefficient(0.0).is_err());
        assert!(validate_coefficient(-2.0).is_err());
        assert!(validate_coefficient(f64::NAN).is_err());
    }
}
