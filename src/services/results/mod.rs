pub mod aggregate;
pub mod export;
pub mod load;
pub mod view;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::results::requests::ResultsQuery;

crate::services::define_service!(ResultService);

impl ResultService {
    // 学期成绩与排名
    pub async fn term_results(
        &self,
        request: &HttpRequest,
        class_id: i64,
        query: ResultsQuery,
    ) -> ActixResult<HttpResponse> {
        view::term_results(self, request, class_id, query).await
    }

    // 学年成绩与排名
    pub async fn annual_results(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        view::annual_results(self, request, class_id).await
    }

    // 导出学期成绩单
    pub async fn export_term_bulletin(
        &self,
        request: &HttpRequest,
        class_id: i64,
        query: ResultsQuery,
    ) -> ActixResult<HttpResponse> {
        export::export_term_bulletin(self, request, class_id, query).await
    }

    // 导出学年成绩单
    pub async fn export_annual_bulletin(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        export::export_annual_bulletin(self, request, class_id).await
    }
}
