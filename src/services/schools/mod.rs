pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::schools::requests::{
    CreateSchoolRequest, SchoolQueryParams, UpdateSchoolRequest,
};

crate::services::define_service!(SchoolService);

impl SchoolService {
    // 创建学校（平台管理员）
    pub async fn create_school(
        &self,
        request: &HttpRequest,
        create_request: CreateSchoolRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_school(self, request, create_request).await
    }

    // 获取学校列表（平台管理员）
    pub async fn list_schools(
        &self,
        request: &HttpRequest,
        query: SchoolQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_schools(self, request, query).await
    }

    pub async fn get_school(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_school(self, request).await
    }

    // 学校概览统计
    pub async fn get_school_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_school_stats(self, request).await
    }

    // 更新学校，后缀变化时同步登录标识
    pub async fn update_school(
        &self,
        request: &HttpRequest,
        update_request: UpdateSchoolRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_school(self, request, update_request).await
    }

    // 删除学校及其全部数据
    pub async fn delete_school(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        delete::delete_school(self, request).await
    }
}
