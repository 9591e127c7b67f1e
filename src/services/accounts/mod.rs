pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::SchoolContext;
use crate::models::profiles::entities::Profile;
use crate::models::profiles::requests::{
    AccountQueryParams, CreateAccountRequest, UpdateAccountRequest,
};
use crate::models::users::entities::UserRole;

pub use create::provision_account;

crate::services::define_service!(AccountService);

impl AccountService {
    // 创建账号
    pub async fn create_account(
        &self,
        request: &HttpRequest,
        create_request: CreateAccountRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_account(self, request, create_request).await
    }

    // 获取账号列表
    pub async fn list_accounts(
        &self,
        request: &HttpRequest,
        query: AccountQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_accounts(self, request, query).await
    }

    pub async fn get_account(
        &self,
        request: &HttpRequest,
        profile_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_account(self, request, profile_id).await
    }

    // 更新账号（含状态与密码重置）
    pub async fn update_account(
        &self,
        request: &HttpRequest,
        profile_id: i64,
        update_request: UpdateAccountRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_account(self, request, profile_id, update_request).await
    }

    // 删除账号
    pub async fn delete_account(
        &self,
        request: &HttpRequest,
        profile_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_account(self, request, profile_id).await
    }
}

/// 档案可见性：教职工可见全校，学生只见自己，家长可见自己和孩子
pub(crate) fn can_view_profile(ctx: &SchoolContext, profile: &Profile) -> bool {
    if ctx.role().is_staff() {
        return true;
    }
    let Some(own_id) = ctx.profile_id() else {
        return false;
    };
    match ctx.role() {
        UserRole::Parent => profile.id == own_id || profile.parent_id == Some(own_id),
        _ => profile.id == own_id,
    }
}
