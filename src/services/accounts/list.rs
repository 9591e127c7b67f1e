use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AccountService;
use crate::models::{
    ApiResponse,
    profiles::requests::{AccountQueryParams, ProfileListQuery},
    users::entities::UserRole,
};
use crate::services::{error_response, forbidden, school_context, try_response};

pub async fn list_accounts(
    service: &AccountService,
    request: &HttpRequest,
    query: AccountQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));

    let mut list_query = ProfileListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        role: query.role,
        class_id: query.class_id,
        parent_id: None,
        search: query.search,
    };

    // 家长只能列出自己的孩子
    match ctx.role() {
        UserRole::Admin | UserRole::SuperAdmin | UserRole::Teacher => {}
        UserRole::Parent => match ctx.profile_id() {
            Some(parent_id) => {
                list_query.role = Some(UserRole::Student);
                list_query.parent_id = Some(parent_id);
            }
            None => return Ok(forbidden("Parent profile required")),
        },
        UserRole::Student => return Ok(forbidden("Students cannot list accounts")),
    }

    match storage
        .list_profiles_with_pagination(ctx.school_id, list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Account list retrieved successfully",
        ))),
        Err(e) => Ok(error_response("Failed to retrieve account list", &e)),
    }
}
