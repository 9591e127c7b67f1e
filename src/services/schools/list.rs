use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SchoolService;
use crate::models::{
    ApiResponse,
    schools::requests::{SchoolListQuery, SchoolQueryParams},
};
use crate::services::error_response;

pub async fn list_schools(
    service: &SchoolService,
    request: &HttpRequest,
    query: SchoolQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let list_query = SchoolListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        search: query.search,
    };

    match storage.list_schools_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "School list retrieved successfully",
        ))),
        Err(e) => Ok(error_response("Failed to retrieve school list", &e)),
    }
}
