use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ResultService;
use super::load::{load_annual_results, load_term_results};
use crate::models::{
    ApiResponse, ErrorCode,
    classes::entities::Class,
    results::{
        requests::ResultsQuery,
        responses::{AnnualResultsResponse, ClassResultsResponse},
    },
};
use crate::services::{check, error_response, forbidden, school_context, scoped, try_response};
use crate::storage::Storage;
use crate::utils::validate::validate_term;

/// 成绩汇总仅对教职工开放
pub(super) async fn authorize_class(
    storage: &dyn Storage,
    request: &HttpRequest,
    class_id: i64,
) -> Result<Class, HttpResponse> {
    let ctx = school_context(request)?;
    if !ctx.role().is_staff() {
        return Err(forbidden("Only staff can view class results"));
    }
    scoped(
        storage.get_class_by_id(class_id).await,
        ctx.school_id,
        ErrorCode::ClassNotFound,
        "Class",
    )
}

pub async fn term_results(
    service: &ResultService,
    request: &HttpRequest,
    class_id: i64,
    query: ResultsQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    try_response!(check(validate_term(query.term)));
    let class = try_response!(authorize_class(storage.as_ref(), request, class_id).await);

    match load_term_results(storage.as_ref(), &class, query.term).await {
        Ok(results) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ClassResultsResponse { results },
            "Term results computed successfully",
        ))),
        Err(e) => Ok(error_response("Failed to compute term results", &e)),
    }
}

pub async fn annual_results(
    service: &ResultService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let class = try_response!(authorize_class(storage.as_ref(), request, class_id).await);

    match load_annual_results(storage.as_ref(), &class).await {
        Ok(results) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AnnualResultsResponse { results },
            "Annual results computed successfully",
        ))),
        Err(e) => Ok(error_response("Failed to compute annual results", &e)),
    }
}
