use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PaymentService;
use crate::models::{
    ApiResponse, ErrorCode,
    payments::requests::{PaymentListQuery, PaymentQueryParams},
    users::entities::UserRole,
};
use crate::services::access::visible_student_ids;
use crate::services::{
    error_response, forbidden, not_found, school_context, scoped, try_response,
};

pub async fn list_payments(
    service: &PaymentService,
    request: &HttpRequest,
    query: PaymentQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if ctx.role() == UserRole::Teacher {
        return Ok(forbidden("Teachers cannot view payments"));
    }

    let student_ids = try_response!(visible_student_ids(storage.as_ref(), &ctx).await);
    let list_query = PaymentListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        student_id: query.student_id,
        status: query.status,
        student_ids,
    };

    match storage
        .list_payments_with_pagination(ctx.school_id, list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Payment list retrieved successfully",
        ))),
        Err(e) => Ok(error_response("Failed to retrieve payment list", &e)),
    }
}

pub async fn get_payment(
    service: &PaymentService,
    request: &HttpRequest,
    payment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if ctx.role() == UserRole::Teacher {
        return Ok(forbidden("Teachers cannot view payments"));
    }

    let payment = try_response!(scoped(
        storage.get_payment_by_id(payment_id).await,
        ctx.school_id,
        ErrorCode::PaymentNotFound,
        "Payment",
    ));
    if let Some(allowed) = try_response!(visible_student_ids(storage.as_ref(), &ctx).await)
        && !allowed.contains(&payment.student_id)
    {
        return Ok(not_found(ErrorCode::PaymentNotFound, "Payment not found"));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        payment,
        "Payment retrieved successfully",
    )))
}
