use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::payments::requests::{CreateCheckoutRequest, PaymentQueryParams};
use crate::services::PaymentService;
use crate::utils::SafePaymentIdI64;

static PAYMENT_SERVICE: Lazy<PaymentService> = Lazy::new(PaymentService::new_lazy);

pub async fn list_payments(
    req: HttpRequest,
    query: web::Query<PaymentQueryParams>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.list_payments(&req, query.into_inner()).await
}

pub async fn checkout(
    req: HttpRequest,
    checkout_data: web::Json<CreateCheckoutRequest>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE
        .checkout(&req, checkout_data.into_inner())
        .await
}

pub async fn get_payment(
    req: HttpRequest,
    payment_id: SafePaymentIdI64,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.get_payment(&req, payment_id.0).await
}

pub async fn handle_webhook(req: HttpRequest, body: web::Bytes) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.handle_webhook(&req, body).await
}

// 挂在 /api/v1/schools/{school_id} 作用域下
pub fn configure_school_payment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .service(web::resource("").route(web::get().to(list_payments)))
            .service(
                web::resource("/checkout")
                    .wrap(middlewares::RateLimit::checkout())
                    .route(web::post().to(checkout)),
            )
            .service(web::resource("/{payment_id}").route(web::get().to(get_payment))),
    );
}

// 网关回调不携带 JWT，依靠签名校验
pub fn configure_webhook_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/v1/payments/webhook")
            .wrap(middlewares::RateLimit::webhook())
            .route(web::post().to(handle_webhook)),
    );
}
