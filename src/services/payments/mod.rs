pub mod checkout;
pub mod gateway;
pub mod list;
pub mod webhook;

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use tracing::error;

use crate::models::payments::requests::{CreateCheckoutRequest, PaymentQueryParams};

pub use gateway::{LocalGateway, PaymentGateway, StripeGateway, create_gateway};
pub use webhook::apply_webhook_event;

crate::services::define_service!(PaymentService);

impl PaymentService {
    // 创建缴费记录并向网关申请结账会话
    pub async fn checkout(
        &self,
        request: &HttpRequest,
        checkout_request: CreateCheckoutRequest,
    ) -> ActixResult<HttpResponse> {
        checkout::checkout(self, request, checkout_request).await
    }

    pub async fn list_payments(
        &self,
        request: &HttpRequest,
        query: PaymentQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_payments(self, request, query).await
    }

    pub async fn get_payment(
        &self,
        request: &HttpRequest,
        payment_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::get_payment(self, request, payment_id).await
    }

    // 网关回调，不经过 JWT
    pub async fn handle_webhook(
        &self,
        request: &HttpRequest,
        body: web::Bytes,
    ) -> ActixResult<HttpResponse> {
        webhook::handle_webhook(self, request, body).await
    }
}

pub(crate) fn gateway_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn PaymentGateway>> {
    request
        .app_data::<web::Data<Arc<dyn PaymentGateway>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Payment gateway not found in app data");
            actix_web::error::ErrorInternalServerError("Payment gateway not configured")
        })
}
