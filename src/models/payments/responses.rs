use super::entities::Payment;
use crate::models::common::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub payment: Payment,
    pub checkout_url: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Payment>,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    /// 本次事件更新了哪条缴费记录
    pub payment_id: Option<i64>,
}
