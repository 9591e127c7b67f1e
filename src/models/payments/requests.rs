use super::entities::PaymentStatus;
use crate::models::common::PaginationQuery;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PaymentQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub student_id: Option<i64>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCheckoutRequest {
    pub student_id: i64,
    pub amount_cents: i64,
    pub currency: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub status: Option<PaymentStatus>,
    /// 家长/学生只能看到这些学生的缴费
    pub student_ids: Option<Vec<i64>>,
}

/// 支付网关 webhook 事件（只解析用到的字段）
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookSessionObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSessionObject {
    pub id: String,
}
