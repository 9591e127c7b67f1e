//! 支付网关回调
//!
//! 未知事件与未知会话同样返回 200，避免网关反复重试；
//! 已支付的记录不会被后续事件改写，重放同一事件结果不变。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use tracing::{info, warn};

use super::PaymentService;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    payments::{entities::PaymentStatus, requests::WebhookEvent, responses::WebhookAck},
};
use crate::services::{error_response, failure};
use crate::storage::Storage;
use crate::utils::signature::verify_signature;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

pub async fn handle_webhook(
    service: &PaymentService,
    request: &HttpRequest,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let config = AppConfig::get();

    if config.payment.webhook_secret.is_empty() {
        if !config.uses_local_payment_gateway() {
            warn!("Webhook received but payment.webhook_secret is not configured");
            return Ok(invalid_signature("Webhook secret not configured"));
        }
    } else {
        let header = request
            .headers()
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok());
        let Some(header) = header else {
            return Ok(invalid_signature("Missing signature header"));
        };
        if let Err(e) = verify_signature(
            &config.payment.webhook_secret,
            header,
            &body,
            chrono::Utc::now().timestamp(),
            config.payment.webhook_tolerance_secs,
        ) {
            warn!("Rejected webhook: {}", e);
            return Ok(invalid_signature(e.message()));
        }
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
                ErrorCode::BadRequest,
                format!("Invalid webhook payload: {e}"),
            )));
        }
    };

    match apply_webhook_event(storage.as_ref(), &event).await {
        Ok(ack) => Ok(HttpResponse::Ok().json(ApiResponse::success(ack, "Webhook processed"))),
        Err(e) => Ok(error_response("Failed to process webhook", &e)),
    }
}

fn invalid_signature(message: impl Into<String>) -> HttpResponse {
    failure(
        actix_web::http::StatusCode::BAD_REQUEST,
        ErrorCode::WebhookSignatureInvalid,
        message,
    )
}

/// 事件类型对应的缴费状态
fn status_for_event(event_type: &str) -> Option<PaymentStatus> {
    match event_type {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            Some(PaymentStatus::Paid)
        }
        "checkout.session.expired" => Some(PaymentStatus::Expired),
        "checkout.session.async_payment_failed" => Some(PaymentStatus::Failed),
        _ => None,
    }
}

/// 按事件更新缴费记录
pub async fn apply_webhook_event(storage: &dyn Storage, event: &WebhookEvent) -> Result<WebhookAck> {
    let ignored = WebhookAck {
        received: true,
        payment_id: None,
    };

    let Some(status) = status_for_event(&event.event_type) else {
        info!("Ignoring webhook event {} ({})", event.id, event.event_type);
        return Ok(ignored);
    };

    let session_id = &event.data.object.id;
    let Some(payment) = storage.get_payment_by_session_id(session_id).await? else {
        warn!("Webhook event {} references unknown session {}", event.id, session_id);
        return Ok(ignored);
    };

    let updated = storage.mark_payment_status(payment.id, status).await?;
    if let Some(updated) = &updated {
        info!(
            "Payment {} is now {} (event {})",
            updated.id, updated.status, event.event_type
        );
    }

    Ok(WebhookAck {
        received: true,
        payment_id: updated.map(|p| p.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payments::entities::{CheckoutSession, NewPayment, Payment};
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::tests::{memory_storage, seed_member, seed_school};

    fn event(event_type: &str, session_id: &str) -> WebhookEvent {
        serde_json::from_value(serde_json::json!({
            "id": "evt_1",
            "type": event_type,
            "data": { "object": { "id": session_id, "object": "checkout.session" } }
        }))
        .unwrap()
    }

    async fn pending_payment(storage: &SeaOrmStorage) -> Payment {
        let school = seed_school(storage, "lycee.sn").await;
        let student = seed_member(storage, &school, UserRole::Student, None).await;
        let payment = storage
            .create_payment(NewPayment {
                school_id: school.id,
                student_id: student.id,
                amount_cents: 10_000,
                currency: "xof".to_string(),
                description: "Cantine".to_string(),
            })
            .await
            .unwrap();
        storage
            .attach_checkout_session(
                payment.id,
                &CheckoutSession {
                    id: "cs_test_1".to_string(),
                    url: "https://pay.example/cs_test_1".to_string(),
                },
            )
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_completed_marks_paid_and_replay_is_idempotent() {
        let storage = memory_storage().await;
        let payment = pending_payment(&storage).await;

        let ack = apply_webhook_event(&storage, &event("checkout.session.completed", "cs_test_1"))
            .await
            .unwrap();
        assert_eq!(ack.payment_id, Some(payment.id));

        let paid = storage.get_payment_by_id(payment.id).await.unwrap().unwrap();
        assert_eq!(paid.status, PaymentStatus::Paid);
        assert!(paid.paid_at.is_some());

        // 重放与迟到的过期事件都不改变已支付状态
        apply_webhook_event(&storage, &event("checkout.session.completed", "cs_test_1"))
            .await
            .unwrap();
        apply_webhook_event(&storage, &event("checkout.session.expired", "cs_test_1"))
            .await
            .unwrap();
        let again = storage.get_payment_by_id(payment.id).await.unwrap().unwrap();
        assert_eq!(again.status, PaymentStatus::Paid);
        assert_eq!(again.paid_at, paid.paid_at);
    }

    #[tokio::test]
    async fn test_expired_and_failed_events() {
        let storage = memory_storage().await;
        let payment = pending_payment(&storage).await;

        apply_webhook_event(&storage, &event("checkout.session.expired", "cs_test_1"))
            .await
            .unwrap();
        let expired = storage.get_payment_by_id(payment.id).await.unwrap().unwrap();
        assert_eq!(expired.status, PaymentStatus::Expired);

        apply_webhook_event(
            &storage,
            &event("checkout.session.async_payment_failed", "cs_test_1"),
        )
        .await
        .unwrap();
        let failed = storage.get_payment_by_id(payment.id).await.unwrap().unwrap();
        assert_eq!(failed.status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_unknown_event_or_session_is_acknowledged() {
        let storage = memory_storage().await;
        let payment = pending_payment(&storage).await;

        let ack = apply_webhook_event(&storage, &event("invoice.created", "cs_test_1"))
            .await
            .unwrap();
        assert!(ack.received);
        assert_eq!(ack.payment_id, None);

        let ack = apply_webhook_event(&storage, &event("checkout.session.completed", "cs_other"))
            .await
            .unwrap();
        assert_eq!(ack.payment_id, None);

        let untouched = storage.get_payment_by_id(payment.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, PaymentStatus::Pending);
    }
}
