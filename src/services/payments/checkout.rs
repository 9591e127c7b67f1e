//! 发起缴费
//!
//! 先写入 pending 记录，再向网关申请会话；网关失败时记录标记为 failed，
//! 便于对账时区分。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::{PaymentGateway, PaymentService, gateway_from_request};
use crate::config::AppConfig;
use crate::errors::{Result, SchoolHubError};
use crate::middlewares::SchoolContext;
use crate::models::{
    ApiResponse,
    payments::{
        entities::{NewPayment, PaymentStatus},
        requests::CreateCheckoutRequest,
        responses::CheckoutResponse,
    },
    users::entities::UserRole,
};
use crate::services::{error_response, forbidden, school_context, try_response};
use crate::storage::Storage;

pub async fn checkout(
    service: &PaymentService,
    request: &HttpRequest,
    checkout_request: CreateCheckoutRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let gateway = gateway_from_request(request)?;
    let ctx = try_response!(school_context(request));
    if !(ctx.is_admin() || ctx.role() == UserRole::Parent) {
        return Ok(forbidden("Only administrators and parents can start a payment"));
    }

    let default_currency = &AppConfig::get().payment.default_currency;
    match start_checkout(
        storage.as_ref(),
        gateway.as_ref(),
        &ctx,
        checkout_request,
        default_currency,
    )
    .await
    {
        Ok(response) => Ok(HttpResponse::Created().json(ApiResponse::success(
            response,
            "Checkout session created successfully",
        ))),
        Err(e) => Ok(error_response("Failed to start checkout", &e)),
    }
}

fn normalize_currency(currency: Option<&str>, default_currency: &str) -> Result<String> {
    let currency = currency.unwrap_or(default_currency).trim().to_lowercase();
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_lowercase()) {
        Ok(currency)
    } else {
        Err(SchoolHubError::validation(
            "Currency must be a three-letter ISO code",
        ))
    }
}

/// 校验请求、写入缴费记录并创建结账会话
pub async fn start_checkout(
    storage: &dyn Storage,
    gateway: &dyn PaymentGateway,
    ctx: &SchoolContext,
    req: CreateCheckoutRequest,
    default_currency: &str,
) -> Result<CheckoutResponse> {
    if req.amount_cents <= 0 {
        return Err(SchoolHubError::validation("Amount must be positive"));
    }
    let description = req.description.trim().to_string();
    if description.is_empty() {
        return Err(SchoolHubError::validation("Description cannot be empty"));
    }
    let currency = normalize_currency(req.currency.as_deref(), default_currency)?;

    let student = storage
        .get_profile_by_id(req.student_id)
        .await?
        .filter(|p| p.school_id == ctx.school_id && p.role == UserRole::Student)
        .ok_or_else(|| {
            SchoolHubError::validation(format!(
                "Profile {} is not a student of this school",
                req.student_id
            ))
        })?;
    // 家长只能为自己的孩子缴费
    if !ctx.is_admin() && (ctx.profile_id().is_none() || student.parent_id != ctx.profile_id()) {
        return Err(SchoolHubError::authorization(
            "You can only pay for your own children",
        ));
    }

    let payment = storage
        .create_payment(NewPayment {
            school_id: ctx.school_id,
            student_id: student.id,
            amount_cents: req.amount_cents,
            currency,
            description,
        })
        .await?;

    let session = match gateway.create_checkout_session(&payment).await {
        Ok(session) => session,
        Err(e) => {
            warn!(
                "Gateway {} failed for payment {}: {}",
                gateway.name(),
                payment.id,
                e
            );
            storage
                .mark_payment_status(payment.id, PaymentStatus::Failed)
                .await?;
            return Err(e);
        }
    };

    let payment = storage
        .attach_checkout_session(payment.id, &session)
        .await?
        .ok_or_else(|| SchoolHubError::not_found(format!("Payment {} not found", payment.id)))?;

    info!(
        "Payment {} ({} {}) opened for student {} with session {}",
        payment.id, payment.amount_cents, payment.currency, payment.student_id, session.id
    );

    Ok(CheckoutResponse {
        payment,
        checkout_url: session.url,
        session_id: session.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payments::entities::{CheckoutSession, Payment};
    use crate::models::profiles::requests::UpdateProfile;
    use crate::services::payments::LocalGateway;
    use crate::storage::sea_orm_storage::tests::{memory_storage, seed_member, seed_school};

    struct FailingGateway;

    #[async_trait::async_trait]
    impl PaymentGateway for FailingGateway {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn create_checkout_session(&self, _payment: &Payment) -> Result<CheckoutSession> {
            Err(SchoolHubError::payment_gateway("unreachable"))
        }
    }

    async fn context_for(
        storage: &crate::storage::sea_orm_storage::SeaOrmStorage,
        profile_id: i64,
    ) -> SchoolContext {
        let profile = storage.get_profile_by_id(profile_id).await.unwrap().unwrap();
        let user = storage.get_user_by_id(profile.user_id).await.unwrap().unwrap();
        SchoolContext {
            school_id: profile.school_id,
            user,
            profile: Some(profile),
        }
    }

    fn checkout_request(student_id: i64) -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            student_id,
            amount_cents: 1_500_000,
            currency: None,
            description: "Inscription 2025-2026".to_string(),
        }
    }

    #[test]
    fn test_currency_normalization() {
        assert_eq!(normalize_currency(Some(" XOF "), "eur").unwrap(), "xof");
        assert_eq!(normalize_currency(None, "eur").unwrap(), "eur");
        assert!(normalize_currency(Some("euro"), "eur").is_err());
    }

    #[tokio::test]
    async fn test_parent_pays_for_own_child_only() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "lycee.sn").await;
        let parent = seed_member(&storage, &school, UserRole::Parent, None).await;
        let child = seed_member(&storage, &school, UserRole::Student, None).await;
        let stranger = seed_member(&storage, &school, UserRole::Student, None).await;
        storage
            .update_profile(
                child.id,
                UpdateProfile {
                    parent_id: Some(parent.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let ctx = context_for(&storage, parent.id).await;
        let gateway = LocalGateway::new("http://localhost/paid");

        let response = start_checkout(&storage, &gateway, &ctx, checkout_request(child.id), "xof")
            .await
            .unwrap();
        assert_eq!(response.payment.status, PaymentStatus::Pending);
        assert_eq!(
            response.payment.checkout_session_id.as_deref(),
            Some(response.session_id.as_str())
        );
        assert_eq!(response.payment.currency, "xof");

        let err = start_checkout(&storage, &gateway, &ctx, checkout_request(stranger.id), "xof")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E012");
    }

    #[tokio::test]
    async fn test_gateway_failure_marks_payment_failed() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "lycee.sn").await;
        let admin = seed_member(&storage, &school, UserRole::Admin, None).await;
        let student = seed_member(&storage, &school, UserRole::Student, None).await;
        let ctx = context_for(&storage, admin.id).await;

        let err = start_checkout(
            &storage,
            &FailingGateway,
            &ctx,
            checkout_request(student.id),
            "xof",
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E014");

        let payments = storage
            .list_payments_with_pagination(school.id, Default::default())
            .await
            .unwrap();
        assert_eq!(payments.items.len(), 1);
        assert_eq!(payments.items[0].status, PaymentStatus::Failed);
    }
}
