//! 支付网关
//!
//! `stripe` 通过 HTTPS 表单请求创建结账会话；`local` 用于开发环境，
//! 直接生成会话号并跳转到成功页。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

use crate::config::PaymentConfig;
use crate::errors::{Result, SchoolHubError};
use crate::models::payments::entities::{CheckoutSession, Payment};

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    /// 为缴费记录创建结账会话
    async fn create_checkout_session(&self, payment: &Payment) -> Result<CheckoutSession>;
}

/// 按配置创建网关
pub fn create_gateway(config: &PaymentConfig) -> Result<Arc<dyn PaymentGateway>> {
    let gateway: Arc<dyn PaymentGateway> = match config.provider.as_str() {
        "stripe" => Arc::new(StripeGateway::new(config)?),
        "local" => Arc::new(LocalGateway::new(&config.success_url)),
        other => {
            return Err(SchoolHubError::validation(format!(
                "Unknown payment provider: {other}"
            )));
        }
    };
    info!("Payment gateway initialized: {}", gateway.name());
    Ok(gateway)
}

/// 在跳转地址后附加会话号
fn with_session_id(url: &str, session_id: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}session_id={session_id}")
}

pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self> {
        if config.secret_key.is_empty() {
            return Err(SchoolHubError::validation(
                "payment.secret_key is required for the stripe provider",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        })
    }

    fn form(&self, payment: &Payment) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "payment".to_string()),
            (
                "success_url",
                with_session_id(&self.success_url, "{CHECKOUT_SESSION_ID}"),
            ),
            ("cancel_url", self.cancel_url.clone()),
            ("client_reference_id", payment.id.to_string()),
            ("metadata[payment_id]", payment.id.to_string()),
            ("metadata[school_id]", payment.school_id.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", payment.currency.clone()),
            (
                "line_items[0][price_data][unit_amount]",
                payment.amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                payment.description.clone(),
            ),
        ]
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_checkout_session(&self, payment: &Payment) -> Result<CheckoutSession> {
        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&self.form(payment))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Checkout session request for payment {} failed with {}: {}",
                payment.id, status, body
            );
            return Err(SchoolHubError::payment_gateway(format!(
                "Gateway returned {status}"
            )));
        }

        let session: StripeSession = response.json().await?;
        let url = session.url.ok_or_else(|| {
            SchoolHubError::payment_gateway("Gateway response is missing the checkout url")
        })?;
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}

pub struct LocalGateway {
    success_url: String,
}

impl LocalGateway {
    pub fn new(success_url: &str) -> Self {
        Self {
            success_url: success_url.to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for LocalGateway {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn create_checkout_session(&self, _payment: &Payment) -> Result<CheckoutSession> {
        let id = format!("cs_local_{}", uuid::Uuid::new_v4().simple());
        let url = with_session_id(&self.success_url, &id);
        Ok(CheckoutSession { id, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payments::entities::PaymentStatus;

    fn payment() -> Payment {
        let now = chrono::Utc::now();
        Payment {
            id: 9,
            school_id: 2,
            student_id: 4,
            amount_cents: 2_500_000,
            currency: "xof".to_string(),
            description: "Frais de scolarité".to_string(),
            status: PaymentStatus::Pending,
            checkout_session_id: None,
            checkout_url: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn config(provider: &str, secret_key: &str) -> PaymentConfig {
        PaymentConfig {
            provider: provider.to_string(),
            api_base: "https://api.stripe.com/v1/".to_string(),
            secret_key: secret_key.to_string(),
            webhook_secret: String::new(),
            webhook_tolerance_secs: 300,
            success_url: "http://localhost:3000/paid".to_string(),
            cancel_url: "http://localhost:3000/cancel".to_string(),
            default_currency: "xof".to_string(),
            request_timeout: 5,
        }
    }

    #[tokio::test]
    async fn test_local_gateway_session() {
        let gateway = LocalGateway::new("http://localhost:3000/paid");
        let session = gateway.create_checkout_session(&payment()).await.unwrap();
        assert!(session.id.starts_with("cs_local_"));
        assert_eq!(
            session.url,
            format!("http://localhost:3000/paid?session_id={}", session.id)
        );
    }

    #[test]
    fn test_with_session_id_keeps_query() {
        assert_eq!(with_session_id("http://x/ok?a=1", "s"), "http://x/ok?a=1&session_id=s");
    }

    #[test]
    fn test_stripe_form_fields() {
        let gateway = StripeGateway::new(&config("stripe", "sk_test")).unwrap();
        assert_eq!(gateway.api_base, "https://api.stripe.com/v1");
        let form = gateway.form(&payment());
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("2500000"));
        assert_eq!(get("metadata[payment_id]"), Some("9"));
        assert_eq!(
            get("success_url"),
            Some("http://localhost:3000/paid?session_id={CHECKOUT_SESSION_ID}")
        );
    }

    #[test]
    fn test_provider_selection() {
        assert_eq!(create_gateway(&config("local", "")).unwrap().name(), "local");
        assert!(create_gateway(&config("stripe", "")).is_err());
        assert!(create_gateway(&config("paypal", "")).is_err());
    }
}
