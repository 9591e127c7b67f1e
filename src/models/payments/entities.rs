use serde::{Deserialize, Serialize};

// 缴费状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl PaymentStatus {
    /// 终态不会再被 webhook 改写
    pub fn is_final(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            "expired" => Ok(PaymentStatus::Expired),
            _ => Err(format!("Invalid payment status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub school_id: i64,
    // 学生档案ID
    pub student_id: i64,
    // 金额，最小货币单位
    pub amount_cents: i64,
    pub currency: String,
    pub description: String,
    pub status: PaymentStatus,
    pub checkout_session_id: Option<String>,
    pub checkout_url: Option<String>,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 创建缴费记录所需数据（存储层使用）
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub school_id: i64,
    pub student_id: i64,
    pub amount_cents: i64,
    pub currency: String,
    pub description: String,
}

/// 支付网关返回的结账会话
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}
