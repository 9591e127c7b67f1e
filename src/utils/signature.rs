//! 支付网关 webhook 签名
//!
//! 头部格式 `t=<unix 秒>,v1=<hex(hmac_sha256(secret, "{t}.{body}"))>`，
//! 可能出现多个 `v1`（密钥轮换期间），任一匹配即通过。

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::{Result, SchoolHubError};

type HmacSha256 = Hmac<Sha256>;

/// 计算签名（hex 编码）
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SchoolHubError::validation(format!("无效的签名密钥: {e}")))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// 生成签名头，本地网关与测试使用
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String> {
    Ok(format!(
        "t={timestamp},v1={}",
        compute_signature(secret, timestamp, payload)?
    ))
}

/// 校验签名头
///
/// `now` 与签名时间相差超过 `tolerance_secs` 时拒绝。
pub fn verify_signature(
    secret: &str,
    header: &str,
    payload: &[u8],
    now: i64,
    tolerance_secs: i64,
) -> Result<()> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for item in header.split(',') {
        match item.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = value.parse().ok();
            }
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| SchoolHubError::authentication("签名头缺少时间戳"))?;
    if candidates.is_empty() {
        return Err(SchoolHubError::authentication("签名头缺少 v1 签名"));
    }
    if (now - timestamp).abs() > tolerance_secs {
        return Err(SchoolHubError::authentication("签名时间超出允许范围"));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SchoolHubError::validation(format!("无效的签名密钥: {e}")))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    // verify_slice 为常量时间比较
    let matched = candidates.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(SchoolHubError::authentication("签名不匹配"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"type":"checkout.session.completed"}"#;

    #[test]
    fn test_roundtrip_header_verifies() {
        let header = signature_header(SECRET, 1_700_000_000, BODY).unwrap();
        assert!(verify_signature(SECRET, &header, BODY, 1_700_000_010, 300).is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let header = signature_header(SECRET, 1_700_000_000, BODY).unwrap();
        let err = verify_signature(SECRET, &header, b"{}", 1_700_000_000, 300).unwrap_err();
        assert_eq!(err.code(), "E011");
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let header = signature_header(SECRET, 1_700_000_000, BODY).unwrap();
        assert!(verify_signature(SECRET, &header, BODY, 1_700_001_000, 300).is_err());
    }

    #[test]
    fn test_any_v1_may_match() {
        let good = compute_signature(SECRET, 42, BODY).unwrap();
        let header = format!("t=42,v1=deadbeef,v1={good}");
        assert!(verify_signature(SECRET, &header, BODY, 42, 300).is_ok());
    }

    #[test]
    fn test_malformed_header_rejected() {
        assert!(verify_signature(SECRET, "garbage", BODY, 0, 300).is_err());
        assert!(verify_signature(SECRET, "t=1", BODY, 1, 300).is_err());
    }
}
