use crate::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const ACCESS_TOKEN: &str = "access";
pub const REFRESH_TOKEN: &str = "refresh";
const REFRESH_COOKIE: &str = "refresh_token";

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,            // Subject (user ID)
    pub role: String,           // 用户角色
    pub school_id: Option<i64>, // 所属学校，平台管理员为空
    pub token_type: String,     // token类型: "access" 或 "refresh"
    pub exp: usize,             // Expiration time (时间戳)
    pub iat: usize,             // Issued at (签发时间)
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

// Token 响应结构体
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// 签发参数
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: i64,
    pub role: &'a str,
    pub school_id: Option<i64>,
}

pub struct JwtUtils;

impl JwtUtils {
    fn secret() -> &'static str {
        &AppConfig::get().jwt.secret
    }

    /// 用指定密钥签发
    pub fn encode_with_secret(
        secret: &str,
        subject: TokenSubject<'_>,
        token_type: &str,
        expiry: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: subject.user_id.to_string(),
            role: subject.role.to_string(),
            school_id: subject.school_id,
            token_type: token_type.to_string(),
            exp: (now + expiry).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// 用指定密钥校验，并检查 token 类型
    pub fn decode_with_secret(
        secret: &str,
        token: &str,
        expected_type: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?
        .claims;
        if claims.token_type != expected_type {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
        }
        Ok(claims)
    }

    // 生成 Access Token
    pub fn generate_access_token(
        subject: TokenSubject<'_>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        Self::encode_with_secret(
            Self::secret(),
            subject,
            ACCESS_TOKEN,
            chrono::Duration::minutes(AppConfig::get().jwt.access_token_expiry),
        )
    }

    // 生成 Refresh Token，未指定有效期时使用配置值
    pub fn generate_refresh_token(
        subject: TokenSubject<'_>,
        token_expiry: Option<chrono::Duration>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let expiry = token_expiry.unwrap_or_else(|| {
            chrono::Duration::days(AppConfig::get().jwt.refresh_token_expiry)
        });
        Self::encode_with_secret(Self::secret(), subject, REFRESH_TOKEN, expiry)
    }

    pub fn generate_token_pair(
        subject: TokenSubject<'_>,
        refresh_token_expiry: Option<chrono::Duration>,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access_token: Self::generate_access_token(subject)?,
            refresh_token: Self::generate_refresh_token(subject, refresh_token_expiry)?,
        })
    }

    // 验证 Access Token
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::decode_with_secret(Self::secret(), token, ACCESS_TOKEN)
    }

    // 验证 Refresh Token
    pub fn verify_refresh_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::decode_with_secret(Self::secret(), token, REFRESH_TOKEN)
    }

    /// 创建 Refresh Token Cookie
    pub fn create_refresh_token_cookie(
        refresh_token: &str,
        max_age: chrono::Duration,
    ) -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE, refresh_token.to_string())
            .path("/api/v1/auth")
            .max_age(actix_web::cookie::time::Duration::seconds(
                max_age.num_seconds(),
            ))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production()) // 生产环境下使用 HTTPS
            .finish()
    }

    /// 创建空的 Refresh Token Cookie（用于注销）
    pub fn create_empty_refresh_token_cookie() -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE, "")
            .path("/api/v1/auth")
            .max_age(actix_web::cookie::time::Duration::seconds(0))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production())
            .finish()
    }

    /// 从请求中提取 Refresh Token
    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn subject() -> TokenSubject<'static> {
        TokenSubject {
            user_id: 7,
            role: "teacher",
            school_id: Some(3),
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let token = JwtUtils::encode_with_secret(
            SECRET,
            subject(),
            ACCESS_TOKEN,
            chrono::Duration::minutes(5),
        )
        .unwrap();
        let claims = JwtUtils::decode_with_secret(SECRET, &token, ACCESS_TOKEN).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.role, "teacher");
        assert_eq!(claims.school_id, Some(3));
    }

    #[test]
    fn test_token_type_is_enforced() {
        let token = JwtUtils::encode_with_secret(
            SECRET,
            subject(),
            REFRESH_TOKEN,
            chrono::Duration::minutes(5),
        )
        .unwrap();
        assert!(JwtUtils::decode_with_secret(SECRET, &token, ACCESS_TOKEN).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtUtils::encode_with_secret(
            SECRET,
            subject(),
            ACCESS_TOKEN,
            chrono::Duration::minutes(5),
        )
        .unwrap();
        assert!(JwtUtils::decode_with_secret("other", &token, ACCESS_TOKEN).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = JwtUtils::encode_with_secret(
            SECRET,
            subject(),
            ACCESS_TOKEN,
            chrono::Duration::minutes(-10),
        )
        .unwrap();
        assert!(JwtUtils::decode_with_secret(SECRET, &token, ACCESS_TOKEN).is_err());
    }
}
