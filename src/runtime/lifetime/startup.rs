use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::errors::{Result, SchoolHubError};
use crate::models::users::entities::{NewUser, User, UserRole};
use crate::services::payments::{PaymentGateway, create_gateway};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_initial_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_ADMIN_EMAIL: &str = "admin@localhost";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub gateway: Arc<dyn PaymentGateway>,
}

/// 按名称构造缓存后端
async fn build_cache(name: &str) -> Result<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name).ok_or_else(|| {
        SchoolHubError::cache_plugin_not_found(format!(
            "Cache backend '{name}' not found in registry"
        ))
    })?;
    let cache = constructor().await?;
    Ok(Arc::from(cache))
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = &AppConfig::get().cache.cache_type;
    warn!("Attempting to create {} cache backend", cache_type);

    match build_cache(cache_type).await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", cache_type);
            Ok(cache)
        }
        Err(e) if cache_type != "moka" => {
            warn!("Failed to create {} cache: {}", cache_type, e);
            warn!("Falling back to memory cache");
            let cache = build_cache("moka").await?;
            warn!("Successfully created fallback Moka (in-memory) cache backend");
            Ok(cache)
        }
        Err(e) => Err(e),
    }
}

/// 首次启动时创建平台管理员
///
/// 已存在平台管理员时不做任何事。未提供密码时生成随机密码并打印到日志。
pub async fn seed_super_admin(
    storage: &dyn Storage,
    email: &str,
    password: Option<String>,
) -> Result<Option<User>> {
    let count = storage.count_users_by_role(UserRole::SuperAdmin).await?;
    if count > 0 {
        debug!("{} super admin(s) already present, skipping seed", count);
        return Ok(None);
    }

    let password = password.filter(|p| !p.is_empty()).unwrap_or_else(|| {
        let generated = generate_initial_password(16);
        warn!("==========================================================");
        warn!("  ADMIN_PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Super admin login: {}", email);
        warn!("  Generated password: {}", generated);
        warn!("==========================================================");
        generated
    });

    let user = storage
        .create_user(NewUser {
            login: email.to_string(),
            email: Some(email.to_string()),
            password_hash: hash_password(&password)?,
            role: UserRole::SuperAdmin,
            school_id: None,
        })
        .await?;

    info!("Super admin created (ID: {}, login: {})", user.id, user.login);
    Ok(Some(user))
}

/// 准备服务器启动的上下文
/// 包括存储、缓存与支付网关
pub async fn prepare_server_startup() -> Result<StartupContext> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());
    let password = std::env::var("ADMIN_PASSWORD").ok();
    if let Err(e) = seed_super_admin(storage.as_ref(), &email, password).await {
        warn!("Failed to seed super admin: {}", e);
    }

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    let gateway = create_gateway(&AppConfig::get().payment)?;

    Ok(StartupContext {
        storage,
        cache,
        gateway,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::tests::memory_storage;
    use crate::utils::password::verify_password;

    #[tokio::test]
    async fn test_seed_super_admin_once() {
        let storage = memory_storage().await;

        let created = seed_super_admin(&storage, "root@schoolhub.io", Some("Secret123".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.role, UserRole::SuperAdmin);
        assert_eq!(created.school_id, None);
        assert!(verify_password("Secret123", &created.password_hash));

        let again = seed_super_admin(&storage, "other@schoolhub.io", None)
            .await
            .unwrap();
        assert!(again.is_none());

        let found = storage
            .get_user_by_identifier("root@schoolhub.io")
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));
    }
}
