//! 对象缓存
//!
//! 缓存后端以插件形式在加载时注册（见 [`declare_object_cache_plugin!`]），
//! 启动时按 `cache.type` 选择，Redis 不可用时回退到进程内的 Moka。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    // 后端出错，无法判断键是否存在
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

/// 声明缓存插件，程序加载时自动注册到插件表
///
/// 类型需要提供 `fn new() -> crate::errors::Result<Self>`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $ty:ty) => {
        #[::ctor::ctor]
        unsafe fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                ::std::sync::Arc::new(|| -> $crate::cache::register::BoxedObjectCacheFuture {
                    ::std::boxed::Box::pin(async {
                        let cache = <$ty>::new()?;
                        Ok(::std::boxed::Box::new(cache)
                            as ::std::boxed::Box<dyn $crate::cache::ObjectCache>)
                    })
                }),
            );
        }
    };
}
