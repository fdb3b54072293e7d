use catalog_core::{AccessGuard, ProductStore, RateLimiter};
use std::sync::Arc;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    /// 按客户端 IP 限流（进程内有效）
    pub limiter: Arc<RateLimiter>,
    /// 写操作鉴权
    pub guard: Arc<AccessGuard>,
}
