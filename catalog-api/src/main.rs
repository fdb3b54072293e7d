mod app;

use anyhow::Context;
use app::{app_router, AppState};
use catalog_core::{AccessGuard, GuardMode, PgProductStore, RateLimiter};
use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct ApiConfig {
    bind: SocketAddr,
    database_url: String,
    db_max_connections: u32,
    guard_mode: GuardMode,
    /// CORS 允许的来源列表（空则允许所有）
    cors_origins: Vec<String>,
}

impl ApiConfig {
    fn from_env() -> anyhow::Result<Self> {
        let bind = parse_bind(env::var("CATALOG_BIND").ok().as_deref())?;

        let database_url = env::var("DATABASE_URL")
            .or_else(|_| env::var("POSTGRES_URL"))
            .context("DATABASE_URL (or POSTGRES_URL) must be set")?;

        let db_max_connections = env::var("CATALOG_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(5);

        let secret = env::var("API_SECRET_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let guard_mode = resolve_guard_mode(
            secret,
            env_flag("CATALOG_ALLOW_UNAUTHENTICATED_WRITES"),
        )?;

        // 逗号分隔；空或 "*" 表示允许所有
        let cors_origins = env::var("CATALOG_CORS_ORIGINS")
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        Ok(Self {
            bind,
            database_url,
            db_max_connections,
            guard_mode,
            cors_origins,
        })
    }
}

/// 未设置时监听 0.0.0.0:8080；设置了但无法解析则启动失败
fn parse_bind(raw: Option<&str>) -> anyhow::Result<SocketAddr> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(addr) => addr
            .parse()
            .with_context(|| format!("CATALOG_BIND is not a valid socket address: {addr}")),
        None => Ok(SocketAddr::from(([0, 0, 0, 0], 8080))),
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// 未配置密钥时，必须显式开启放行开关，避免生产环境误暴露写接口。
fn resolve_guard_mode(secret: Option<String>, allow_open: bool) -> anyhow::Result<GuardMode> {
    match (secret, allow_open) {
        (Some(secret), _) => Ok(GuardMode::SharedSecret(secret)),
        (None, true) => Ok(GuardMode::Disabled),
        (None, false) => anyhow::bail!(
            "API_SECRET_KEY is not set; set it, or set CATALOG_ALLOW_UNAUTHENTICATED_WRITES=true \
             to accept unauthenticated writes (development only)"
        ),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "*" {
        return vec![];
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 优先读取 .env（若存在）
    let _ = dotenv();
    init_tracing();

    let config = ApiConfig::from_env()?;
    info!("starting API on {}", config.bind);

    let guard = AccessGuard::new(config.guard_mode.clone());
    if !guard.is_enabled() {
        warn!("write authorization disabled: CATALOG_ALLOW_UNAUTHENTICATED_WRITES is set");
    }

    let store = PgProductStore::connect(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to database")?;

    let state = AppState {
        store: Arc::new(store),
        limiter: Arc::new(RateLimiter::default()),
        guard: Arc::new(guard),
    };

    let app = app_router(state, config.cors_origins.clone());
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
