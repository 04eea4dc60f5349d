use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

fn connect_options(db: &DatabaseConfig) -> Result<PgConnectOptions, sqlx::Error> {
    let mut connect_options = PgConnectOptions::from_str(&db.url)?
        .options([("statement_timeout", format!("{}s", db.statement_timeout_secs))]);

    // 设置慢查询日志阈值为 5秒
    connect_options = connect_options.log_slow_statements(
        tracing::log::LevelFilter::Warn,
        Duration::from_secs(5),
    );
    Ok(connect_options)
}

fn pool_options(db: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(db.max_connections)
        .acquire_timeout(db.acquire_timeout())
        .idle_timeout(Some(db.idle_timeout()))
        .max_lifetime(Some(db.max_lifetime()))
        .test_before_acquire(db.test_before_acquire)
}

/// 创建数据库连接池，启动时连接失败按配置重试
pub async fn create_pool(db: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = connect_options(db)?;
    let mut attempt = 0u32;

    loop {
        match pool_options(db).connect_with(options.clone()).await {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < db.connect_retries => {
                attempt += 1;
                tracing::warn!(
                    "Database connection failed (attempt {}/{}): {}",
                    attempt,
                    db.connect_retries + 1,
                    e
                );
                tokio::time::sleep(db.connect_retry_delay()).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// 创建延迟连接的连接池 (首次使用时才建立连接)
pub fn create_lazy_pool(db: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    Ok(pool_options(db).connect_lazy_with(connect_options(db)?))
}
