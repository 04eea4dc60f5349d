use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// 服务端语句超时 (PostgreSQL statement_timeout)
    pub statement_timeout_secs: u64,
    /// 单个库存流程 (整个事务) 的最长执行时间
    pub workflow_timeout_secs: u64,
    /// 启动时连接失败的重试次数
    pub connect_retries: u32,
    pub connect_retry_delay_ms: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn workflow_timeout(&self) -> Duration {
        Duration::from_secs(self.workflow_timeout_secs)
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.connect_retry_delay_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/inventario".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
                statement_timeout_secs: 30,
                workflow_timeout_secs: 30,
                connect_retries: 5,
                connect_retry_delay_ms: 2000,
                idle_timeout_secs: 600,
                max_lifetime_secs: 1800,
                test_before_acquire: true,
            },
            cors: CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            },
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> config/default.toml -> config/{APP_ENV}.toml -> APP__* 环境变量
    /// 同时兼容 DATABASE_URL / SERVER_HOST / SERVER_PORT
    pub fn load() -> Result<Self, ConfigError> {
        let run_env = std::env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

        let mut builder = Self::defaults()?
            .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
            .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            );

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }
        if let Ok(host) = std::env::var("SERVER_HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
        {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// 以 `Default` 实现为基础的配置构建器
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let d = AppConfig::default();
        let builder = Config::builder()
            .set_default("server.host", d.server.host)?
            .set_default("server.port", d.server.port as i64)?
            .set_default("database.url", d.database.url)?
            .set_default("database.max_connections", d.database.max_connections as i64)?
            .set_default("database.acquire_timeout_secs", d.database.acquire_timeout_secs as i64)?
            .set_default("database.statement_timeout_secs", d.database.statement_timeout_secs as i64)?
            .set_default("database.workflow_timeout_secs", d.database.workflow_timeout_secs as i64)?
            .set_default("database.connect_retries", d.database.connect_retries as i64)?
            .set_default("database.connect_retry_delay_ms", d.database.connect_retry_delay_ms as i64)?
            .set_default("database.idle_timeout_secs", d.database.idle_timeout_secs as i64)?
            .set_default("database.max_lifetime_secs", d.database.max_lifetime_secs as i64)?
            .set_default("database.test_before_acquire", d.database.test_before_acquire)?
            .set_default("cors.allowed_origins", d.cors.allowed_origins)?;
        Ok(builder)
    }
}
