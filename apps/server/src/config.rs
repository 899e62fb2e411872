use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use dues_core::settings::{AssistancePolicy, EngineSettings, OverpaymentPolicy};
use dues_storage_sqlite::DEFAULT_WRITE_TIMEOUT;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub write_timeout: Duration,
    pub settings: EngineSettings,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("DUES_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid DUES_LISTEN_ADDR")?;
        let db_path = env_or("DUES_DB_PATH", "./db/dues.db");
        let cors_allow = env_or("DUES_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("DUES_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .unwrap_or(30000);
        let write_timeout = std::env::var("DUES_WRITE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_WRITE_TIMEOUT);

        let assistance_policy: AssistancePolicy = env_or("DUES_ASSISTANCE_POLICY", "POOLED")
            .parse()
            .context("Invalid DUES_ASSISTANCE_POLICY")?;
        let overpayment_policy: OverpaymentPolicy =
            env_or("DUES_OVERPAYMENT_POLICY", "CONVERT_TO_CREDIT")
                .parse()
                .context("Invalid DUES_OVERPAYMENT_POLICY")?;

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            write_timeout,
            settings: EngineSettings {
                assistance_policy,
                overpayment_policy,
            },
            log_format: env_or("DUES_LOG_FORMAT", "text"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
