//! Server configuration.
//!
//! Defaults, then an optional YAML file named by `GROUP_FUND_CONFIG`, then
//! environment variables. Later sources win.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::FixedOffset;
use log::info;
use serde::Deserialize;

use crate::backend::domain::models::MonthKey;
use crate::backend::domain::FiscalCalendar;

pub const CONFIG_PATH_ENV: &str = "GROUP_FUND_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:group_fund.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FundConfig {
    /// First month the fund collects dues for, `YYYY-MM`
    pub inception: String,
    /// Whole hours east of UTC used for month boundaries
    pub utc_offset_hours: i32,
    /// Admin account seeded at startup
    pub admin_name: String,
}

impl Default for FundConfig {
    fn default() -> Self {
        Self {
            inception: "2025-10".to_string(),
            utc_offset_hours: 9,
            admin_name: "admin".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub fund: FundConfig,
    pub client_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            fund: FundConfig::default(),
            client_origin: "http://localhost:5173".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.calendar()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());
        let yaml_content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply environment-style overrides; `lookup` returns the raw value for a key
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT: {}", port))?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(origin) = lookup("CLIENT_ORIGIN") {
            self.client_origin = origin;
        }
        if let Some(inception) = lookup("FUND_INCEPTION") {
            self.fund.inception = inception;
        }
        if let Some(offset) = lookup("FUND_UTC_OFFSET_HOURS") {
            self.fund.utc_offset_hours = offset
                .trim()
                .parse()
                .with_context(|| format!("Invalid FUND_UTC_OFFSET_HOURS: {}", offset))?;
        }
        if let Some(admin_name) = lookup("ADMIN_NAME") {
            self.fund.admin_name = admin_name;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn calendar(&self) -> Result<FiscalCalendar> {
        let inception = MonthKey::parse(self.fund.inception.trim())
            .context("Invalid fund inception")?;
        let offset = self
            .fund
            .utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("Invalid fund UTC offset: {} hours", self.fund.utc_offset_hours))?;
        Ok(FiscalCalendar::new(inception, offset))
    }
}
