use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use tracing::{info, warn};

use crate::money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// try `DATABASE_URL`, fall back to the local store
    Auto,
    Local,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(StorageBackend::Auto),
            "local" => Ok(StorageBackend::Local),
            "postgres" | "pg" => Ok(StorageBackend::Postgres),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub local_store_path: Option<PathBuf>,
    pub initial_credit: BigDecimal,
    pub min_top_up: BigDecimal,
    pub log_level: tracing::Level,
    /// lowercased addresses whose accounts are provisioned as admins at startup
    pub admin_emails: Vec<String>,
    pub admin_password: Option<String>,
    /// shared with the sign-in proxy in front of `/auth/provider`, unset disables the route
    pub provider_secret: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            storage: StorageBackend::Auto,
            database_url: None,
            local_store_path: None,
            initial_credit: BigDecimal::from(25),
            min_top_up: BigDecimal::from(5),
            log_level: tracing::Level::INFO,
            admin_emails: Vec::new(),
            admin_password: None,
            provider_secret: None,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let defaults = Config::default();
        Self {
            bind_address: var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            storage: try_load("STORAGE_BACKEND", defaults.storage),
            database_url: var("DATABASE_URL"),
            local_store_path: var("LOCAL_STORE_PATH").map(PathBuf::from),
            initial_credit: try_load_amount("INITIAL_CREDIT", defaults.initial_credit),
            min_top_up: try_load_amount("MIN_TOP_UP", defaults.min_top_up),
            log_level: try_load("LOG_LEVEL", defaults.log_level),
            admin_emails: var("ADMIN_EMAILS").map(|raw| parse_list(&raw)).unwrap_or_default(),
            admin_password: var("ADMIN_PASSWORD"),
            provider_secret: var("PROVIDER_SECRET"),
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match var(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
    }
}

fn try_load_amount(key: &str, default: BigDecimal) -> BigDecimal {
    match var(key) {
        None => default,
        Some(raw) => money::parse_positive(&raw).unwrap_or_else(|| {
            warn!("Invalid {key} value '{raw}', using default: {default}");
            default
        }),
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageBackend::Auto => "auto",
            StorageBackend::Local => "local",
            StorageBackend::Postgres => "postgres",
        };
        f.write_str(name)
    }
}
