//! Server Configuration
//!
//! Read from the environment (after `.env` is loaded) once at startup.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::{AuthConfig, DefaultAdmin};
use platform::token::TokenConfig;
use secrecy::SecretString;

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_EXPIRY_HOURS: i64 = 24;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

/// Storage backend selected by `DATABASE_DRIVER`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseDriver {
    Postgres { url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseDriver,
    pub http_addr: SocketAddr,
    pub request_timeout: Duration,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = match optional("DATABASE_DRIVER")
            .as_deref()
            .unwrap_or("postgres")
        {
            "postgres" => DatabaseDriver::Postgres {
                url: env::var("DATABASE_URL")
                    .context("DATABASE_URL must be set for the postgres driver")?,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            },
            "memory" => DatabaseDriver::Memory,
            other => bail!("unsupported DATABASE_DRIVER `{other}` (expected postgres or memory)"),
        };

        let http_addr = parse_or("HTTP_ADDR", DEFAULT_HTTP_ADDR.parse::<SocketAddr>()?)?;
        let request_timeout =
            Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);

        let frontend_origins = optional("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let secret = optional("JWT_SECRET").context("JWT_SECRET must be set and non-empty")?;
        let expiry_hours = parse_or("JWT_EXPIRY_HOURS", DEFAULT_EXPIRY_HOURS)?;
        if expiry_hours <= 0 {
            bail!("JWT_EXPIRY_HOURS must be positive (got {expiry_hours})");
        }

        let mut auth = AuthConfig::new(TokenConfig {
            secret: SecretString::from(secret),
            expiry_hours,
        });
        if let Some(admin) = default_admin()? {
            auth = auth.with_default_admin(admin);
        }

        Ok(Self {
            database,
            http_addr,
            request_timeout,
            frontend_origins,
            auth,
        })
    }
}

/// All three variables or none
fn default_admin() -> anyhow::Result<Option<DefaultAdmin>> {
    let username = optional("DEFAULT_ADMIN_USERNAME");
    let email = optional("DEFAULT_ADMIN_EMAIL");
    let password = optional("DEFAULT_ADMIN_PASSWORD");

    match (username, email, password) {
        (Some(username), Some(email), Some(password)) => Ok(Some(DefaultAdmin {
            username,
            email,
            password: SecretString::from(password),
        })),
        (None, None, None) => Ok(None),
        _ => bail!(
            "DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_EMAIL and DEFAULT_ADMIN_PASSWORD must be set together"
        ),
    }
}

/// Unset and blank are treated the same
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value `{raw}`")),
        None => Ok(default),
    }
}
