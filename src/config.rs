use crate::auth::cookie::SameSite;
use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_COOKIE_NAME: &str = "freewise-session";
pub const DEFAULT_EXCHANGE_RATES_URL: &str = "https://open.er-api.com/v6/latest";
/// Upper bound for `SESSION_TTL_SECONDS`: one year.
pub const MAX_SESSION_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value `{value}` for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    pub session_ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    pub bcrypt_cost: u32,
    pub default_currency: String,
    pub exchange_rates_url: String,
    pub admin: Option<AdminSeed>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("jwt_secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("default_currency", &self.default_currency)
            .field("exchange_rates_url", &self.exchange_rates_url)
            .field("admin", &self.admin.as_ref().map(|a| a.username.as_str()))
            .finish()
    }
}

impl Config {
    /// Reads `.env` (if any) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminSeed { username, password })
            }
            _ => None,
        };

        let ttl_seconds: u64 = parse(&lookup, "SESSION_TTL_SECONDS", 2 * 60 * 60)?;
        if ttl_seconds == 0 || ttl_seconds > MAX_SESSION_TTL_SECONDS {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_SECONDS",
                value: ttl_seconds.to_string(),
            });
        }

        Ok(Self {
            port: parse(&lookup, "PORT", 3000)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            jwt_secret,
            session_ttl: Duration::from_secs(ttl_seconds),
            cookie_name: lookup("SESSION_COOKIE_NAME").unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
            cookie_secure: parse(&lookup, "SESSION_COOKIE_SECURE", false)?,
            cookie_same_site: parse(&lookup, "SESSION_COOKIE_SAME_SITE", SameSite::Lax)?,
            bcrypt_cost: parse(&lookup, "BCRYPT_COST", 10)?,
            default_currency: lookup("DEFAULT_CURRENCY").unwrap_or_else(|| "EUR".to_string()),
            exchange_rates_url: lookup("EXCHANGE_RATES_URL").unwrap_or_else(|| DEFAULT_EXCHANGE_RATES_URL.to_string()),
            admin,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}
