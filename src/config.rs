use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub openai_api_key: String,
    pub youtube_api_key: String,
    pub public_rps: u32,
    pub catalog_path: Option<String>,
    pub content_timeout_secs: u64,
    pub session_retention_secs: i64,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            openai_api_key: get_env("OPENAI_API_KEY")?,
            youtube_api_key: get_env("YOUTUBE_API_KEY")?,
            public_rps: get_env_parse("PUBLIC_RPS")?,
            catalog_path: env::var("CATALOG_PATH").ok(),
            content_timeout_secs: get_env_parse_or("CONTENT_TIMEOUT_SECS", 20)?,
            session_retention_secs: get_env_parse_or("SESSION_RETENTION_SECS", 1800)?,
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout_secs: get_env_parse_or("DB_ACQUIRE_TIMEOUT_SECS", 5)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_knobs_fall_back_to_defaults() {
        for (name, value) in [
            ("SERVER_ADDRESS", "127.0.0.1:0"),
            ("DATABASE_URL", "postgres://localhost/learnhub"),
            ("JWT_SECRET", "secret"),
            ("OPENAI_API_KEY", "key"),
            ("YOUTUBE_API_KEY", "key"),
            ("PUBLIC_RPS", "100"),
        ] {
            env::set_var(name, value);
        }
        for name in [
            "CATALOG_PATH",
            "CONTENT_TIMEOUT_SECS",
            "SESSION_RETENTION_SECS",
            "DB_MAX_CONNECTIONS",
            "DB_ACQUIRE_TIMEOUT_SECS",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env().expect("required vars are set");
        assert_eq!(config.content_timeout_secs, 20);
        assert_eq!(config.session_retention_secs, 1800);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.db_acquire_timeout_secs, 5);
        assert!(config.catalog_path.is_none());
    }
}
