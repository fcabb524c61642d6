use anyhow::{Context, Result, anyhow};
use std::{path::PathBuf, str::FromStr};

#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub db: u8,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub run_migrations: bool,
    pub port: u16,
    pub db_min_conn: u32,
    pub db_max_conn: u32,
    pub redis: RedisSettings,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub webhook_secret: String,
    pub low_stock_threshold: i32,
    pub otel_endpoint: String,
    pub dev_mode: bool,
    pub enable_file_log: bool,
}

impl Config {
    pub fn init() -> Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, `std::env` in production.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key).with_context(|| format!("Missing environment variable: {key}"))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let webhook_secret = required("MP_WEBHOOK_SECRET")?;
        let redis_host = required("REDIS_HOST")?;

        let run_migrations = parse_bool("RUN_MIGRATIONS", &required("RUN_MIGRATIONS")?)?;

        let port = required("PORT")?
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        let db_min_conn = parse_or(&lookup, "DB_MIN_CONN", 1u32)?;
        let db_max_conn = parse_or(&lookup, "DB_MAX_CONN", 10u32)?;

        if db_min_conn > db_max_conn {
            return Err(anyhow!(
                "DB_MIN_CONN ({db_min_conn}) cannot exceed DB_MAX_CONN ({db_max_conn})"
            ));
        }

        let redis = RedisSettings {
            host: redis_host,
            port: parse_or(&lookup, "REDIS_PORT", 6379u16)?,
            db: parse_or(&lookup, "REDIS_DB", 0u8)?,
            password: lookup("REDIS_PASSWORD").filter(|p| !p.is_empty()),
        };

        let upload_dir = lookup("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./uploads"));

        let max_upload_bytes = parse_or(&lookup, "MAX_UPLOAD_BYTES", 5 * 1024 * 1024usize)?;
        let low_stock_threshold = parse_or(&lookup, "LOW_STOCK_THRESHOLD", 5i32)?;

        let otel_endpoint = lookup("OTEL_ENDPOINT")
            .unwrap_or_else(|| "http://otel-collector:4317".to_string());

        let dev_mode = lookup("DEV_MODE")
            .map(|v| parse_bool("DEV_MODE", &v))
            .transpose()?
            .unwrap_or(false);

        let enable_file_log = lookup("ENABLE_FILE_LOG")
            .map(|v| parse_bool("ENABLE_FILE_LOG", &v))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            database_url,
            jwt_secret,
            run_migrations,
            port,
            db_min_conn,
            db_max_conn,
            redis,
            upload_dir,
            max_upload_bytes,
            webhook_secret,
            low_stock_threshold,
            otel_endpoint,
            dev_mode,
            enable_file_log,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(anyhow!("{key} must be 'true' or 'false', got '{other}'")),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/mundopuertas"),
            ("JWT_SECRET", "secret"),
            ("RUN_MIGRATIONS", "true"),
            ("PORT", "5000"),
            ("REDIS_HOST", "localhost"),
            ("MP_WEBHOOK_SECRET", "whsec"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<Config> {
        Config::from_source(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn applies_defaults() {
        let config = load(&base()).unwrap();

        assert!(config.run_migrations);
        assert_eq!(config.port, 5000);
        assert_eq!(config.db_min_conn, 1);
        assert_eq!(config.db_max_conn, 10);
        assert_eq!(config.redis.port, 6379);
        assert_eq!(config.redis.password, None);
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.low_stock_threshold, 5);
        assert_eq!(config.otel_endpoint, "http://otel-collector:4317");
        assert!(!config.dev_mode);
    }

    #[test]
    fn reports_missing_variable() {
        let mut env = base();
        env.remove("JWT_SECRET");

        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn rejects_bad_bool() {
        let mut env = base();
        env.insert("RUN_MIGRATIONS", "yes");
        assert!(load(&env).is_err());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let mut env = base();
        env.insert("DB_MIN_CONN", "20");
        env.insert("DB_MAX_CONN", "5");
        assert!(load(&env).is_err());
    }

    #[test]
    fn reads_overrides() {
        let mut env = base();
        env.insert("LOW_STOCK_THRESHOLD", "12");
        env.insert("REDIS_PASSWORD", "pw");
        env.insert("DEV_MODE", "true");

        let config = load(&env).unwrap();
        assert_eq!(config.low_stock_threshold, 12);
        assert_eq!(config.redis.password.as_deref(), Some("pw"));
        assert!(config.dev_mode);
    }
}
