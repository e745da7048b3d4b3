use anyhow::{Context, Result};
use std::{env, str::FromStr};

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub pricing: PricingConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: env::var("DATABASE_HOST").context("DATABASE_HOST is not set")?,
            port: parse_var("DATABASE_PORT")?.context("DATABASE_PORT is not set")?,
            username: env::var("DATABASE_USERNAME").context("DATABASE_USERNAME is not set")?,
            password: env::var("DATABASE_PASSWORD").context("DATABASE_PASSWORD is not set")?,
            database: env::var("DATABASE_NAME").context("DATABASE_NAME is not set")?,
        };
        let pricing = PricingConfig {
            free_days: parse_var("PRICING_FREE_DAYS")?.unwrap_or(0),
            max_duration_days: parse_var("PRICING_MAX_DURATION_DAYS")?.unwrap_or(60),
        };
        let server = ServerConfig {
            port: parse_var("SERVER_PORT")?.unwrap_or(8080),
        };
        Ok(Self {
            database,
            pricing,
            server,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

// 料金計算ポリシー。無料日数と最長レンタル日数は運用ごとに変わるため環境変数で与える
#[derive(Debug, Clone, Copy)]
pub struct PricingConfig {
    pub free_days: u32,
    pub max_duration_days: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_days: 0,
            max_duration_days: 60,
        }
    }
}

pub struct ServerConfig {
    pub port: u16,
}

// 未設定なら None、設定されていてパースできなければエラー
fn parse_var<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("{key} is not valid unicode")),
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} has an invalid value: {v}")),
    }
}
