use anyhow::{Context, Result};
use std::{env, str::FromStr, time::Duration};

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub payment: PaymentConfig,
    pub referral: ReferralConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: env::var("DATABASE_HOST")?,
            port: env::var("DATABASE_PORT")?.parse()?,
            username: env::var("DATABASE_USERNAME")?,
            password: env::var("DATABASE_PASSWORD")?,
            database: env::var("DATABASE_NAME")?,
            max_connections: var_or("DATABASE_MAX_CONNECTIONS", 10)?,
            acquire_timeout: Duration::from_secs(var_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?),
        };
        let payment = PaymentConfig {
            min_amount: var_or("PAYMENT_MIN_AMOUNT", PaymentConfig::default().min_amount)?,
            max_amount: var_or("PAYMENT_MAX_AMOUNT", PaymentConfig::default().max_amount)?,
        };
        let referral = ReferralConfig {
            threshold: var_or("REFERRAL_THRESHOLD", ReferralConfig::default().threshold)?,
            bonus: var_or("REFERRAL_BONUS", ReferralConfig::default().bonus)?,
        };
        Ok(Self {
            database,
            payment,
            referral,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentConfig {
    pub min_amount: i64,
    pub max_amount: i64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            min_amount: 100,
            max_amount: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralConfig {
    pub threshold: i64,
    pub bonus: i64,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            threshold: 2000,
            bonus: 100,
        }
    }
}

// 未設定ならデフォルト値、設定済みでパースできなければエラー
fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => v
            .parse()
            .with_context(|| format!("{key} has an invalid value: {v}")),
        Err(_) => Ok(default),
    }
}
