//! Process configuration, read once from the environment (and `.env`).
use std::{env, ops::RangeInclusive, str::FromStr, time::Duration};

use crate::{chat::queue::Overflow, error::AppErr};

/// Costs `bcrypt::hash` accepts.
const BCRYPT_COSTS: RangeInclusive<u32> = 4..=31;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url:   String,
    pub bind_addr:      String,
    pub static_dir:     String,
    pub jwt_secret:     String,
    pub token_ttl:      Duration,
    pub bcrypt_cost:    u32,
    pub queue_capacity: usize,
    pub overflow:       Overflow,
    /// `None` disables the idle timeout.
    pub idle_timeout:   Option<Duration>,
    /// `None` disables the heartbeat task.
    pub ping_interval:  Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppErr> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key → value source; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppErr> {
        let env = Vars(lookup);

        let jwt_secret = match env.get("JWT_SECRET") {
            Some(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("JWT_SECRET not set, tokens will not survive a restart");
                random_secret()
            }
        };

        let queue_capacity: usize = env.parse("QUEUE_CAPACITY", 1024)?;
        if queue_capacity == 0 {
            return Err(AppErr::Config("QUEUE_CAPACITY must be at least 1".into()));
        }

        let bcrypt_cost: u32 = env.parse("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !BCRYPT_COSTS.contains(&bcrypt_cost) {
            return Err(AppErr::Config("BCRYPT_COST must be 4..=31".into()));
        }

        let token_ttl = env
            .parse::<u64>("TOKEN_TTL_MINUTES", 120)?
            .checked_mul(60)
            .filter(|s| i64::try_from(*s).is_ok())
            .map(Duration::from_secs)
            .ok_or_else(|| AppErr::Config("TOKEN_TTL_MINUTES is too large".into()))?;

        Ok(Self {
            database_url:   env.or("DATABASE_URL", "sqlite://database.db"),
            bind_addr:      env.or("BIND_ADDR", "0.0.0.0:8000"),
            static_dir:     env.or("STATIC_DIR", "public"),
            jwt_secret,
            token_ttl,
            bcrypt_cost,
            queue_capacity,
            overflow:       env.parse("QUEUE_OVERFLOW", Overflow::Block)?,
            idle_timeout:   secs(env.parse("IDLE_TIMEOUT_SECS", 90)?),
            ping_interval:  secs(env.parse("PING_INTERVAL_SECS", 30)?),
        })
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.into())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, AppErr>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppErr::Config(format!("{key}={raw}: {e}"))),
            None => Ok(default),
        }
    }
}

fn secs(n: u64) -> Option<Duration> {
    (n > 0).then(|| Duration::from_secs(n))
}

fn random_secret() -> String {
    use rand::{distributions::Alphanumeric, Rng};
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}
