use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};

use std::time::Duration;

#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    #[serde(default, skip_serializing)]
    pub pg_con: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            pg_con: String::new(),
            pool_size: default_pool_size(),
            acquire_timeout: default_acquire_timeout(),
        }
    }
}

pub async fn init_pool(config: &DbConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.pg_con)
        .await?;
    Ok(pool)
}

fn default_pool_size() -> u32 {
    20
}

fn default_acquire_timeout() -> Duration {
    Duration::from_secs(5)
}
