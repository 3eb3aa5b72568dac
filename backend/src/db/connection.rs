use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

const MAX_LIFETIME: Duration = Duration::from_secs(15 * 60);

pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .max_lifetime(MAX_LIFETIME)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}
