use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument, warn};

use crate::application::ports::JobStoreError;

const CONNECT_ATTEMPTS: u32 = 6;

/// Connect with exponential backoff; the database is often still coming
/// up when the service starts.
#[instrument(skip(url))]
pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, JobStoreError> {
    let options = PgPoolOptions::new().max_connections(max_connections);
    let mut delay = Duration::from_millis(250);

    for attempt in 1..=CONNECT_ATTEMPTS {
        match options.clone().connect(url).await {
            Ok(pool) => {
                info!(attempt, "PostgreSQL connection pool established");
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                warn!(
                    error = %e,
                    attempt,
                    delay_ms = delay.as_millis(),
                    "PostgreSQL connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(JobStoreError::ConnectionFailed(e.to_string())),
        }
    }

    unreachable!("connect loop always returns")
}
