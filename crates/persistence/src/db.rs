//! Single database connection management.
//!
//! The repository deliberately holds one connection rather than a pool: the
//! access model is single-owner and sequential, and exclusive use is
//! enforced by handing the connection to one `CustomerRepository`.

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::StoreError;

/// Establishes one PostgreSQL connection with the given configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgConnection, StoreError> {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password);

    let conn = PgConnection::connect_with(&options)
        .await
        .map_err(StoreError::Connection)?;

    info!(
        host = %config.host,
        database = %config.database,
        "connection established"
    );
    Ok(conn)
}
