use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use std::{str::FromStr, sync::Arc, time::Duration};

pub mod indexing_log;
pub mod subscription;
pub mod usage;
pub mod user;

pub mod models {
    pub mod indexing_log;
    pub mod subscription;
    pub mod usage;
    pub mod user;
}

pub mod dtos {
    pub mod indexing_log;
    pub mod subscription;
    pub mod user;
}

const MAX_CONNECTIONS: u32 = 20;

/// Connects to Postgres, creating the database if it does not exist yet,
/// and runs the embedded migrations.
///
/// Counters live only here, so every worker shares this one pool.
pub async fn setup(
    database_url: &str,
    require_ssl: bool,
) -> Result<Arc<PgPool>, Box<dyn std::error::Error>> {
    let mut options = PgConnectOptions::from_str(database_url)?;
    if require_ssl {
        options = options.ssl_mode(PgSslMode::Require);
    }

    let db_name = options.get_database().unwrap_or("postgres").to_string();
    create_database_if_missing(options.clone().database("postgres"), &db_name).await?;

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Database {} ready, migrations applied", db_name);

    Ok(Arc::new(pool))
}

async fn create_database_if_missing(
    admin_options: PgConnectOptions,
    db_name: &str,
) -> Result<(), sqlx::Error> {
    let admin_pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(admin_options)
        .await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&admin_pool)
            .await?;

    if !exists {
        log::info!("Creating database {}", db_name);
        sqlx::query(&format!("CREATE DATABASE \"{}\"", db_name.replace('"', "\"\"")))
            .execute(&admin_pool)
            .await?;
    }

    admin_pool.close().await;
    Ok(())
}
