use crate::config::{BootstrapConfig, DatabaseConfig};
use crate::database::sqlite_repository::SqliteRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use rocket::fairing::AdHoc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub async fn init_pool(db_config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&db_config.url)?.create_if_missing(true).foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout));

    // An in-memory database lives exactly as long as its connection.
    pool_options = if db_config.is_in_memory() {
        pool_options.max_connections(1).idle_timeout(None).max_lifetime(None)
    } else {
        pool_options.idle_timeout(Duration::from_secs(30)).max_lifetime(Duration::from_secs(1800))
    };

    pool_options.connect_with(options).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed_bootstrap_user(repo: &SqliteRepository, bootstrap: &BootstrapConfig) -> Result<(), AppError> {
    if !bootstrap.enabled {
        return Ok(());
    }

    if repo.ensure_user(&bootstrap.username, &bootstrap.password).await? {
        tracing::info!(username = %bootstrap.username, "Bootstrap user created");
    }

    Ok(())
}

async fn prepare(db_config: &DatabaseConfig, bootstrap: &BootstrapConfig) -> Result<SqlitePool, AppError> {
    let pool = init_pool(db_config).await.map_err(|e| AppError::db("Failed to open database", e))?;
    run_migrations(&pool).await?;
    seed_bootstrap_user(&SqliteRepository::new(pool.clone()), bootstrap).await?;
    Ok(pool)
}

pub fn stage_db(db_config: DatabaseConfig, bootstrap: BootstrapConfig) -> AdHoc {
    AdHoc::try_on_ignite("SQLite (sqlx)", |rocket| async move {
        match prepare(&db_config, &bootstrap).await {
            Ok(pool) => {
                tracing::info!(url = %db_config.url, "Database pool initialized successfully");
                Ok(rocket.manage(pool))
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to initialize database");
                Err(rocket)
            }
        }
    })
}
