use crate::config::{Config, DatabaseConfig};
use crate::database::sqlite_repository::SqliteRepository;
use crate::db::{init_pool, run_migrations};
use crate::models::book::BookRequest;

pub fn memory_database() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        acquire_timeout: 5,
    }
}

/// Service configuration backed by a private in-memory database.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database = memory_database();
    config.logging.level = "warn".to_string();
    config
}

/// Migrated, empty in-memory store.
pub async fn test_repository() -> SqliteRepository {
    let pool = init_pool(&memory_database()).await.expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    SqliteRepository::new(pool)
}

pub fn book_request(title: &str, isbn: &str) -> BookRequest {
    BookRequest {
        title: title.to_string(),
        author: "Test Author".to_string(),
        isbn: isbn.to_string(),
        published_year: Some(2024),
        genre: Some("Fiction".to_string()),
    }
}

pub async fn count_sessions(repo: &SqliteRepository) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sessions")
        .fetch_one(&repo.pool)
        .await
        .expect("count sessions")
}
