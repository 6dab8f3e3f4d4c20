use sqlx::SqlitePool;

/// Handle to the persistent store. Cheap to clone; every operation checks a
/// connection out of the pool and returns it when the statement completes.
#[derive(Clone)]
pub struct SqliteRepository {
    pub pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}
