use serde::Serialize;

/// One login of one user. `created_at` is a unix timestamp in seconds.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub created_at: i64,
}

impl Session {
    /// Whether the session is still within `timeout_secs` of its creation at `now`.
    pub fn is_fresh(&self, now: i64, timeout_secs: i64) -> bool {
        now - self.created_at < timeout_secs
    }
}
