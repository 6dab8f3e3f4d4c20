use crate::database::session::SessionRepository;
use crate::error::app_error::AppError;
use crate::models::session::Session;
use chrono::Utc;
use tracing::{debug, info};

/// Owns the session lifecycle: at most one live session per user, expiry
/// after `timeout_secs`, and the lazy sweep of expired rows.
///
/// Every operation has an `_at` twin taking the current unix time explicitly.
pub struct SessionManager<'a, R: SessionRepository> {
    repo: &'a R,
    timeout_secs: i64,
}

impl<'a, R: SessionRepository> SessionManager<'a, R> {
    pub fn new(repo: &'a R, timeout_secs: i64) -> Self {
        Self { repo, timeout_secs }
    }

    pub fn now() -> i64 {
        Utc::now().timestamp()
    }

    /// Start a session for `user_id`, invalidating any earlier one.
    pub async fn create_session(&self, user_id: i64, token: &str) -> Result<Session, AppError> {
        self.create_session_at(user_id, token, Self::now()).await
    }

    pub async fn create_session_at(&self, user_id: i64, token: &str, now: i64) -> Result<Session, AppError> {
        let session = self.repo.replace_user_session(user_id, token, now).await?;
        info!(user_id = user_id, session_id = session.id, "Session created");
        Ok(session)
    }

    /// True only for a stored token younger than the timeout. Expired rows
    /// are left for the sweep.
    pub async fn validate_session(&self, token: &str) -> Result<bool, AppError> {
        self.validate_session_at(token, Self::now()).await
    }

    pub async fn validate_session_at(&self, token: &str, now: i64) -> Result<bool, AppError> {
        Ok(self.active_session_at(token, now).await?.is_some())
    }

    /// Resolve a token to its user, failing with `Unauthorized` when the
    /// token is unknown or expired.
    pub async fn authenticate(&self, token: &str) -> Result<i64, AppError> {
        self.authenticate_at(token, Self::now()).await
    }

    pub async fn authenticate_at(&self, token: &str, now: i64) -> Result<i64, AppError> {
        if !self.validate_session_at(token, now).await? {
            return Err(AppError::Unauthorized);
        }
        // The row may have been replaced by a concurrent login in between.
        self.get_user_id_for_token(token).await?.ok_or(AppError::Unauthorized)
    }

    /// User owning the token, expired or not.
    pub async fn get_user_id_for_token(&self, token: &str) -> Result<Option<i64>, AppError> {
        Ok(self.repo.get_session_by_token(token).await?.map(|s| s.user_id))
    }

    /// Idempotent: unknown tokens are ignored.
    pub async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        let removed = self.repo.delete_session(token).await?;
        debug!(removed = removed, "Session deleted");
        Ok(())
    }

    pub async fn delete_sessions_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        self.repo.delete_sessions_for_user(user_id).await
    }

    /// Delete every session created more than `timeout_secs` ago.
    pub async fn remove_expired_sessions(&self) -> Result<u64, AppError> {
        self.remove_expired_sessions_at(Self::now()).await
    }

    pub async fn remove_expired_sessions_at(&self, now: i64) -> Result<u64, AppError> {
        let removed = self.repo.delete_sessions_created_before(now - self.timeout_secs).await?;
        if removed > 0 {
            info!(removed = removed, "Expired sessions removed");
        }
        Ok(removed)
    }

    async fn active_session_at(&self, token: &str, now: i64) -> Result<Option<Session>, AppError> {
        let session = self.repo.get_session_by_token(token).await?;
        Ok(session.filter(|s| s.is_fresh(now, self.timeout_secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::sqlite_repository::SqliteRepository;
    use crate::database::user::UserRepository;
    use crate::test_utils::{count_sessions, test_repository};

    const TIMEOUT: i64 = 3600;
    const T0: i64 = 1_700_000_000;

    async fn setup() -> (SqliteRepository, i64) {
        let repo = test_repository().await;
        let user = repo.create_user("reader", "pw").await.unwrap();
        (repo, user.id)
    }

    #[tokio::test]
    async fn new_session_invalidates_previous_token() {
        let (repo, user_id) = setup().await;
        let sessions = SessionManager::new(&repo, TIMEOUT);

        sessions.create_session_at(user_id, "t1", T0).await.unwrap();
        sessions.create_session_at(user_id, "t2", T0 + 10).await.unwrap();

        assert!(!sessions.validate_session_at("t1", T0 + 20).await.unwrap());
        assert!(sessions.validate_session_at("t2", T0 + 20).await.unwrap());
    }

    #[tokio::test]
    async fn sessions_of_other_users_are_untouched() {
        let (repo, alice) = setup().await;
        let bob = repo.create_user("bob", "pw").await.unwrap().id;
        let sessions = SessionManager::new(&repo, TIMEOUT);

        sessions.create_session_at(alice, "alice-token", T0).await.unwrap();
        sessions.create_session_at(bob, "bob-token", T0).await.unwrap();

        assert!(sessions.validate_session_at("alice-token", T0 + 1).await.unwrap());
        assert!(sessions.validate_session_at("bob-token", T0 + 1).await.unwrap());
    }

    #[tokio::test]
    async fn expired_token_fails_before_any_sweep() {
        let (repo, user_id) = setup().await;
        let sessions = SessionManager::new(&repo, TIMEOUT);
        sessions.create_session_at(user_id, "tok", T0).await.unwrap();

        assert!(sessions.validate_session_at("tok", T0 + TIMEOUT - 1).await.unwrap());
        assert!(!sessions.validate_session_at("tok", T0 + TIMEOUT).await.unwrap());
        assert!(matches!(sessions.authenticate_at("tok", T0 + TIMEOUT).await, Err(AppError::Unauthorized)));

        // Still stored until swept.
        assert_eq!(count_sessions(&repo).await, 1);
        assert_eq!(sessions.get_user_id_for_token("tok").await.unwrap(), Some(user_id));
    }

    #[tokio::test]
    async fn sweep_removes_expired_rows_and_is_idempotent() {
        let (repo, alice) = setup().await;
        let bob = repo.create_user("bob", "pw").await.unwrap().id;
        let sessions = SessionManager::new(&repo, TIMEOUT);

        sessions.create_session_at(alice, "old", T0).await.unwrap();
        sessions.create_session_at(bob, "fresh", T0 + 3000).await.unwrap();

        let now = T0 + TIMEOUT + 1;
        assert_eq!(sessions.remove_expired_sessions_at(now).await.unwrap(), 1);
        assert_eq!(sessions.remove_expired_sessions_at(now).await.unwrap(), 0);

        assert_eq!(count_sessions(&repo).await, 1);
        assert!(sessions.validate_session_at("fresh", now).await.unwrap());
    }

    #[tokio::test]
    async fn authenticate_returns_owner() {
        let (repo, user_id) = setup().await;
        let sessions = SessionManager::new(&repo, TIMEOUT);
        sessions.create_session_at(user_id, "tok", T0).await.unwrap();

        assert_eq!(sessions.authenticate_at("tok", T0 + 5).await.unwrap(), user_id);
        assert!(matches!(sessions.authenticate_at("unknown", T0).await, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn delete_session_is_idempotent() {
        let (repo, user_id) = setup().await;
        let sessions = SessionManager::new(&repo, TIMEOUT);
        sessions.create_session_at(user_id, "tok", T0).await.unwrap();

        sessions.delete_session("tok").await.unwrap();
        sessions.delete_session("tok").await.unwrap();
        assert!(!sessions.validate_session_at("tok", T0).await.unwrap());
        assert_eq!(sessions.get_user_id_for_token("tok").await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let (repo, _) = setup().await;
        repo.pool.close().await;
        let sessions = SessionManager::new(&repo, TIMEOUT);

        assert!(matches!(sessions.validate_session("tok").await, Err(AppError::Db { .. })));
        assert!(matches!(sessions.remove_expired_sessions().await, Err(AppError::Db { .. })));
    }
}
