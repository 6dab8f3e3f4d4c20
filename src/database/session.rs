use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::session::Session;

#[async_trait::async_trait]
pub trait SessionRepository: Send + Sync {
    /// Atomically drop every session of `user_id` and insert a new one.
    async fn replace_user_session(&self, user_id: i64, token: &str, created_at: i64) -> Result<Session, AppError>;
    async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>, AppError>;
    async fn delete_session(&self, token: &str) -> Result<u64, AppError>;
    async fn delete_sessions_for_user(&self, user_id: i64) -> Result<u64, AppError>;
    /// Delete sessions with `created_at < cutoff`.
    async fn delete_sessions_created_before(&self, cutoff: i64) -> Result<u64, AppError>;
}

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn replace_user_session(&self, user_id: i64, token: &str, created_at: i64) -> Result<Session, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token, created_at)
            VALUES (?, ?, ?)
            RETURNING id, user_id, token, created_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from(e).with_conflict_message("Session token already in use"))?;

        tx.commit().await?;

        Ok(session)
    }

    async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, token, created_at
            FROM sessions
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn delete_session(&self, token: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?").bind(token).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    async fn delete_sessions_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?").bind(user_id).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    async fn delete_sessions_created_before(&self, cutoff: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE created_at < ?").bind(cutoff).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}
