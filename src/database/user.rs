use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::LazyLock;

/// A real Argon2 hash computed once, verified against when the username is
/// unknown so that both login failure paths cost the same.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("dummy-never-matches").ok());

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, AppError>;
    /// Insert the user unless the username is taken. Returns whether a row was added.
    async fn ensure_user(&self, username: &str, password: &str) -> Result<bool, AppError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn update_user_password(&self, id: i64, new_password: &str) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, AppError> {
        let password_hash = hash_password(password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES (?, ?)
            RETURNING id, username, password_hash
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from(e).with_conflict_message(format!("User {} already exists", username)))?;

        Ok(user)
    }

    async fn ensure_user(&self, username: &str, password: &str) -> Result<bool, AppError> {
        if self.get_user_by_username(username).await?.is_some() {
            return Ok(false);
        }

        let password_hash = hash_password(password)?;
        let result = sqlx::query("INSERT OR IGNORE INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(&password_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user_password(&self, id: i64, new_password: &str) -> Result<(), AppError> {
        let password_hash = hash_password(new_password)?;
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::password_hash("Failed to hash password", e))?;

    Ok(hash.to_string())
}

pub(crate) fn verify_password(user: &User, password: &str) -> Result<(), AppError> {
    let password_hash = PasswordHash::new(&user.password_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &password_hash)
        .map_err(|_| AppError::InvalidCredentials)
}

/// Throwaway verification used when the username does not exist.
pub(crate) fn dummy_verify(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref().and_then(|h| PasswordHash::new(h).ok()) {
        let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_repository;

    #[tokio::test]
    async fn passwords_are_stored_hashed() {
        let repo = test_repository().await;
        let user = repo.create_user("reader", "hunter2").await.unwrap();

        assert_ne!(user.password_hash, "hunter2");
        assert!(user.password_hash.starts_with("$argon2"));
        assert!(verify_password(&user, "hunter2").is_ok());
        assert!(matches!(verify_password(&user, "wrong"), Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let repo = test_repository().await;
        repo.create_user("reader", "one").await.unwrap();

        let err = repo.create_user("reader", "two").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref msg) if msg == "User reader already exists"));
    }

    #[tokio::test]
    async fn ensure_user_is_insert_or_ignore() {
        let repo = test_repository().await;
        assert!(repo.ensure_user("testuser", "testpassword").await.unwrap());
        assert!(!repo.ensure_user("testuser", "other").await.unwrap());

        let user = repo.get_user_by_username("testuser").await.unwrap().unwrap();
        assert!(verify_password(&user, "testpassword").is_ok());
    }

    #[tokio::test]
    async fn password_rotation() {
        let repo = test_repository().await;
        let user = repo.create_user("reader", "old").await.unwrap();

        repo.update_user_password(user.id, "new").await.unwrap();
        let user = repo.get_user_by_id(user.id).await.unwrap().unwrap();
        assert!(verify_password(&user, "new").is_ok());
        assert!(verify_password(&user, "old").is_err());

        assert!(matches!(repo.update_user_password(9999, "x").await, Err(AppError::NotFound(_))));
    }
}
