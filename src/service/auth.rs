use crate::config::SessionConfig;
use crate::database::session::SessionRepository;
use crate::database::user::{UserRepository, dummy_verify, verify_password};
use crate::error::app_error::AppError;
use crate::models::user::User;
use crate::service::session::SessionManager;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// Credential checks and token issuance on top of the session manager.
pub struct AuthService<'a, R: UserRepository + SessionRepository> {
    pub repo: &'a R,
    pub config: &'a SessionConfig,
}

/// SHA-256 over the username and a fresh 128-bit random salt, hex encoded.
///
/// Uniqueness is probabilistic; the unique index on `sessions.token` is what
/// actually rejects a duplicate.
pub fn generate_token(username: &str) -> String {
    let salt: [u8; 16] = rand::random();

    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(hex::encode(salt).as_bytes());
    hex::encode(hasher.finalize())
}

impl<'a, R: UserRepository + SessionRepository> AuthService<'a, R> {
    pub fn new(repo: &'a R, config: &'a SessionConfig) -> Self {
        Self { repo, config }
    }

    pub fn sessions(&self) -> SessionManager<'a, R> {
        SessionManager::new(self.repo, self.config.timeout_secs)
    }

    /// The user id for a matching username/password pair. Unknown users and
    /// wrong passwords are indistinguishable to the caller.
    pub async fn authenticate_user(&self, username: &str, password: &str) -> Result<Option<i64>, AppError> {
        let Some(user) = self.repo.get_user_by_username(username).await? else {
            dummy_verify(password);
            return Ok(None);
        };

        match verify_password(&user, password) {
            Ok(()) => Ok(Some(user.id)),
            Err(AppError::InvalidCredentials) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Verify credentials and open a session, returning its token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        self.login_with(username, password, generate_token).await
    }

    pub(crate) async fn login_with<F>(&self, username: &str, password: &str, mut next_token: F) -> Result<String, AppError>
    where
        F: FnMut(&str) -> String + Send,
    {
        let user_id = self.authenticate_user(username, password).await?.ok_or(AppError::InvalidCredentials)?;
        let sessions = self.sessions();
        let attempts = self.config.token_attempts.max(1);

        for attempt in 1..=attempts {
            let token = next_token(username);
            match sessions.create_session(user_id, &token).await {
                Ok(_) => {
                    info!(user_id = user_id, "User logged in");
                    return Ok(token);
                }
                Err(e) if e.is_conflict() && attempt < attempts => {
                    warn!(user_id = user_id, attempt = attempt, "Session token collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Conflict("Could not allocate a unique session token".to_string()))
    }

    /// End the session behind `token`. Unknown or expired tokens are rejected.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let sessions = self.sessions();
        let user_id = sessions.authenticate(token).await?;
        sessions.delete_session(token).await?;
        info!(user_id = user_id, "User logged out");
        Ok(())
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self.repo.create_user(username, password).await?;
        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Rotate the password after checking the current one. Every session of
    /// the user ends, so the caller has to log in again.
    pub async fn change_password(&self, user_id: i64, current_password: &str, new_password: &str) -> Result<(), AppError> {
        let user = self
            .repo
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        verify_password(&user, current_password)?;

        self.repo.update_user_password(user_id, new_password).await?;
        let ended = self.sessions().delete_sessions_for_user(user_id).await?;
        info!(user_id = user_id, sessions_ended = ended, "Password changed");
        Ok(())
    }
}
