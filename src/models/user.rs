use rocket::serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Serialize, Debug)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Validate)]
pub struct UserRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Both fields are optional so that a missing one is answered with 400 by
/// the handler instead of a body parse failure.
#[derive(Deserialize, Debug, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the credentials when both are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((username, password))
    }
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Deserialize, Debug, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 1))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_fields() {
        let request = LoginRequest {
            username: Some("testuser".to_string()),
            password: Some("testpassword".to_string()),
        };
        assert_eq!(request.credentials(), Some(("testuser", "testpassword")));

        let missing_password = LoginRequest {
            username: Some("testuser".to_string()),
            password: None,
        };
        assert!(missing_password.credentials().is_none());

        let empty_username = LoginRequest {
            username: Some(String::new()),
            password: Some("testpassword".to_string()),
        };
        assert!(empty_username.credentials().is_none());
    }
}
