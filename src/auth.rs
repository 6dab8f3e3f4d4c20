use crate::config::SessionConfig;
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::service::session::SessionManager;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use serde::Serialize;
use sqlx::SqlitePool;

/// The `Authorization` header carries the raw session token. A `Bearer `
/// prefix is tolerated.
pub(crate) fn parse_authorization(value: &str) -> Option<&str> {
    let value = value.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value,
    };
    if token.is_empty() { None } else { Some(token) }
}

fn header_token<'r>(req: &'r Request<'_>) -> Option<&'r str> {
    req.headers().get_one("Authorization").and_then(parse_authorization)
}

/// Token from the `Authorization` header, if any. Never fails; handlers
/// decide what a missing token means.
#[derive(Debug, Clone)]
pub struct SessionToken(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionToken {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, ()> {
        Outcome::Success(SessionToken(header_token(req).map(str::to_string)))
    }
}

/// Guard for protected routes: a present, stored and unexpired token.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(token) = header_token(req) else {
            return Outcome::Error((Status::Unauthorized, AppError::MissingToken));
        };

        let (Some(pool), Some(session_config)) = (req.rocket().state::<SqlitePool>(), req.rocket().state::<SessionConfig>()) else {
            return Outcome::Error((Status::InternalServerError, AppError::MissingState));
        };

        let repo = SqliteRepository::new(pool.clone());
        match SessionManager::new(&repo, session_config.timeout_secs).authenticate(token).await {
            Ok(user_id) => {
                let current_user = CurrentUser { id: user_id };
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            Err(AppError::Unauthorized) => Outcome::Error((Status::Unauthorized, AppError::Unauthorized)),
            Err(err) => {
                tracing::error!(error = ?err, "Session lookup failed");
                Outcome::Error((Status::InternalServerError, err))
            }
        }
    }
}
