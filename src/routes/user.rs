use crate::auth::{CurrentUser, SessionToken};
use crate::config::SessionConfig;
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::message::MessageResponse;
use crate::models::user::{ChangePasswordRequest, LoginRequest, LoginResponse, UserRequest, UserResponse};
use crate::service::auth::AuthService;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, routes};
use sqlx::SqlitePool;
use validator::Validate;

#[rocket::post("/login", data = "<payload>")]
pub async fn post_login(pool: &State<SqlitePool>, session_config: &State<SessionConfig>, payload: JsonBody<LoginRequest>) -> Result<Json<LoginResponse>, AppError> {
    let (username, password) = payload
        .credentials()
        .ok_or_else(|| AppError::BadRequest("Username and password are required".to_string()))?;

    let repo = SqliteRepository::new(pool.inner().clone());
    let token = AuthService::new(&repo, session_config).login(username, password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

#[rocket::post("/logout")]
pub async fn post_logout(pool: &State<SqlitePool>, session_config: &State<SessionConfig>, token: SessionToken) -> Result<Json<MessageResponse>, AppError> {
    let token = token.0.ok_or(AppError::MissingToken)?;

    let repo = SqliteRepository::new(pool.inner().clone());
    AuthService::new(&repo, session_config).logout(&token).await?;

    Ok(Json(MessageResponse::new("Logout successful")))
}

#[rocket::post("/users", data = "<payload>")]
pub async fn post_user(pool: &State<SqlitePool>, session_config: &State<SessionConfig>, payload: JsonBody<UserRequest>) -> Result<(Status, Json<UserResponse>), AppError> {
    payload.validate()?;

    let repo = SqliteRepository::new(pool.inner().clone());
    let user = AuthService::new(&repo, session_config).register(&payload.username, &payload.password).await?;

    Ok((Status::Created, Json(UserResponse::from(&user))))
}

#[rocket::put("/users/password", data = "<payload>")]
pub async fn put_password(
    pool: &State<SqlitePool>,
    session_config: &State<SessionConfig>,
    current_user: CurrentUser,
    payload: JsonBody<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    let repo = SqliteRepository::new(pool.inner().clone());
    AuthService::new(&repo, session_config)
        .change_password(current_user.id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password changed, please log in again")))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![post_login, post_logout, post_user, put_password]
}
