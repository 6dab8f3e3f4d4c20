use crate::config::SessionConfig;
use crate::database::sqlite_repository::SqliteRepository;
use crate::service::session::SessionManager;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::request::Request;
use rocket::{Data, Response};
use sqlx::SqlitePool;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Request ID that is attached to every request for tracking
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// Fairing that adds request ID to all requests and logs request/response information
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let request_id = RequestId::new();

        request.local_cache(|| Some(request_id.clone()));

        info!(
            request_id = %request_id.0,
            method = %request.method(),
            uri = %request.uri(),
            "incoming request"
        );
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let request_id = request
            .local_cache(|| None::<RequestId>)
            .as_ref()
            .map(|r| r.0.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let status = response.status();
        let method = request.method();
        let uri = request.uri();

        response.set_header(Header::new("X-Request-Id", request_id.clone()));
        response.set_header(Header::new("X-Content-Type-Options", "nosniff"));
        response.set_header(Header::new("X-Frame-Options", "DENY"));
        response.set_header(Header::new("Cache-Control", "no-store"));

        if status.class().is_server_error() || status.class().is_client_error() {
            warn!(
                request_id = %request_id,
                method = %method,
                uri = %uri,
                status = %status.code,
                "request completed with error"
            );
        } else {
            info!(
                request_id = %request_id,
                method = %method,
                uri = %uri,
                status = %status.code,
                "request completed"
            );
        }
    }
}

/// Deletes expired sessions before every request is routed. There is no
/// background timer; expiry is swept lazily on traffic.
pub struct SessionSweeper;

#[rocket::async_trait]
impl Fairing for SessionSweeper {
    fn info(&self) -> Info {
        Info {
            name: "Expired Session Sweeper",
            kind: Kind::Request,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let rocket = request.rocket();
        let (Some(pool), Some(session_config)) = (rocket.state::<SqlitePool>(), rocket.state::<SessionConfig>()) else {
            return;
        };

        let repo = SqliteRepository::new(pool.clone());
        // A fairing cannot fail the request; a broken store surfaces again in the handler.
        if let Err(err) = SessionManager::new(&repo, session_config.timeout_secs).remove_expired_sessions().await {
            error!(error = ?err, uri = %request.uri(), "Failed to remove expired sessions");
        }
    }
}
