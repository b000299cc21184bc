use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

/// Internal failures a handler cannot recover from (join errors, store
/// errors on critical paths). Handlers own their user-facing fallbacks —
/// notices and redirects — so this only catches plumbing.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("handler failure: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong. Please try again.",
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
