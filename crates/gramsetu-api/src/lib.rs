pub mod auth;
pub mod error;
pub mod issues;
pub mod jobs;
pub mod marketplace;
pub mod middleware;
pub mod pages;
pub mod profile;
pub mod schemes;
pub mod uploads;

use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::{DefaultBodyLimit, State},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::warn;

use gramsetu_db::Database;

use crate::middleware::RequestContext;
use crate::uploads::UploadStore;

/// Maximum request body size; uploads ride inside multipart forms.
pub const MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

pub struct AppStateInner {
    pub db: Database,
    pub uploads: UploadStore,
}

pub type AppState = Arc<AppStateInner>;

/// Assemble the portal router: public pages, session-gated pages behind
/// `require_login`, and the session-context middleware wrapping everything.
pub fn app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(index))
        .merge(jobs::public_router())
        .merge(schemes::router())
        .merge(issues::public_router())
        .merge(marketplace::public_router())
        .merge(auth::router());

    let protected = Router::new()
        .merge(jobs::protected_router())
        .merge(issues::protected_router())
        .merge(marketplace::protected_router())
        .merge(profile::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_login,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session_context,
        ))
        .layer(DefaultBodyLimit::max(MAX_CONTENT_LENGTH))
        .with_state(state)
}

/// Queue a one-time notice on the current session. Failures are logged,
/// never surfaced: a lost notice must not fail the request.
pub async fn flash(state: &AppState, ctx: &RequestContext, message: &str) {
    let Some(token) = ctx.session.clone() else {
        return;
    };
    let db = state.clone();
    let msg = message.to_string();
    match tokio::task::spawn_blocking(move || db.db.push_flash(&token, &msg)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("flash store failed: {:#}", e),
        Err(e) => warn!("flash join error: {}", e),
    }
}

/// Drain pending notices for rendering. Fails closed to "no notices".
pub async fn take_notices(state: &AppState, ctx: &RequestContext) -> Vec<String> {
    let Some(token) = ctx.session.clone() else {
        return Vec::new();
    };
    let db = state.clone();
    match tokio::task::spawn_blocking(move || db.db.take_flashes(&token)).await {
        Ok(Ok(notices)) => notices,
        Ok(Err(e)) => {
            warn!("notice drain failed: {:#}", e);
            Vec::new()
        }
        Err(e) => {
            warn!("notice drain join error: {}", e);
            Vec::new()
        }
    }
}

/// Render a page with the session's pending notices drained into it.
pub async fn render_page(
    state: &AppState,
    ctx: &RequestContext,
    title: &str,
    body: String,
) -> Response {
    let notices = take_notices(state, ctx).await;
    pages::render(ctx, &notices, title, &body).into_response()
}

async fn index(State(state): State<AppState>, Extension(ctx): Extension<RequestContext>) -> Response {
    render_page(&state, &ctx, "GramSetu", pages::landing_body()).await
}
