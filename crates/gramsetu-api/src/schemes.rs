use axum::{
    Extension, Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};

use crate::error::AppError;
use crate::middleware::RequestContext;
use crate::{AppState, flash, pages, render_page};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schemes", get(list_schemes))
        .route("/schemes/{id}", get(scheme_detail))
}

pub async fn list_schemes(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let db = state.clone();
    let schemes = tokio::task::spawn_blocking(move || db.db.list_schemes()).await??;

    let body = pages::schemes_body(&schemes);
    Ok(render_page(&state, &ctx, "Government Schemes", body).await)
}

pub async fn scheme_detail(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let db = state.clone();
    let scheme = tokio::task::spawn_blocking(move || db.db.get_scheme(id)).await??;

    let Some(scheme) = scheme else {
        flash(&state, &ctx, "Scheme not found!").await;
        return Ok(Redirect::to("/schemes").into_response());
    };

    let body = pages::scheme_detail_body(&scheme);
    Ok(render_page(&state, &ctx, "Scheme Details", body).await)
}
