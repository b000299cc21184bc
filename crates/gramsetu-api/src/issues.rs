use axum::{
    Extension, Router,
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tracing::warn;

use gramsetu_db::models::NewIssue;

use crate::error::AppError;
use crate::middleware::RequestContext;
use crate::uploads::{self, INVALID_TYPE_NOTICE, UploadError, UploadPurpose};
use crate::{AppState, flash, pages, render_page};

pub fn public_router() -> Router<AppState> {
    Router::new().route("/issues", get(list_issues))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/issues/report", get(report_page).post(report_submit))
}

pub async fn list_issues(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let db = state.clone();
    let issues = tokio::task::spawn_blocking(move || db.db.list_issues()).await??;

    let body = pages::issues_body(&issues);
    Ok(render_page(&state, &ctx, "Infrastructure Issues", body).await)
}

pub async fn report_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    render_page(&state, &ctx, "Report an Issue", pages::report_issue_body()).await
}

pub async fn report_submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(user) = ctx.user.clone() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let form = uploads::read_form(multipart).await?;
    let title = form.field("title").to_string();
    let description = form.field("description").to_string();
    let location = form.field("location").to_string();
    let category = form.field("category").to_string();

    if title.is_empty() || description.is_empty() || location.is_empty() {
        flash(&state, &ctx, "Title, description and location are required!").await;
        return Ok(render_page(&state, &ctx, "Report an Issue", pages::report_issue_body()).await);
    }

    let mut image = None;
    if let Some(file) = form.file("image") {
        match state
            .uploads
            .store(&user.username, UploadPurpose::Issue, &file.filename, &file.bytes)
            .await
        {
            Ok(stored) => image = Some(stored),
            Err(UploadError::InvalidExtension(_)) => {
                flash(&state, &ctx, INVALID_TYPE_NOTICE).await;
                return Ok(
                    render_page(&state, &ctx, "Report an Issue", pages::report_issue_body()).await,
                );
            }
            Err(e) => {
                // The report still goes through, just without the photo.
                warn!("issue image upload failed: {}", e);
                flash(&state, &ctx, "Error uploading image. Please try again later.").await;
            }
        }
    }

    let db = state.clone();
    tokio::task::spawn_blocking(move || {
        db.db.insert_issue(&NewIssue {
            title: &title,
            description: &description,
            location: &location,
            category: &category,
            image: image.as_deref(),
            user_id: user.id,
        })
    })
    .await??;

    flash(&state, &ctx, "Issue reported successfully!").await;
    Ok(Redirect::to("/issues").into_response())
}
