use axum::{
    Extension, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tracing::{error, warn};

use gramsetu_db::models::{ApplicationWithJob, IssueRow, JobRow, ProductRow, UserRow};

use crate::error::AppError;
use crate::middleware::RequestContext;
use crate::uploads::{self, INVALID_TYPE_NOTICE, UploadError, UploadPurpose};
use crate::{AppState, flash, pages, render_page};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/edit_profile", get(edit_profile_page).post(edit_profile_submit))
        .route("/settings", get(settings))
        .route("/direct-upload", get(direct_upload_page).post(direct_upload_submit))
}

/// Everything the session user owns, newest first. The user row is the only
/// fetch that can fail the view; each sub-list fails closed to empty.
pub async fn profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let Some(user) = ctx.user.clone() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let db = state.clone();
    let uid = user.id;
    type Owned = (
        Option<UserRow>,
        Vec<JobRow>,
        Vec<IssueRow>,
        Vec<ProductRow>,
        Vec<ApplicationWithJob>,
    );
    let (user_row, jobs, issues, products, applications) =
        tokio::task::spawn_blocking(move || -> anyhow::Result<Owned> {
            let user_row = db.db.get_user_by_id(uid)?;
            let jobs = db.db.list_jobs_by_user(uid).unwrap_or_else(|e| {
                warn!("profile jobs fetch failed: {:#}", e);
                Vec::new()
            });
            let issues = db.db.list_issues_by_user(uid).unwrap_or_else(|e| {
                warn!("profile issues fetch failed: {:#}", e);
                Vec::new()
            });
            let products = db.db.list_products_by_user(uid).unwrap_or_else(|e| {
                warn!("profile products fetch failed: {:#}", e);
                Vec::new()
            });
            let applications = db.db.list_applications_with_jobs(uid).unwrap_or_else(|e| {
                warn!("profile applications fetch failed: {:#}", e);
                Vec::new()
            });
            Ok((user_row, jobs, issues, products, applications))
        })
        .await??;

    let Some(user_row) = user_row else {
        flash(&state, &ctx, "User not found!").await;
        return Ok(Redirect::to("/").into_response());
    };

    let body = pages::profile_body(&user_row, &jobs, &issues, &products, &applications);
    Ok(render_page(&state, &ctx, "Profile", body).await)
}

pub async fn edit_profile_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let Some(user_row) = load_user(&state, &ctx).await? else {
        flash(&state, &ctx, "User not found!").await;
        return Ok(Redirect::to("/").into_response());
    };

    let body = pages::edit_profile_body(&user_row);
    Ok(render_page(&state, &ctx, "Edit Profile", body).await)
}

pub async fn edit_profile_submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(user_row) = load_user(&state, &ctx).await? else {
        flash(&state, &ctx, "User not found!").await;
        return Ok(Redirect::to("/").into_response());
    };

    let form = uploads::read_form(multipart).await?;
    let fullname = form.field("fullname").to_string();
    let village = form.field("village").to_string();
    let contact = form.field("contact").to_string();

    if contact.is_empty() {
        flash(&state, &ctx, "Contact information is required!").await;
        let body = pages::edit_profile_body(&user_row);
        return Ok(render_page(&state, &ctx, "Edit Profile", body).await);
    }

    // Each image keeps its prior reference unless a new upload lands.
    let mut profile_image = user_row.profile_image.clone();
    if let Some(file) = form.file("profile_image") {
        match state
            .uploads
            .store(&user_row.username, UploadPurpose::Profile, &file.filename, &file.bytes)
            .await
        {
            Ok(stored) => profile_image = Some(stored),
            Err(UploadError::InvalidExtension(_)) => {
                flash(&state, &ctx, INVALID_TYPE_NOTICE).await;
                let body = pages::edit_profile_body(&user_row);
                return Ok(render_page(&state, &ctx, "Edit Profile", body).await);
            }
            Err(e) => {
                warn!("profile image upload failed: {}", e);
                flash(&state, &ctx, "Error uploading profile image. Please try again later.").await;
            }
        }
    }

    let mut banner_image = user_row.banner_image.clone();
    if let Some(file) = form.file("banner_image") {
        match state
            .uploads
            .store(&user_row.username, UploadPurpose::Banner, &file.filename, &file.bytes)
            .await
        {
            Ok(stored) => banner_image = Some(stored),
            Err(UploadError::InvalidExtension(_)) => {
                flash(&state, &ctx, INVALID_TYPE_NOTICE).await;
                let body = pages::edit_profile_body(&user_row);
                return Ok(render_page(&state, &ctx, "Edit Profile", body).await);
            }
            Err(e) => {
                warn!("banner image upload failed: {}", e);
                flash(&state, &ctx, "Error uploading banner image. Please try again later.").await;
            }
        }
    }

    let db = state.clone();
    let uid = user_row.id;
    let updated = tokio::task::spawn_blocking(move || {
        db.db.update_profile(
            uid,
            &fullname,
            &village,
            &contact,
            profile_image.as_deref(),
            banner_image.as_deref(),
        )
    })
    .await?;

    match updated {
        Ok(()) => flash(&state, &ctx, "Profile updated successfully!").await,
        Err(e) => {
            error!("profile update failed: {:#}", e);
            flash(&state, &ctx, "Error updating profile. Please try again.").await;
        }
    }

    Ok(Redirect::to("/profile").into_response())
}

pub async fn settings(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let Some(user_row) = load_user(&state, &ctx).await? else {
        flash(&state, &ctx, "User not found!").await;
        return Ok(Redirect::to("/").into_response());
    };

    let body = pages::settings_body(&user_row);
    Ok(render_page(&state, &ctx, "Settings", body).await)
}

pub async fn direct_upload_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    render_page(&state, &ctx, "Direct Upload", pages::direct_upload_body()).await
}

/// Plain-form fallback for profile pictures. Answers with bare text and
/// explicit status codes rather than the usual notice-and-redirect flow.
pub async fn direct_upload_submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(user) = ctx.user.clone() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let form = uploads::read_form(multipart).await?;
    let Some(file) = form.file("file") else {
        return Ok((StatusCode::BAD_REQUEST, "No file selected").into_response());
    };

    let stored = match state
        .uploads
        .store(&user.username, UploadPurpose::Direct, &file.filename, &file.bytes)
        .await
    {
        Ok(stored) => stored,
        Err(UploadError::InvalidExtension(_)) => {
            return Ok((StatusCode::BAD_REQUEST, INVALID_TYPE_NOTICE).into_response());
        }
        Err(e) => {
            error!("direct upload failed: {}", e);
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save the file, please try again",
            )
                .into_response());
        }
    };

    let db = state.clone();
    let filename = stored.clone();
    tokio::task::spawn_blocking(move || db.db.set_profile_image(user.id, &filename)).await??;

    Ok(format!("File uploaded successfully as {}", stored).into_response())
}

async fn load_user(state: &AppState, ctx: &RequestContext) -> Result<Option<UserRow>, AppError> {
    let Some(user) = ctx.user.clone() else {
        return Ok(None);
    };
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_user_by_id(user.id)).await??;
    Ok(row)
}
