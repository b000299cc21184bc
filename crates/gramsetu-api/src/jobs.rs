use axum::{
    Extension, Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::NaiveDateTime;

use gramsetu_db::DATE_FORMAT;
use gramsetu_db::models::{ApplicationRow, JobRow, NewApplication, NewJob};
use gramsetu_types::forms::{ApplicationForm, JobListQuery, NewJobForm};

use crate::error::AppError;
use crate::middleware::RequestContext;
use crate::{AppState, flash, pages, render_page};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/{id}", get(job_detail))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/jobs/new", get(new_job_page).post(new_job_submit))
        .route("/jobs/{id}/apply", get(apply_page).post(apply_submit))
        .route("/my-applications", get(my_applications))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<JobListQuery>,
) -> Result<Response, AppError> {
    let category = query.category.filter(|c| !c.is_empty());

    let db = state.clone();
    let filter = category.clone();
    let jobs =
        tokio::task::spawn_blocking(move || db.db.list_jobs(filter.as_deref())).await??;

    let body = pages::jobs_body(&jobs, category.as_deref());
    Ok(render_page(&state, &ctx, "Job Board", body).await)
}

pub async fn job_detail(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let db = state.clone();
    let job = tokio::task::spawn_blocking(move || db.db.get_job(id)).await??;

    let Some(job) = job else {
        flash(&state, &ctx, "Job not found!").await;
        return Ok(Redirect::to("/jobs").into_response());
    };

    // Malformed stored data must never abort rendering.
    let posted = NaiveDateTime::parse_from_str(&job.posted_date, DATE_FORMAT)
        .unwrap_or_else(|_| chrono::Local::now().naive_local());

    let body = pages::job_detail_body(&job, posted);
    Ok(render_page(&state, &ctx, "Job Details", body).await)
}

pub async fn new_job_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    render_page(&state, &ctx, "Post a Job", pages::new_job_body()).await
}

pub async fn new_job_submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Form(form): Form<NewJobForm>,
) -> Result<Response, AppError> {
    let Some(user) = ctx.user.clone() else {
        return Ok(Redirect::to("/login").into_response());
    };

    if form.title.is_empty() || form.description.is_empty() || form.contact.is_empty() {
        flash(&state, &ctx, "Title, description and contact information are required!").await;
        return Ok(render_page(&state, &ctx, "Post a Job", pages::new_job_body()).await);
    }

    let db = state.clone();
    tokio::task::spawn_blocking(move || {
        db.db.insert_job(&NewJob {
            title: &form.title,
            description: &form.description,
            location: &form.location,
            contact: &form.contact,
            category: &form.category,
            eligibility: &form.eligibility,
            salary: &form.salary,
            deadline: &form.deadline,
            user_id: user.id,
        })
    })
    .await??;

    flash(&state, &ctx, "Job posted successfully!").await;
    Ok(Redirect::to("/jobs").into_response())
}

pub async fn apply_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(user) = ctx.user.clone() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let db = state.clone();
    let (job, existing) = tokio::task::spawn_blocking(
        move || -> anyhow::Result<(Option<JobRow>, Option<ApplicationRow>)> {
            let job = db.db.get_job(id)?;
            let existing = db.db.get_application(user.id, id)?;
            Ok((job, existing))
        },
    )
    .await??;

    let Some(job) = job else {
        flash(&state, &ctx, "Job not found!").await;
        return Ok(Redirect::to("/jobs").into_response());
    };

    let prefill = ctx.user.as_ref().map(|u| u.fullname.as_str()).unwrap_or("");
    let body = pages::apply_body(&job, existing.is_some(), prefill);
    Ok(render_page(&state, &ctx, "Apply", body).await)
}

pub async fn apply_submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i64>,
    Form(form): Form<ApplicationForm>,
) -> Result<Response, AppError> {
    let Some(user) = ctx.user.clone() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let db = state.clone();
    let (job, existing) = tokio::task::spawn_blocking(
        move || -> anyhow::Result<(Option<JobRow>, Option<ApplicationRow>)> {
            let job = db.db.get_job(id)?;
            let existing = db.db.get_application(user.id, id)?;
            Ok((job, existing))
        },
    )
    .await??;

    let Some(job) = job else {
        flash(&state, &ctx, "Job not found!").await;
        return Ok(Redirect::to("/jobs").into_response());
    };

    if form.name.is_empty() || form.phone.is_empty() {
        flash(&state, &ctx, "Name and phone number are required!").await;
        let prefill = ctx.user.as_ref().map(|u| u.fullname.as_str()).unwrap_or("");
        let body = pages::apply_body(&job, existing.is_some(), prefill);
        return Ok(render_page(&state, &ctx, "Apply", body).await);
    }

    // The UNIQUE(job_id, user_id) constraint makes this atomic: the
    // existing-row check above only picks the notice wording.
    let user_id = ctx.user.as_ref().map(|u| u.id).unwrap_or_default();
    let db = state.clone();
    tokio::task::spawn_blocking(move || {
        db.db.upsert_application(&NewApplication {
            job_id: id,
            user_id,
            name: &form.name,
            phone: &form.phone,
            experience: &form.experience,
            message: &form.message,
        })
    })
    .await??;

    let notice = if existing.is_some() {
        "Your application has been updated!"
    } else {
        "Your application has been submitted!"
    };
    flash(&state, &ctx, notice).await;
    Ok(Redirect::to(&format!("/jobs/{}", id)).into_response())
}

pub async fn my_applications(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let Some(user) = ctx.user.clone() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let db = state.clone();
    let applications =
        tokio::task::spawn_blocking(move || db.db.list_applications_with_jobs(user.id)).await??;

    let body = pages::my_applications_body(&applications);
    Ok(render_page(&state, &ctx, "My Applications", body).await)
}
