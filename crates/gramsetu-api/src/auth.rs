use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Extension, Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use gramsetu_db::models::NewUser;
use gramsetu_types::forms::{LanguageQuery, LoginForm, RegisterForm};

use crate::error::AppError;
use crate::middleware::{self, RequestContext};
use crate::{AppState, flash, pages, render_page};

/// One message for both unknown-username and wrong-password, so a login
/// attempt cannot probe which usernames exist.
const INVALID_CREDENTIALS: &str = "Invalid username or password!";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register_submit))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
        .route("/language/{code}", get(set_language))
}

pub async fn register_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    if ctx.user.is_some() {
        return Redirect::to("/").into_response();
    }
    render_page(&state, &ctx, "Register", pages::register_body()).await
}

pub async fn register_submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if ctx.user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let mut validation_errors = Vec::new();
    if form.username.len() < 3 {
        validation_errors.push("Username must be at least 3 characters long.");
    }
    if form.password.len() < 6 {
        validation_errors.push("Password must be at least 6 characters long.");
    }
    if form.contact.is_empty() {
        validation_errors.push("Contact information is required.");
    }
    if !validation_errors.is_empty() {
        for message in validation_errors {
            flash(&state, &ctx, message).await;
        }
        return Ok(render_page(&state, &ctx, "Register", pages::register_body()).await);
    }

    let db = state.clone();
    let username = form.username.clone();
    let existing = tokio::task::spawn_blocking(move || db.db.get_user_by_username(&username))
        .await??;
    if existing.is_some() {
        flash(&state, &ctx, "Username already exists! Please choose another one.").await;
        return Ok(render_page(&state, &ctx, "Register", pages::register_body()).await);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(form.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hash failure: {}", e))?
        .to_string();

    let db = state.clone();
    let created = tokio::task::spawn_blocking(move || {
        db.db.create_user(&NewUser {
            username: &form.username,
            password_hash: &password_hash,
            fullname: &form.fullname,
            village: &form.village,
            contact: &form.contact,
        })
    })
    .await?;

    let user_id = match created {
        Ok(id) => id,
        Err(e) => {
            // Lost a race on the unique username, or the store failed.
            warn!("registration insert failed: {:#}", e);
            flash(&state, &ctx, "An error occurred during registration. Please try again.").await;
            return Ok(render_page(&state, &ctx, "Register", pages::register_body()).await);
        }
    };

    // Auto-login: fresh session carrying the new identity.
    let token = rotate_session(&state, &ctx, Some(user_id)).await?;
    flash_token(&state, &token, "Registration successful! Welcome to GramSetu.").await;

    Ok((jar.add(middleware::session_cookie(token)), Redirect::to("/")).into_response())
}

pub async fn login_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    if ctx.user.is_some() {
        return Redirect::to("/").into_response();
    }
    render_page(&state, &ctx, "Login", pages::login_body()).await
}

pub async fn login_submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if ctx.user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    if form.username.is_empty() || form.password.is_empty() {
        flash(&state, &ctx, "Username and password are required!").await;
        return Ok(render_page(&state, &ctx, "Login", pages::login_body()).await);
    }

    let db = state.clone();
    let username = form.username.clone();
    let user = tokio::task::spawn_blocking(move || db.db.get_user_by_username(&username))
        .await??;

    let Some(user) = user else {
        flash(&state, &ctx, INVALID_CREDENTIALS).await;
        return Ok(render_page(&state, &ctx, "Login", pages::login_body()).await);
    };

    let verified = PasswordHash::new(&user.password)
        .map(|parsed| {
            Argon2::default()
                .verify_password(form.password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or_else(|e| {
            warn!("stored password hash for {} is unparseable: {}", user.username, e);
            false
        });

    if !verified {
        flash(&state, &ctx, INVALID_CREDENTIALS).await;
        return Ok(render_page(&state, &ctx, "Login", pages::login_body()).await);
    }

    let token = rotate_session(&state, &ctx, Some(user.id)).await?;
    let welcome = format!("Login successful! Welcome back, {}!", user.username);
    flash_token(&state, &token, &welcome).await;

    Ok((jar.add(middleware::session_cookie(token)), Redirect::to("/")).into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    // Rotating to a fresh anonymous session clears every session key.
    let token = rotate_session(&state, &ctx, None).await?;
    flash_token(&state, &token, "You have been logged out.").await;

    Ok((jar.add(middleware::session_cookie(token)), Redirect::to("/")).into_response())
}

/// Store the locale preference on the session and bounce to the
/// caller-supplied target.
pub async fn set_language(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(code): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Response {
    if let Some(token) = ctx.session.clone() {
        let db = state.clone();
        match tokio::task::spawn_blocking(move || db.db.set_session_language(&token, &code)).await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("language update failed: {:#}", e),
            Err(e) => warn!("language update join error: {}", e),
        }
    }
    let next = query.next.unwrap_or_else(|| "/".to_string());
    Redirect::to(&next).into_response()
}

/// Replace the current session row with a fresh one (new token, given
/// identity, language carried over). Deleting the old row invalidates any
/// other holder of the old cookie.
async fn rotate_session(
    state: &AppState,
    ctx: &RequestContext,
    user_id: Option<i64>,
) -> Result<String, AppError> {
    let token = middleware::new_session_token();
    let db = state.clone();
    let stored = token.clone();
    let old = ctx.session.clone();
    let language = ctx.language.clone();
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        if let Some(old) = old {
            db.db.delete_session(&old)?;
        }
        db.db.create_session(&stored, user_id, &language)
    })
    .await??;
    Ok(token)
}

/// Flash directly against a token — used right after rotation, when the
/// request context still points at the discarded session.
async fn flash_token(state: &AppState, token: &str, message: &str) {
    let db = state.clone();
    let token = token.to_string();
    let msg = message.to_string();
    match tokio::task::spawn_blocking(move || db.db.push_flash(&token, &msg)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("flash store failed: {:#}", e),
        Err(e) => warn!("flash join error: {}", e),
    }
}
