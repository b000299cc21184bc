use axum::{
    Extension,
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::RngCore;
use tracing::warn;

use gramsetu_db::models::{SessionRow, UserRow};

use crate::AppState;

pub const SESSION_COOKIE: &str = "gramsetu_session";

/// The authenticated identity a session resolves to, looked up fresh on
/// every request so profile edits are visible immediately.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub fullname: String,
    pub profile_image: Option<String>,
}

impl CurrentUser {
    fn from_row(row: UserRow) -> Self {
        let fullname = match &row.fullname {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => row.username.clone(),
        };
        Self {
            id: row.id,
            username: row.username,
            fullname,
            profile_image: row.profile_image,
        }
    }
}

/// Per-request context carrying identity and locale, injected by
/// `session_context` and read by handlers via `Extension`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Session token backing this request; `None` only when the store
    /// refused both lookup and creation.
    pub session: Option<String>,
    pub user: Option<CurrentUser>,
    pub language: String,
}

impl RequestContext {
    fn anonymous() -> Self {
        Self {
            session: None,
            user: None,
            language: "en".to_string(),
        }
    }
}

pub fn new_session_token() -> String {
    let mut buf = [0u8; 32];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Resolve the session cookie to a server-side session row, loading the
/// user row when one is attached. Requests without a usable session get a
/// fresh anonymous one, with the cookie set on the way out.
pub async fn session_context(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let presented = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

    let db = state.clone();
    type Loaded = Option<(SessionRow, Option<UserRow>)>;
    let loaded = tokio::task::spawn_blocking(move || -> anyhow::Result<Loaded> {
        if let Some(token) = presented {
            if let Some(session) = db.db.get_session(&token)? {
                let user = match session.user_id {
                    Some(id) => db.db.get_user_by_id(id)?,
                    None => None,
                };
                return Ok(Some((session, user)));
            }
        }
        Ok(None)
    })
    .await;

    let (ctx, minted) = match loaded {
        Ok(Ok(Some((session, user)))) => (
            RequestContext {
                session: Some(session.token),
                user: user.map(CurrentUser::from_row),
                language: session.language,
            },
            None,
        ),
        Ok(Ok(None)) => mint_session(&state).await,
        Ok(Err(e)) => {
            warn!("session lookup failed: {:#}", e);
            (RequestContext::anonymous(), None)
        }
        Err(e) => {
            warn!("session lookup join error: {}", e);
            (RequestContext::anonymous(), None)
        }
    };

    req.extensions_mut().insert(ctx);
    let response = next.run(req).await;

    match minted {
        // Don't clobber a cookie the handler rotated itself.
        Some(token) if !response.headers().contains_key(SET_COOKIE) => {
            (jar.add(session_cookie(token)), response).into_response()
        }
        _ => response,
    }
}

async fn mint_session(state: &AppState) -> (RequestContext, Option<String>) {
    let token = new_session_token();
    let db = state.clone();
    let stored = token.clone();
    match tokio::task::spawn_blocking(move || db.db.create_session(&stored, None, "en")).await {
        Ok(Ok(())) => (
            RequestContext {
                session: Some(token.clone()),
                user: None,
                language: "en".to_string(),
            },
            Some(token),
        ),
        Ok(Err(e)) => {
            warn!("session create failed: {:#}", e);
            (RequestContext::anonymous(), None)
        }
        Err(e) => {
            warn!("session create join error: {}", e);
            (RequestContext::anonymous(), None)
        }
    }
}

/// Gate for mutating routes: authenticated is binary, no roles.
pub async fn require_login(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    req: Request,
    next: Next,
) -> Response {
    if ctx.user.is_some() {
        return next.run(req).await;
    }
    crate::flash(&state, &ctx, "Please login to access this feature.").await;
    Redirect::to("/login").into_response()
}
