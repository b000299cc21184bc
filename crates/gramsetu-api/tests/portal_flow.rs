//! End-to-end flows through the assembled router: sessions, auth gating,
//! validation, upsert semantics, uploads.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use gramsetu_api::uploads::UploadStore;
use gramsetu_api::{AppState, AppStateInner, app};
use gramsetu_db::Database;

static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

async fn setup() -> (Router, AppState, PathBuf) {
    let db = Database::open_in_memory().unwrap();
    let dir = std::env::temp_dir().join(format!(
        "gramsetu-it-{}-{}",
        std::process::id(),
        DIR_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let uploads = UploadStore::new(dir.clone()).await.unwrap();
    let state = Arc::new(AppStateInner { db, uploads });
    (app(state.clone()), state, dir)
}

async fn get(router: &Router, path: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut req = Request::get(path);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(
    router: &Router,
    path: &str,
    body: &str,
    cookie: Option<&str>,
) -> axum::response::Response {
    let mut req = Request::post(path).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(req.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

const BOUNDARY: &str = "----gramsetu-test-boundary";

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in fields {
        out.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, bytes) in files {
        out.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        out.extend_from_slice(bytes);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    out
}

async fn post_multipart(
    router: &Router,
    path: &str,
    body: Vec<u8>,
    cookie: Option<&str>,
) -> axum::response::Response {
    let mut req = Request::post(path).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(req.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

fn session_cookie(res: &axum::response::Response) -> String {
    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("response should set a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn location(res: &axum::response::Response) -> &str {
    res.headers()
        .get(header::LOCATION)
        .expect("response should redirect")
        .to_str()
        .unwrap()
}

async fn body_string(res: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Register a user and return the authenticated session cookie.
async fn register(router: &Router, username: &str) -> String {
    let body = format!(
        "username={username}&password=secret123&fullname=Asha+Devi&village=Rampur&contact=9876543210"
    );
    let res = post_form(router, "/register", &body, None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    session_cookie(&res)
}

fn count(state: &AppState, table: &str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    state
        .db
        .with_conn(|conn| Ok(conn.query_row(&sql, [], |r| r.get(0))?))
        .unwrap()
}

#[tokio::test]
async fn registration_auto_logs_in_and_profile_renders() {
    let (router, state, _dir) = setup().await;
    let cookie = register(&router, "asha").await;

    let res = get(&router, "/profile", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = body_string(res).await;
    assert!(page.contains("asha"));
    assert!(page.contains("Registration successful"));

    // Stored password is an Argon2 PHC string, never the submitted text.
    let user = state.db.get_user_by_username("asha").unwrap().unwrap();
    assert!(user.password.starts_with("$argon2"));
    assert_ne!(user.password, "secret123");
}

#[tokio::test]
async fn gated_routes_redirect_anonymous_visitors_to_login() {
    let (router, _state, _dir) = setup().await;

    for path in ["/jobs/new", "/issues/report", "/marketplace/new", "/profile", "/my-applications"] {
        let res = get(&router, path, None).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{path} should be gated");
        assert_eq!(location(&res), "/login");
    }

    // The notice lands on the next rendered page.
    let res = get(&router, "/jobs/new", None).await;
    let cookie = session_cookie(&res);
    let login = get(&router, "/login", Some(&cookie)).await;
    let page = body_string(login).await;
    assert!(page.contains("Please login to access this feature."));
}

#[tokio::test]
async fn invalid_job_submission_leaves_store_unchanged() {
    let (router, state, _dir) = setup().await;
    let cookie = register(&router, "asha").await;

    let res = post_form(
        &router,
        "/jobs/new",
        "title=Harvest+help&description=&contact=",
        Some(&cookie),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = body_string(res).await;
    assert!(page.contains("Title, description and contact information are required!"));
    assert_eq!(count(&state, "jobs"), 0);
}

#[tokio::test]
async fn job_create_list_filter_and_missing_detail() {
    let (router, state, _dir) = setup().await;
    let cookie = register(&router, "asha").await;

    let res = post_form(
        &router,
        "/jobs/new",
        "title=Harvest+help&description=Two+weeks+of+field+work&location=Rampur&contact=9876543210&category=Agriculture",
        Some(&cookie),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/jobs");
    assert_eq!(count(&state, "jobs"), 1);

    let page = body_string(get(&router, "/jobs?category=Agriculture", None).await).await;
    assert!(page.contains("Harvest help"));
    let page = body_string(get(&router, "/jobs?category=Transport", None).await).await;
    assert!(!page.contains("Harvest help"));

    // A miss redirects with a notice instead of erroring.
    let res = get(&router, "/jobs/9999", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/jobs");
}

#[tokio::test]
async fn applying_twice_keeps_one_row_second_submission_wins() {
    let (router, state, _dir) = setup().await;
    let cookie = register(&router, "asha").await;

    post_form(
        &router,
        "/jobs/new",
        "title=Harvest+help&description=Field+work&contact=9876543210",
        Some(&cookie),
    )
    .await;
    let job_id: i64 = state
        .db
        .with_conn(|conn| Ok(conn.query_row("SELECT id FROM jobs", [], |r| r.get(0))?))
        .unwrap();

    let apply_path = format!("/jobs/{job_id}/apply");
    let res = post_form(
        &router,
        &apply_path,
        "name=Asha&phone=111&experience=none&message=first",
        Some(&cookie),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), format!("/jobs/{job_id}"));

    let res = post_form(
        &router,
        &apply_path,
        "name=Asha+Devi&phone=222&experience=two+seasons&message=second",
        Some(&cookie),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    assert_eq!(count(&state, "job_applications"), 1);
    let user = state.db.get_user_by_username("asha").unwrap().unwrap();
    let application = state.db.get_application(user.id, job_id).unwrap().unwrap();
    assert_eq!(application.name, "Asha Devi");
    assert_eq!(application.phone, "222");
    assert_eq!(application.status, "Pending");
}

#[tokio::test]
async fn login_rejections_use_one_message_for_both_causes() {
    let (router, _state, _dir) = setup().await;
    register(&router, "asha").await;

    let wrong_password =
        post_form(&router, "/login", "username=asha&password=wrongwrong", None).await;
    assert_eq!(wrong_password.status(), StatusCode::OK);
    let page = body_string(wrong_password).await;
    assert!(page.contains("Invalid username or password!"));

    let unknown_user =
        post_form(&router, "/login", "username=ghost&password=whatever1", None).await;
    assert_eq!(unknown_user.status(), StatusCode::OK);
    let page = body_string(unknown_user).await;
    assert!(page.contains("Invalid username or password!"));

    // And the real credentials still work.
    let ok = post_form(&router, "/login", "username=asha&password=secret123", None).await;
    assert_eq!(ok.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&ok), "/");
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let (router, _state, _dir) = setup().await;
    let cookie = register(&router, "asha").await;

    let res = get(&router, "/logout", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    // The old token is gone server-side: gated routes bounce to login.
    let res = get(&router, "/profile", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn marketplace_filters_combine_with_and() {
    let (router, _state, _dir) = setup().await;
    let cookie = register(&router, "asha").await;

    for (name, description, category) in [
        ("Basmati Rice", "aromatic grain", "Grains"),
        ("Rice flour", "finely milled", "Flour"),
        ("Bicycle", "good condition", "Transport"),
    ] {
        let body = multipart_body(
            &[
                ("name", name),
                ("description", description),
                ("price", "100"),
                ("location", "Rampur"),
                ("contact", "9876543210"),
                ("category", category),
            ],
            &[],
        );
        let res = post_multipart(&router, "/marketplace/new", body, Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    let page = body_string(get(&router, "/marketplace?search=rice", None).await).await;
    assert!(page.contains("Basmati Rice"));
    assert!(page.contains("Rice flour"));
    assert!(!page.contains("Bicycle"));

    let page =
        body_string(get(&router, "/marketplace?search=rice&category=Grains", None).await).await;
    assert!(page.contains("Basmati Rice"));
    assert!(!page.contains("Rice flour"));
}

#[tokio::test]
async fn rejected_upload_leaves_profile_image_unchanged() {
    let (router, state, _dir) = setup().await;
    let cookie = register(&router, "asha").await;

    let body = multipart_body(
        &[("fullname", "Asha"), ("village", "Rampur"), ("contact", "111")],
        &[("profile_image", "script.exe", b"not an image")],
    );
    let res = post_multipart(&router, "/edit_profile", body, Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = body_string(res).await;
    assert!(page.contains("Invalid file type"));

    let user = state.db.get_user_by_username("asha").unwrap().unwrap();
    assert!(user.profile_image.is_none());
}

#[tokio::test]
async fn issue_report_stores_image_and_records_filename() {
    let (router, state, dir) = setup().await;
    let cookie = register(&router, "asha").await;

    let body = multipart_body(
        &[
            ("title", "Broken culvert"),
            ("description", "Collapsed after the rains"),
            ("location", "East road"),
            ("category", "Roads"),
        ],
        &[("image", "culvert.png", b"pretend png bytes")],
    );
    let res = post_multipart(&router, "/issues/report", body, Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/issues");

    let issues = state.db.list_issues().unwrap();
    assert_eq!(issues.len(), 1);
    let stored = issues[0].image.as_deref().expect("image filename recorded");
    assert!(stored.contains("_issue_"));
    assert!(stored.ends_with("_culvert.png"));
    assert!(dir.join(stored).exists());
    assert_eq!(issues[0].status, "Pending");
}
