use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use gramsetu_api::AppStateInner;
use gramsetu_api::uploads::UploadStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gramsetu=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("GRAMSETU_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("GRAMSETU_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()?;
    let db_path = std::env::var("GRAMSETU_DB_PATH").unwrap_or_else(|_| "gramsetu.db".into());
    let upload_dir: PathBuf = std::env::var("GRAMSETU_UPLOAD_DIR")
        .unwrap_or_else(|_| "./uploads".into())
        .into();

    // Init database and upload storage
    let db = gramsetu_db::Database::open(&PathBuf::from(&db_path))?;
    let uploads = UploadStore::new(upload_dir.clone()).await?;

    let state = Arc::new(AppStateInner { db, uploads });

    let app = gramsetu_api::app(state)
        .nest_service("/uploads", ServeDir::new(&upload_dir))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("GramSetu portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
