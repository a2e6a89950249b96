//! Preview server: the built site plus the JSON API the page scripts were
//! written against

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::Site;

/// Server state
struct ServerState {
    index_path: PathBuf,
    articles_dir: PathBuf,
}

/// JSON error body: `{ "error": "..." }`
struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn not_found(message: &'static str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message,
        }
    }

    fn internal(message: &'static str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Routes for a built site
pub fn router(site: &Site) -> Router {
    let state = Arc::new(ServerState {
        index_path: site.index_path(),
        articles_dir: site.public_dir.join("articles"),
    });

    Router::new()
        .route("/api/site", get(site_handler))
        .route("/api/articles", get(articles_handler))
        .route("/api/articles/:filename", get(article_handler))
        .with_state(state)
        .fallback_service(ServeDir::new(&site.public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the preview server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let app = router(site);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Read and parse the site index for one request
async fn read_index(state: &ServerState, not_found: &'static str) -> Result<Value, ApiError> {
    if !tokio::fs::try_exists(&state.index_path).await.unwrap_or(false) {
        return Err(ApiError::not_found(not_found));
    }

    let content = tokio::fs::read_to_string(&state.index_path)
        .await
        .map_err(|e| {
            tracing::error!("Error reading {:?}: {}", state.index_path, e);
            ApiError::internal("Failed to read site configuration")
        })?;

    serde_json::from_str(&content).map_err(|e| {
        tracing::error!("Error parsing {:?}: {}", state.index_path, e);
        ApiError::internal("Failed to read site configuration")
    })
}

/// GET /api/site
async fn site_handler(State(state): State<Arc<ServerState>>) -> Result<Json<Value>, ApiError> {
    let index = read_index(&state, "Site configuration not found").await?;
    Ok(Json(index))
}

/// GET /api/articles
async fn articles_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Value>, ApiError> {
    let mut index = read_index(&state, "Articles index not found").await?;
    let articles = index
        .get_mut("articles")
        .map(Value::take)
        .unwrap_or_else(|| Value::Array(Vec::new()));
    Ok(Json(articles))
}

/// GET /api/articles/:filename - raw markdown
async fn article_handler(
    State(state): State<Arc<ServerState>>,
    Path(filename): Path<String>,
) -> Result<String, ApiError> {
    if !is_plain_filename(&filename) {
        return Err(ApiError::not_found("Article not found"));
    }

    let path = state.articles_dir.join(&filename);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(ApiError::not_found("Article not found"));
    }

    tokio::fs::read_to_string(&path).await.map_err(|e| {
        tracing::error!("Error reading article {:?}: {}", path, e);
        ApiError::internal("Failed to read article")
    })
}

/// A single path component that cannot leave the articles directory
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}
