//! 解析エンドポイント（axum）
//!
//! - `POST /api/analyze`: 画像＋レビュー → ExtractedProductInfo
//! - `GET /health`: 死活監視

pub mod analyze;
pub mod gemini;

use crate::config::Config;
use crate::error::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use gemini::{GeminiModel, GenerativeModel};

/// リクエストボディ上限（Data URIで10MB程度の画像を許容）
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn GenerativeModel>,
}

impl AppState {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/analyze",
            post(analyze::analyze_product).fallback(analyze::method_not_allowed),
        )
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// エンドポイントを起動（APIキー必須）
pub async fn serve(config: &Config) -> Result<()> {
    let api_key = config.require_api_key()?;
    let addr = config.bind_addr()?;

    let model = GeminiModel::new(api_key, &config.model, &config.gemini_base_url)?;
    let app = create_router(AppState::new(Arc::new(model)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, model = %config.model, "analysis endpoint listening");

    axum::serve(listener, app).await?;
    Ok(())
}
