//! Read-only HTTP API over the blink store.
//!
//! Signing happens in the user's wallet, so the server never accepts
//! intents over HTTP; it only exposes the lifecycle records for dashboards
//! and reconciliation checks.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::Json,
	routing::get,
	Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use blink_storage::StorageService;
use blink_types::BlinkId;

#[derive(Clone)]
pub struct AppState {
	storage: Arc<StorageService>,
}

impl AppState {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}
}

pub async fn start_http_server(state: AppState, port: u16) -> anyhow::Result<()> {
	let app = Router::new()
		.route("/health", get(health_check))
		.route("/api/blinks", get(list_blinks))
		.route("/api/blinks/{id}", get(get_blink))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive());

	let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

	info!("API server listening on port {}", port);

	axum::serve(listener, app).await?;

	Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
	Json(serde_json::json!({
		"status": "ok",
		"timestamp": chrono::Utc::now().timestamp()
	}))
}

#[derive(Deserialize)]
struct ListParams {
	team: i64,
	#[serde(default = "default_limit")]
	limit: usize,
}

fn default_limit() -> usize {
	50
}

async fn list_blinks(
	State(state): State<AppState>,
	Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
	let blinks = state
		.storage
		.list_by_team(params.team, params.limit)
		.await
		.map_err(internal_error)?;

	let count = blinks.len();
	Ok(Json(serde_json::json!({
		"blinks": blinks,
		"count": count
	})))
}

async fn get_blink(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
	let blink = state
		.storage
		.get(&BlinkId(id))
		.await
		.map_err(internal_error)?;

	match blink {
		Some(blink) => Ok(Json(serde_json::json!({ "blink": blink }))),
		None => Err((
			StatusCode::NOT_FOUND,
			Json(serde_json::json!({ "error": "blink not found" })),
		)),
	}
}

fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, Json<serde_json::Value>) {
	(
		StatusCode::INTERNAL_SERVER_ERROR,
		Json(serde_json::json!({ "error": err.to_string() })),
	)
}
