mod cache;
pub mod handler;
mod page;
mod server;

use axum::Router;
use axum::routing::get;
use std::sync::Arc;

pub use cache::ModelCache;
pub use server::serve;

/// Shared state: the lazily loaded model, one per process.
#[derive(Clone)]
pub struct AppState {
	pub cache: Arc<ModelCache>,
}

impl AppState {
	pub fn new(cache: ModelCache) -> Self {
		Self { cache: Arc::new(cache) }
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(handler::index).post(handler::submit))
		.route("/health", get(handler::health))
		.with_state(state)
}
