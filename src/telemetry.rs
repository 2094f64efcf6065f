use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber.
/// Human-readable by default; JSON when `RUST_LOG_FORMAT=json`.
pub fn init_tracing() {
	let use_json = std::env::var("RUST_LOG_FORMAT")
		.map(|v| v == "json")
		.unwrap_or(false);

	let filter = EnvFilter::builder()
		.with_default_directive(Level::INFO.into())
		.from_env_lossy();

	if use_json {
		tracing_subscriber::registry()
			.with(
				fmt::layer()
					.json()
					.flatten_event(true)
					.with_current_span(true),
			)
			.with(filter)
			.init();
	} else {
		tracing_subscriber::registry()
			.with(fmt::layer())
			.with(filter)
			.init();
	}
}
