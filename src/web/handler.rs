use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::{error, info, warn};

use super::AppState;
use super::page::{self, Outcome};
use crate::record::PatientRecord;

/// Handler for GET /: the blank form with default values.
pub async fn index() -> Html<String> {
	Html(page::render(&PatientRecord::default(), None))
}

/// Handler for POST /: one prediction per submission.
///
/// Bodies that do not decode into a record are rejected by the `Form`
/// extractor before this runs.
pub async fn submit(State(state): State<AppState>, Form(record): Form<PatientRecord>) -> Response {
	if let Err(e) = record.check_bounds() {
		warn!("Rejected submission: {e}");
		let outcome = Outcome::Rejected(e.to_string());
		return (StatusCode::UNPROCESSABLE_ENTITY, Html(page::render(&record, Some(&outcome)))).into_response();
	}

	let prediction = match state.cache.get().await {
		Ok(pipeline) => pipeline.predict(&record),
		Err(e) => Err(e),
	};

	match prediction {
		Ok(prediction) => {
			info!(
				label = %prediction.label,
				probability = prediction.probability,
				"Predicted risk"
			);
			let outcome = Outcome::Predicted(prediction);
			Html(page::render(&record, Some(&outcome))).into_response()
		},
		Err(e) => {
			error!("Prediction failed: {e}");
			let outcome = Outcome::Failed(e.to_string());
			(StatusCode::INTERNAL_SERVER_ERROR, Html(page::render(&record, Some(&outcome)))).into_response()
		},
	}
}

/// Handler for GET /health
pub async fn health() -> &'static str {
	"Healthy"
}
