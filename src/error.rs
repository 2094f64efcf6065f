use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Failed to read CSV: {0}")]
	Csv(#[from] csv::Error),

	#[error("Invalid model artifact: {0}")]
	Artifact(String),

	#[error("Dataset {0} contains no rows")]
	EmptyDataset(String),

	#[error("Unknown category {value:?} for column {column}")]
	UnknownCategory { column: &'static str, value: String },

	#[error("{field} must be between {min} and {max}, got {value}")]
	OutOfRange {
		field: &'static str,
		value: f64,
		min: f64,
		max: f64,
	},

	#[error("Failed to bind to address {address}: {source}")]
	Bind {
		address: String,
		#[source]
		source: std::io::Error,
	},

	#[error("Server error: {0}")]
	Server(String),
}
