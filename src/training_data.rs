use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{Error, Result};
use crate::record::{LabeledRecord, PatientRecord};

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
	let mut reader = csv::Reader::from_path(path)?;

	let rows = reader
		.deserialize()
		.collect::<std::result::Result<Vec<T>, csv::Error>>()?;

	if rows.is_empty() {
		return Err(Error::EmptyDataset(path.display().to_string()));
	}

	info!("Read {} rows from {}", rows.len(), path.display());

	Ok(rows)
}

/// Labeled rows for training. Any CSV problem aborts the whole read.
pub fn read(path: &Path) -> Result<Vec<LabeledRecord>> {
	read_rows(path)
}

/// Unlabeled rows for batch prediction. A label column, if present, is ignored.
pub fn read_records(path: &Path) -> Result<Vec<PatientRecord>> {
	read_rows(path)
}

/// Shuffles `records` and returns `(train, test)` with `test_rate` of the rows held out.
pub fn train_test_split<T: Clone, R: Rng + ?Sized>(records: &[T], rng: &mut R, test_rate: f64) -> (Vec<T>, Vec<T>) {
	let mut records = records.to_vec();
	records.shuffle(rng);

	let test_num = (records.len() as f64 * test_rate.clamp(0.0, 1.0)).round() as usize;
	let train = records.split_off(test_num);

	(train, records)
}
