//! The fitted model artifact: preprocessing followed by a random forest,
//! fitted, saved and loaded as one unit.
//!
//! On disk the artifact is big-endian binary: the magic bytes `CHDP`, the
//! column transformer, then the forest. There is no version field.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::info;

use crate::classifier::Classifier;
use crate::dataset::Builder;
use crate::error::{Error, Result};
use crate::functions::POSITIVE;
use crate::preprocess::ColumnTransformer;
use crate::random_forest::{RandomForestBuilder, RandomForestClassifier};
use crate::record::{LabeledRecord, PatientRecord};

const MAGIC: &[u8; 4] = b"CHDP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLabel {
	Low,
	High,
}

impl RiskLabel {
	pub fn value(&self) -> u8 {
		match self {
			RiskLabel::Low => 0,
			RiskLabel::High => 1,
		}
	}
}

impl fmt::Display for RiskLabel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RiskLabel::Low => f.write_str("low risk"),
			RiskLabel::High => f.write_str("high risk"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
	pub label: RiskLabel,
	/// Probability of the high-risk class.
	pub probability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
	preprocess: ColumnTransformer,
	classifier: RandomForestClassifier,
}

impl Pipeline {
	pub fn fit(records: &[LabeledRecord], forest: &RandomForestBuilder) -> Result<Self> {
		let inputs = records.iter().map(LabeledRecord::record).collect::<Vec<_>>();
		let preprocess = ColumnTransformer::fit(&inputs)?;

		let mut builder = Builder::new();
		for record in records {
			builder.add(&preprocess.transform(&record.record())?, record.target());
		}

		let classifier = forest.fit(builder.build());

		Ok(Self { preprocess, classifier })
	}

	pub fn predict(&self, record: &PatientRecord) -> Result<Prediction> {
		let x = self.preprocess.transform(record)?;

		let label = if self.classifier.predict(&x) == POSITIVE {
			RiskLabel::High
		} else {
			RiskLabel::Low
		};

		Ok(Prediction {
			label,
			probability: self.classifier.predict_proba(&x),
		})
	}

	/// Share of `records` whose predicted label matches `chd`.
	pub fn evaluate(&self, records: &[LabeledRecord]) -> Result<f64> {
		if records.is_empty() {
			return Ok(0.0);
		}

		let mut builder = Builder::new();
		for record in records {
			builder.add(&self.preprocess.transform(&record.record())?, record.target());
		}

		Ok(builder.build().evaluate(&self.classifier))
	}

	pub fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		writer.write_all(MAGIC)?;
		self.preprocess.serialize(writer)?;
		self.classifier.serialize(writer)
	}

	pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
		let mut magic = [0u8; 4];
		reader.read_exact(&mut magic).map_err(artifact)?;
		if &magic != MAGIC {
			return Err(Error::Artifact(format!("unexpected header {:?}", magic)));
		}

		let preprocess = ColumnTransformer::deserialize(reader).map_err(artifact)?;
		let classifier = RandomForestClassifier::deserialize(reader).map_err(artifact)?;

		if let Some(column) = classifier.max_column() {
			if column >= preprocess.width() {
				return Err(Error::Artifact(format!(
					"forest splits on feature {} but preprocessing yields {}",
					column,
					preprocess.width()
				)));
			}
		}

		Ok(Self { preprocess, classifier })
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		let mut writer = BufWriter::new(File::create(path)?);
		self.serialize(&mut writer)?;
		writer.flush()?;

		info!("Saved model ({} trees) to {}", self.classifier.trees().len(), path.display());
		Ok(())
	}

	pub fn load(path: &Path) -> Result<Self> {
		let mut reader = BufReader::new(File::open(path)?);
		let pipeline = Self::deserialize(&mut reader)?;

		info!("Loaded model ({} trees) from {}", pipeline.classifier.trees().len(), path.display());
		Ok(pipeline)
	}
}

fn artifact(e: std::io::Error) -> Error {
	Error::Artifact(e.to_string())
}
