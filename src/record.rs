use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const NUMERIC_COLUMNS: [&str; 5] = ["sbp", "ldl", "adiposity", "obesity", "age"];
pub const CATEGORICAL_COLUMN: &str = "famhist";

pub const AGE_RANGE: (u32, u32) = (10, 100);
pub const SBP_RANGE: (f64, f64) = (80.0, 250.0);
pub const LDL_RANGE: (f64, f64) = (0.0, 10.0);
pub const ADIPOSITY_RANGE: (f64, f64) = (0.0, 60.0);
pub const OBESITY_RANGE: (f64, f64) = (0.0, 60.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FamilyHistory {
	Present,
	Absent,
}

impl FamilyHistory {
	pub const ALL: [FamilyHistory; 2] = [FamilyHistory::Present, FamilyHistory::Absent];

	pub fn as_str(&self) -> &'static str {
		match self {
			FamilyHistory::Present => "Present",
			FamilyHistory::Absent => "Absent",
		}
	}
}

impl fmt::Display for FamilyHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for FamilyHistory {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"Present" => Ok(FamilyHistory::Present),
			"Absent" => Ok(FamilyHistory::Absent),
			other => Err(Error::UnknownCategory {
				column: CATEGORICAL_COLUMN,
				value: other.to_string(),
			}),
		}
	}
}

/// One row of model input, in the column order the pipeline was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PatientRecord {
	pub sbp: f64,
	pub ldl: f64,
	pub adiposity: f64,
	pub obesity: f64,
	pub age: u32,
	pub famhist: FamilyHistory,
}

impl Default for PatientRecord {
	fn default() -> Self {
		Self {
			sbp: 140.0,
			ldl: 4.0,
			adiposity: 25.0,
			obesity: 30.0,
			age: 50,
			famhist: FamilyHistory::Present,
		}
	}
}

impl PatientRecord {
	pub fn columns() -> [&'static str; 6] {
		let [sbp, ldl, adiposity, obesity, age] = NUMERIC_COLUMNS;
		[sbp, ldl, adiposity, obesity, age, CATEGORICAL_COLUMN]
	}

	/// Numeric features, ordered as `NUMERIC_COLUMNS`.
	pub fn numeric(&self) -> [f64; 5] {
		[self.sbp, self.ldl, self.adiposity, self.obesity, self.age as f64]
	}

	/// Cell values rendered as text, ordered as `columns()`.
	pub fn cells(&self) -> [String; 6] {
		[
			self.sbp.to_string(),
			self.ldl.to_string(),
			self.adiposity.to_string(),
			self.obesity.to_string(),
			self.age.to_string(),
			self.famhist.to_string(),
		]
	}

	pub fn check_bounds(&self) -> Result<()> {
		check("age", self.age as f64, (AGE_RANGE.0 as f64, AGE_RANGE.1 as f64))?;
		check("sbp", self.sbp, SBP_RANGE)?;
		check("ldl", self.ldl, LDL_RANGE)?;
		check("adiposity", self.adiposity, ADIPOSITY_RANGE)?;
		check("obesity", self.obesity, OBESITY_RANGE)?;
		Ok(())
	}
}

fn check(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<()> {
	// NaN fails both comparisons, so test for containment rather than exclusion
	if value >= min && value <= max {
		Ok(())
	} else {
		Err(Error::OutOfRange { field, value, min, max })
	}
}

/// One training row. Columns other than these seven are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LabeledRecord {
	pub sbp: f64,
	pub ldl: f64,
	pub adiposity: f64,
	pub obesity: f64,
	pub age: u32,
	pub famhist: FamilyHistory,
	pub chd: u8,
}

impl LabeledRecord {
	pub fn new(record: PatientRecord, chd: u8) -> Self {
		Self {
			sbp: record.sbp,
			ldl: record.ldl,
			adiposity: record.adiposity,
			obesity: record.obesity,
			age: record.age,
			famhist: record.famhist,
			chd,
		}
	}

	pub fn record(&self) -> PatientRecord {
		PatientRecord {
			sbp: self.sbp,
			ldl: self.ldl,
			adiposity: self.adiposity,
			obesity: self.obesity,
			age: self.age,
			famhist: self.famhist,
		}
	}

	pub fn target(&self) -> f64 {
		self.chd as f64
	}
}
