//! Column-wise preprocessing: standard scaling of the numeric columns
//! followed by a one-hot encoding of the family-history column.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};
use crate::record::{FamilyHistory, PatientRecord, CATEGORICAL_COLUMN, NUMERIC_COLUMNS};

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
	mean: Vec<f64>,
	scale: Vec<f64>,
}

impl StandardScaler {
	/// Population mean and standard deviation per column. A constant column
	/// gets a scale of 1 so it maps to 0 instead of NaN.
	pub fn fit(rows: &[[f64; 5]]) -> Self {
		let n = rows.len() as f64;

		let mean = (0..NUMERIC_COLUMNS.len())
			.map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
			.collect::<Vec<_>>();

		let scale = mean
			.iter()
			.enumerate()
			.map(|(j, m)| {
				let var = rows.iter().map(|r| (r[j] - m).powi(2)).sum::<f64>() / n;
				let std = var.sqrt();
				if std > std::f64::EPSILON { std } else { 1.0 }
			})
			.collect::<Vec<_>>();

		Self { mean, scale }
	}

	pub fn transform<'a>(&'a self, values: &'a [f64]) -> impl Iterator<Item = f64> + 'a {
		values
			.iter()
			.zip(self.mean.iter().zip(&self.scale))
			.map(|(v, (m, s))| (v - m) / s)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoder {
	categories: Vec<FamilyHistory>,
}

impl OneHotEncoder {
	/// Categories seen in training, sorted by name.
	pub fn fit(values: impl Iterator<Item = FamilyHistory>) -> Self {
		let mut categories = values.collect::<Vec<_>>();
		categories.sort_by_key(|c| c.as_str());
		categories.dedup();

		Self { categories }
	}

	pub fn categories(&self) -> &[FamilyHistory] {
		&self.categories
	}

	pub fn transform(&self, value: FamilyHistory) -> Result<impl Iterator<Item = f64> + '_> {
		if !self.categories.contains(&value) {
			return Err(Error::UnknownCategory {
				column: CATEGORICAL_COLUMN,
				value: value.to_string(),
			});
		}

		Ok(self.categories.iter().map(move |&c| if c == value { 1.0 } else { 0.0 }))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTransformer {
	scaler: StandardScaler,
	encoder: OneHotEncoder,
}

impl ColumnTransformer {
	pub fn fit(records: &[PatientRecord]) -> Result<Self> {
		if records.is_empty() {
			return Err(Error::EmptyDataset("for preprocessing".to_string()));
		}

		let numeric = records.iter().map(PatientRecord::numeric).collect::<Vec<_>>();

		Ok(Self {
			scaler: StandardScaler::fit(&numeric),
			encoder: OneHotEncoder::fit(records.iter().map(|r| r.famhist)),
		})
	}

	/// Number of features `transform` produces.
	pub fn width(&self) -> usize {
		NUMERIC_COLUMNS.len() + self.encoder.categories().len()
	}

	pub fn transform(&self, record: &PatientRecord) -> Result<Vec<f64>> {
		let mut row = Vec::with_capacity(self.width());
		row.extend(self.scaler.transform(&record.numeric()));
		row.extend(self.encoder.transform(record.famhist)?);

		Ok(row)
	}

	pub fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		writer.write_u16::<BigEndian>(self.scaler.mean.len() as u16)?;
		for (mean, scale) in self.scaler.mean.iter().zip(&self.scaler.scale) {
			writer.write_f64::<BigEndian>(*mean)?;
			writer.write_f64::<BigEndian>(*scale)?;
		}

		writer.write_u16::<BigEndian>(self.encoder.categories.len() as u16)?;
		for category in &self.encoder.categories {
			let name = category.as_str().as_bytes();
			writer.write_u16::<BigEndian>(name.len() as u16)?;
			writer.write_all(name)?;
		}

		Ok(())
	}

	pub fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		let numeric = reader.read_u16::<BigEndian>()? as usize;
		if numeric != NUMERIC_COLUMNS.len() {
			return Err(invalid(format!(
				"expected {} numeric columns, found {}",
				NUMERIC_COLUMNS.len(),
				numeric
			)));
		}

		let mut mean = Vec::with_capacity(numeric);
		let mut scale = Vec::with_capacity(numeric);
		for _ in 0..numeric {
			mean.push(reader.read_f64::<BigEndian>()?);
			scale.push(reader.read_f64::<BigEndian>()?);
		}

		let len = reader.read_u16::<BigEndian>()?;
		let categories = (0..len)
			.map(|_| {
				let mut name = vec![0u8; reader.read_u16::<BigEndian>()? as usize];
				reader.read_exact(&mut name)?;

				String::from_utf8(name)
					.map_err(|e| invalid(e.to_string()))?
					.parse::<FamilyHistory>()
					.map_err(|e| invalid(e.to_string()))
			})
			.collect::<std::io::Result<Vec<_>>>()?;

		Ok(Self {
			scaler: StandardScaler { mean, scale },
			encoder: OneHotEncoder { categories },
		})
	}
}

fn invalid(message: String) -> std::io::Error {
	std::io::Error::new(std::io::ErrorKind::InvalidData, message)
}
