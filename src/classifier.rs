use std::io::{Read, Write};

use crate::functions::{NEGATIVE, POSITIVE};

pub trait Classifier: Sized {
	/// Probability of the positive class for one preprocessed row.
	fn predict_proba(&self, x: &[f64]) -> f64;

	/// Class with the highest probability; ties go to the negative class.
	fn predict(&self, x: &[f64]) -> f64 {
		if self.predict_proba(x) > 0.5 {
			POSITIVE
		} else {
			NEGATIVE
		}
	}

	fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;
	fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self>;
}
