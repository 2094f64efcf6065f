use crate::classifier::Classifier;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::ops::Range;
use rand::Rng;
use ordered_float::OrderedFloat;

/// Index view over columnar training data. Sorting and splitting only
/// reorder `index`; the borrowed columns are never copied.
#[derive(Clone, Debug)]
pub struct Dataset<'a> {
	columns: &'a [Vec<f64>],
	targets: &'a [f64],

	index: Vec<usize>,
	range: Range<usize>,
}

impl<'a, 'b> Dataset<'a> {
	/// Share of rows the classifier labels correctly. Zero for an empty view.
	pub fn evaluate<C: Classifier + Sync>(&self, classifier: &C) -> f64 {
		if self.rows_len() == 0 {
			return 0.0;
		}

		self.rows()
			.zip(self.targets())
			.collect::<Vec<_>>()
			.into_par_iter()
			.filter(|(x, y)| classifier.predict(x) == *y)
			.count() as f64 / self.rows_len() as f64
	}

	pub fn sort(&mut self, column: usize) {
		let values = &self.columns[column];

		self.index[self.range.start..self.range.end]
			.sort_by_key(|&x| OrderedFloat(values[x]));
	}

	/// Runs `f` on the first `row` rows of the view, then on the rest.
	pub fn split<F, T>(&mut self, row: usize, mut f: F) -> (T, T)
	where
		F: FnMut(&mut Self) -> T,
	{
		let row = row + self.range.start;
		let original = self.range.clone();

		self.range.end = row;
		let left = f(self);
		self.range.end = original.end;

		self.range.start = row;
		let right = f(self);
		self.range.start = original.start;

		(left, right)
	}

	/// Draws `max_samples` rows with replacement.
	pub fn bootstrap<R: Rng + ?Sized>(&self, rng: &mut R, max_samples: usize) -> Self {
		let range = 0..max_samples;
		let index = if self.rows_len() == 0 {
			Vec::new()
		} else {
			range
				.clone()
				.map(|_| self.index[rng.gen_range(self.range.start, self.range.end)])
				.collect::<Vec<_>>()
		};

		Self {
			range: 0..index.len(),
			index,
			columns: self.columns,
			targets: self.targets,
		}
	}

	fn indices(&'b self) -> impl 'b + Iterator<Item = usize> + Clone {
		self.index[self.range.start..self.range.end]
			.iter()
			.copied()
	}

	pub fn targets(&'b self) -> impl 'b + Iterator<Item = f64> + Clone {
		self.indices()
			.map(move |i| self.targets[i])
	}

	pub fn column(&'b self, column: usize) -> impl 'b + Iterator<Item = f64> {
		let column = &self.columns[column];

		self.indices()
			.map(move |i| column[i])
	}

	pub fn features_len(&self) -> usize {
		self.columns.len()
	}

	pub fn rows_len(&self) -> usize {
		self.range.end - self.range.start
	}

	pub fn rows(&'b self) -> impl 'b + Iterator<Item = Vec<f64>> {
		self.indices().map(move |i| {
			(0..self.columns.len())
				.map(|j| self.columns[j][i])
				.collect()
		})
	}
}

#[derive(Debug, Default)]
pub struct Builder {
	columns: Vec<Vec<f64>>,
	targets: Vec<f64>,
}

impl Builder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn build(&self) -> Dataset<'_> {
		let range = 0..self.targets.len();

		Dataset {
			columns: &self.columns,
			targets: &self.targets,

			range: range.clone(),
			index: range.collect(),
		}
	}

	pub fn add(&mut self, x: &[f64], y: f64) {
		if self.columns.is_empty() {
			self.columns = vec![Vec::new(); x.len()];
		}

		debug_assert_eq!(self.columns.len(), x.len(), "rows must share one width");

		for (column, value) in self.columns.iter_mut().zip(x) {
			column.push(*value);
		}

		self.targets.push(y);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	fn builder() -> Builder {
		let mut builder = Builder::new();
		builder.add(&[3.0, 10.0], 1.0);
		builder.add(&[1.0, 20.0], 0.0);
		builder.add(&[2.0, 30.0], 1.0);
		builder
	}

	#[test]
	fn sort_reorders_view_only() {
		let builder = builder();
		let mut dataset = builder.build();
		dataset.sort(0);

		assert_eq!(dataset.column(0).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
		assert_eq!(dataset.targets().collect::<Vec<_>>(), vec![0.0, 1.0, 1.0]);
		assert_eq!(dataset.rows().next(), Some(vec![1.0, 20.0]));
	}

	#[test]
	fn split_restores_range() {
		let builder = builder();
		let mut dataset = builder.build();
		let (left, right) = dataset.split(1, |d| d.rows_len());

		assert_eq!((left, right), (1, 2));
		assert_eq!(dataset.rows_len(), 3);
	}

	#[test]
	fn bootstrap_draws_requested_rows() {
		let builder = builder();
		let dataset = builder.build();
		let mut rng = StdRng::seed_from_u64(7);
		let sample = dataset.bootstrap(&mut rng, 10);

		assert_eq!(sample.rows_len(), 10);
		assert_eq!(sample.features_len(), 2);
		assert!(sample.targets().all(|y| y == 0.0 || y == 1.0));
	}
}
