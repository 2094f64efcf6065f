use std::io::{Read, Write};
use std::collections::HashMap;
use rand::Rng;
use rand::seq::SliceRandom as _;
use ordered_float::OrderedFloat;

use crate::dataset::Dataset;
use crate::node::{Node, Split};
use crate::classifier::Classifier;
use crate::functions::{self, gini, most_frequent, positive_fraction, NEGATIVE};

// Class counts of one side of a candidate split, updated one row at a time.
// Keeps sum(n_i^2) so gini = 1 - sum(n_i^2) / n^2 stays exact.
struct SlidingGini {
	n: usize,
	ni: HashMap<OrderedFloat<f64>, usize>,
	sum_sq: usize,
}

impl SlidingGini {
	pub fn new(targets: impl Iterator<Item = f64>) -> Self {
		let (histogram, len) = functions::histogram(targets);

		Self {
			n: len,
			sum_sq: histogram.values().map(|&c| c * c).sum(),
			ni: histogram,
		}
	}

	pub fn inc(&mut self, typ: OrderedFloat<f64>) {
		let entry = self.ni.entry(typ).or_insert(0);
		self.sum_sq += 2 * *entry + 1;
		*entry += 1;
		self.n += 1;
	}

	pub fn dec(&mut self, typ: OrderedFloat<f64>) {
		let entry = self.ni.entry(typ).or_insert(0);
		debug_assert!(*entry > 0, "removing a class the window does not hold");
		self.sum_sq -= 2 * *entry - 1;
		*entry -= 1;
		self.n -= 1;
	}

	pub fn gini(&self) -> f64 {
		if self.n == 0 {
			return 0.0;
		}

		1.0 - self.sum_sq as f64 / (self.n as f64).powi(2)
	}
}

struct NodeBuilder<R> {
	max_features: usize,
	max_depth: Option<usize>,
	min_samples_split: usize,
	rng: R
}

impl<R: Rng> NodeBuilder<R> {
	fn leaf(dataset: &Dataset) -> Node {
		Node::Leaf {
			label: most_frequent(dataset.targets()).unwrap_or(NEGATIVE),
			proba: positive_fraction(dataset.targets()),
		}
	}

	fn build(&mut self, dataset: &mut Dataset, depth: usize) -> Node {
		let rows = dataset.rows_len();
		let impurity = gini(dataset.targets());

		if impurity <= std::f64::EPSILON
			|| rows < self.min_samples_split
			|| self.max_depth.map_or(false, |max| depth > max)
		{
			return Self::leaf(dataset);
		}

		let mut best_split: Option<Split> = None;
		let mut best_gain = std::f64::MIN;
		let columns = (0..dataset.features_len()).collect::<Vec<usize>>();
		let max_features = std::cmp::min(columns.len(), self.max_features);

		for &column in columns.choose_multiple(&mut self.rng, max_features) {
			dataset.sort(column);

			let values = dataset.column(column).collect::<Vec<_>>();
			let targets = dataset.targets().collect::<Vec<_>>();

			let mut left_window = SlidingGini::new(std::iter::empty());
			let mut right_window = SlidingGini::new(targets.iter().copied());

			for i in 0..rows - 1 {
				let cls = OrderedFloat(targets[i]);
				left_window.inc(cls);
				right_window.dec(cls);

				// Only cut between distinct values
				if (values[i + 1] - values[i]).abs() <= std::f64::EPSILON {
					continue;
				}

				let ratio_l = (i + 1) as f64 / rows as f64;
				let ratio_r = 1.0 - ratio_l;

				let gain = impurity - (ratio_l * left_window.gini() + ratio_r * right_window.gini());

				if best_gain < gain {
					best_split = Some(Split { column, value: (values[i] + values[i + 1]) / 2.0 });
					best_gain = gain;
				}
			}
		}

		if let Some(split) = best_split {
			self.build_children(dataset, split, depth)
		} else {
			Self::leaf(dataset)
		}
	}

	pub fn build_children(&mut self, dataset: &mut Dataset, split: Split, depth: usize) -> Node {
		dataset.sort(split.column);

		let split_row = dataset
			.column(split.column)
			.take_while(|&f| f <= split.value)
			.count();

		// A midpoint can round onto one of its neighbours
		if split_row == 0 || split_row == dataset.rows_len() {
			return Self::leaf(dataset);
		}

		let (left, right) = dataset.split(split_row, |x| Box::new(self.build(x, depth + 1)));

		Node::Children {
			left, right, split
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
	root: Node,
}

impl DecisionTree {
	pub fn root(&self) -> &Node {
		&self.root
	}
}

impl Classifier for DecisionTree {
	fn predict_proba(&self, x: &[f64]) -> f64 {
		self.root.predict_proba(x)
	}

	fn predict(&self, x: &[f64]) -> f64 {
		self.root.predict(x)
	}

	fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		self.root.serialize(writer)
	}

	fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		let root = Node::deserialize(reader)?;

		Ok(Self {
			root
		})
	}
}

pub struct DecisionTreeBuilder {
	pub max_features: Option<usize>,
	pub max_depth: Option<usize>,
	pub min_samples_split: usize,
}

impl Default for DecisionTreeBuilder {
	fn default() -> Self {
		Self {
			max_features: None,
			max_depth: None,
			min_samples_split: 2,
		}
	}
}

impl DecisionTreeBuilder {
	pub fn fit<R: Rng + ?Sized>(&self, rng: &mut R, mut dataset: Dataset) -> DecisionTree {
		let max_features = self.max_features.unwrap_or(dataset.features_len());
		let root = (NodeBuilder {
			max_features,
			max_depth: self.max_depth,
			min_samples_split: self.min_samples_split.max(2),
			rng
		}).build(&mut dataset, 1);

		DecisionTree { root }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dataset::Builder;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	#[test]
	fn sliding_gini_matches_batch_gini() {
		let targets = [0.0, 1.0, 1.0, 0.0, 1.0];
		let mut window = SlidingGini::new(std::iter::empty());

		for (i, &t) in targets.iter().enumerate() {
			window.inc(OrderedFloat(t));
			let expected = gini(targets[..=i].iter().copied());
			assert!((window.gini() - expected).abs() < 1e-12);
		}

		window.dec(OrderedFloat(1.0));
		assert!((window.gini() - gini([0.0, 1.0, 1.0, 0.0].iter().copied())).abs() < 1e-12);
	}

	#[test]
	fn separable_data_is_learned_exactly() {
		let mut builder = Builder::new();
		for i in 0..20 {
			let x = i as f64;
			builder.add(&[x, (i % 3) as f64], if x < 10.0 { 0.0 } else { 1.0 });
		}

		let mut rng = StdRng::seed_from_u64(1);
		let tree = DecisionTreeBuilder::default().fit(&mut rng, builder.build());

		assert_eq!(tree.predict(&[2.0, 0.0]), 0.0);
		assert_eq!(tree.predict(&[15.0, 0.0]), 1.0);
		assert_eq!(tree.predict_proba(&[15.0, 1.0]), 1.0);
	}

	#[test]
	fn depth_limit_is_respected() {
		let mut builder = Builder::new();
		for i in 0..64 {
			builder.add(&[i as f64], (i % 2) as f64);
		}

		let mut rng = StdRng::seed_from_u64(3);
		let tree = DecisionTreeBuilder {
			max_depth: Some(2),
			..Default::default()
		}.fit(&mut rng, builder.build());

		assert!(tree.root().depth() <= 3);
	}

	#[test]
	fn pure_dataset_is_a_single_leaf() {
		let mut builder = Builder::new();
		builder.add(&[1.0], 1.0);
		builder.add(&[2.0], 1.0);

		let mut rng = StdRng::seed_from_u64(0);
		let tree = DecisionTreeBuilder::default().fit(&mut rng, builder.build());

		assert_eq!(tree.root(), &Node::Leaf { label: 1.0, proba: 1.0 });
	}
}
