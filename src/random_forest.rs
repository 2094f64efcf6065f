use std::io::{Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::classifier::Classifier;
use crate::decision_tree::{DecisionTreeBuilder, DecisionTree};

#[derive(Debug, Clone)]
pub struct RandomForestBuilder {
	pub n_trees: usize,
	pub max_depth: Option<usize>,
	pub min_samples_split: usize,
	/// Bootstrap sample size as a share of the training rows.
	pub bag_amount: f64,
	/// Master seed; `None` draws one from the thread rng.
	pub seed: Option<u64>,
}

impl Default for RandomForestBuilder {
	fn default() -> Self {
		Self {
			n_trees: 100,
			max_depth: None,
			min_samples_split: 2,
			bag_amount: 1.0,
			seed: None,
		}
	}
}

impl RandomForestBuilder {
	pub fn fit(&self, dataset: Dataset) -> RandomForestClassifier {
		let feature_len = (dataset.features_len() as f64).sqrt().ceil() as usize;
		let n_trees = self.n_trees.max(1);

		info!(
			trees = n_trees,
			rows = dataset.rows_len(),
			features = dataset.features_len(),
			max_features = feature_len,
			"Fitting random forest"
		);

		let start = Instant::now();
		let done = AtomicUsize::new(0);

		let forest = self.get_rngs(n_trees)
			.collect::<Vec<_>>()
			.into_par_iter()
			.map(|mut rng| {
				let tree = self.fit_tree(&mut rng, &dataset, feature_len);

				let i = done.fetch_add(1, Ordering::Relaxed) + 1;
				debug!(
					"[{:.1}%] tree depth {}",
					i as f64 / n_trees as f64 * 100.0,
					tree.root().depth(),
				);

				tree
			})
			.collect::<Vec<_>>();

		info!("Fitted {} trees in {:.2} s", forest.len(), start.elapsed().as_secs_f64());

		RandomForestClassifier {
			forest
		}
	}

	fn fit_tree<R: Rng + ?Sized>(&self, rng: &mut R, dataset: &Dataset, feature_len: usize) -> DecisionTree {
		let builder = DecisionTreeBuilder {
			max_features: Some(feature_len),
			max_depth: self.max_depth,
			min_samples_split: self.min_samples_split,
		};

		let max_samples = ((dataset.rows_len() as f64 * self.bag_amount) as usize).max(1);
		let bootstrapped = dataset.bootstrap(rng, max_samples);

		builder.fit(rng, bootstrapped)
	}

	fn get_rngs(&self, n_trees: usize) -> impl Iterator<Item = StdRng> {
		let seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
		let mut rng = StdRng::seed_from_u64(seed);

		(0..n_trees).map(move |_| {
			let mut seed = [0u8; 32];
			rng.fill(&mut seed);
			StdRng::from_seed(seed)
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestClassifier {
	forest: Vec<DecisionTree>,
}

impl RandomForestClassifier {
	pub fn trees(&self) -> &[DecisionTree] {
		&self.forest
	}

	/// Highest feature index any tree splits on.
	pub fn max_column(&self) -> Option<usize> {
		self.forest.iter().filter_map(|t| t.root().max_column()).max()
	}
}

impl Classifier for RandomForestClassifier {
	/// Mean of the per-tree leaf probabilities.
	fn predict_proba(&self, x: &[f64]) -> f64 {
		if self.forest.is_empty() {
			return 0.0;
		}

		let sum = self.forest.iter().map(|t| t.predict_proba(x)).sum::<f64>();
		(sum / self.forest.len() as f64).clamp(0.0, 1.0)
	}

	fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		let len = u16::try_from(self.forest.len()).map_err(|_| std::io::Error::new(
			std::io::ErrorKind::InvalidInput,
			format!("forest of {} trees does not fit the format", self.forest.len()),
		))?;
		writer.write_u16::<BigEndian>(len)?;

		for tree in &self.forest {
			tree.serialize(writer)?;
		}

		Ok(())
	}

	fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		let len = reader.read_u16::<BigEndian>()?;

		let forest = (0..len)
			.map(|_| DecisionTree::deserialize(reader))
			.collect::<std::io::Result<Vec<DecisionTree>>>()?;

		Ok(Self {
			forest
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dataset::Builder;

	fn builder() -> Builder {
		let mut builder = Builder::new();
		for i in 0..200 {
			let x = i as f64 / 10.0;
			let noise = ((i * 7) % 5) as f64;
			builder.add(&[x, noise], if x > 10.0 { 1.0 } else { 0.0 });
		}
		builder
	}

	#[test]
	fn seeded_forests_are_identical() {
		let builder = builder();
		let forest = RandomForestBuilder { n_trees: 8, seed: Some(42), ..Default::default() };

		let a = forest.fit(builder.build());
		let b = forest.fit(builder.build());

		assert_eq!(a, b);
		assert_eq!(a.trees().len(), 8);
	}

	#[test]
	fn forest_separates_clear_classes() {
		let builder = builder();
		let forest = RandomForestBuilder { n_trees: 16, seed: Some(7), ..Default::default() }
			.fit(builder.build());

		assert_eq!(forest.predict(&[2.0, 1.0]), 0.0);
		assert_eq!(forest.predict(&[18.0, 1.0]), 1.0);
		assert!(builder.build().evaluate(&forest) > 0.95);

		let p = forest.predict_proba(&[10.0, 3.0]);
		assert!((0.0..=1.0).contains(&p));
	}

	#[test]
	fn serialization_works() -> std::io::Result<()> {
		let builder = builder();
		let forest = RandomForestBuilder { n_trees: 4, seed: Some(1), ..Default::default() }
			.fit(builder.build());

		let mut buf = Vec::new();
		forest.serialize(&mut buf)?;
		let restored = RandomForestClassifier::deserialize(&mut buf.as_slice())?;

		assert_eq!(restored, forest);
		Ok(())
	}
}
