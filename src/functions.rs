use std::collections::HashMap;
use ordered_float::OrderedFloat;

pub const POSITIVE: f64 = 1.0;
pub const NEGATIVE: f64 = 0.0;

pub fn histogram(values: impl Iterator<Item = f64>) -> (HashMap<OrderedFloat<f64>, usize>, usize) {
	let mut histogram = HashMap::new();
	let mut len = 0;

	for value in values {
		*histogram.entry(OrderedFloat(value)).or_default() += 1;
		len += 1;
	}

	(histogram, len)
}

pub fn gini_val(histogram: &HashMap<OrderedFloat<f64>, usize>, len: usize) -> f64 {
	if len == 0 {
		return 0.0;
	}

	1.0 - histogram
		.values()
		.map(|&n| (n as f64 / len as f64).powi(2))
		.sum::<f64>()
}

pub fn gini(values: impl Iterator<Item = f64>) -> f64 {
	let (histogram, len) = histogram(values);
	gini_val(&histogram, len)
}

/// Most frequent value; ties resolve to the smallest value. `None` when empty.
pub fn most_frequent(values: impl Iterator<Item = f64>) -> Option<f64> {
	let (histogram, _) = histogram(values);

	histogram
		.into_iter()
		.max_by_key(|&(k, v)| (v, -k))
		.map(|(k, _)| k.into_inner())
}

/// Share of values equal to `POSITIVE`.
pub fn positive_fraction(values: impl Iterator<Item = f64>) -> f64 {
	let (positive, len) = values.fold((0usize, 0usize), |(p, n), v| {
		(p + (v == POSITIVE) as usize, n + 1)
	});

	if len == 0 {
		0.0
	} else {
		positive as f64 / len as f64
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn gini_of_pure_set_is_zero() {
		assert_eq!(gini([1.0, 1.0, 1.0].iter().copied()), 0.0);
	}

	#[test]
	fn gini_of_even_binary_split() {
		assert!((gini([0.0, 1.0, 0.0, 1.0].iter().copied()) - 0.5).abs() < 1e-12);
	}

	#[test]
	fn most_frequent_breaks_ties_towards_smaller_class() {
		assert_eq!(most_frequent([1.0, 0.0].iter().copied()), Some(0.0));
		assert_eq!(most_frequent([1.0, 1.0, 0.0].iter().copied()), Some(1.0));
		assert_eq!(most_frequent(std::iter::empty()), None);
	}

	#[test]
	fn positive_fraction_counts_ones() {
		assert_eq!(positive_fraction([1.0, 0.0, 1.0, 1.0].iter().copied()), 0.75);
		assert_eq!(positive_fraction(std::iter::empty()), 0.0);
	}
}
