use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::random_forest::RandomForestBuilder;

#[derive(Parser, Debug)]
#[command(author, version, about = "Coronary heart disease risk: train a model or serve the risk form", long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Fit the preprocessing + random forest pipeline on a CSV and save it
	Fit(FitArgs),
	/// Label every row of a CSV with a saved model
	Predict(PredictArgs),
	/// Serve the patient form
	Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FitArgs {
	/// Training CSV with columns sbp, ldl, adiposity, obesity, age, famhist, chd
	#[arg(long, env = "CHD_DATA")]
	pub data: PathBuf,

	/// Where to write the fitted model
	#[arg(long, env = "CHD_MODEL", default_value = "Model.bin")]
	pub model: PathBuf,

	/// Number of trees
	#[arg(long, env = "CHD_TREES", default_value_t = 100, value_parser = clap::value_parser!(u16).range(1..))]
	pub trees: u16,

	/// Maximum tree depth (unlimited when absent)
	#[arg(long, env = "CHD_MAX_DEPTH")]
	pub max_depth: Option<usize>,

	/// Minimum rows a node needs before it is split
	#[arg(long, env = "CHD_MIN_SAMPLES_SPLIT", default_value_t = 2)]
	pub min_samples_split: usize,

	/// Bootstrap sample size per tree, as a share of the training rows
	#[arg(long, env = "CHD_BAG_AMOUNT", default_value_t = 1.0, value_parser = parse_bag_amount)]
	pub bag_amount: f64,

	/// Seed for reproducible fits
	#[arg(long, env = "CHD_SEED")]
	pub seed: Option<u64>,

	/// Share of rows held out to report accuracy; 0 fits on every row
	#[arg(long, env = "CHD_TEST_RATE", default_value_t = 0.0, value_parser = parse_test_rate)]
	pub test_rate: f64,
}

impl FitArgs {
	pub fn forest(&self) -> RandomForestBuilder {
		RandomForestBuilder {
			n_trees: self.trees as usize,
			max_depth: self.max_depth,
			min_samples_split: self.min_samples_split,
			bag_amount: self.bag_amount,
			seed: self.seed,
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
	/// CSV with columns sbp, ldl, adiposity, obesity, age, famhist
	#[arg(long, env = "CHD_DATA")]
	pub data: PathBuf,

	#[arg(long, env = "CHD_MODEL", default_value = "Model.bin")]
	pub model: PathBuf,

	/// Output CSV; input columns plus label and probability
	#[arg(long, env = "CHD_OUTPUT")]
	pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
	#[arg(long, env = "CHD_MODEL", default_value = "Model.bin")]
	pub model: PathBuf,

	#[arg(long, env = "CHD_BIND", default_value = "127.0.0.1:8501")]
	pub bind: SocketAddr,
}

fn parse_fraction(s: &str) -> Result<f64, String> {
	let value = s.parse::<f64>().map_err(|e| format!("{s:?} is not a number: {e}"))?;
	if !value.is_finite() {
		return Err(format!("{s:?} is not finite"));
	}
	Ok(value)
}

fn parse_bag_amount(s: &str) -> Result<f64, String> {
	let value = parse_fraction(s)?;
	if value <= 0.0 || value > 1.0 {
		return Err("Bag amount must be in (0, 1]".into());
	}
	Ok(value)
}

fn parse_test_rate(s: &str) -> Result<f64, String> {
	let value = parse_fraction(s)?;
	if !(0.0..1.0).contains(&value) {
		return Err("Test rate must be in [0, 1)".into());
	}
	Ok(value)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_bag_amount() {
		assert_eq!(parse_bag_amount("1"), Ok(1.0));
		assert_eq!(parse_bag_amount("0.5"), Ok(0.5));
		assert!(parse_bag_amount("0").is_err());
		assert!(parse_bag_amount("1.5").is_err());
		assert!(parse_bag_amount("NaN").is_err());
	}

	#[test]
	fn test_parse_test_rate() {
		assert_eq!(parse_test_rate("0"), Ok(0.0));
		assert_eq!(parse_test_rate("0.3"), Ok(0.3));
		assert!(parse_test_rate("1").is_err());
		assert!(parse_test_rate("-0.1").is_err());
		assert!(parse_test_rate("abc").unwrap_err().contains("not a number"));
	}

	#[test]
	fn test_fit_defaults() {
		let cli = Cli::try_parse_from(["chd-risk", "fit", "--data", "chd.csv"]).unwrap();
		let Command::Fit(args) = cli.command else {
			panic!("expected fit");
		};

		assert_eq!(args.model, PathBuf::from("Model.bin"));
		assert_eq!(args.test_rate, 0.0);

		let forest = args.forest();
		assert_eq!(forest.n_trees, 100);
		assert_eq!(forest.max_depth, None);
		assert_eq!(forest.bag_amount, 1.0);
		assert_eq!(forest.seed, None);
	}

	#[test]
	fn test_serve_bind() {
		let cli = Cli::try_parse_from(["chd-risk", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
		let Command::Serve(args) = cli.command else {
			panic!("expected serve");
		};

		assert_eq!(args.bind.port(), 9000);
	}

	#[test]
	fn test_zero_trees_rejected() {
		assert!(Cli::try_parse_from(["chd-risk", "fit", "--data", "x.csv", "--trees", "0"]).is_err());
	}
}
