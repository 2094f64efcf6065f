use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::config::{FitArgs, PredictArgs, ServeArgs};
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::record::FamilyHistory;
use crate::training_data::{self, train_test_split};
use crate::web::{self, AppState, ModelCache};

pub fn fit(args: &FitArgs) -> Result<Pipeline> {
	info!("Reading dataset {} ...", args.data.display());
	let records = training_data::read(&args.data)?;

	let (train, test) = if args.test_rate > 0.0 {
		let mut rng = match args.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};
		train_test_split(&records, &mut rng, args.test_rate)
	} else {
		(records, Vec::new())
	};
	info!("Training on {} rows, holding out {}", train.len(), test.len());

	let pipeline = Pipeline::fit(&train, &args.forest())?;

	if !test.is_empty() {
		info!("Classification rate test: {:.3}%", pipeline.evaluate(&test)? * 100.0);
		info!("Classification rate train: {:.3}%", pipeline.evaluate(&train)? * 100.0);
	}

	pipeline.save(&args.model)?;
	info!("Model exported to {}", args.model.display());

	Ok(pipeline)
}

#[derive(Debug, Serialize)]
struct PredictionRow {
	sbp: f64,
	ldl: f64,
	adiposity: f64,
	obesity: f64,
	age: u32,
	famhist: FamilyHistory,
	label: u8,
	probability: f64,
}

/// Labels every row of `args.data` and writes them to `args.output`. Returns the row count.
pub fn predict(args: &PredictArgs) -> Result<usize> {
	let pipeline = Pipeline::load(&args.model)?;
	let records = training_data::read_records(&args.data)?;

	info!("Classifying {} rows ...", records.len());
	let mut writer = csv::Writer::from_path(&args.output)?;

	for record in &records {
		let prediction = pipeline.predict(record)?;

		writer.serialize(PredictionRow {
			sbp: record.sbp,
			ldl: record.ldl,
			adiposity: record.adiposity,
			obesity: record.obesity,
			age: record.age,
			famhist: record.famhist,
			label: prediction.label.value(),
			probability: prediction.probability,
		})?;
	}

	writer.flush()?;
	info!("Wrote predictions to {}", args.output.display());

	Ok(records.len())
}

pub async fn serve(args: ServeArgs) -> Result<()> {
	let state = AppState::new(ModelCache::new(args.model));
	web::serve(web::router(state), args.bind).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pipeline::tests::cohort;
	use std::io::Write;

	fn write_cohort() -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "sbp,ldl,adiposity,obesity,age,famhist,chd").unwrap();
		for r in cohort() {
			writeln!(file, "{},{},{},{},{},{},{}", r.sbp, r.ldl, r.adiposity, r.obesity, r.age, r.famhist, r.chd).unwrap();
		}
		file
	}

	fn fit_args(data: &tempfile::NamedTempFile, model: &std::path::Path, test_rate: f64) -> FitArgs {
		FitArgs {
			data: data.path().to_path_buf(),
			model: model.to_path_buf(),
			trees: 10,
			max_depth: None,
			min_samples_split: 2,
			bag_amount: 1.0,
			seed: Some(5),
			test_rate,
		}
	}

	#[test]
	fn fit_writes_a_loadable_artifact() -> Result<()> {
		let data = write_cohort();
		let dir = tempfile::tempdir()?;
		let model = dir.path().join("Model.bin");

		let fitted = fit(&fit_args(&data, &model, 0.0))?;
		let loaded = Pipeline::load(&model)?;

		assert_eq!(loaded, fitted);
		Ok(())
	}

	#[test]
	fn fit_with_holdout_still_saves() -> Result<()> {
		let data = write_cohort();
		let dir = tempfile::tempdir()?;
		let model = dir.path().join("Model.bin");

		fit(&fit_args(&data, &model, 0.25))?;
		assert!(model.exists());
		Ok(())
	}

	#[test]
	fn fit_aborts_on_missing_data() {
		let dir = tempfile::tempdir().unwrap();
		let args = FitArgs {
			data: dir.path().join("missing.csv"),
			..fit_args(&write_cohort(), &dir.path().join("Model.bin"), 0.0)
		};

		assert!(fit(&args).is_err());
		assert!(!dir.path().join("Model.bin").exists());
	}

	#[test]
	fn predict_writes_one_row_per_input() -> Result<()> {
		let data = write_cohort();
		let dir = tempfile::tempdir()?;
		let model = dir.path().join("Model.bin");
		fit(&fit_args(&data, &model, 0.0))?;

		let output = dir.path().join("out.csv");
		let rows = predict(&PredictArgs {
			data: data.path().to_path_buf(),
			model,
			output: output.clone(),
		})?;
		assert_eq!(rows, cohort().len());

		let mut reader = csv::Reader::from_path(&output)?;
		let headers = reader.headers()?.clone();
		assert_eq!(headers.len(), 8);
		assert_eq!(&headers[6], "label");

		for row in reader.records() {
			let row = row?;
			assert!(matches!(&row[6], "0" | "1"));
			let p = row[7].parse::<f64>().unwrap();
			assert!((0.0..=1.0).contains(&p));
		}

		Ok(())
	}
}
