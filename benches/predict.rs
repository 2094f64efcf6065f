use chd_risk::random_forest::RandomForestBuilder;
use chd_risk::{FamilyHistory, LabeledRecord, PatientRecord, Pipeline};
use criterion::{criterion_group, criterion_main, Criterion};

fn pipeline() -> Pipeline {
	let records = (0..400)
		.map(|i| {
			let age = 20 + i % 60;
			let record = PatientRecord {
				sbp: 100.0 + (i % 120) as f64,
				ldl: (i % 10) as f64,
				adiposity: (i % 45) as f64,
				obesity: 15.0 + (i % 30) as f64,
				age,
				famhist: if i % 4 == 0 { FamilyHistory::Present } else { FamilyHistory::Absent },
			};
			LabeledRecord::new(record, (age > 45) as u8)
		})
		.collect::<Vec<_>>();

	let forest = RandomForestBuilder { seed: Some(0), ..Default::default() };
	Pipeline::fit(&records, &forest).expect("fit benchmark pipeline")
}

fn bench_predict_single(c: &mut Criterion) {
	let model = pipeline();
	let record = PatientRecord::default();

	c.bench_function("predict default patient", |b| {
		b.iter(|| {
			let _ = model.predict(&record);
		})
	});
}

fn bench_fit(c: &mut Criterion) {
	c.bench_function("fit 100 trees on 400 rows", |b| {
		b.iter(pipeline)
	});
}

criterion_group!(benches, bench_predict_single, bench_fit);
criterion_main!(benches);
