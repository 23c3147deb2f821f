use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quake_damage::{
    Dataset, DamageQuery, FeatureVector, FeatureVectorBuilder, LabelEncoderRegistry,
    ModelInvocationError, PredictionContext, Predictor,
};

const DATASET: &[u8] = include_bytes!("../tests/fixtures/building_damage.csv");

#[derive(Debug)]
struct Constant(f32);

impl Predictor for Constant {
    fn name(&self) -> &str {
        "constant"
    }

    fn predict(&self, _features: &FeatureVector) -> Result<f32, ModelInvocationError> {
        Ok(self.0)
    }
}

fn bench_fitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fitting");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("read_dataset", |b| b.iter(|| {
        Dataset::from_bytes(black_box(DATASET)).unwrap()
    }));

    let dataset = Dataset::from_bytes(DATASET).unwrap();
    group.bench_function("fit_registry", |b| b.iter(|| {
        LabelEncoderRegistry::fit_dataset(black_box(&dataset))
    }));

    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let registry = LabelEncoderRegistry::fit_dataset(&Dataset::from_bytes(DATASET).unwrap());
    let builder = FeatureVectorBuilder::new(&registry);
    let query = DamageQuery::new("Reinforced Concrete Shear Wall (C1)", "Commercial");

    let mut group = c.benchmark_group("Encoding");
    group.bench_function("build_vector", |b| b.iter(|| {
        builder.build(black_box(&query)).unwrap()
    }));
    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let context = PredictionContext::builder()
        .with_dataset(Dataset::from_bytes(DATASET).unwrap())
        .with_classifier(Constant(1.0))
        .with_regressor(Constant(0.5))
        .build()
        .unwrap();
    let query = DamageQuery::new("Wooden Frame (W1)", "Residential").with_magnitude(6.5);

    let mut group = c.benchmark_group("Prediction");
    group.bench_function("stub_models", |b| b.iter(|| {
        context.predict(black_box(&query)).unwrap()
    }));
    group.finish();
}

criterion_group!(benches, bench_fitting, bench_encoding, bench_prediction);
criterion_main!(benches);
