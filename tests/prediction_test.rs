mod common;

use std::fs;

use common::{Constant, Failing, LinearRegressor, MagnitudeClassifier, Recording};
use quake_damage::{
    ArtifactStore, BuildError, DamageClass, DamageQuery, Dataset, EncodingError, InputError, LabelEncoder,
    LabelEncoderRegistry, ModelInvocationError, PredictionContext, PredictionError, Vocabulary,
};

#[test]
fn test_end_to_end_prediction() -> Result<(), Box<dyn std::error::Error>> {
    let context = common::stub_context();
    let query = DamageQuery::new("Reinforced Concrete Shear Wall (C1)", "Residential")
        .with_year_built(2000)
        .with_stories(0)
        .with_magnitude(5.0)
        .with_distance(3.0);

    let result = context.predict(&query)?;
    assert!(result.mean_damage_index.is_finite());
    assert!(DamageClass::ALL.contains(&result.damage_class));
    assert_eq!(result.damage_class, DamageClass::Safe);
    Ok(())
}

#[test]
fn test_class_follows_classifier_output() -> Result<(), Box<dyn std::error::Error>> {
    let context = common::stub_context();
    let base = DamageQuery::new("Unreinforced Masonry (URM)", "Commercial");

    assert_eq!(context.predict(&base.clone().with_magnitude(6.4))?.damage_class, DamageClass::HighRisk);
    assert_eq!(context.predict(&base.with_magnitude(7.8))?.damage_class, DamageClass::Collapsed);
    Ok(())
}

#[test]
fn test_both_models_score_the_same_vector() -> Result<(), Box<dyn std::error::Error>> {
    let (classifier, classifier_seen) = Recording::new(MagnitudeClassifier);
    let (regressor, regressor_seen) = Recording::new(LinearRegressor);
    let context = PredictionContext::builder()
        .with_dataset(common::fixture_dataset())
        .with_classifier(classifier)
        .with_regressor(regressor)
        .build()?;

    let query = DamageQuery::new("Steel Moment Frame (S1)", "Industrial")
        .with_year_built(2010)
        .with_stories(12)
        .with_magnitude(6.8)
        .with_distance(25.0);
    context.predict(&query)?;

    let classifier_seen = classifier_seen.lock().unwrap();
    let regressor_seen = regressor_seen.lock().unwrap();
    assert_eq!(classifier_seen.len(), 1);
    assert_eq!(*classifier_seen, *regressor_seen);
    assert_eq!(classifier_seen[0].values(), [4.0, 9.0, 2010.0, 12.0, 6.8, 25.0]);
    Ok(())
}

#[test]
fn test_year_bounds() {
    let context = common::stub_context();
    let base = DamageQuery::new("Wooden Frame (W1)", "Residential");

    assert!(context.predict(&base.clone().with_year_built(1985)).is_ok());
    assert!(context.predict(&base.clone().with_year_built(2017)).is_ok());

    for year in [1984, 2018] {
        let err = context.predict(&base.clone().with_year_built(year)).unwrap_err();
        assert!(
            matches!(err, PredictionError::Input(InputError::OutOfRange { field: "year_built", .. })),
            "year {} gave {:?}",
            year,
            err
        );
    }
}

#[test]
fn test_invalid_category_fails_closed() {
    let (regressor, seen) = Recording::new(LinearRegressor);
    let context = PredictionContext::builder()
        .with_dataset(common::fixture_dataset())
        .with_classifier(MagnitudeClassifier)
        .with_regressor(regressor)
        .build()
        .unwrap();

    let err = context
        .predict(&DamageQuery::new("Adobe Brick", "Residential"))
        .unwrap_err();
    assert!(matches!(err, PredictionError::Encoding(EncodingError::InvalidCategory(_))));
    assert!(seen.lock().unwrap().is_empty(), "no model may run after an encoding failure");
}

#[test]
fn test_model_failure_yields_no_result() {
    let query = DamageQuery::new("Wooden Frame (W1)", "Residential");

    let failing_classifier = PredictionContext::builder()
        .with_dataset(common::fixture_dataset())
        .with_classifier(Failing)
        .with_regressor(LinearRegressor)
        .build()
        .unwrap();
    assert!(matches!(
        failing_classifier.predict(&query),
        Err(PredictionError::Model(ModelInvocationError::ShapeMismatch { .. }))
    ));

    let failing_regressor = PredictionContext::builder()
        .with_dataset(common::fixture_dataset())
        .with_classifier(MagnitudeClassifier)
        .with_regressor(Failing)
        .build()
        .unwrap();
    assert!(failing_regressor.predict(&query).is_err());
}

#[test]
fn test_unmapped_or_invalid_outputs() {
    let query = DamageQuery::new("Wooden Frame (W1)", "Residential");
    let build = |class: f32, index: f32| {
        PredictionContext::builder()
            .with_dataset(common::fixture_dataset())
            .with_classifier(Constant(class))
            .with_regressor(Constant(index))
            .build()
            .unwrap()
    };

    assert!(matches!(
        build(3.0, 0.5).predict(&query),
        Err(PredictionError::Model(ModelInvocationError::UnmappedClass(3)))
    ));
    assert!(matches!(
        build(1.5, 0.5).predict(&query),
        Err(PredictionError::Model(ModelInvocationError::InvalidOutput { .. }))
    ));
    assert!(matches!(
        build(1.0, f32::NAN).predict(&query),
        Err(PredictionError::Model(ModelInvocationError::InvalidOutput { .. }))
    ));
    // Regression output is not bounded
    assert_eq!(build(2.0, 7.5).predict(&query).unwrap().mean_damage_index, 7.5);
}

#[test]
fn test_pinned_vocabulary_matches_dataset_fit() -> Result<(), Box<dyn std::error::Error>> {
    let dataset = common::fixture_dataset();
    let vocabulary = LabelEncoderRegistry::fit_dataset(&dataset).to_vocabulary();
    let parsed = Vocabulary::from_json(&vocabulary.to_json()?)?;

    let pinned = PredictionContext::builder()
        .with_vocabulary(parsed)
        .with_dataset(dataset)
        .with_classifier(MagnitudeClassifier)
        .with_regressor(LinearRegressor)
        .build()?;
    let fitted = common::stub_context();
    assert_eq!(pinned.registry(), fitted.registry());

    let query = DamageQuery::new("Precast Concrete (PC1)", "Educational").with_magnitude(6.2);
    assert_eq!(pinned.predict(&query)?, fitted.predict(&query)?);
    Ok(())
}

#[test]
fn test_vocabulary_drift_is_rejected() {
    let mut registry = LabelEncoderRegistry::fit_dataset(&common::fixture_dataset());
    // Reverse the occupancy order, as if the models were trained on a different encoding
    let reversed: Vec<String> = registry
        .encoder("occ_type")
        .unwrap()
        .classes()
        .iter()
        .rev()
        .cloned()
        .collect();
    registry.insert(LabelEncoder::from_classes("occ_type", reversed));

    let result = PredictionContext::builder()
        .with_vocabulary(registry.to_vocabulary())
        .with_dataset(common::fixture_dataset())
        .with_classifier(MagnitudeClassifier)
        .with_regressor(LinearRegressor)
        .build();
    assert!(matches!(result, Err(BuildError::VocabularyDrift { ref column }) if column == "occ_type"));
}

#[test]
fn test_pinned_vocabulary_file_with_dataset_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path());
    fs::copy(common::fixture_path(), store.dataset_path())?;

    let pinned = store.pin_vocabulary(None)?;
    assert!(store.vocabulary_path().exists());
    assert!(pinned.model_hashes.is_empty());

    let context = PredictionContext::builder()
        .with_vocabulary_file(store.vocabulary_path())?
        .with_dataset_file(store.dataset_path())?
        .with_classifier(MagnitudeClassifier)
        .with_regressor(LinearRegressor)
        .build()?;
    assert_eq!(context.registry(), common::stub_context().registry());

    let query = DamageQuery::new("Wooden Frame (W1)", "Residential").with_magnitude(6.9);
    assert_eq!(context.predict(&query)?.damage_class, DamageClass::HighRisk);

    // A dataset gaining RES2 shifts every later occupancy code
    let mut drifted = fs::read_to_string(common::fixture_path())?;
    drifted.push_str("99,W1,RES2,1999,2,5.0,3.0,0.1,0\n");
    fs::write(store.dataset_path(), drifted)?;

    let result = PredictionContext::builder()
        .with_vocabulary_file(store.vocabulary_path())?
        .with_dataset_file(store.dataset_path())?
        .with_classifier(MagnitudeClassifier)
        .with_regressor(LinearRegressor)
        .build();
    assert!(matches!(result, Err(BuildError::VocabularyDrift { ref column }) if column == "occ_type"));
    Ok(())
}

#[test]
fn test_build_requirements() {
    assert!(matches!(
        PredictionContext::builder()
            .with_classifier(MagnitudeClassifier)
            .with_regressor(LinearRegressor)
            .build(),
        Err(BuildError::MissingVocabulary)
    ));

    assert!(matches!(
        PredictionContext::builder()
            .with_dataset(common::fixture_dataset())
            .with_regressor(LinearRegressor)
            .build(),
        Err(BuildError::MissingPredictor("classifier"))
    ));

    let no_occupancy = Dataset::from_bytes(b"struct_typ,year_built\nW1,1990\n").unwrap();
    assert!(matches!(
        PredictionContext::builder()
            .with_dataset(no_occupancy)
            .with_classifier(MagnitudeClassifier)
            .with_regressor(LinearRegressor)
            .build(),
        Err(BuildError::Dataset(_))
    ));
}
