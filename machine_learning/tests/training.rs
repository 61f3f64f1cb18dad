use std::fs;

use machine_learning::{
    MlErr, ModelArtifact, Predictor, Record, Trainer, TrainingConfig, Value,
    training::{DEFAULT_FEATURES, DEFAULT_TARGETS},
};

// Rows are deliberately out of date order.
const DATASET: &str = "\
date,weight_kg,height_cm,age,sex,waist_cm,hip_cm,steps,training_minutes,calories,body_fat_pct,lean_mass_kg,bmr
2024-01-05,82.0,180,34,M,90,98,8000,45,2500,21.5,64.4,1780
2024-01-01,80.5,180,34,M,91,99,6500,30,2600,22.4,62.5,1765
2024-01-02,61.2,165,29,F,72,96,10200,60,1900,26.1,45.2,1390
2024-01-03,60.8,165,29,F,71,95,11000,50,1850,25.7,45.2,1385
2024-01-04,95.3,185,45,M,104,108,4000,0,3100,28.9,67.8,1905
2024-01-06,94.1,185,45,M,102,107,5200,20,2900,28.1,67.7,1890
2024-01-07,70.0,172,38,F,80,101,7600,35,2100,30.2,48.9,1420
2024-01-08,69.4,172,38,F,79,100,9100,40,2050,29.6,48.9,1415
2024-01-09,76.9,176,25,M,84,94,12000,75,2700,15.3,65.1,1790
2024-01-10,76.2,176,25,M,83,94,12500,80,2750,14.8,64.9,1785
2024-01-11,58.3,160,52,F,78,99,6000,15,1700,33.0,39.1,1230
2024-01-12,57.9,160,52,F,77,98,6400,20,1680,32.6,39.0,1228
";

fn train(config: TrainingConfig) -> ModelArtifact {
    let table = machine_learning::Table::from_csv_str(DATASET).unwrap();
    Trainer::new(config).train(table).unwrap().artifact
}

fn write_json(value: &serde_json::Value) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, serde_json::to_vec(value).unwrap()).unwrap();
    (dir, path)
}

fn first_split(value: &mut serde_json::Value) -> Option<&mut serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => {
            if map.contains_key("split") {
                return map.get_mut("split");
            }
            map.values_mut().find_map(first_split)
        }
        serde_json::Value::Array(items) => items.iter_mut().find_map(first_split),
        _ => None,
    }
}

fn full_record() -> Record {
    let mut record = Record::new();
    record.insert("weight_kg".into(), Value::Float(78.0));
    record.insert("height_cm".into(), Value::Int(178));
    record.insert("age".into(), Value::Int(33));
    record.insert("sex".into(), Value::from("M"));
    record.insert("waist_cm".into(), Value::Int(88));
    record.insert("hip_cm".into(), Value::Int(97));
    record.insert("steps".into(), Value::Int(9000));
    record.insert("training_minutes".into(), Value::Int(40));
    record.insert("calories".into(), Value::Int(2500));
    record
}

#[test]
fn end_to_end_prediction_returns_every_target() {
    let predictor = Predictor::new(train(TrainingConfig::default()));

    assert_eq!(predictor.features(), DEFAULT_FEATURES);
    assert_eq!(predictor.targets(), DEFAULT_TARGETS);

    let prediction = predictor.predict(&full_record()).unwrap();
    assert_eq!(prediction.len(), 3);
    assert_eq!(prediction.targets().collect::<Vec<_>>(), DEFAULT_TARGETS);
    assert!(prediction.iter().all(|(_, v)| v.is_finite()));

    // Forests average training targets, so predictions stay within their range.
    let bmr = prediction.get("bmr").unwrap();
    assert!((1228.0..=1905.0).contains(&bmr), "bmr out of range: {bmr}");
}

#[test]
fn twelve_rows_hold_out_the_last_three() {
    let table = machine_learning::Table::from_csv_str(DATASET).unwrap();
    let config = TrainingConfig::default().with_n_estimators(10);

    let report = Trainer::new(config).train(table).unwrap();

    assert!(report.held_out);
    assert_eq!((report.train_rows, report.validation_rows), (9, 3));
    assert_eq!(
        report.artifact.mae().keys().collect::<Vec<_>>(),
        ["bmr", "body_fat_pct", "lean_mass_kg"]
    );
    assert!(report.artifact.mae().values().all(|v| *v >= 0.0));
}

#[test]
fn missing_feature_is_a_schema_error_naming_it() {
    let predictor = Predictor::new(train(TrainingConfig::default().with_n_estimators(10)));

    let mut record = full_record();
    record.remove("age");

    assert_eq!(predictor.missing_features(&record), ["age"]);

    let err = predictor.predict(&record).unwrap_err();
    assert!(err.is_schema_error());
    assert!(matches!(&err, MlErr::MissingFeatures(names) if names == &["age"]));
    assert!(err.to_string().contains("age"));
}

#[test]
fn extra_keys_are_ignored() {
    let predictor = Predictor::new(train(TrainingConfig::default().with_n_estimators(10)));

    let base = predictor.predict(&full_record()).unwrap();

    let mut record = full_record();
    record.insert("mood".into(), Value::from("great"));
    assert_eq!(predictor.predict(&record).unwrap(), base);
}

#[test]
fn unseen_category_silently_predicts() {
    // Unknown categories encode to an all-zero block instead of failing.
    let predictor = Predictor::new(train(TrainingConfig::default().with_n_estimators(10)));

    let mut record = full_record();
    record.insert("sex".into(), Value::from("X"));

    let first = predictor.predict(&record).unwrap();
    let second = predictor.predict(&record).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn text_in_numeric_feature_is_a_schema_error() {
    let predictor = Predictor::new(train(TrainingConfig::default().with_n_estimators(10)));

    let mut record = full_record();
    record.insert("steps".into(), Value::from("many"));

    let err = predictor.predict(&record).unwrap_err();
    assert!(err.is_schema_error());
    assert!(err.to_string().contains("steps"));
}

#[test]
fn save_then_load_preserves_the_artifact() {
    let artifact = train(TrainingConfig::default().with_n_estimators(20));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models").join("nested").join("model.json");
    artifact.save(&path).unwrap();

    let loaded = ModelArtifact::load(&path).unwrap();
    assert_eq!(loaded.features(), artifact.features());
    assert_eq!(loaded.targets(), artifact.targets());
    assert_eq!(loaded.mae(), artifact.mae());
    assert_eq!(loaded, artifact);

    let before = Predictor::new(artifact).predict(&full_record()).unwrap();
    let after = Predictor::new(loaded).predict(&full_record()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn artifact_without_mae_loads_with_an_empty_map() {
    let artifact = train(TrainingConfig::default().with_n_estimators(5));

    let mut json = serde_json::to_value(&artifact).unwrap();
    json.as_object_mut().unwrap().remove("mae");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

    let predictor = Predictor::load(&path).unwrap();
    assert!(predictor.mae().is_empty());
    assert_eq!(predictor.predict(&full_record()).unwrap().len(), 3);
}

#[test]
fn same_seed_trains_the_same_model() {
    let config = TrainingConfig::default().with_n_estimators(15);
    assert_eq!(train(config.clone()), train(config));
}

#[test]
fn csv_missing_columns_fails_listing_them() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    fs::write(&path, "weight_kg,age,bmr\n70,30,1500\n").unwrap();

    let config = TrainingConfig::default().with_n_estimators(5);
    match Trainer::new(config).train_csv(&path) {
        Err(MlErr::MissingColumns { features, targets }) => {
            assert_eq!(
                features,
                [
                    "height_cm",
                    "sex",
                    "waist_cm",
                    "hip_cm",
                    "steps",
                    "training_minutes",
                    "calories"
                ]
            );
            assert_eq!(targets, ["body_fat_pct", "lean_mass_kg"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unreadable_csv_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Trainer::default()
        .train_csv(dir.path().join("missing.csv"))
        .unwrap_err();
    assert!(matches!(err, MlErr::Io(_)));
}

#[test]
fn out_of_range_child_fails_to_load() {
    let artifact = train(TrainingConfig::default().with_n_estimators(5));
    let mut json = serde_json::to_value(&artifact).unwrap();
    first_split(&mut json).unwrap()["left"] = 999.into();

    let (_dir, path) = write_json(&json);
    let err = Predictor::load(&path).unwrap_err();

    assert!(matches!(err, MlErr::CorruptArtifact(_)), "got {err:?}");
    assert!(!err.is_schema_error());
}

#[test]
fn cyclic_tree_fails_to_load() {
    let artifact = train(TrainingConfig::default().with_n_estimators(5));
    let mut json = serde_json::to_value(&artifact).unwrap();
    first_split(&mut json).unwrap()["left"] = 0.into();

    let (_dir, path) = write_json(&json);
    assert!(matches!(
        Predictor::load(&path),
        Err(MlErr::CorruptArtifact(_))
    ));
}

#[test]
fn missing_estimator_fails_to_load() {
    let artifact = train(TrainingConfig::default().with_n_estimators(5));
    let mut json = serde_json::to_value(&artifact).unwrap();
    json["model"]["model"]["estimators"]
        .as_array_mut()
        .unwrap()
        .pop();

    let (_dir, path) = write_json(&json);
    assert!(matches!(
        Predictor::load(&path),
        Err(MlErr::CorruptArtifact(_))
    ));
}

#[test]
fn infinite_cells_fail_training() {
    let config = TrainingConfig::default()
        .with_features(["x"])
        .with_targets(["y"])
        .with_n_estimators(5);

    let table = machine_learning::Table::from_csv_str("x,y\n1,10\n2,inf\n3,30\n").unwrap();
    let err = Trainer::new(config.clone()).train(table).unwrap_err();
    assert!(
        matches!(&err, MlErr::NonFiniteValue { column, row: 1 } if column == "y"),
        "got {err:?}"
    );

    let table = machine_learning::Table::from_csv_str("x,y\n1,10\n-inf,20\n3,30\n").unwrap();
    let err = Trainer::new(config).train(table).unwrap_err();
    assert!(matches!(&err, MlErr::NonFiniteValue { column, .. } if column == "x"));
}

#[test]
fn rows_are_sorted_by_date_before_the_holdout() {
    // Only the two latest dates have a non-zero target. Once sorted they're the whole
    // validation set, so every tree is trained on zeros and misses them by exactly 100.
    // Lexicographic or file order would leak them into training.
    let csv = "\
date,x,y
10,10,100
3,3,0
9,9,100
1,1,0
5,5,0
2,2,0
8,8,0
4,4,0
7,7,0
6,6,0
";
    let table = machine_learning::Table::from_csv_str(csv).unwrap();
    let config = TrainingConfig::default()
        .with_features(["x"])
        .with_targets(["y"])
        .with_n_estimators(10);

    let report = Trainer::new(config).train(table).unwrap();

    assert_eq!((report.train_rows, report.validation_rows), (8, 2));
    assert_eq!(report.artifact.mae()["y"], 100.0);
}
