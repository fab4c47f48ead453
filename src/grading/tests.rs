//! Tests for the grading service.

use super::*;
use crate::adapters::RiskLevel;
use crate::classification::DistanceMetric;
use crate::config::GraderConfig;
use crate::error::{HeveaError, Result};

/// A source whose backing store is down.
struct Offline;

impl CorpusSource for Offline {
    fn load(&self) -> Result<Vec<GradedSample>> {
        Err(HeveaError::CorpusUnavailable("connection refused".into()))
    }
}

/// A source that fails for a reason other than availability.
struct Corrupt;

impl CorpusSource for Corrupt {
    fn load(&self) -> Result<Vec<GradedSample>> {
        Err(HeveaError::validation("row 3 has a negative DRC"))
    }
}

fn grader() -> QualityGrader {
    QualityGrader::new(GraderConfig::default())
}

fn premium() -> LabMeasurement {
    LabMeasurement::new(65.5, 0.5, 0.3, 9.0)
}

fn poor() -> LabMeasurement {
    LabMeasurement::new(25.0, 3.5, 2.8, 3.5)
}

/// Two tight historical clusters, graded by DRC.
fn history() -> Vec<GradedSample> {
    let mut samples = Vec::new();
    for i in 0..5 {
        let offset = f64::from(i) * 0.1;
        samples.push(GradedSample::from_measurement(LabMeasurement::new(
            70.0 + offset,
            0.2,
            0.2,
            9.0,
        )));
        samples.push(GradedSample::from_measurement(LabMeasurement::new(
            50.0 + offset,
            3.0,
            3.0,
            3.0,
        )));
    }
    samples
}

#[test]
fn test_premium_sample_is_grade_a_for_both_engines() {
    for algorithm in [Algorithm::Knn, Algorithm::DecisionTree] {
        let result = grader()
            .classify(&premium(), &NoHistory, algorithm)
            .expect("classify");
        assert_eq!(result.grade, QualityGrade::A, "{algorithm}");
    }
}

#[test]
fn test_poor_sample_is_grade_d_for_both_engines() {
    for algorithm in [Algorithm::Knn, Algorithm::DecisionTree] {
        let result = grader()
            .classify(&poor(), &NoHistory, algorithm)
            .expect("classify");
        assert_eq!(result.grade, QualityGrade::D, "{algorithm}");
    }
}

#[test]
fn test_empty_history_uses_synthetic_corpus() {
    let result = grader()
        .classify(&premium(), &NoHistory, Algorithm::Knn)
        .expect("classify");
    assert_eq!(result.model_info.corpus_origin, CorpusOrigin::Synthetic);
    assert_eq!(result.model_info.training_samples, 120);
}

#[test]
fn test_feature_set_follows_viscosity() {
    let without = grader()
        .classify(&premium(), &NoHistory, Algorithm::Knn)
        .expect("classify");
    assert_eq!(
        without.model_info.features,
        vec!["drcPercentage", "moistureContent", "impurities", "colorScore"]
    );

    let with = grader()
        .classify(&premium().with_viscosity(6.0), &NoHistory, Algorithm::DecisionTree)
        .expect("classify");
    assert_eq!(with.model_info.features.len(), 5);
    assert_eq!(with.model_info.features[4], "viscosity");
    assert_eq!(with.grade, QualityGrade::A);
}

#[test]
fn test_knn_explanation_lists_neighbors() {
    let result = grader()
        .classify(&premium(), &NoHistory, Algorithm::Knn)
        .expect("classify");
    let Explanation::Neighbors { neighbors, votes } = &result.explanation else {
        panic!("expected neighbors, got {:?}", result.explanation);
    };
    assert_eq!(neighbors.len(), 3);
    assert!(neighbors.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert_eq!(votes[0].label, result.grade);
    assert!((result.confidence - votes[0].votes as f64 / 3.0).abs() < 1e-12);
    assert_eq!(
        result.model_info.hyperparameters,
        Hyperparameters::Knn(KnnHyperparameters {
            k: 3,
            distance_metric: DistanceMetric::Euclidean,
            normalized: true,
        })
    );
}

#[test]
fn test_tree_explanation_is_decision_path() {
    let result = grader()
        .classify(&poor(), &NoHistory, Algorithm::DecisionTree)
        .expect("classify");
    let Explanation::DecisionPath { steps, leaf_samples } = &result.explanation else {
        panic!("expected decision path, got {:?}", result.explanation);
    };
    assert!(!steps.is_empty());
    assert!(*leaf_samples > 0);
    assert_eq!(steps[0].feature, "drcPercentage");
    assert!((0.0..=1.0).contains(&result.confidence));

    match result.model_info.hyperparameters {
        Hyperparameters::DecisionTree(tree) => {
            assert_eq!(tree.max_depth, 5);
            assert!(tree.depth.expect("fitted") <= 5);
            assert!(tree.n_leaves.expect("fitted") >= 4);
        }
        other => panic!("expected tree hyperparameters, got {other:?}"),
    }
}

#[test]
fn test_historical_corpus_preferred() {
    let history = history();
    let result = grader()
        .classify(&LabMeasurement::new(69.0, 0.3, 0.3, 8.5), &history, Algorithm::Knn)
        .expect("classify");
    assert_eq!(result.model_info.corpus_origin, CorpusOrigin::Historical);
    assert_eq!(result.model_info.training_samples, 10);
    assert_eq!(result.grade, QualityGrade::A);
}

#[test]
fn test_min_historical_samples_threshold() {
    let config = GraderConfig {
        min_historical_samples: 50,
        ..GraderConfig::default()
    };
    let result = QualityGrader::new(config)
        .classify(&premium(), &history(), Algorithm::Knn)
        .expect("classify");
    assert_eq!(result.model_info.corpus_origin, CorpusOrigin::Synthetic);
}

#[test]
fn test_unavailable_source_falls_back() {
    let result = grader()
        .classify(&poor(), &Offline, Algorithm::DecisionTree)
        .expect("fallback");
    assert_eq!(result.model_info.corpus_origin, CorpusOrigin::Synthetic);
    assert_eq!(result.grade, QualityGrade::D);
}

#[test]
fn test_other_source_errors_propagate() {
    let err = grader()
        .classify(&poor(), &Corrupt, Algorithm::Knn)
        .expect_err("corrupt source");
    assert!(matches!(err, HeveaError::Validation { .. }));
}

#[test]
fn test_recorded_grade_overrides_drc_band() {
    // Recorded grades win over DRC banding, so this corpus teaches "C".
    let history: Vec<GradedSample> = (0..4)
        .map(|i| GradedSample {
            measurement: LabMeasurement::new(70.0 + f64::from(i), 0.2, 0.2, 9.0),
            grade: Some(QualityGrade::C),
        })
        .collect();
    let result = grader()
        .classify(&premium(), &history, Algorithm::DecisionTree)
        .expect("classify");
    assert_eq!(result.grade, QualityGrade::C);
    assert!((result.confidence - 1.0).abs() < 1e-12);
}

#[test]
fn test_compare_agreement() {
    let comparison = grader().compare(&premium(), &NoHistory).expect("compare");
    assert!(comparison.agree);
    assert!(!comparison.needs_manual_review());
    assert_eq!(comparison.knn.model_info.algorithm, Algorithm::Knn);
    assert_eq!(
        comparison.decision_tree.model_info.algorithm,
        Algorithm::DecisionTree
    );
}

#[test]
fn test_compare_flags_disagreement() {
    // DRC says B, every other feature says A: the tree splits on DRC alone.
    let borderline = LabMeasurement::new(64.0, 0.3, 0.3, 9.0);
    let comparison = grader().compare(&borderline, &NoHistory).expect("compare");
    assert_eq!(comparison.knn.grade, QualityGrade::A);
    assert_eq!(comparison.decision_tree.grade, QualityGrade::B);
    assert!(comparison.needs_manual_review());
}

#[test]
fn test_describe_synthetic_corpus() {
    let summary = grader().describe_corpus(&NoHistory).expect("describe");
    assert_eq!(summary.training_samples, 120);
    assert_eq!(summary.corpus_origin, CorpusOrigin::Synthetic);
    assert_eq!(summary.class_distribution.len(), 4);
    assert!(summary.class_distribution.values().all(|&n| n == 30));
    assert_eq!(summary.features.len(), 5);
    assert_eq!(summary.knn.k, 3);
    assert_eq!(summary.decision_tree.depth, None);
}

#[test]
fn test_describe_historical_corpus() {
    let summary = grader().describe_corpus(&history()).expect("describe");
    assert_eq!(summary.corpus_origin, CorpusOrigin::Historical);
    assert_eq!(summary.class_distribution.get(&QualityGrade::A), Some(&5));
    assert_eq!(summary.class_distribution.get(&QualityGrade::D), Some(&5));
    assert_eq!(summary.class_distribution.get(&QualityGrade::B), None);
}

#[test]
fn test_screen_flags_outlier() {
    let outlier = LabMeasurement::new(90.0, 10.0, 10.0, 0.0);
    let result = grader().screen(&outlier, &NoHistory).expect("screen");
    assert!(result.report.is_anomaly);
    assert_eq!(result.report.risk_level, RiskLevel::High);
    assert_eq!(result.k, 5);
    assert_eq!(result.training_samples, 120);
}

#[test]
fn test_screen_accepts_typical_sample() {
    let result = grader().screen(&premium(), &NoHistory).expect("screen");
    assert!(!result.report.is_anomaly);
    assert_eq!(result.report.risk_level, RiskLevel::Normal);
}

#[test]
fn test_screen_never_flags_historical_sample() {
    let history = history();
    let config = GraderConfig {
        anomaly: crate::config::AnomalySettings { k: 5, threshold: 1e-9 },
        ..GraderConfig::default()
    };
    let grader = QualityGrader::new(config);
    for sample in &history {
        let result = grader.screen(&sample.measurement, &history).expect("screen");
        assert!(!result.report.is_anomaly);
    }
}

#[test]
fn test_result_json_shape() {
    let result = grader()
        .classify(&premium(), &NoHistory, Algorithm::Knn)
        .expect("classify");
    let json = serde_json::to_value(&result).expect("serialize");

    assert_eq!(json["grade"], "A");
    assert_eq!(json["explanation"]["type"], "neighbors");
    assert!(json["explanation"]["neighbors"].is_array());
    assert_eq!(json["modelInfo"]["algorithm"], "knn");
    assert_eq!(json["modelInfo"]["trainingSamples"], 120);
    assert_eq!(json["modelInfo"]["corpusOrigin"], "synthetic");
    assert_eq!(json["modelInfo"]["hyperparameters"]["distanceMetric"], "euclidean");

    let tree = grader()
        .classify(&premium(), &NoHistory, Algorithm::DecisionTree)
        .expect("classify");
    let json = serde_json::to_value(&tree).expect("serialize");
    assert_eq!(json["explanation"]["type"], "decisionPath");
    assert!(json["explanation"]["leafSamples"].is_u64());
    assert_eq!(json["modelInfo"]["hyperparameters"]["maxDepth"], 5);
}

#[test]
fn test_algorithm_parsing() {
    assert_eq!("knn".parse::<Algorithm>().expect("parse"), Algorithm::Knn);
    assert_eq!(
        "decision-tree".parse::<Algorithm>().expect("parse"),
        Algorithm::DecisionTree
    );
    assert_eq!("TREE".parse::<Algorithm>().expect("parse"), Algorithm::DecisionTree);
    assert!("svm".parse::<Algorithm>().is_err());
}

#[test]
fn test_graded_sample_json_defaults() {
    let sample: GradedSample = serde_json::from_str(
        r#"{"drcPercentage": 61.0, "moistureContent": 1.0, "impurities": 1.0, "colorScore": 7.0}"#,
    )
    .expect("parse");
    assert_eq!(sample.measurement.viscosity, None);
    assert_eq!(sample.label(), QualityGrade::B);
    assert_eq!(sample.measurement.full_features()[4], DEFAULT_VISCOSITY);

    let graded: GradedSample = serde_json::from_str(
        r#"{"drcPercentage": 61.0, "moistureContent": 1.0, "impurities": 1.0, "colorScore": 7.0, "viscosity": 4.5, "grade": "C"}"#,
    )
    .expect("parse");
    assert_eq!(graded.label(), QualityGrade::C);
    assert_eq!(graded.measurement.viscosity, Some(4.5));
}

#[test]
fn test_graded_sample_missing_lab_fields_default() {
    let sample: GradedSample =
        serde_json::from_str(r#"{"drcPercentage": 66.0, "impurities": 0.2}"#).expect("parse");
    assert_eq!(sample.measurement.moisture_content, 0.0);
    assert_eq!(sample.measurement.impurities, 0.2);
    assert_eq!(sample.measurement.color_score, DEFAULT_COLOR_SCORE);
    assert_eq!(sample.label(), QualityGrade::A);

    let history: Vec<GradedSample> = serde_json::from_str(
        r#"[{"drcPercentage": 70.0, "grade": "A"}, {"drcPercentage": 50.0, "colorScore": 3.0}]"#,
    )
    .expect("parse");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].label(), QualityGrade::D);

    assert!(serde_json::from_str::<GradedSample>(r#"{"moistureContent": 1.0}"#).is_err());
}

#[test]
fn test_measurement_validation() {
    assert!(premium().validate().is_ok());
    assert!(premium().with_viscosity(0.0).validate().is_ok());

    for bad in [
        LabMeasurement::new(f64::NAN, 0.5, 0.3, 9.0),
        LabMeasurement::new(101.0, 0.5, 0.3, 9.0),
        LabMeasurement::new(65.0, -0.1, 0.3, 9.0),
        LabMeasurement::new(65.0, 0.5, 0.3, 10.5),
        premium().with_viscosity(-1.0),
        premium().with_viscosity(f64::INFINITY),
    ] {
        assert!(
            matches!(bad.validate(), Err(HeveaError::Validation { .. })),
            "accepted {bad:?}"
        );
    }
}

#[test]
fn test_grade_parsing_and_display() {
    assert_eq!("b".parse::<QualityGrade>().expect("parse"), QualityGrade::B);
    assert!("E".parse::<QualityGrade>().is_err());
    assert_eq!(QualityGrade::D.to_string(), "D");
    assert_eq!(QualityGrade::from_drc(55.0), QualityGrade::C);
    assert_eq!(QualityGrade::from_drc(54.999), QualityGrade::D);
    assert_eq!(QualityGrade::from_drc(60.0), QualityGrade::B);
}

#[test]
fn test_tune_k_on_synthetic_corpus() {
    let best = grader().tune_k(&NoHistory, 10, 5).expect("tune");
    assert_eq!(best.scores.len(), 9);
    assert!((1..10).contains(&best.k));
    assert!(best.accuracy >= best.scores[0].accuracy);
    assert!(best.accuracy >= best.scores[8].accuracy);
    // Grades are separable in feature space.
    assert!(best.accuracy > 0.9);

    let again = grader().tune_k(&NoHistory, 10, 5).expect("tune");
    assert_eq!(best, again);
}

#[test]
fn test_tune_k_rejects_bad_folds() {
    let err = grader().tune_k(&history(), 5, 11).expect_err("more folds than samples");
    assert!(matches!(err, HeveaError::InvalidHyperparameter { .. }));
}
