//! Tests for the synthetic corpus generator.

use super::*;

fn within((lo, hi): Range, v: f64) -> bool {
    lo <= v && v < hi
}

#[test]
fn test_default_config() {
    let config = SyntheticConfig::default();
    assert_eq!(config.samples_per_grade, 30);
    assert_eq!(config.seed, 42);
}

#[test]
fn test_corpus_size_and_grade_order() {
    let corpus = generate_quality_corpus(&SyntheticConfig::default()).expect("generate");
    assert_eq!(corpus.len(), 120);

    let grades: Vec<QualityGrade> = corpus.iter().filter_map(|s| s.grade).collect();
    assert_eq!(grades.len(), 120);
    for (block, expected) in grades.chunks(30).zip(QualityGrade::ALL) {
        assert!(block.iter().all(|&g| g == expected));
    }
}

#[test]
fn test_values_inside_grade_ranges() {
    let corpus = generate_quality_corpus(&SyntheticConfig::default().with_seed(7))
        .expect("generate");

    for sample in &corpus {
        let grade = sample.grade.expect("synthetic samples are labeled");
        let profile = GRADE_PROFILES
            .iter()
            .find(|p| p.grade == grade)
            .expect("every grade has a profile");
        let m = &sample.measurement;

        assert!(within(profile.drc, m.drc_percentage));
        assert!(within(profile.moisture, m.moisture_content));
        assert!(within(profile.impurities, m.impurities));
        assert!(within(profile.color, m.color_score));
        assert!(within(profile.viscosity, m.viscosity.expect("always set")));
    }
}

#[test]
fn test_drc_band_matches_label() {
    let corpus = generate_quality_corpus(&SyntheticConfig::default()).expect("generate");
    for sample in &corpus {
        assert_eq!(
            Some(QualityGrade::from_drc(sample.measurement.drc_percentage)),
            sample.grade
        );
    }
}

#[test]
fn test_same_seed_same_corpus() {
    let config = SyntheticConfig::default().with_seed(1234);
    let a = generate_quality_corpus(&config).expect("generate");
    let b = generate_quality_corpus(&config).expect("generate");
    assert_eq!(a, b);

    let c = generate_quality_corpus(&config.with_seed(1235)).expect("generate");
    assert_ne!(a, c);
}

#[test]
fn test_zero_samples_rejected() {
    let config = SyntheticConfig::default().with_samples_per_grade(0);
    assert!(matches!(
        generate_quality_corpus(&config),
        Err(HeveaError::InvalidHyperparameter { .. })
    ));
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: SyntheticConfig = toml::from_str("seed = 9").expect("parse");
    assert_eq!(config.seed, 9);
    assert_eq!(config.samples_per_grade, 30);
}
