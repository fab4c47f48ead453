//! Synthetic latex quality corpus.
//!
//! When no historical lab results are available the grading service trains
//! on a generated corpus: `samples_per_grade` samples for each grade, every
//! feature drawn uniformly from a fixed per-grade range. Values are drawn in
//! the order drc, moisture, impurities, color, viscosity, grades in the
//! order A, B, C, D, so a given seed always yields the same corpus.
//!
//! # Quick Start
//!
//! ```
//! use hevea::synthetic::{generate_quality_corpus, SyntheticConfig};
//!
//! let config = SyntheticConfig::default().with_samples_per_grade(10);
//! let corpus = generate_quality_corpus(&config).expect("non-zero sample count");
//! assert_eq!(corpus.len(), 40);
//! ```

use crate::error::{HeveaError, Result};
use crate::grading::{GradedSample, LabMeasurement, QualityGrade};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Generation settings for the synthetic corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Samples generated for each grade
    pub samples_per_grade: usize,
    /// RNG seed
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            samples_per_grade: 30,
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    /// Sets the number of samples per grade.
    #[must_use]
    pub fn with_samples_per_grade(mut self, n: usize) -> Self {
        self.samples_per_grade = n;
        self
    }

    /// Sets the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Half-open range `[lo, hi)` for one feature.
pub type Range = (f64, f64);

/// Feature ranges that characterize one grade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeProfile {
    /// Grade these ranges produce
    pub grade: QualityGrade,
    /// Dry rubber content, percent
    pub drc: Range,
    /// Moisture content, percent
    pub moisture: Range,
    /// Impurities, percent
    pub impurities: Range,
    /// Color score, 0 to 10
    pub color: Range,
    /// Viscosity
    pub viscosity: Range,
}

/// Business-defined ranges for every grade.
pub const GRADE_PROFILES: [GradeProfile; 4] = [
    GradeProfile {
        grade: QualityGrade::A,
        drc: (65.0, 75.0),
        moisture: (0.0, 0.5),
        impurities: (0.0, 0.5),
        color: (8.0, 10.0),
        viscosity: (5.0, 8.0),
    },
    GradeProfile {
        grade: QualityGrade::B,
        drc: (60.0, 65.0),
        moisture: (0.5, 1.5),
        impurities: (0.5, 1.5),
        color: (6.0, 8.0),
        viscosity: (4.0, 7.0),
    },
    GradeProfile {
        grade: QualityGrade::C,
        drc: (55.0, 60.0),
        moisture: (1.0, 2.5),
        impurities: (1.0, 2.5),
        color: (4.0, 6.0),
        viscosity: (3.0, 6.0),
    },
    GradeProfile {
        grade: QualityGrade::D,
        drc: (45.0, 55.0),
        moisture: (2.0, 4.0),
        impurities: (2.0, 4.0),
        color: (2.0, 4.0),
        viscosity: (2.0, 5.0),
    },
];

impl GradeProfile {
    /// Draws one measurement from this profile.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> LabMeasurement {
        let mut draw = |(lo, hi): Range| lo + rng.gen::<f64>() * (hi - lo);
        let drc_percentage = draw(self.drc);
        let moisture_content = draw(self.moisture);
        let impurities = draw(self.impurities);
        let color_score = draw(self.color);
        let viscosity = draw(self.viscosity);

        LabMeasurement {
            drc_percentage,
            moisture_content,
            impurities,
            color_score,
            viscosity: Some(viscosity),
        }
    }
}

/// Generates the labeled synthetic corpus, grades A through D in order.
///
/// # Errors
///
/// Returns `InvalidHyperparameter` when `samples_per_grade` is 0.
pub fn generate_quality_corpus(config: &SyntheticConfig) -> Result<Vec<GradedSample>> {
    if config.samples_per_grade == 0 {
        return Err(HeveaError::invalid_hyperparameter(
            "samples_per_grade",
            0,
            "samples_per_grade >= 1",
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut corpus = Vec::with_capacity(config.samples_per_grade * GRADE_PROFILES.len());
    for profile in &GRADE_PROFILES {
        for _ in 0..config.samples_per_grade {
            corpus.push(GradedSample {
                measurement: profile.sample(&mut rng),
                grade: Some(profile.grade),
            });
        }
    }

    debug!(
        samples = corpus.len(),
        seed = config.seed,
        "generated synthetic quality corpus"
    );
    Ok(corpus)
}

#[cfg(test)]
mod tests;
