//! Lab measurements and graded historical samples.

use super::QualityGrade;
use crate::error::{HeveaError, Result};
use serde::{Deserialize, Serialize};

/// Feature names, in matrix column order.
pub const FEATURE_NAMES: [&str; 5] = [
    "drcPercentage",
    "moistureContent",
    "impurities",
    "colorScore",
    "viscosity",
];

/// Viscosity assumed for historical samples recorded without one.
pub const DEFAULT_VISCOSITY: f64 = 5.0;

/// Color score assumed for historical samples recorded without one.
pub const DEFAULT_COLOR_SCORE: f64 = 5.0;

/// Laboratory results for one latex sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabMeasurement {
    /// Dry rubber content, percent
    pub drc_percentage: f64,
    /// Moisture content, percent
    pub moisture_content: f64,
    /// Impurities, percent
    pub impurities: f64,
    /// Color score, 0 to 10
    pub color_score: f64,
    /// Viscosity, when measured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viscosity: Option<f64>,
}

impl LabMeasurement {
    /// Creates a measurement without viscosity.
    #[must_use]
    pub fn new(drc_percentage: f64, moisture_content: f64, impurities: f64, color_score: f64) -> Self {
        Self {
            drc_percentage,
            moisture_content,
            impurities,
            color_score,
            viscosity: None,
        }
    }

    /// Sets the viscosity.
    #[must_use]
    pub fn with_viscosity(mut self, viscosity: f64) -> Self {
        self.viscosity = Some(viscosity);
        self
    }

    /// Checks the caller-side input contract.
    ///
    /// All values must be finite; DRC, moisture and impurities must lie in
    /// [0, 100]; the color score in [0, 10]; viscosity, when present, must
    /// be non-negative. The grading engine itself does not call this: callers
    /// validate before classifying.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let percentages = [
            ("drcPercentage", self.drc_percentage),
            ("moistureContent", self.moisture_content),
            ("impurities", self.impurities),
        ];
        for (name, value) in percentages {
            check_range(name, value, 0.0, 100.0)?;
        }
        check_range("colorScore", self.color_score, 0.0, 10.0)?;
        if let Some(v) = self.viscosity {
            check_range("viscosity", v, 0.0, f64::INFINITY)?;
        }
        Ok(())
    }

    /// Feature vector in [`FEATURE_NAMES`] order, with viscosity when present.
    #[must_use]
    pub fn features(&self) -> Vec<f64> {
        let mut features = vec![
            self.drc_percentage,
            self.moisture_content,
            self.impurities,
            self.color_score,
        ];
        features.extend(self.viscosity);
        features
    }

    /// All five features; a missing viscosity becomes [`DEFAULT_VISCOSITY`].
    #[must_use]
    pub fn full_features(&self) -> [f64; 5] {
        [
            self.drc_percentage,
            self.moisture_content,
            self.impurities,
            self.color_score,
            self.viscosity.unwrap_or(DEFAULT_VISCOSITY),
        ]
    }
}

fn check_range(name: &str, value: f64, lo: f64, hi: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(HeveaError::validation(format!("{name} must be finite, got {value}")));
    }
    if value < lo || value > hi {
        return Err(HeveaError::validation(format!(
            "{name} = {value} outside [{lo}, {hi}]"
        )));
    }
    Ok(())
}

/// A historical measurement with its recorded grade.
///
/// When read from JSON only `drcPercentage` is required: missing moisture
/// and impurities read as 0 and a missing color score as
/// [`DEFAULT_COLOR_SCORE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "HistoricalRecord")]
pub struct GradedSample {
    /// Lab results
    #[serde(flatten)]
    pub measurement: LabMeasurement,
    /// Recorded grade; derived from DRC when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<QualityGrade>,
}

impl GradedSample {
    /// Sample labeled by DRC banding.
    #[must_use]
    pub fn from_measurement(measurement: LabMeasurement) -> Self {
        Self {
            measurement,
            grade: None,
        }
    }

    /// Recorded grade, or the DRC band when none was recorded.
    #[must_use]
    pub fn label(&self) -> QualityGrade {
        self.grade
            .unwrap_or_else(|| QualityGrade::from_drc(self.measurement.drc_percentage))
    }
}

/// Wire shape of a stored sample, with the lab defaults for missing fields.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoricalRecord {
    drc_percentage: f64,
    #[serde(default)]
    moisture_content: f64,
    #[serde(default)]
    impurities: f64,
    #[serde(default = "default_color_score")]
    color_score: f64,
    #[serde(default)]
    viscosity: Option<f64>,
    #[serde(default)]
    grade: Option<QualityGrade>,
}

fn default_color_score() -> f64 {
    DEFAULT_COLOR_SCORE
}

impl From<HistoricalRecord> for GradedSample {
    fn from(record: HistoricalRecord) -> Self {
        Self {
            measurement: LabMeasurement {
                drc_percentage: record.drc_percentage,
                moisture_content: record.moisture_content,
                impurities: record.impurities,
                color_score: record.color_score,
                viscosity: record.viscosity,
            },
            grade: record.grade,
        }
    }
}
