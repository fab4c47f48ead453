//! Latex quality grades.

use crate::error::{HeveaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commercial grade of a latex sample, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityGrade {
    /// DRC at or above 65%
    A,
    /// DRC in [60, 65)
    B,
    /// DRC in [55, 60)
    C,
    /// DRC below 55%
    D,
}

impl QualityGrade {
    /// Every grade, best first.
    pub const ALL: [QualityGrade; 4] = [
        QualityGrade::A,
        QualityGrade::B,
        QualityGrade::C,
        QualityGrade::D,
    ];

    /// Grade implied by dry rubber content alone.
    ///
    /// ```
    /// use hevea::grading::QualityGrade;
    ///
    /// assert_eq!(QualityGrade::from_drc(65.0), QualityGrade::A);
    /// assert_eq!(QualityGrade::from_drc(64.99), QualityGrade::B);
    /// assert_eq!(QualityGrade::from_drc(25.0), QualityGrade::D);
    /// ```
    #[must_use]
    pub fn from_drc(drc_percentage: f64) -> Self {
        if drc_percentage >= 65.0 {
            QualityGrade::A
        } else if drc_percentage >= 60.0 {
            QualityGrade::B
        } else if drc_percentage >= 55.0 {
            QualityGrade::C
        } else {
            QualityGrade::D
        }
    }

    /// Single-letter name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QualityGrade::A => "A",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
            QualityGrade::D => "D",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityGrade {
    type Err = HeveaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "A" | "a" => Ok(QualityGrade::A),
            "B" | "b" => Ok(QualityGrade::B),
            "C" | "c" => Ok(QualityGrade::C),
            "D" | "d" => Ok(QualityGrade::D),
            other => Err(HeveaError::validation(format!(
                "unknown quality grade '{other}', expected A, B, C or D"
            ))),
        }
    }
}
