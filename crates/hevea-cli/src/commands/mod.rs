//! Command implementations and their shared context.

pub(crate) mod classify;
pub(crate) mod compare;
pub(crate) mod info;
pub(crate) mod optimal_k;
pub(crate) mod screen;

use crate::error::{CliError, Result};
use hevea::config::GraderConfig;
use hevea::grading::{CorpusSource, GradedSample, LabMeasurement, NoHistory, QualityGrader};
use hevea::HeveaError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Graded samples stored as a JSON array.
#[derive(Debug, Clone)]
pub(crate) struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CliError::FileNotFound(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl CorpusSource for HistoryFile {
    fn load(&self) -> hevea::Result<Vec<GradedSample>> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            HeveaError::CorpusUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        let samples: Vec<GradedSample> = serde_json::from_str(&text).map_err(|e| {
            HeveaError::validation(format!("history file {}: {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), samples = samples.len(), "loaded history file");
        Ok(samples)
    }
}

/// Everything a command needs: the grader, the corpus source and the
/// output mode.
pub(crate) struct Context {
    pub(crate) grader: QualityGrader,
    history: Option<HistoryFile>,
    pub(crate) json: bool,
}

impl Context {
    pub(crate) fn new(config: Option<&Path>, history: Option<&Path>, json: bool) -> Result<Self> {
        let config = match config {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::FileNotFound(path.to_path_buf()));
                }
                GraderConfig::load(path)?
            }
            None => GraderConfig::default(),
        };
        let history = history.map(HistoryFile::open).transpose()?;
        Ok(Self {
            grader: QualityGrader::new(config),
            history,
            json,
        })
    }

    /// The history file when given, otherwise no history at all.
    pub(crate) fn source(&self) -> &dyn CorpusSource {
        match &self.history {
            Some(file) => file,
            None => &NoHistory,
        }
    }
}

/// Rejects measurements outside their physical ranges before grading.
pub(crate) fn validated(measurement: &LabMeasurement) -> Result<&LabMeasurement> {
    measurement.validate()?;
    Ok(measurement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn history_file_loads_samples() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"drcPercentage": 70.0, "moistureContent": 0.2, "impurities": 0.1, "colorScore": 9.0, "grade": "A"}}]"#
        )
        .expect("write");

        let history = HistoryFile::open(file.path()).expect("open");
        let samples = history.load().expect("load");
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].measurement.viscosity, None);
    }

    #[test]
    fn malformed_history_is_a_validation_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write");

        let err = HistoryFile::open(file.path())
            .expect("open")
            .load()
            .expect_err("malformed");
        assert!(matches!(err, HeveaError::Validation { .. }));
    }

    #[test]
    fn missing_history_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = HistoryFile::open(&dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn context_without_files_uses_defaults() {
        let ctx = Context::new(None, None, false).expect("context");
        assert_eq!(ctx.grader.config().knn.k, 3);
        assert!(ctx.source().load().expect("load").is_empty());
    }

    #[test]
    fn out_of_range_measurement_rejected() {
        let bad = LabMeasurement::new(120.0, 0.5, 0.3, 9.0);
        assert!(matches!(validated(&bad), Err(CliError::ValidationFailed(_))));
    }
}
