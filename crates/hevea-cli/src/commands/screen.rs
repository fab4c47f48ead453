//! Screen command implementation

use super::{validated, Context};
use crate::error::Result;
use crate::output;
use hevea::adapters::RiskLevel;
use hevea::grading::LabMeasurement;

/// Run the screen command
pub(crate) fn run(ctx: &Context, measurement: &LabMeasurement) -> Result<()> {
    let screening = ctx.grader.screen(validated(measurement)?, ctx.source())?;

    if ctx.json {
        return output::json(&screening);
    }
    let report = &screening.report;
    output::section("Anomaly Screening");
    output::kv("Score", format!("{:.4}", report.score));
    output::kv("Threshold", report.threshold);
    output::kv("Confidence", format!("{:.0}%", report.confidence * 100.0));
    output::kv("Neighbors (k)", screening.k);
    output::kv("Training samples", screening.training_samples);

    match report.risk_level {
        RiskLevel::Normal => output::success("Measurement is consistent with the corpus"),
        level => output::warning(&format!("Anomalous measurement, risk {level:?}")),
    }
    Ok(())
}
