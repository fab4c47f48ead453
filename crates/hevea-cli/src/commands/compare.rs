//! Compare command implementation

use super::{validated, Context};
use crate::error::Result;
use crate::output;
use hevea::grading::LabMeasurement;

/// Run the compare command
pub(crate) fn run(ctx: &Context, measurement: &LabMeasurement) -> Result<()> {
    let comparison = ctx.grader.compare(validated(measurement)?, ctx.source())?;

    if ctx.json {
        return output::json(&comparison);
    }
    output::grading_result("KNN", &comparison.knn);
    output::grading_result("Decision Tree", &comparison.decision_tree);

    output::section("Verdict");
    if comparison.needs_manual_review() {
        output::warning(&format!(
            "Engines disagree ({} vs {}): manual review recommended",
            comparison.knn.grade, comparison.decision_tree.grade
        ));
    } else {
        output::success(&format!("Both engines grade {}", output::grade(comparison.knn.grade)));
    }
    Ok(())
}
