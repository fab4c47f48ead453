//! Classify command implementation

use super::{validated, Context};
use crate::error::Result;
use crate::output;
use hevea::grading::{Algorithm, LabMeasurement};

/// Run the classify command
pub(crate) fn run(ctx: &Context, measurement: &LabMeasurement, algorithm: Algorithm) -> Result<()> {
    let result = ctx
        .grader
        .classify(validated(measurement)?, ctx.source(), algorithm)?;

    if ctx.json {
        return output::json(&result);
    }
    output::grading_result(algorithm.name(), &result);
    Ok(())
}
