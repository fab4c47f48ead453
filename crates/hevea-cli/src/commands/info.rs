//! Info command implementation

use super::Context;
use crate::error::Result;
use crate::output;

/// Run the info command
pub(crate) fn run(ctx: &Context) -> Result<()> {
    let summary = ctx.grader.describe_corpus(ctx.source())?;

    if ctx.json {
        return output::json(&summary);
    }
    output::section("Training Corpus");
    output::kv("Origin", format!("{:?}", summary.corpus_origin));
    output::kv("Samples", summary.training_samples);
    for (grade, count) in &summary.class_distribution {
        output::kv(&format!("Grade {}", output::grade(*grade)), count);
    }
    output::kv("Features", summary.features.join(", "));

    output::section("Hyperparameters");
    output::kv("KNN k", summary.knn.k);
    output::kv("KNN metric", summary.knn.distance_metric);
    output::kv("KNN normalized", summary.knn.normalized);
    output::kv("Tree max depth", summary.decision_tree.max_depth);
    output::kv("Tree min samples split", summary.decision_tree.min_samples_split);
    Ok(())
}
