//! Optimal-k command implementation

use super::Context;
use crate::error::Result;
use crate::output;
use colored::Colorize;

/// Run the optimal-k command
pub(crate) fn run(ctx: &Context, max_k: usize, folds: usize) -> Result<()> {
    let best = ctx.grader.tune_k(ctx.source(), max_k, folds)?;

    if ctx.json {
        return output::json(&best);
    }
    output::section(&format!("Optimal k ({folds}-fold cross-validation)"));
    for score in &best.scores {
        let line = format!("  k = {:<3} accuracy {:.2}%", score.k, score.accuracy * 100.0);
        if score.k == best.k {
            println!("{}", line.green().bold());
        } else {
            println!("{line}");
        }
    }
    output::kv("Best k", best.k);
    Ok(())
}
