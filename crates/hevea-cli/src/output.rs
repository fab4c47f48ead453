//! Output formatting utilities

use colored::Colorize;
use hevea::grading::{Explanation, GradingResult, QualityGrade};
use serde::Serialize;

/// Print a section header
pub(crate) fn section(title: &str) {
    println!("\n{}", format!("=== {title} ===").cyan().bold());
}

/// Print a key-value pair
pub(crate) fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {}: {}", key.white().bold(), value);
}

/// Print a warning message
pub(crate) fn warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Print a success message
pub(crate) fn success(msg: &str) {
    println!("{} {}", "[PASS]".green().bold(), msg);
}

/// Pretty-print any result as JSON on stdout
pub(crate) fn json<T: Serialize>(value: &T) -> crate::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Grade letter colored by quality
pub(crate) fn grade(grade: QualityGrade) -> String {
    let letter = grade.as_str().bold();
    match grade {
        QualityGrade::A => letter.green().to_string(),
        QualityGrade::B => letter.cyan().to_string(),
        QualityGrade::C => letter.yellow().to_string(),
        QualityGrade::D => letter.red().to_string(),
    }
}

/// Human-readable rendering of one grading result
pub(crate) fn grading_result(title: &str, result: &GradingResult) {
    section(title);
    kv("Grade", grade(result.grade));
    kv("Confidence", format!("{:.1}%", result.confidence * 100.0));
    kv(
        "Training samples",
        format!(
            "{} ({:?})",
            result.model_info.training_samples, result.model_info.corpus_origin
        ),
    );
    kv("Features", result.model_info.features.join(", "));

    match &result.explanation {
        Explanation::Neighbors { neighbors, votes } => {
            println!("  {}", "Nearest neighbors:".white().bold());
            for n in neighbors {
                println!("    #{:<4} {}  d = {:.4}", n.index, grade(n.label), n.distance);
            }
            let tally: Vec<String> = votes
                .iter()
                .map(|v| format!("{}: {}", v.label, v.votes))
                .collect();
            kv("Votes", tally.join(", "));
        }
        Explanation::DecisionPath {
            steps,
            leaf_samples,
        } => {
            println!("  {}", "Decision path:".white().bold());
            for step in steps {
                println!("    {step}");
            }
            kv("Leaf samples", leaf_samples);
        }
    }
}
