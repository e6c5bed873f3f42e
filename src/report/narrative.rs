use log::warn;
use serde::Serialize;

use crate::data::model::{CategoricalField, NumericField, NO_DISORDER};
use crate::error::LookupError;

use super::StatsAccessor;

/// One sentence of report text backed by looked-up statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub topic: &'static str,
    pub text: String,
}

/// Correlation pairs called out in the report, with reader-facing labels.
const CORRELATION_CALLOUTS: [(NumericField, NumericField, &str, &str); 5] = [
    (
        NumericField::SleepDuration,
        NumericField::QualityOfSleep,
        "sleep duration",
        "sleep quality",
    ),
    (
        NumericField::StressLevel,
        NumericField::QualityOfSleep,
        "stress",
        "sleep quality",
    ),
    (
        NumericField::PhysicalActivityLevel,
        NumericField::DailySteps,
        "physical activity",
        "daily steps",
    ),
    (
        NumericField::HeartRate,
        NumericField::StressLevel,
        "heart rate",
        "stress",
    ),
    (
        NumericField::PhysicalActivityLevel,
        NumericField::QualityOfSleep,
        "physical activity",
        "sleep quality",
    ),
];

/// Strength label for a correlation coefficient.
pub fn strength(r: f64) -> &'static str {
    match r.abs() {
        a if a >= 0.7 => "strong",
        a if a >= 0.4 => "moderate",
        _ => "weak",
    }
}

/// All key findings, in report order. A finding whose statistics cannot be
/// resolved comes back as its [`LookupError`] so the caller can omit it.
pub fn key_findings(stats: &StatsAccessor<'_>) -> Vec<Result<Finding, LookupError>> {
    let mut findings = vec![
        gender_comparison(stats, NumericField::SleepDuration, "sleep_by_gender", |f, m| {
            format!(
                "Women sleep {f:.2} hours on average and men {m:.2} hours, a difference of {:.2} hours.",
                (f - m).abs()
            )
        }),
        gender_comparison(stats, NumericField::QualityOfSleep, "quality_by_gender", |f, m| {
            format!("Sleep quality averages {f:.2} for women vs {m:.2} for men.")
        }),
        gender_comparison(stats, NumericField::StressLevel, "stress_by_gender", |f, m| {
            format!("Stress level averages {m:.2} for men vs {f:.2} for women.")
        }),
        disorder_prevalence(stats),
    ];

    for (a, b, label_a, label_b) in CORRELATION_CALLOUTS {
        findings.push(stats.correlation(a, b).map(|r| {
            let direction = if r >= 0.0 { "positive" } else { "negative" };
            let mut text = format!(
                "{} {direction} correlation ({r:.2}) between {label_a} and {label_b}.",
                strength(r)
            );
            capitalize(&mut text);
            Finding {
                topic: "correlation",
                text,
            }
        }));
    }

    for err in findings.iter().filter_map(|f| f.as_ref().err()) {
        warn!("omitting finding: {err}");
    }
    findings
}

fn gender_comparison(
    stats: &StatsAccessor<'_>,
    field: NumericField,
    topic: &'static str,
    sentence: impl Fn(f64, f64) -> String,
) -> Result<Finding, LookupError> {
    let female = stats.group_mean(CategoricalField::Gender, "Female", field)?;
    let male = stats.group_mean(CategoricalField::Gender, "Male", field)?;
    Ok(Finding {
        topic,
        text: sentence(female, male),
    })
}

fn disorder_prevalence(stats: &StatsAccessor<'_>) -> Result<Finding, LookupError> {
    let without = stats.count(CategoricalField::SleepDisorder, NO_DISORDER)?;
    let total = stats.total();
    let pct = 100.0 * without as f64 / total as f64;
    Ok(Finding {
        topic: "sleep_disorders",
        text: format!("{without} of {total} individuals ({pct:.1}%) report no sleep disorder."),
    })
}

fn capitalize(text: &mut String) {
    if let Some(first) = text.get(..1) {
        let upper = first.to_ascii_uppercase();
        text.replace_range(..1, &upper);
    }
}
