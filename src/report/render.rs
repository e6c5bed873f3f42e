use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::error::LookupError;
use crate::stats::{CorrelationMatrix, FrequencyTable, GroupAggregate, Summary};

use super::narrative::Finding;
use super::{HeadlineStat, ReportArtifacts};

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn table(columns: Vec<(String, ArrayRef)>) -> Result<String, ArrowError> {
    let batch = RecordBatch::try_from_iter(columns)?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}

fn text_column(name: &str, values: Vec<&str>) -> (String, ArrayRef) {
    (name.to_string(), Arc::new(StringArray::from(values)))
}

fn float_column(name: &str, values: Vec<Option<f64>>) -> (String, ArrayRef) {
    (
        name.to_string(),
        Arc::new(Float64Array::from(
            values.into_iter().map(|v| v.map(round2)).collect::<Vec<_>>(),
        )),
    )
}

fn count_column(values: Vec<usize>) -> (String, ArrayRef) {
    (
        "Count".to_string(),
        Arc::new(UInt64Array::from(
            values.into_iter().map(|v| v as u64).collect::<Vec<_>>(),
        )),
    )
}

pub fn group_table(agg: &GroupAggregate) -> Result<String, ArrowError> {
    let mut columns = vec![
        text_column(agg.group_field.column_name(), agg.keys().collect()),
        count_column(agg.rows.iter().map(|r| r.count).collect()),
    ];
    for (i, field) in agg.fields.iter().enumerate() {
        columns.push(float_column(
            field.column_name(),
            agg.rows.iter().map(|r| r.means[i]).collect(),
        ));
    }
    table(columns)
}

pub fn frequency_table(freq: &FrequencyTable) -> Result<String, ArrowError> {
    table(vec![
        text_column(
            freq.field.column_name(),
            freq.entries.iter().map(|e| e.value.as_str()).collect(),
        ),
        count_column(freq.entries.iter().map(|e| e.count).collect()),
    ])
}

/// Undefined coefficients render as empty cells.
pub fn correlation_table(matrix: &CorrelationMatrix) -> Result<String, ArrowError> {
    let fields = matrix.fields();
    let mut columns = vec![text_column(
        "Field",
        fields.iter().map(|f| f.column_name()).collect(),
    )];
    for &col in fields {
        columns.push(float_column(
            col.column_name(),
            fields
                .iter()
                .map(|&row| {
                    matrix
                        .get(row, col)
                        .filter(|_| matrix.is_defined(row, col))
                })
                .collect(),
        ));
    }
    table(columns)
}

pub fn summary_table(summary: &Summary) -> Result<String, ArrowError> {
    let rows = summary.rows();
    table(vec![
        text_column("Statistic", rows.iter().map(|(label, _)| *label).collect()),
        float_column(
            summary.field.column_name(),
            rows.iter().map(|(_, v)| *v).collect(),
        ),
    ])
}

pub fn headline_table(headline: &[HeadlineStat]) -> Result<String, ArrowError> {
    table(vec![
        text_column(
            "Field",
            headline.iter().map(|h| h.field.column_name()).collect(),
        ),
        float_column("Mean", headline.iter().map(|h| h.mean).collect()),
    ])
}

/// Plain-text rendering of every artifact, with findings appended.
pub fn render_text(
    report: &ReportArtifacts,
    findings: &[Result<Finding, LookupError>],
) -> Result<String, ArrowError> {
    let mut out = format!(
        "Sleep health report: {} records from {}\n",
        report.records, report.origin
    );
    if let Some(reason) = &report.degraded {
        out.push_str(&format!("DEGRADED: built-in fixture data in use ({reason})\n"));
    }

    let mut section = |title: &str, body: String| {
        out.push_str(&format!("\n{title}\n{body}\n"));
    };
    section("Averages", headline_table(&report.headline)?);
    section("Means by gender", group_table(&report.by_gender)?);
    section("Means by BMI category", group_table(&report.by_bmi)?);
    section("Gender distribution", frequency_table(&report.gender_counts)?);
    section("BMI category distribution", frequency_table(&report.bmi_counts)?);
    section("Sleep disorders", frequency_table(&report.disorder_counts)?);
    section("Correlation matrix", correlation_table(&report.correlations)?);
    if let Some(summary) = &report.sleep_summary {
        section("Sleep duration summary", summary_table(summary)?);
    }

    if !findings.is_empty() {
        out.push_str("\nKey findings\n");
        for finding in findings {
            let line = match finding {
                Ok(f) => format!("  - {}\n", f.text),
                Err(err) => format!("  - (omitted: {err})\n"),
            };
            out.push_str(&line);
        }
    }
    Ok(out)
}
