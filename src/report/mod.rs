//! Report artifacts: everything the presentation layer consumes, computed
//! once from an immutable [`Dataset`].

pub mod accessor;
pub mod narrative;
pub mod render;

use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::data::loader::LoadOutcome;
use crate::data::model::{CategoricalField, DataOrigin, Dataset, NumericField};
use crate::stats::{
    column_mean, correlation_matrix, describe, frequency, group_means, CorrelationMatrix,
    FrequencyTable, GroupAggregate, Summary,
};

pub use accessor::StatsAccessor;

/// Fields shown as dataset-wide headline averages.
pub const HEADLINE_FIELDS: [NumericField; 3] = [
    NumericField::SleepDuration,
    NumericField::QualityOfSleep,
    NumericField::StressLevel,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineStat {
    pub field: NumericField,
    pub mean: Option<f64>,
}

/// Immutable bundle of derived tables, plus read access to the rows for
/// per-record charts.
#[derive(Debug, Clone, Serialize)]
pub struct ReportArtifacts {
    #[serde(skip)]
    dataset: Arc<Dataset>,
    pub origin: DataOrigin,
    /// Why the fixture was substituted, when it was.
    pub degraded: Option<String>,
    pub records: usize,
    pub by_gender: GroupAggregate,
    pub by_bmi: GroupAggregate,
    pub gender_counts: FrequencyTable,
    pub bmi_counts: FrequencyTable,
    pub disorder_counts: FrequencyTable,
    pub correlations: CorrelationMatrix,
    pub headline: Vec<HeadlineStat>,
    pub sleep_summary: Option<Summary>,
}

impl ReportArtifacts {
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// Group means for a dimension; only Gender and BMI_Category are aggregated.
    pub fn groups(&self, dimension: CategoricalField) -> Option<&GroupAggregate> {
        match dimension {
            CategoricalField::Gender => Some(&self.by_gender),
            CategoricalField::BmiCategory => Some(&self.by_bmi),
            CategoricalField::SleepDisorder => None,
        }
    }

    pub fn counts(&self, field: CategoricalField) -> &FrequencyTable {
        match field {
            CategoricalField::Gender => &self.gender_counts,
            CategoricalField::BmiCategory => &self.bmi_counts,
            CategoricalField::SleepDisorder => &self.disorder_counts,
        }
    }

    pub fn accessor(&self) -> StatsAccessor<'_> {
        StatsAccessor::new(self)
    }
}

/// Compute every report artifact from `dataset`.
pub fn build_report(dataset: Arc<Dataset>) -> ReportArtifacts {
    let fields = &NumericField::REPORT;
    let artifacts = ReportArtifacts {
        origin: dataset.origin().clone(),
        degraded: None,
        records: dataset.len(),
        by_gender: group_means(&dataset, CategoricalField::Gender, fields),
        by_bmi: group_means(&dataset, CategoricalField::BmiCategory, fields),
        gender_counts: frequency(&dataset, CategoricalField::Gender),
        bmi_counts: frequency(&dataset, CategoricalField::BmiCategory),
        disorder_counts: frequency(&dataset, CategoricalField::SleepDisorder),
        correlations: correlation_matrix(&dataset, fields),
        headline: HEADLINE_FIELDS
            .into_iter()
            .map(|field| HeadlineStat {
                field,
                mean: column_mean(&dataset, field),
            })
            .collect(),
        sleep_summary: describe(&dataset, NumericField::SleepDuration),
        dataset,
    };
    info!(
        "report built from {} ({} records, {} genders, {} BMI categories)",
        artifacts.origin,
        artifacts.records,
        artifacts.by_gender.rows.len(),
        artifacts.by_bmi.rows.len()
    );
    artifacts
}

/// Build from a load outcome, carrying over its degraded-mode reason.
pub fn build_from_outcome(outcome: LoadOutcome) -> ReportArtifacts {
    let mut artifacts = build_report(Arc::new(outcome.dataset));
    artifacts.degraded = outcome.degraded.map(|e| e.to_string());
    artifacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixture::fixture_dataset;
    use crate::error::LoadError;

    #[test]
    fn builds_every_table() {
        let artifacts = build_report(Arc::new(fixture_dataset()));
        assert_eq!(artifacts.records, 4);
        assert_eq!(artifacts.by_gender.rows.len(), 2);
        assert_eq!(artifacts.by_bmi.rows.len(), 3);
        assert_eq!(artifacts.disorder_counts.total(), 4);
        assert_eq!(artifacts.correlations.fields().len(), 6);
        assert_eq!(artifacts.headline.len(), 3);
        assert_eq!(artifacts.sleep_summary.as_ref().map(|s| s.count), Some(4));
        assert!(!artifacts.is_degraded());
        assert!(artifacts.groups(CategoricalField::SleepDisorder).is_none());
        assert_eq!(artifacts.dataset().len(), 4);
    }

    #[test]
    fn degraded_outcome_is_carried() {
        let outcome = LoadOutcome {
            dataset: fixture_dataset(),
            degraded: Some(LoadError::Empty),
        };
        let artifacts = build_from_outcome(outcome);
        assert!(artifacts.is_degraded());
        assert_eq!(artifacts.origin, DataOrigin::Fixture);
    }

    #[test]
    fn serializes_without_rows() {
        let artifacts = build_report(Arc::new(fixture_dataset()));
        let json = serde_json::to_value(&artifacts).unwrap();
        assert!(json.get("dataset").is_none());
        assert_eq!(json["origin"]["kind"], "fixture");
        assert_eq!(json["by_gender"]["group_field"], "Gender");
        assert_eq!(json["by_gender"]["fields"][0], "Sleep_Duration");
        assert_eq!(json["disorder_counts"]["entries"][0]["value"], "None");
    }
}
