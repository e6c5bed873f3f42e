use crate::data::model::{CategoricalField, NumericField};
use crate::error::LookupError;
use crate::stats::{CorrelationMatrix, FrequencyTable, GroupAggregate};

use super::ReportArtifacts;

impl GroupAggregate {
    /// Mean of `field` within group `key`.
    pub fn lookup(&self, key: &str, field: NumericField) -> Result<f64, LookupError> {
        let table = format!("{} group means", self.group_field);
        let idx = self
            .field_index(field)
            .ok_or_else(|| LookupError::key_not_found(&table, field.column_name()))?;
        let row = self
            .group(key)
            .ok_or_else(|| LookupError::key_not_found(&table, key))?;
        row.means[idx].ok_or_else(|| LookupError::NoValue {
            group: key.to_string(),
            field: field.column_name().to_string(),
        })
    }
}

impl FrequencyTable {
    pub fn lookup(&self, value: &str) -> Result<usize, LookupError> {
        self.get(value)
            .ok_or_else(|| LookupError::key_not_found(format!("{} counts", self.field), value))
    }
}

impl CorrelationMatrix {
    /// Coefficient for a pair; an undefined coefficient is an error rather
    /// than its stored `0.0`.
    pub fn lookup(&self, a: NumericField, b: NumericField) -> Result<f64, LookupError> {
        let r = self.get(a, b).ok_or_else(|| {
            let missing = if self.fields().contains(&a) { b } else { a };
            LookupError::key_not_found("correlation matrix", missing.column_name())
        })?;
        if !self.is_defined(a, b) {
            return Err(LookupError::UndefinedCorrelation {
                a: a.column_name().to_string(),
                b: b.column_name().to_string(),
            });
        }
        Ok(r)
    }
}

/// Named scalar lookups over a built report. Every miss is an error, never a
/// default.
#[derive(Debug, Clone, Copy)]
pub struct StatsAccessor<'a> {
    artifacts: &'a ReportArtifacts,
}

impl<'a> StatsAccessor<'a> {
    pub fn new(artifacts: &'a ReportArtifacts) -> Self {
        StatsAccessor { artifacts }
    }

    /// e.g. mean sleep duration for `Female` along `Gender`.
    pub fn group_mean(
        &self,
        dimension: CategoricalField,
        group: &str,
        field: NumericField,
    ) -> Result<f64, LookupError> {
        self.artifacts
            .groups(dimension)
            .ok_or_else(|| LookupError::key_not_found("group dimensions", dimension.column_name()))?
            .lookup(group, field)
    }

    pub fn count(&self, field: CategoricalField, value: &str) -> Result<usize, LookupError> {
        self.artifacts.counts(field).lookup(value)
    }

    pub fn correlation(&self, a: NumericField, b: NumericField) -> Result<f64, LookupError> {
        self.artifacts.correlations.lookup(a, b)
    }

    /// Dataset-wide mean of a headline field.
    pub fn headline(&self, field: NumericField) -> Result<f64, LookupError> {
        let stat = self
            .artifacts
            .headline
            .iter()
            .find(|h| h.field == field)
            .ok_or_else(|| LookupError::key_not_found("headline", field.column_name()))?;
        stat.mean.ok_or_else(|| LookupError::NoValue {
            group: "all".to_string(),
            field: field.column_name().to_string(),
        })
    }

    pub fn total(&self) -> usize {
        self.artifacts.records
    }
}
