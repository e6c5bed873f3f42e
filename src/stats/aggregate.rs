use std::collections::HashMap;

use serde::Serialize;

use crate::data::model::{CategoricalField, Dataset, NumericField};

// ---------------------------------------------------------------------------
// Running mean accumulator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct MeanAcc {
    sum: f64,
    n: usize,
}

impl MeanAcc {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.n += 1;
    }

    fn mean(self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

// ---------------------------------------------------------------------------
// Group means
// ---------------------------------------------------------------------------

/// Means of the aggregated fields over the rows sharing one group value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: String,
    /// Rows in the group.
    pub count: usize,
    /// Parallel to [`GroupAggregate::fields`]; `None` when no row in the group
    /// has a valid value for that field.
    pub means: Vec<Option<f64>>,
}

/// Group-wise means, one row per distinct group value in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAggregate {
    pub group_field: CategoricalField,
    pub fields: Vec<NumericField>,
    pub rows: Vec<GroupRow>,
}

impl GroupAggregate {
    pub fn group(&self, key: &str) -> Option<&GroupRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    pub fn field_index(&self, field: NumericField) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.key.as_str())
    }
}

/// Arithmetic mean of each of `fields` over the rows of each distinct
/// `group_field` value. Invalid cells drop out of that field's mean only.
pub fn group_means(
    dataset: &Dataset,
    group_field: CategoricalField,
    fields: &[NumericField],
) -> GroupAggregate {
    let mut order: Vec<(String, usize, Vec<MeanAcc>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in dataset {
        let key = record.category(group_field);
        let slot = *index.entry(key).or_insert_with(|| {
            order.push((key.to_string(), 0, vec![MeanAcc::default(); fields.len()]));
            order.len() - 1
        });
        let (_, count, accs) = &mut order[slot];
        *count += 1;
        for (acc, field) in accs.iter_mut().zip(fields) {
            if let Some(v) = record.numeric(*field) {
                acc.push(v);
            }
        }
    }

    GroupAggregate {
        group_field,
        fields: fields.to_vec(),
        rows: order
            .into_iter()
            .map(|(key, count, accs)| GroupRow {
                key,
                count,
                means: accs.into_iter().map(MeanAcc::mean).collect(),
            })
            .collect(),
    }
}

/// Mean of one numeric field over the whole dataset.
pub fn column_mean(dataset: &Dataset, field: NumericField) -> Option<f64> {
    let mut acc = MeanAcc::default();
    for v in dataset.iter().filter_map(|r| r.numeric(field)) {
        acc.push(v);
    }
    acc.mean()
}

// ---------------------------------------------------------------------------
// Frequency tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
}

/// Occurrence counts of each distinct value of a categorical field, most
/// frequent first (ties keep first-seen order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    pub field: CategoricalField,
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    pub fn get(&self, value: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.count)
    }

    /// Sum of all counts; equals the dataset length.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }
}

pub fn frequency(dataset: &Dataset, field: CategoricalField) -> FrequencyTable {
    let mut entries: Vec<FrequencyEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in dataset {
        let value = record.category(field);
        match index.get(value) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(value, entries.len());
                entries.push(FrequencyEntry {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    // stable: equal counts stay in first-seen order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    FrequencyTable { field, entries }
}
