use serde::Serialize;

use crate::data::model::{Dataset, NumericField};

/// Descriptive summary of one numeric field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub field: NumericField,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); undefined for a single value.
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Summary {
    /// Labelled statistics in display order.
    pub fn rows(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("count", Some(self.count as f64)),
            ("mean", Some(self.mean)),
            ("std", self.std),
            ("min", Some(self.min)),
            ("25%", Some(self.q1)),
            ("50%", Some(self.median)),
            ("75%", Some(self.q3)),
            ("max", Some(self.max)),
        ]
    }
}

/// Summarize the valid values of `field`; `None` if there are none.
pub fn describe(dataset: &Dataset, field: NumericField) -> Option<Summary> {
    let mut sorted = dataset.numeric_values(field);
    if sorted.is_empty() {
        return None;
    }
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let sum_sq = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        (sum_sq / (count - 1) as f64).sqrt()
    });

    sorted.sort_by(f64::total_cmp);
    Some(Summary {
        field,
        count,
        mean,
        std,
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Linear-interpolated quantile of non-empty sorted data.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let weight = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * weight
}
