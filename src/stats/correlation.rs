use serde::Serialize;

use crate::data::model::{Dataset, NumericField};

/// Symmetric Pearson correlation matrix over a set of numeric fields.
///
/// Undefined coefficients (a zero-variance field, or fewer than two
/// pairwise-complete rows) are stored as `0.0` and listed in `undefined`
/// so callers can tell them apart from a computed zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    fields: Vec<NumericField>,
    values: Vec<Vec<f64>>,
    undefined: Vec<(NumericField, NumericField)>,
}

impl CorrelationMatrix {
    pub fn fields(&self) -> &[NumericField] {
        &self.fields
    }

    /// Row-major coefficients, indexed like [`fields`](Self::fields).
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    fn index_of(&self, field: NumericField) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    /// Stored coefficient, `None` if either field is not in the matrix.
    pub fn get(&self, a: NumericField, b: NumericField) -> Option<f64> {
        Some(self.values[self.index_of(a)?][self.index_of(b)?])
    }

    /// Whether the stored coefficient was actually computed.
    pub fn is_defined(&self, a: NumericField, b: NumericField) -> bool {
        !self
            .undefined
            .iter()
            .any(|&(x, y)| (x, y) == (a, b) || (x, y) == (b, a))
    }

    /// Off-diagonal pairs (upper triangle) whose coefficient is undefined.
    pub fn undefined_pairs(&self) -> &[(NumericField, NumericField)] {
        &self.undefined
    }
}

/// Pearson coefficient of two equally long samples. `None` when fewer than
/// two points are given or either sample is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 || is_constant(xs) || is_constant(ys) {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        numerator += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    if sum_sq_x == 0.0 || sum_sq_y == 0.0 {
        return None;
    }
    Some((numerator / (sum_sq_x.sqrt() * sum_sq_y.sqrt())).clamp(-1.0, 1.0))
}

/// Exact equality; the rounded mean of a constant sample can leave a
/// non-zero residual sum of squares.
fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Pairwise-complete correlation matrix: each pair uses every row where both
/// of its fields are present, independently of the other pairs.
pub fn correlation_matrix(dataset: &Dataset, fields: &[NumericField]) -> CorrelationMatrix {
    let n = fields.len();
    let mut values = vec![vec![0.0; n]; n];
    let mut undefined = Vec::new();

    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = dataset
                .iter()
                .filter_map(|r| Some((r.numeric(fields[i])?, r.numeric(fields[j])?)))
                .unzip();
            let r = match pearson(&xs, &ys) {
                Some(r) => r,
                None => {
                    log::debug!(
                        "correlation {} ~ {} undefined over {} rows",
                        fields[i],
                        fields[j],
                        xs.len()
                    );
                    undefined.push((fields[i], fields[j]));
                    0.0
                }
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        fields: fields.to_vec(),
        values,
        undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixture::fixture_dataset;
    use crate::data::model::DataOrigin;

    fn assert_invariants(m: &CorrelationMatrix) {
        let n = m.fields().len();
        for i in 0..n {
            assert_eq!(m.values()[i][i], 1.0);
            for j in 0..n {
                let v = m.values()[i][j];
                assert!((-1.0..=1.0).contains(&v), "{v} out of range");
                assert_eq!(v.to_bits(), m.values()[j][i].to_bits());
            }
        }
    }

    #[test]
    fn pearson_of_linear_samples() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &down).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_undefined_cases() {
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
        assert_eq!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn constant_decimal_column_is_undefined() {
        let mut records = fixture_dataset().records().to_vec();
        records.extend(fixture_dataset().records().iter().cloned());
        for r in &mut records {
            r.sleep_duration = Some(7.1);
        }
        let ds = Dataset::new(records, DataOrigin::Stream);
        let m = correlation_matrix(
            &ds,
            &[NumericField::SleepDuration, NumericField::StressLevel],
        );

        assert_invariants(&m);
        assert!(!m.is_defined(NumericField::SleepDuration, NumericField::StressLevel));
        assert_eq!(pearson(&[0.1; 3], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn fixture_matrix_holds_invariants() {
        let ds = fixture_dataset();
        let m = correlation_matrix(&ds, &NumericField::REPORT);
        assert_invariants(&m);
        assert!(m.undefined_pairs().is_empty());

        let r = m
            .get(NumericField::SleepDuration, NumericField::QualityOfSleep)
            .unwrap();
        assert!(r > 0.9);
        let r = m
            .get(NumericField::StressLevel, NumericField::QualityOfSleep)
            .unwrap();
        assert!(r < -0.9);
        assert_eq!(m.get(NumericField::Age, NumericField::HeartRate), None);
    }

    #[test]
    fn zero_variance_is_flagged_not_computed() {
        let mut records = fixture_dataset().records().to_vec();
        for r in &mut records {
            r.stress_level = Some(5);
        }
        let ds = Dataset::new(records, DataOrigin::Stream);
        let m = correlation_matrix(&ds, &NumericField::REPORT);

        assert_invariants(&m);
        assert_eq!(m.values()[3][3], 1.0);
        assert_eq!(
            m.get(NumericField::StressLevel, NumericField::HeartRate),
            Some(0.0)
        );
        assert!(!m.is_defined(NumericField::HeartRate, NumericField::StressLevel));
        assert!(m.is_defined(NumericField::HeartRate, NumericField::DailySteps));
        assert_eq!(m.undefined_pairs().len(), 5);
    }

    #[test]
    fn pairs_are_evaluated_pairwise_complete() {
        let mut records = fixture_dataset().records().to_vec();
        records[0].heart_rate = None;
        let ds = Dataset::new(records.clone(), DataOrigin::Stream);
        let m = correlation_matrix(
            &ds,
            &[
                NumericField::SleepDuration,
                NumericField::QualityOfSleep,
                NumericField::HeartRate,
            ],
        );

        // the sleep/quality pair still sees all four rows
        let full = correlation_matrix(
            &fixture_dataset(),
            &[NumericField::SleepDuration, NumericField::QualityOfSleep],
        );
        assert_eq!(
            m.get(NumericField::SleepDuration, NumericField::QualityOfSleep),
            full.get(NumericField::SleepDuration, NumericField::QualityOfSleep)
        );

        // the heart-rate pairs use the three remaining rows
        let xs: Vec<f64> = records[1..].iter().filter_map(|r| r.sleep_duration).collect();
        let ys: Vec<f64> = records[1..]
            .iter()
            .filter_map(|r| r.heart_rate.map(f64::from))
            .collect();
        assert_eq!(
            m.get(NumericField::SleepDuration, NumericField::HeartRate),
            pearson(&xs, &ys)
        );
    }

    #[test]
    fn recomputation_is_bit_identical() {
        let ds = fixture_dataset();
        let a = correlation_matrix(&ds, &NumericField::REPORT);
        let b = correlation_matrix(&ds, &NumericField::REPORT);
        for (ra, rb) in a.values().iter().zip(b.values()) {
            for (x, y) in ra.iter().zip(rb) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
    }
}
