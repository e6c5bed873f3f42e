use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single untyped cell in a raw source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as produced by the CSV / JSON / Parquet readers,
/// before the typed [`Record`] conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`. Text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Whether the cell carries no usable value (null or blank text).
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Field identifiers – the only names ever looked up dynamically
// ---------------------------------------------------------------------------

/// Numeric measurement columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NumericField {
    #[serde(rename = "Age")]
    Age,
    #[serde(rename = "Sleep_Duration")]
    SleepDuration,
    #[serde(rename = "Quality_of_Sleep")]
    QualityOfSleep,
    #[serde(rename = "Physical_Activity_Level")]
    PhysicalActivityLevel,
    #[serde(rename = "Stress_Level")]
    StressLevel,
    #[serde(rename = "Heart_Rate")]
    HeartRate,
    #[serde(rename = "Daily_Steps")]
    DailySteps,
}

impl NumericField {
    pub const ALL: [NumericField; 7] = [
        NumericField::Age,
        NumericField::SleepDuration,
        NumericField::QualityOfSleep,
        NumericField::PhysicalActivityLevel,
        NumericField::StressLevel,
        NumericField::HeartRate,
        NumericField::DailySteps,
    ];

    /// The six measurements that feed group means and the correlation matrix.
    pub const REPORT: [NumericField; 6] = [
        NumericField::SleepDuration,
        NumericField::QualityOfSleep,
        NumericField::PhysicalActivityLevel,
        NumericField::StressLevel,
        NumericField::HeartRate,
        NumericField::DailySteps,
    ];

    /// Canonical (normalized) column identifier.
    pub fn column_name(self) -> &'static str {
        match self {
            NumericField::Age => "Age",
            NumericField::SleepDuration => "Sleep_Duration",
            NumericField::QualityOfSleep => "Quality_of_Sleep",
            NumericField::PhysicalActivityLevel => "Physical_Activity_Level",
            NumericField::StressLevel => "Stress_Level",
            NumericField::HeartRate => "Heart_Rate",
            NumericField::DailySteps => "Daily_Steps",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for NumericField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_column(s);
        NumericField::ALL
            .into_iter()
            .find(|f| f.column_name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown numeric field '{s}'"))
    }
}

/// Categorical columns usable as a group-by dimension or frequency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CategoricalField {
    #[serde(rename = "Gender")]
    Gender,
    #[serde(rename = "BMI_Category")]
    BmiCategory,
    #[serde(rename = "Sleep_Disorder")]
    SleepDisorder,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 3] = [
        CategoricalField::Gender,
        CategoricalField::BmiCategory,
        CategoricalField::SleepDisorder,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            CategoricalField::Gender => "Gender",
            CategoricalField::BmiCategory => "BMI_Category",
            CategoricalField::SleepDisorder => "Sleep_Disorder",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for CategoricalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_column(s);
        CategoricalField::ALL
            .into_iter()
            .find(|f| f.column_name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown categorical field '{s}'"))
    }
}

/// Normalize a column identifier: strip a BOM, trim, and replace every
/// internal whitespace run with a single `_`.
pub fn normalize_column(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("male") {
            Ok(Gender::Male)
        } else if s.eq_ignore_ascii_case("female") {
            Ok(Gender::Female)
        } else {
            Err(())
        }
    }
}

/// Literal category substituted for an absent sleep disorder.
pub const NO_DISORDER: &str = "None";

/// One individual. Numeric fields are `None` when the source cell was absent
/// or not a valid value for the field; that only excludes the row from
/// statistics over that field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub person_id: Option<u64>,
    pub gender: Gender,
    pub age: Option<u32>,
    /// Hours.
    pub sleep_duration: Option<f64>,
    /// 1–10.
    pub quality_of_sleep: Option<u8>,
    /// Minutes per day.
    pub physical_activity_level: Option<f64>,
    /// 1–10.
    pub stress_level: Option<u8>,
    pub bmi_category: String,
    /// Beats per minute.
    pub heart_rate: Option<u32>,
    pub daily_steps: Option<u32>,
    /// Never empty: an absent value is stored as [`NO_DISORDER`].
    pub sleep_disorder: String,
}

impl Record {
    pub fn numeric(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::Age => self.age.map(f64::from),
            NumericField::SleepDuration => self.sleep_duration,
            NumericField::QualityOfSleep => self.quality_of_sleep.map(f64::from),
            NumericField::PhysicalActivityLevel => self.physical_activity_level,
            NumericField::StressLevel => self.stress_level.map(f64::from),
            NumericField::HeartRate => self.heart_rate.map(f64::from),
            NumericField::DailySteps => self.daily_steps.map(f64::from),
        }
    }

    pub fn category(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Gender => self.gender.as_str(),
            CategoricalField::BmiCategory => &self.bmi_category,
            CategoricalField::SleepDisorder => &self.sleep_disorder,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Where a dataset came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum DataOrigin {
    File(PathBuf),
    Stream,
    /// Built-in rows substituted after a failed load.
    Fixture,
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataOrigin::File(p) => write!(f, "{}", p.display()),
            DataOrigin::Stream => write!(f, "<stream>"),
            DataOrigin::Fixture => write!(f, "<built-in fixture>"),
        }
    }
}

/// The full parsed dataset. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    origin: DataOrigin,
}

impl Dataset {
    pub fn new(records: Vec<Record>, origin: DataOrigin) -> Self {
        Dataset { records, origin }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn origin(&self) -> &DataOrigin {
        &self.origin
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Valid values of one numeric field, in row order.
    pub fn numeric_values(&self, field: NumericField) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.numeric(field)).collect()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_replaces_whitespace_runs() {
        assert_eq!(normalize_column("Sleep Duration"), "Sleep_Duration");
        assert_eq!(normalize_column("  Quality of\tSleep "), "Quality_of_Sleep");
        assert_eq!(normalize_column("\u{feff}Person ID"), "Person_ID");
        assert_eq!(normalize_column("Gender"), "Gender");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["Physical Activity Level", " BMI  Category", "Daily_Steps"] {
            let once = normalize_column(raw);
            assert_eq!(normalize_column(&once), once);
        }
    }

    #[test]
    fn field_names_parse_case_insensitively() {
        assert_eq!(
            "sleep duration".parse::<NumericField>(),
            Ok(NumericField::SleepDuration)
        );
        assert_eq!(
            "QUALITY_OF_SLEEP".parse::<NumericField>(),
            Ok(NumericField::QualityOfSleep)
        );
        assert_eq!(
            "BMI Category".parse::<CategoricalField>(),
            Ok(CategoricalField::BmiCategory)
        );
        assert!("Occupation".parse::<CategoricalField>().is_err());
    }

    #[test]
    fn cell_values_convert_to_f64() {
        assert_eq!(CellValue::Integer(7).as_f64(), Some(7.0));
        assert_eq!(CellValue::Text(" 6.5 ".into()).as_f64(), Some(6.5));
        assert_eq!(CellValue::Text("n/a".into()).as_f64(), None);
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
        assert!(CellValue::Text("  ".into()).is_blank());
        assert!(!CellValue::Integer(0).is_blank());
    }

    #[test]
    fn gender_parses_both_values() {
        assert_eq!(" female".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!("MALE".parse::<Gender>(), Ok(Gender::Male));
        assert!("other".parse::<Gender>().is_err());
    }
}
