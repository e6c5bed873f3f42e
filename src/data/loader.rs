use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{new_null_array, Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use log::{debug, error, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::fixture::fixture_dataset;
use super::model::{
    normalize_column, CategoricalField, CellValue, DataOrigin, Dataset, Gender, NumericField,
    Record, NO_DISORDER,
};
use crate::error::LoadError;

/// Optional identifier column.
pub const PERSON_ID_COLUMN: &str = "Person_ID";

/// Cell spellings treated as an absent sleep disorder.
const DISORDER_NULL_MARKERS: [&str; 5] = ["na", "n/a", "nan", "null", "none"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one record per line
/// * `.json`    – `[{ "Gender": "Male", "Sleep Duration": 7.5, ... }, ...]`
/// * `.parquet` – flat columns of strings, integers, floats or booleans
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(open(path)?)?,
        "json" => read_json(BufReader::new(open(path)?))?,
        "parquet" | "pq" => read_parquet(open(path)?)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let dataset = table.into_dataset(DataOrigin::File(path.to_path_buf()))?;
    info!("loaded {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Load a CSV dataset from an arbitrary byte stream.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let dataset = read_csv(reader)?.into_dataset(DataOrigin::Stream)?;
    info!("loaded {} records from stream", dataset.len());
    Ok(dataset)
}

/// Result of a load that may have fallen back to the built-in fixture.
#[derive(Debug)]
pub struct LoadOutcome {
    pub dataset: Dataset,
    /// The error that forced the fixture substitution, if any.
    pub degraded: Option<LoadError>,
}

impl LoadOutcome {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Load `path`, substituting the fixture dataset on failure when `fallback`
/// is enabled. With `fallback` disabled the load error is returned as-is.
pub fn load_with_fallback(path: &Path, fallback: bool) -> Result<LoadOutcome, LoadError> {
    match load_file(path) {
        Ok(dataset) => Ok(LoadOutcome {
            dataset,
            degraded: None,
        }),
        Err(err) if fallback => {
            error!("failed to load {}: {err}", path.display());
            let dataset = fixture_dataset();
            warn!(
                "degraded mode: using built-in fixture dataset ({} records) instead of {}",
                dataset.len(),
                path.display()
            );
            Ok(LoadOutcome {
                dataset,
                degraded: Some(err),
            })
        }
        Err(err) => Err(err),
    }
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// RawTable – normalized headers plus untyped cells
// ---------------------------------------------------------------------------

/// Format-independent intermediate table. Column names are already normalized.
#[derive(Debug, Clone, Default)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    /// Columns whose source type could not be read.
    unreadable: Vec<usize>,
}

static NULL_CELL: CellValue = CellValue::Null;

impl RawTable {
    /// Index of the column whose normalized name matches `name` (ASCII
    /// case-insensitive).
    fn locate(&self, name: &str) -> Result<Option<usize>, LoadError> {
        let mut hits = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.eq_ignore_ascii_case(name))
            .map(|(i, _)| i);
        let first = hits.next();
        if hits.next().is_some() {
            return Err(LoadError::DuplicateColumn(name.to_string()));
        }
        Ok(first)
    }

    fn require(&self, name: &str) -> Result<usize, LoadError> {
        let idx = self
            .locate(name)?
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))?;
        if self.unreadable.contains(&idx) {
            return Err(LoadError::Malformed(format!("column {name} has an unsupported type")));
        }
        Ok(idx)
    }

    fn into_dataset(self, origin: DataOrigin) -> Result<Dataset, LoadError> {
        let layout = ColumnLayout::resolve(&self)?;
        if self.rows.is_empty() {
            return Err(LoadError::Empty);
        }

        let mut excluded = 0usize;
        let mut records = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            let mut cells = RowCells {
                row_no: i + 1,
                row,
                excluded: 0,
            };
            records.push(layout.record(&mut cells)?);
            excluded += cells.excluded;
        }

        if excluded > 0 {
            warn!("{excluded} numeric cells were missing or invalid and excluded from statistics");
        }
        Ok(Dataset::new(records, origin))
    }
}

/// Column positions of every field the pipeline reads.
struct ColumnLayout {
    person_id: Option<usize>,
    gender: usize,
    bmi_category: usize,
    sleep_disorder: usize,
    numeric: HashMap<NumericField, usize>,
}

impl ColumnLayout {
    fn resolve(table: &RawTable) -> Result<Self, LoadError> {
        let mut numeric = HashMap::new();
        for field in NumericField::ALL {
            numeric.insert(field, table.require(field.column_name())?);
        }
        Ok(ColumnLayout {
            person_id: table.locate(PERSON_ID_COLUMN)?,
            gender: table.require(CategoricalField::Gender.column_name())?,
            bmi_category: table.require(CategoricalField::BmiCategory.column_name())?,
            sleep_disorder: table.require(CategoricalField::SleepDisorder.column_name())?,
            numeric,
        })
    }

    fn record(&self, cells: &mut RowCells<'_>) -> Result<Record, LoadError> {
        let gender_cell = cells.get(self.gender);
        let gender = gender_cell
            .to_string()
            .parse::<Gender>()
            .map_err(|_| cells.invalid(CategoricalField::Gender.column_name(), gender_cell))?;

        let bmi_cell = cells.get(self.bmi_category);
        if bmi_cell.is_blank() {
            return Err(cells.invalid(CategoricalField::BmiCategory.column_name(), bmi_cell));
        }

        Ok(Record {
            person_id: self
                .person_id
                .and_then(|idx| cells.integer(idx, PERSON_ID_COLUMN, |v| v >= 0)),
            gender,
            age: cells.integer(self.numeric[&NumericField::Age], "Age", |v| v > 0),
            sleep_duration: cells.float(
                self.numeric[&NumericField::SleepDuration],
                "Sleep_Duration",
                |v| v > 0.0,
            ),
            quality_of_sleep: cells.integer(
                self.numeric[&NumericField::QualityOfSleep],
                "Quality_of_Sleep",
                |v| (1..=10).contains(&v),
            ),
            physical_activity_level: cells.float(
                self.numeric[&NumericField::PhysicalActivityLevel],
                "Physical_Activity_Level",
                |v| v >= 0.0,
            ),
            stress_level: cells.integer(
                self.numeric[&NumericField::StressLevel],
                "Stress_Level",
                |v| (1..=10).contains(&v),
            ),
            bmi_category: bmi_cell.to_string().trim().to_string(),
            heart_rate: cells.integer(self.numeric[&NumericField::HeartRate], "Heart_Rate", |v| {
                v > 0
            }),
            daily_steps: cells.integer(
                self.numeric[&NumericField::DailySteps],
                "Daily_Steps",
                |v| v >= 0,
            ),
            sleep_disorder: sleep_disorder_or_none(cells.get(self.sleep_disorder)),
        })
    }
}

/// Missing-value policy: an absent sleep disorder becomes the literal "None".
fn sleep_disorder_or_none(cell: &CellValue) -> String {
    let text = cell.to_string();
    let text = text.trim();
    if cell.is_blank()
        || DISORDER_NULL_MARKERS
            .iter()
            .any(|m| text.eq_ignore_ascii_case(m))
    {
        NO_DISORDER.to_string()
    } else {
        text.to_string()
    }
}

/// One raw row being converted, with a tally of excluded numeric cells.
struct RowCells<'a> {
    row_no: usize,
    row: &'a [CellValue],
    excluded: usize,
}

impl<'a> RowCells<'a> {
    fn get(&self, idx: usize) -> &'a CellValue {
        self.row.get(idx).unwrap_or(&NULL_CELL)
    }

    fn invalid(&self, column: &str, cell: &CellValue) -> LoadError {
        LoadError::InvalidValue {
            row: self.row_no,
            column: column.to_string(),
            value: cell.to_string(),
        }
    }

    fn exclude(&mut self, column: &str, cell: &CellValue) {
        debug!("row {}: excluding '{cell}' from {column}", self.row_no);
        self.excluded += 1;
    }

    fn float(&mut self, idx: usize, column: &str, valid: impl Fn(f64) -> bool) -> Option<f64> {
        let cell = self.get(idx);
        if cell.is_blank() {
            self.excluded += 1;
            return None;
        }
        match cell.as_f64() {
            Some(v) if valid(v) => Some(v),
            _ => {
                self.exclude(column, cell);
                None
            }
        }
    }

    fn integer<T: TryFrom<i64>>(
        &mut self,
        idx: usize,
        column: &str,
        valid: impl Fn(i64) -> bool,
    ) -> Option<T> {
        let cell = self.get(idx);
        if cell.is_blank() {
            self.excluded += 1;
            return None;
        }
        let parsed = cell
            .as_f64()
            .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
            .map(|v| v as i64)
            .filter(|v| valid(*v))
            .and_then(|v| T::try_from(v).ok());
        if parsed.is_none() {
            self.exclude(column, cell);
        }
        parsed
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
fn read_csv<R: Read>(reader: R) -> Result<RawTable, LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let columns: Vec<String> = reader.headers()?.iter().map(normalize_column).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable {
        columns,
        rows,
        ..RawTable::default()
    })
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Gender": "Male", "Sleep Duration": 7.5, "Sleep Disorder": null, ... },
///   ...
/// ]
/// ```
///
/// Keys missing from an object read as null. Two keys of one object that
/// normalize to the same column are a `DuplicateColumn` error.
fn read_json<R: Read>(reader: R) -> Result<RawTable, LoadError> {
    let root: JsonValue = serde_json::from_reader(reader)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected a top-level JSON array".to_string()))?;

    let mut table = RawTable::default();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut objects = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {} is not a JSON object", i + 1)))?;
        let mut seen = HashSet::with_capacity(obj.len());
        for key in obj.keys() {
            let name = normalize_column(key);
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(LoadError::DuplicateColumn(name));
            }
            if !positions.contains_key(&name) {
                positions.insert(name.clone(), table.columns.len());
                table.columns.push(name);
            }
        }
        objects.push(obj);
    }

    for obj in objects {
        let mut row = vec![CellValue::Null; table.columns.len()];
        for (key, val) in obj {
            if let Some(&idx) = positions.get(&normalize_column(key)) {
                row[idx] = json_to_cell(val);
            }
        }
        table.rows.push(row);
    }

    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => guess_cell_type(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Narrow integer, half-precision and
/// dictionary-encoded columns are widened with Arrow's cast kernel first;
/// a column that cannot be widened is kept as all-null and flagged, so that
/// requiring it fails the load.
fn read_parquet(file: File) -> Result<RawTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| normalize_column(f.name()))
        .collect();
    let reader = builder.build()?;

    let mut table = RawTable {
        columns,
        ..RawTable::default()
    };
    for batch in reader {
        let batch = batch?;
        let mut widened = Vec::with_capacity(batch.num_columns());
        for (idx, col) in batch.columns().iter().enumerate() {
            match widen(col) {
                Some(col) => widened.push(col),
                None => {
                    if !table.unreadable.contains(&idx) {
                        debug!(
                            "unsupported Parquet column type {:?} for {}",
                            col.data_type(),
                            table.columns[idx]
                        );
                        table.unreadable.push(idx);
                    }
                    widened.push(new_null_array(&DataType::Null, col.len()));
                }
            }
        }
        for row in 0..batch.num_rows() {
            table
                .rows
                .push(widened.iter().map(|col| arrow_cell(col, row)).collect());
        }
    }

    Ok(table)
}

/// Cast a column to one of the four types `arrow_cell` reads.
fn widen(col: &ArrayRef) -> Option<ArrayRef> {
    let target = match col.data_type() {
        DataType::Null
        | DataType::Utf8
        | DataType::Int64
        | DataType::Float64
        | DataType::Boolean => return Some(Arc::clone(col)),
        t if t.is_integer() => DataType::Int64,
        t if t.is_floating() => DataType::Float64,
        DataType::LargeUtf8 | DataType::Utf8View | DataType::Dictionary(_, _) => DataType::Utf8,
        _ => return None,
    };
    cast(col, &target).ok()
}

/// Extract a single cell from a widened Arrow column.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let cell = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| guess_cell_type(a.value(row))),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };
    cell.unwrap_or(CellValue::Null)
}
