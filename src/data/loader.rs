use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::model::{
    CompanySize, EmploymentType, ExperienceLevel, Record, RecordTable, REMOTE_RATIOS,
};

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "salary_in_usd",
    "work_year",
    "experience_level",
    "employment_type",
    "company_size",
    "remote_ratio",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a salary table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least [`REQUIRED_COLUMNS`]; extra columns are ignored
/// * `.json`    – `[{ "salary_in_usd": 85000, "work_year": "2023", ... }, ...]`
/// * `.parquet` – flat columns named like the CSV headers
pub fn load_file(path: &Path) -> Result<RecordTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!("Loaded {} salary records from {}", table.len(), path.display());
    Ok(table)
}

// ---------------------------------------------------------------------------
// Raw row – untyped fields shared by every format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawRow {
    salary_in_usd: f64,
    work_year: f64,
    experience_level: String,
    employment_type: String,
    company_size: String,
    remote_ratio: f64,
}

impl RawRow {
    /// Validate codes and ranges.  Unknown codes are data-quality errors.
    fn into_record(self, row: usize) -> Result<Record> {
        if !self.salary_in_usd.is_finite() || self.salary_in_usd < 0.0 {
            bail!("Row {row}: salary_in_usd {} is not a non-negative number", self.salary_in_usd);
        }
        let work_year = whole_number(self.work_year)
            .and_then(|y| i32::try_from(y).ok())
            .with_context(|| format!("Row {row}: work_year {} is not a year", self.work_year))?;
        let experience_level = ExperienceLevel::from_code(self.experience_level.trim())
            .with_context(|| {
                format!("Row {row}: unknown experience_level '{}'", self.experience_level)
            })?;
        let employment_type = EmploymentType::from_code(self.employment_type.trim())
            .with_context(|| {
                format!("Row {row}: unknown employment_type '{}'", self.employment_type)
            })?;
        let company_size = CompanySize::from_code(self.company_size.trim())
            .with_context(|| format!("Row {row}: unknown company_size '{}'", self.company_size))?;
        let remote_ratio = whole_number(self.remote_ratio)
            .and_then(|r| u8::try_from(r).ok())
            .filter(|r| REMOTE_RATIOS.contains(r))
            .with_context(|| {
                format!("Row {row}: remote_ratio {} is not one of 0, 50, 100", self.remote_ratio)
            })?;

        Ok(Record {
            salary_usd: self.salary_in_usd,
            work_year,
            experience_level,
            employment_type,
            company_size,
            remote_ratio,
        })
    }
}

fn whole_number(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one posting per row.
fn load_csv(path: &Path) -> Result<RecordTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            bail!("CSV missing '{col}' column");
        }
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRow>().enumerate() {
        let raw = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(raw.into_record(row_no)?);
    }

    Ok(RecordTable::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented).  Numeric fields may be numbers
/// or numeric strings, as produced by most CSV-to-JSON exporters.
///
/// ```json
/// [
///   { "salary_in_usd": 85847, "work_year": "2023", "experience_level": "SE",
///     "employment_type": "FT", "company_size": "L", "remote_ratio": 100 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RecordTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let raw = RawRow {
            salary_in_usd: json_number(obj, "salary_in_usd", i)?,
            work_year: json_number(obj, "work_year", i)?,
            experience_level: json_text(obj, "experience_level", i)?,
            employment_type: json_text(obj, "employment_type", i)?,
            company_size: json_text(obj, "company_size", i)?,
            remote_ratio: json_number(obj, "remote_ratio", i)?,
        };
        records.push(raw.into_record(i)?);
    }

    Ok(RecordTable::from_records(records))
}

fn json_number(obj: &Map<String, JsonValue>, key: &str, row: usize) -> Result<f64> {
    match obj.get(key) {
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .with_context(|| format!("Row {row}: '{key}' is out of range")),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Row {row}: '{key}' value '{s}' is not a number")),
        Some(other) => bail!("Row {row}: '{key}' has unexpected value {other}"),
        None => bail!("Row {row}: missing '{key}'"),
    }
}

fn json_text(obj: &Map<String, JsonValue>, key: &str, row: usize) -> Result<String> {
    match obj.get(key) {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(other) => bail!("Row {row}: '{key}' has unexpected value {other}"),
        None => bail!("Row {row}: missing '{key}'"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per required field.
///
/// Numeric columns may be Int32, Int64, Float32, Float64 or numeric strings;
/// code columns must be Utf8/LargeUtf8.
fn load_parquet(path: &Path) -> Result<RecordTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut row_base = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let salary = column(&batch, "salary_in_usd")?;
        let year = column(&batch, "work_year")?;
        let experience = column(&batch, "experience_level")?;
        let employment = column(&batch, "employment_type")?;
        let size = column(&batch, "company_size")?;
        let remote = column(&batch, "remote_ratio")?;

        for row in 0..batch.num_rows() {
            let row_no = row_base + row;
            let raw = RawRow {
                salary_in_usd: numeric_at(salary, row)
                    .with_context(|| format!("Row {row_no}: salary_in_usd"))?,
                work_year: numeric_at(year, row)
                    .with_context(|| format!("Row {row_no}: work_year"))?,
                experience_level: text_at(experience, row)
                    .with_context(|| format!("Row {row_no}: experience_level"))?,
                employment_type: text_at(employment, row)
                    .with_context(|| format!("Row {row_no}: employment_type"))?,
                company_size: text_at(size, row)
                    .with_context(|| format!("Row {row_no}: company_size"))?,
                remote_ratio: numeric_at(remote, row)
                    .with_context(|| format!("Row {row_no}: remote_ratio"))?,
            };
            records.push(raw.into_record(row_no)?);
        }
        row_base += batch.num_rows();
    }

    Ok(RecordTable::from_records(records))
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

/// Read a single numeric cell.
fn numeric_at(col: &ArrayRef, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value");
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Int32 => Ok(f64::from(
            any.downcast_ref::<Int32Array>()
                .context("expected Int32Array")?
                .value(row),
        )),
        DataType::Int64 => Ok(any
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row) as f64),
        DataType::Float32 => Ok(f64::from(
            any.downcast_ref::<Float32Array>()
                .context("expected Float32Array")?
                .value(row),
        )),
        DataType::Float64 => Ok(any
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row)),
        DataType::Utf8 | DataType::LargeUtf8 => {
            let s = text_at(col, row)?;
            s.trim()
                .parse::<f64>()
                .with_context(|| format!("'{s}' is not a number"))
        }
        other => bail!("Expected a numeric column, got {other:?}"),
    }
}

/// Read a single text cell.
fn text_at(col: &ArrayRef, row: usize) -> Result<String> {
    use arrow::array::AsArray;

    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected a string column, got {other:?}"),
    }
}
