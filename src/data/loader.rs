use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{MisInterval, ReferenceTable, SeaLevelRecord};

const AGE_COLUMN: &str = "age_ka";
const ICE_VOLUME_COLUMN: &str = "d18Ow_IV";
const SEA_LEVEL_COLUMN: &str = "SL_m";

const INTERVAL_COLUMN: &str = "interval";
const AGE_START_COLUMN: &str = "age_start";
const AGE_END_COLUMN: &str = "age_end";
const GLACIAL_COLUMN: &str = "glacial";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the sea-level reference table.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with `age_ka,d18Ow_IV,SL_m` (extra columns ignored)
/// * `.json`    – `[{ "age_ka": 18, "d18Ow_IV": 1.0, "SL_m": -120.0 }, ...]`
/// * `.parquet` – numeric columns with the same names
///
/// Ages may be written as integral floats (`18.0`); anything else is an error.
pub fn load_reference_table(path: &Path) -> Result<ReferenceTable> {
    let records = match extension(path).as_str() {
        "csv" => reference_from_csv(path),
        "json" => reference_from_json(path),
        "parquet" | "pq" => reference_from_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading reference table {}", path.display()))?;

    let table = ReferenceTable::from_records(records)?;
    info!(
        "loaded {} sea-level rows from {} (ages {:?})",
        table.len(),
        path.display(),
        table.age_range()
    );
    Ok(table)
}

/// Load Marine Isotope Stage boundaries.  Dispatch by extension.
///
/// Columns: `interval`, `age_start`, `age_end`, `glacial`. The `glacial`
/// column holds `"glacial"` for glacial stages; any other text (usually
/// `"interglacial"`) marks an interglacial. Booleans are accepted too.
pub fn load_mis_boundaries(path: &Path) -> Result<Vec<MisInterval>> {
    let intervals = match extension(path).as_str() {
        "csv" => mis_from_csv(path),
        "json" => mis_from_json(path),
        "parquet" | "pq" => mis_from_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading MIS boundaries {}", path.display()))?;

    info!("loaded {} MIS intervals from {}", intervals.len(), path.display());
    Ok(intervals)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Ages are stored to the nearest 1 ka, sometimes as floats.
fn integral_age(value: f64, row: usize) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        bail!("Row {row}: '{AGE_COLUMN}' = {value} is not a whole number of ka");
    }
    Ok(value as i64)
}

fn is_glacial_label(label: &str) -> bool {
    label.trim() == "glacial"
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

struct CsvTable {
    headers: Vec<String>,
    records: Vec<csv::StringRecord>,
}

impl CsvTable {
    fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
        let headers: Vec<String> = reader
            .headers()
            .context("reading CSV headers")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let records = reader
            .records()
            .enumerate()
            .map(|(row_no, r)| r.with_context(|| format!("CSV row {row_no}")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { headers, records })
    }

    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    }
}

fn csv_f64(record: &csv::StringRecord, idx: usize, row: usize, col: &str) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{raw}' is not a number"))
}

fn reference_from_csv(path: &Path) -> Result<Vec<SeaLevelRecord>> {
    let table = CsvTable::read(path)?;
    let age_idx = table.column(AGE_COLUMN)?;
    let iv_idx = table.column(ICE_VOLUME_COLUMN)?;
    let sl_idx = table.column(SEA_LEVEL_COLUMN)?;

    table
        .records
        .iter()
        .enumerate()
        .map(|(row, record)| -> Result<_> {
            Ok(SeaLevelRecord {
                age_ka: integral_age(csv_f64(record, age_idx, row, AGE_COLUMN)?, row)?,
                d18ow_iv: csv_f64(record, iv_idx, row, ICE_VOLUME_COLUMN)?,
                sl_m: csv_f64(record, sl_idx, row, SEA_LEVEL_COLUMN)?,
            })
        })
        .collect()
}

fn mis_from_csv(path: &Path) -> Result<Vec<MisInterval>> {
    let table = CsvTable::read(path)?;
    let name_idx = table.column(INTERVAL_COLUMN)?;
    let start_idx = table.column(AGE_START_COLUMN)?;
    let end_idx = table.column(AGE_END_COLUMN)?;
    let glacial_idx = table.column(GLACIAL_COLUMN)?;

    table
        .records
        .iter()
        .enumerate()
        .map(|(row, record)| -> Result<_> {
            let glacial = record.get(glacial_idx).unwrap_or("");
            Ok(MisInterval {
                interval: record.get(name_idx).unwrap_or("").trim().to_string(),
                age_start: csv_f64(record, start_idx, row, AGE_START_COLUMN)?,
                age_end: csv_f64(record, end_idx, row, AGE_END_COLUMN)?,
                glacial: is_glacial_label(glacial) || glacial.trim() == "true",
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`.
fn json_records(path: &Path) -> Result<Vec<Map<String, JsonValue>>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            rec.as_object()
                .cloned()
                .with_context(|| format!("Row {i} is not a JSON object"))
        })
        .collect()
}

fn json_f64(obj: &Map<String, JsonValue>, row: usize, col: &str) -> Result<f64> {
    obj.get(col)
        .and_then(|v| v.as_f64())
        .with_context(|| format!("Row {row}: missing or non-numeric '{col}'"))
}

fn reference_from_json(path: &Path) -> Result<Vec<SeaLevelRecord>> {
    json_records(path)?
        .iter()
        .enumerate()
        .map(|(row, obj)| -> Result<_> {
            Ok(SeaLevelRecord {
                age_ka: integral_age(json_f64(obj, row, AGE_COLUMN)?, row)?,
                d18ow_iv: json_f64(obj, row, ICE_VOLUME_COLUMN)?,
                sl_m: json_f64(obj, row, SEA_LEVEL_COLUMN)?,
            })
        })
        .collect()
}

fn mis_from_json(path: &Path) -> Result<Vec<MisInterval>> {
    json_records(path)?
        .iter()
        .enumerate()
        .map(|(row, obj)| -> Result<_> {
            let interval = obj
                .get(INTERVAL_COLUMN)
                .and_then(|v| v.as_str())
                .with_context(|| format!("Row {row}: missing '{INTERVAL_COLUMN}'"))?;
            let glacial = match obj.get(GLACIAL_COLUMN) {
                Some(JsonValue::String(s)) => is_glacial_label(s),
                Some(JsonValue::Bool(b)) => *b,
                _ => bail!("Row {row}: missing or invalid '{GLACIAL_COLUMN}'"),
            };
            Ok(MisInterval {
                interval: interval.to_string(),
                age_start: json_f64(obj, row, AGE_START_COLUMN)?,
                age_end: json_f64(obj, row, AGE_END_COLUMN)?,
                glacial,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Read every record batch of a Parquet file.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn parquet_batches(path: &Path) -> Result<Vec<RecordBatch>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;
    reader
        .map(|batch| batch.context("reading parquet record batch"))
        .collect()
}

fn batch_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn reference_from_parquet(path: &Path) -> Result<Vec<SeaLevelRecord>> {
    let mut records = Vec::new();
    for batch in parquet_batches(path)? {
        let age = batch_column(&batch, AGE_COLUMN)?;
        let iv = batch_column(&batch, ICE_VOLUME_COLUMN)?;
        let sl = batch_column(&batch, SEA_LEVEL_COLUMN)?;

        for row in 0..batch.num_rows() {
            let age_ka = extract_f64(age, row).with_context(|| format!("Row {row}: '{AGE_COLUMN}'"))?;
            records.push(SeaLevelRecord {
                age_ka: integral_age(age_ka, row)?,
                d18ow_iv: extract_f64(iv, row)
                    .with_context(|| format!("Row {row}: '{ICE_VOLUME_COLUMN}'"))?,
                sl_m: extract_f64(sl, row)
                    .with_context(|| format!("Row {row}: '{SEA_LEVEL_COLUMN}'"))?,
            });
        }
    }
    Ok(records)
}

fn mis_from_parquet(path: &Path) -> Result<Vec<MisInterval>> {
    let mut intervals = Vec::new();
    for batch in parquet_batches(path)? {
        let name = batch_column(&batch, INTERVAL_COLUMN)?;
        let start = batch_column(&batch, AGE_START_COLUMN)?;
        let end = batch_column(&batch, AGE_END_COLUMN)?;
        let glacial = batch_column(&batch, GLACIAL_COLUMN)?;

        for row in 0..batch.num_rows() {
            intervals.push(MisInterval {
                interval: extract_string(name, row)
                    .with_context(|| format!("Row {row}: '{INTERVAL_COLUMN}'"))?,
                age_start: extract_f64(start, row)
                    .with_context(|| format!("Row {row}: '{AGE_START_COLUMN}'"))?,
                age_end: extract_f64(end, row)
                    .with_context(|| format!("Row {row}: '{AGE_END_COLUMN}'"))?,
                glacial: extract_glacial(glacial, row)
                    .with_context(|| format!("Row {row}: '{GLACIAL_COLUMN}'"))?,
            });
        }
    }
    Ok(intervals)
}

// -- Arrow helpers --

/// Read a numeric cell as `f64`, whatever the integer/float width.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    let value = match col.data_type() {
        DataType::Float64 => downcast::<Float64Array>(col)?.value(row),
        DataType::Float32 => downcast::<Float32Array>(col)?.value(row) as f64,
        DataType::Int64 => downcast::<Int64Array>(col)?.value(row) as f64,
        DataType::Int32 => downcast::<Int32Array>(col)?.value(row) as f64,
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(value)
}

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in text column");
    }
    match col.data_type() {
        DataType::Utf8 => Ok(downcast::<StringArray>(col)?.value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected a text column, got {other:?}"),
    }
}

fn extract_glacial(col: &Arc<dyn Array>, row: usize) -> Result<bool> {
    match col.data_type() {
        DataType::Boolean => {
            if col.is_null(row) {
                bail!("null value in boolean column");
            }
            Ok(downcast::<BooleanArray>(col)?.value(row))
        }
        _ => extract_string(col, row).map(|s| is_glacial_label(&s)),
    }
}

fn downcast<T: 'static>(col: &Arc<dyn Array>) -> Result<&T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array type {:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_reference_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "sea_level.csv",
            "age_ka,d18Ow_IV,SL_m,note\n0,0.0,0.0,modern\n18.0,1.0,-120.0,lgm\n19,1.02,-123.5,\n",
        );
        let table = load_reference_table(&path).unwrap();
        assert_eq!(table.len(), 3);
        let lgm = table.get(18).unwrap();
        assert_eq!(lgm.d18ow_iv, 1.0);
        assert_eq!(lgm.sl_m, -120.0);
        assert_eq!(table.age_range(), Some((0, 19)));
    }

    #[test]
    fn test_reference_csv_rejects_fractional_age() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.csv", "age_ka,d18Ow_IV,SL_m\n18.3,1.0,-120.0\n");
        let err = load_reference_table(&path).unwrap_err();
        assert!(format!("{err:#}").contains("not a whole number"));
    }

    #[test]
    fn test_reference_csv_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.csv", "age_ka,SL_m\n18,-120.0\n");
        let err = load_reference_table(&path).unwrap_err();
        assert!(format!("{err:#}").contains("d18Ow_IV"));
    }

    #[test]
    fn test_reference_duplicate_age() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "dup.csv",
            "age_ka,d18Ow_IV,SL_m\n18,1.0,-120.0\n18.0,1.1,-121.0\n",
        );
        let err = load_reference_table(&path).unwrap_err();
        assert!(format!("{err:#}").contains("more than one row for age 18"));
    }

    #[test]
    fn test_reference_json() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "sea_level.json",
            r#"[{"age_ka": 18, "d18Ow_IV": 1.0, "SL_m": -120.0},
                {"age_ka": 20.0, "d18Ow_IV": 1.05, "SL_m": -125.0}]"#,
        );
        let table = load_reference_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(20).unwrap().sl_m, -125.0);
    }

    #[test]
    fn test_reference_parquet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sea_level.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("age_ka", DataType::Int64, false),
            Field::new("d18Ow_IV", DataType::Float64, false),
            Field::new("SL_m", DataType::Float32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![17, 18])),
                Arc::new(Float64Array::from(vec![0.95, 1.0])),
                Arc::new(Float32Array::from(vec![-115.0f32, -120.0])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_reference_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(18).unwrap().sl_m, -120.0);
        assert_eq!(table.get(17).unwrap().d18ow_iv, 0.95);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "sea_level.xlsx", "");
        let err = load_reference_table(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension: .xlsx"));
    }

    #[test]
    fn test_mis_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "MIS_boundaries.csv",
            "interval,age_start,age_end,glacial\nMIS 1,0,14,interglacial\nMIS 2,14,29,glacial\n",
        );
        let intervals = load_mis_boundaries(&path).unwrap();
        assert_eq!(intervals.len(), 2);
        assert!(!intervals[0].glacial);
        assert!(intervals[1].glacial);
        assert_eq!(intervals[1].interval, "MIS 2");
        assert_eq!(intervals[1].age_end, 29.0);
    }

    #[test]
    fn test_mis_json_accepts_bool_and_text() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "mis.json",
            r#"[{"interval": "MIS 5", "age_start": 71, "age_end": 130, "glacial": false},
                {"interval": "MIS 6", "age_start": 130, "age_end": 191, "glacial": "glacial"}]"#,
        );
        let intervals = load_mis_boundaries(&path).unwrap();
        assert!(!intervals[0].glacial);
        assert!(intervals[1].glacial);
    }
}
