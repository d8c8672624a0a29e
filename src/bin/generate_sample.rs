use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// δ18O_sw change per metre of sea-level fall (‰/m), ~1 ‰ over a full glacial.
const ICE_VOLUME_PER_METRE: f64 = 1.0 / 120.0;

/// Synthetic relative sea level (m): a 100 kyr sawtooth with a 41 kyr wobble.
fn sea_level(age_ka: i64) -> f64 {
    let t = age_ka as f64;
    let phase = (t % 100.0) / 100.0;
    let sawtooth = if phase < 0.9 {
        // slow build-up of ice
        -120.0 * phase / 0.9
    } else {
        // rapid termination
        -120.0 * (1.0 - phase) / 0.1
    };
    sawtooth + 10.0 * (2.0 * std::f64::consts::PI * t / 41.0).sin()
}

const MIS_BOUNDARIES: &str = "\
interval,age_start,age_end,glacial
MIS 1,0,14,interglacial
MIS 2,14,29,glacial
MIS 3,29,57,interglacial
MIS 4,57,71,glacial
MIS 5,71,130,interglacial
MIS 6,130,191,glacial
MIS 7,191,243,interglacial
MIS 8,243,300,glacial
";

fn main() -> Result<()> {
    let ages: Vec<i64> = (0..=500).collect();
    let sl: Vec<f64> = ages.iter().map(|&a| sea_level(a)).collect();
    let d18ow_iv: Vec<f64> = sl.iter().map(|&s| -s * ICE_VOLUME_PER_METRE).collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("age_ka", DataType::Int64, false),
        Field::new("d18Ow_IV", DataType::Float64, false),
        Field::new("SL_m", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(ages.clone())),
            Arc::new(Float64Array::from(d18ow_iv)),
            Arc::new(Float64Array::from(sl)),
        ],
    )
    .context("building record batch")?;

    let table_path = "sea_level_sample.parquet";
    let file = std::fs::File::create(table_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    let mis_path = "MIS_boundaries_sample.csv";
    std::fs::write(mis_path, MIS_BOUNDARIES).context("writing MIS table")?;

    println!(
        "Wrote {} sea-level rows to {table_path} and MIS boundaries to {mis_path}",
        ages.len()
    );
    Ok(())
}
