use crate::error::Result;
use crate::structs::{HourlyTotal, RentalRecord, WeatherCode};
use arrow_array::{RecordBatch, UInt32Array, UInt64Array};
use arrow_schema::{DataType, Field, Schema};
use chrono::NaiveDate;
use csv::Writer;
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path, sync::Arc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw CSV row as it appears in the pre-aggregated dataset. Columns the
/// analytics never touch (season, temp, windspeed, ...) are ignored by the
/// header-driven deserialization.
#[derive(Debug, Deserialize)]
struct RawRow {
    dteday: String,
    hr: u32,
    weathersit: u8,
    casual: u32,
    registered: u32,
    cnt: u32,
}

impl RawRow {
    fn into_record(self) -> Option<RentalRecord> {
        let dteday = match NaiveDate::parse_from_str(&self.dteday, DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => {
                debug!("Skipping row with unparseable date: {}", self.dteday);
                return None;
            }
        };
        let weathersit = match WeatherCode::try_from(self.weathersit) {
            Ok(code) => code,
            Err(raw) => {
                debug!("Skipping row with unknown weather code: {}", raw);
                return None;
            }
        };
        Some(RentalRecord {
            dteday,
            hr: self.hr,
            weathersit,
            casual: self.casual,
            registered: self.registered,
            cnt: self.cnt,
        })
    }
}

/// Reads the bike-rental dataset from a CSV file.
///
/// Rows with an unparseable date or a weather code outside 1-4 are skipped
/// and logged rather than failing the load; the number of skipped rows is
/// reported at debug level.
///
/// # Arguments
/// * `input_path` - Path to the pre-aggregated rental CSV
///
/// # Returns
/// Returns the loaded records in file order.
///
/// # Errors
/// Returns error if the file cannot be opened or a row is structurally
/// invalid (missing columns, non-numeric counts).
pub fn read_records(input_path: &Path) -> Result<Vec<RentalRecord>> {
    let file = File::open(input_path)?;
    read_records_from(file)
}

/// Reads rental records from any CSV source. Split out from [`read_records`]
/// so in-memory buffers can be loaded the same way as files.
pub fn read_records_from<R: Read>(source: R) -> Result<Vec<RentalRecord>> {
    let mut reader = csv::Reader::from_reader(source);
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.deserialize::<RawRow>() {
        match row?.into_record() {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    debug!("Loaded {} records, skipped {} rows", records.len(), skipped);
    Ok(records)
}

/// Writes the 24-slot hourly totals to a CSV file for charting.
///
/// # Arguments
/// * `results` - Hourly totals, one entry per hour 0-23
/// * `output_path` - Path where the CSV file will be created
///
/// # Returns
/// Returns `Ok(())` on success.
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_csv(results: &[HourlyTotal], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["Hour", "Total_Rentals"])?;
    for slot in results {
        writer.write_record(&[slot.hr.to_string(), slot.cnt.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the hourly totals to a pretty-formatted JSON file.
///
/// # Arguments
/// * `results` - Hourly totals, one entry per hour 0-23
/// * `output_path` - Path where the JSON file will be created
///
/// # Returns
/// Returns `Ok(())` on success.
///
/// # Errors
/// Returns error if file cannot be created or serialization fails.
pub fn write_json(results: &[HourlyTotal], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}

/// Writes the hourly totals to a columnar Parquet file using Arrow format.
///
/// # Arguments
/// * `results` - Hourly totals, one entry per hour 0-23
/// * `output_path` - Path where the Parquet file will be created
///
/// # Returns
/// Returns `Ok(())` on success.
///
/// # Errors
/// Returns error if file cannot be created, schema is invalid, or Arrow
/// operations fail.
pub fn write_parquet(results: &[HourlyTotal], output_path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("hr", DataType::UInt32, false),
        Field::new("cnt", DataType::UInt64, false),
    ]));

    let hours: UInt32Array = results.iter().map(|s| s.hr).collect();
    let counts: UInt64Array = results.iter().map(|s| s.cnt).collect();

    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(hours), Arc::new(counts)])?;

    let file = File::create(output_path)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}
