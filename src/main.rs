use chrono::NaiveDate;
use clap::Parser;
use lib::{
    PipelineError, SimpleLogger, WeatherCode, filter_date_range, hourly_profile, hourly_totals,
    read_records, rfm_distribution, usage_summary, weather_breakdown, write_csv, write_json,
    write_parquet,
};
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV file with the pre-aggregated rental dataset
    #[arg(short, long)]
    input_file: PathBuf,

    /// Output base name (will create dir containing .csv, .json, and .parquet files)
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Date for the filtered hourly view (YYYY-MM-DD). Defaults to the
    /// earliest date in the dataset.
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Weather conditions to filter the hourly view by (e.g. clear,mist).
    /// If not specified, all conditions pass.
    #[arg(short, long, value_delimiter = ',')]
    weather: Vec<WeatherCode>,

    /// Start date (inclusive) for the weather-correlation view (optional)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// End date (inclusive) for the weather-correlation view (optional)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() -> Result<(), PipelineError> {
    // Initialize timer and logger
    let total_start = Instant::now();
    log::set_logger(&LOGGER).unwrap();

    // Acquire CLI args
    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }
    let weather_display = if args.weather.is_empty() {
        "ALL".to_string()
    } else {
        args.weather
            .iter()
            .map(|code| code.label())
            .collect::<Vec<_>>()
            .join(",")
    };

    // UI
    println!("BikeStats! Bike-Sharing Analysis Pipeline");
    debug!(
        "Input file: {} | Weather: {}",
        args.input_file.display(),
        weather_display
    );

    // Load the dataset
    println!("Loading dataset...");
    let load_start = Instant::now();
    let records = read_records(&args.input_file)?;
    println!(
        "Loaded {} records in {:.2?}",
        records.len(),
        load_start.elapsed()
    );
    if records.is_empty() {
        return Err(PipelineError::Data(format!(
            "No usable records in {}",
            args.input_file.display()
        )));
    }

    let min_date = records.iter().map(|r| r.dteday).min().unwrap();
    let max_date = records.iter().map(|r| r.dteday).max().unwrap();
    debug!("Dataset spans {} to {}", min_date, max_date);

    let processing_start = Instant::now();

    // Headline metrics
    let summary = usage_summary(&records);
    println!("\nTotal Registered Customer: {}", summary.registered);
    println!("Total Casual Customer: {}", summary.casual);
    println!("Total Customer: {}", summary.cnt);

    // Overall hourly profile
    let profile = hourly_profile(&records);
    if let Some(peak) = profile.iter().max_by_key(|slot| slot.cnt) {
        println!(
            "\nBusiest hour overall: {}:00 with {} rentals",
            peak.hr, peak.cnt
        );
    }

    // Filtered hourly view for the selected date
    let target_date = args.date.unwrap_or(min_date);
    let weather_filter: HashSet<WeatherCode> = args.weather.iter().copied().collect();
    debug!(
        "Computing hourly totals for {} with weather filter {}",
        target_date, weather_display
    );
    let hourly = hourly_totals(&records, target_date, Some(&weather_filter));

    // Weather correlation over the selected date range
    let start_date = args.start_date.unwrap_or(min_date);
    let end_date = args.end_date.unwrap_or(max_date);
    let ranged = filter_date_range(&records, start_date, end_date);
    debug!(
        "Date range {} to {} keeps {} records",
        start_date,
        end_date,
        ranged.len()
    );
    println!("\nRentals by Weather Condition ({} to {}):", start_date, end_date);
    for entry in weather_breakdown(&ranged) {
        println!("  {:<10} {}", entry.condition.label(), entry.cnt);
    }

    // RFM score distribution
    println!("\nRFM Score Distribution:");
    for bucket in rfm_distribution(&records) {
        println!("  Score {:>2}: {} customers", bucket.score, bucket.customers);
    }

    let processing_time = processing_start.elapsed();
    println!("\nAnalysis completed in {:.2?}", processing_time);

    // Create output directory
    let output_dir = PathBuf::from(format!("./output/{}", args.output));
    fs::create_dir_all(&output_dir)?;
    println!(
        "Created output directory: {} | Writing hourly view for {}...",
        output_dir.display(),
        target_date
    );
    let io_start = Instant::now();

    // Extract just the directory name for the file names (remove path separators)
    let output_name = args
        .output
        .split(['/', '\\'])
        .next_back()
        .unwrap_or(&args.output);
    let csv_path = output_dir.join(format!("{}.csv", output_name));
    let json_path = output_dir.join(format!("{}.json", output_name));
    let parquet_path = output_dir.join(format!("{}.parquet", output_name));

    write_csv(&hourly, &csv_path)?;
    write_json(&hourly, &json_path)?;
    write_parquet(&hourly, &parquet_path)?;

    let io_time = io_start.elapsed();
    println!("Wrote files to directory: {}", output_dir.display());
    debug!("  - {}", csv_path.display());
    debug!("  - {}", json_path.display());
    debug!("  - {}", parquet_path.display());

    let total_time = total_start.elapsed();
    println!("\nPipeline completed successfully in {:.2?}", total_time);
    debug!(
        "Performance breakdown: Processing={:.1}%, IO={:.1}%",
        (processing_time.as_secs_f64() / total_time.as_secs_f64()) * 100.0,
        (io_time.as_secs_f64() / total_time.as_secs_f64()) * 100.0
    );

    Ok(())
}
