pub mod error;
pub mod load;
pub mod structs;
pub mod transform;

// Re-export public API
pub use error::{PipelineError, Result};
pub use load::{read_records, read_records_from, write_csv, write_json, write_parquet};
pub use structs::{
    HourlyTotal, RentalRecord, RfmBucket, SimpleLogger, UsageSummary, WeatherCode, WeatherTotal,
};
pub use transform::{
    filter_date_range, hourly_profile, hourly_totals, rfm_distribution, usage_summary,
    weather_breakdown,
};
