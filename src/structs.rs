use chrono::NaiveDate;
use log::{Log, Metadata, Record as LogRecord};
use serde::{Deserialize, Serialize};

/// Simple logger implementation
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &LogRecord) {
        println!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Weather condition code of the source dataset (`weathersit` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
pub enum WeatherCode {
    Clear,
    Mist,
    LightRain,
    HeavyRain,
}

impl WeatherCode {
    /// All codes in dataset order (1 through 4).
    pub const ALL: [WeatherCode; 4] = [
        WeatherCode::Clear,
        WeatherCode::Mist,
        WeatherCode::LightRain,
        WeatherCode::HeavyRain,
    ];

    /// Numeric code as it appears in the CSV.
    pub fn code(self) -> u8 {
        match self {
            WeatherCode::Clear => 1,
            WeatherCode::Mist => 2,
            WeatherCode::LightRain => 3,
            WeatherCode::HeavyRain => 4,
        }
    }

    /// Human-readable label for printed tables and chart axes.
    pub fn label(self) -> &'static str {
        match self {
            WeatherCode::Clear => "Clear",
            WeatherCode::Mist => "Mist",
            WeatherCode::LightRain => "Light Rain",
            WeatherCode::HeavyRain => "Heavy Rain",
        }
    }
}

impl TryFrom<u8> for WeatherCode {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        match code {
            1 => Ok(WeatherCode::Clear),
            2 => Ok(WeatherCode::Mist),
            3 => Ok(WeatherCode::LightRain),
            4 => Ok(WeatherCode::HeavyRain),
            other => Err(other),
        }
    }
}

/// One hourly bike-rental observation from the pre-aggregated dataset.
///
/// Immutable once loaded; the analytics in `transform` borrow slices of
/// these and never mutate them. `cnt` is expected to equal
/// `casual + registered` but this is not enforced anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentalRecord {
    pub dteday: NaiveDate,
    pub hr: u32,
    pub weathersit: WeatherCode,
    pub casual: u32,
    pub registered: u32,
    pub cnt: u32,
}

/// Total rentals for exactly one hour slot (0 through 23).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyTotal {
    pub hr: u32,
    pub cnt: u64,
}

/// Dataset-wide user totals (the dashboard's three headline metrics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    pub casual: u64,
    pub registered: u64,
    pub cnt: u64,
}

/// Total rentals under one weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherTotal {
    pub condition: WeatherCode,
    pub cnt: u64,
}

/// Number of records carrying one combined RFM score (0 through 9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RfmBucket {
    pub score: u32,
    pub customers: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_code_round_trip() {
        for code in WeatherCode::ALL {
            assert_eq!(WeatherCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn weather_code_rejects_out_of_range() {
        assert_eq!(WeatherCode::try_from(0), Err(0));
        assert_eq!(WeatherCode::try_from(5), Err(5));
    }

    #[test]
    fn weather_labels_match_dataset_legend() {
        assert_eq!(WeatherCode::Clear.label(), "Clear");
        assert_eq!(WeatherCode::HeavyRain.label(), "Heavy Rain");
    }
}
