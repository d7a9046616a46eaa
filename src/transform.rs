use crate::structs::{HourlyTotal, RentalRecord, RfmBucket, UsageSummary, WeatherCode, WeatherTotal};
use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Number of hour slots in one day; every hourly result has exactly this
/// many entries regardless of how sparse the input is.
pub const HOURS_PER_DAY: u32 = 24;

/// Computes the 24-slot hourly rental totals for one calendar date.
///
/// Records are first restricted to those whose date exactly equals `date`
/// (equality, not range). If `weather` is present and non-empty, only
/// records whose condition is a member survive; `None` and an empty set
/// both disable weather filtering entirely.
///
/// The surviving records are grouped by hour-of-day summing `cnt`, then
/// merged against the full 0-23 hour template so that hours with no rentals
/// come back as an explicit 0 rather than being absent.
///
/// # Arguments
///
/// * `records` - The full in-memory record set; may be empty
/// * `date` - Calendar date to select
/// * `weather` - Optional set of weather conditions to keep
///
/// # Returns
///
/// Returns exactly 24 `HourlyTotal` entries, hours 0 through 23 ascending
/// with no gaps or duplicates. The sum of the returned totals equals the
/// `cnt` sum of the filtered subset.
///
/// Rows carrying an hour outside 0-23 are dropped (and logged at debug
/// level) rather than clamped; the output contract holds regardless.
pub fn hourly_totals(
    records: &[RentalRecord],
    date: NaiveDate,
    weather: Option<&HashSet<WeatherCode>>,
) -> Vec<HourlyTotal> {
    // An empty selection disables the filter, same as no selection at all.
    let weather = weather.filter(|set| !set.is_empty());

    let mut grouped: HashMap<u32, u64> = HashMap::new();
    for record in records {
        if record.dteday != date {
            continue;
        }
        if let Some(set) = weather {
            if !set.contains(&record.weathersit) {
                continue;
            }
        }
        if record.hr >= HOURS_PER_DAY {
            debug!("Dropping record with out-of-range hour: {}", record.hr);
            continue;
        }
        *grouped.entry(record.hr).or_default() += u64::from(record.cnt);
    }

    fill_hour_template(&grouped)
}

/// Per-hour rental totals over the whole dataset, same 24-slot contract as
/// [`hourly_totals`] but without any filtering.
pub fn hourly_profile(records: &[RentalRecord]) -> Vec<HourlyTotal> {
    let mut grouped: HashMap<u32, u64> = HashMap::new();
    for record in records {
        if record.hr >= HOURS_PER_DAY {
            debug!("Dropping record with out-of-range hour: {}", record.hr);
            continue;
        }
        *grouped.entry(record.hr).or_default() += u64::from(record.cnt);
    }
    fill_hour_template(&grouped)
}

/// Left-joins grouped sums against the 0-23 hour template, zero-filling
/// hours with no matching group.
fn fill_hour_template(grouped: &HashMap<u32, u64>) -> Vec<HourlyTotal> {
    let mut totals: Vec<HourlyTotal> = (0..HOURS_PER_DAY)
        .map(|hr| HourlyTotal {
            hr,
            cnt: grouped.get(&hr).copied().unwrap_or(0),
        })
        .collect();

    // Template order is already ascending; sort anyway so the contract does
    // not depend on how the template was built.
    totals.sort_by_key(|slot| slot.hr);
    totals
}

/// Dataset-wide casual/registered/total sums (the dashboard headline
/// metrics).
pub fn usage_summary(records: &[RentalRecord]) -> UsageSummary {
    let mut summary = UsageSummary {
        casual: 0,
        registered: 0,
        cnt: 0,
    };
    for record in records {
        summary.casual += u64::from(record.casual);
        summary.registered += u64::from(record.registered);
        summary.cnt += u64::from(record.cnt);
    }
    summary
}

/// Returns the records whose date falls within `start..=end` (both
/// inclusive), preserving input order.
pub fn filter_date_range(
    records: &[RentalRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<RentalRecord> {
    records
        .iter()
        .filter(|record| record.dteday >= start && record.dteday <= end)
        .cloned()
        .collect()
}

/// Total rentals grouped by weather condition, ordered by code. All four
/// conditions are always present, zero-filled when nothing matched.
pub fn weather_breakdown(records: &[RentalRecord]) -> Vec<WeatherTotal> {
    let mut grouped: HashMap<WeatherCode, u64> = HashMap::new();
    for record in records {
        *grouped.entry(record.weathersit).or_default() += u64::from(record.cnt);
    }

    WeatherCode::ALL
        .iter()
        .map(|&condition| WeatherTotal {
            condition,
            cnt: grouped.get(&condition).copied().unwrap_or(0),
        })
        .collect()
}

/// Distribution of combined Recency/Frequency/Monetary scores across the
/// record set.
///
/// Per record: Recency is the number of days between the record's date and
/// the newest date in the dataset, Frequency is `cnt`, and Monetary assumes
/// one currency unit per rental (so it equals `cnt`). Each metric is
/// quartile-scored 0-3 against the whole dataset and the three scores are
/// summed, giving a combined score of 0-9.
///
/// # Returns
///
/// Returns the number of records per combined score, ascending by score.
/// Scores with no records are omitted. Empty input yields an empty
/// distribution.
pub fn rfm_distribution(records: &[RentalRecord]) -> Vec<RfmBucket> {
    let Some(today) = records.iter().map(|r| r.dteday).max() else {
        return Vec::new();
    };

    let recency: Vec<f64> = records
        .iter()
        .map(|r| (today - r.dteday).num_days() as f64)
        .collect();
    let frequency: Vec<f64> = records.iter().map(|r| f64::from(r.cnt)).collect();
    // Monetary assumes one currency unit per rental.
    let monetary: Vec<f64> = records.iter().map(|r| f64::from(r.cnt)).collect();

    let r_edges = quartile_edges(&recency);
    let f_edges = quartile_edges(&frequency);
    let m_edges = quartile_edges(&monetary);

    debug!(
        "RFM quartile edges: R={:?} F={:?} M={:?}",
        r_edges, f_edges, m_edges
    );

    // Score each record independently (parallelized).
    let scores: Vec<u32> = (0..records.len())
        .into_par_iter()
        .map(|i| {
            quartile_score(recency[i], &r_edges)
                + quartile_score(frequency[i], &f_edges)
                + quartile_score(monetary[i], &m_edges)
        })
        .collect();

    let mut counts: HashMap<u32, u64> = HashMap::new();
    for score in scores {
        *counts.entry(score).or_default() += 1;
    }

    let mut buckets: Vec<RfmBucket> = counts
        .into_iter()
        .map(|(score, customers)| RfmBucket { score, customers })
        .collect();
    buckets.sort_by_key(|bucket| bucket.score);
    buckets
}

/// The 25th/50th/75th percentile edges used for quartile bucketing.
fn quartile_edges(data: &[f64]) -> [f64; 3] {
    [
        calculate_percentile(data, 25.0),
        calculate_percentile(data, 50.0),
        calculate_percentile(data, 75.0),
    ]
}

/// Quartile label (0-3) of `value` against the given edges: the number of
/// edges the value exceeds.
fn quartile_score(value: f64, edges: &[f64; 3]) -> u32 {
    edges.iter().filter(|&&edge| value > edge).count() as u32
}

/// Calculates a specific percentile using linear interpolation.
///
/// # Arguments
///
/// * `data` - Slice of values to analyze
/// * `percentile` - Desired percentile as a percentage (0.0 to 100.0)
///
/// # Returns
///
/// Returns the calculated percentile value as `f64`. Returns 0.0 for empty
/// datasets.
fn calculate_percentile(data: &[f64], percentile: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut sorted_data = data.to_vec();
    sorted_data.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let index = (percentile / 100.0) * (sorted_data.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted_data[lower]
    } else {
        let weight = index - lower as f64;
        sorted_data[lower] * (1.0 - weight) + sorted_data[upper] * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(dteday: NaiveDate, hr: u32, weathersit: WeatherCode, cnt: u32) -> RentalRecord {
        // Arbitrary casual/registered split; cnt is what aggregation reads.
        RentalRecord {
            dteday,
            hr,
            weathersit,
            casual: cnt / 3,
            registered: cnt - cnt / 3,
            cnt,
        }
    }

    fn sample_day() -> Vec<RentalRecord> {
        let d = date(2024, 1, 1);
        vec![
            rec(d, 5, WeatherCode::Clear, 10),
            rec(d, 5, WeatherCode::Mist, 3),
            rec(d, 9, WeatherCode::Clear, 7),
        ]
    }

    #[test]
    fn always_24_slots_in_ascending_hour_order() {
        let cases: Vec<Vec<HourlyTotal>> = vec![
            hourly_totals(&[], date(2024, 1, 1), None),
            hourly_totals(&sample_day(), date(2024, 1, 1), None),
            hourly_totals(&sample_day(), date(1999, 12, 31), None),
            hourly_profile(&sample_day()),
            hourly_profile(&[]),
        ];
        for totals in cases {
            assert_eq!(totals.len(), 24);
            let hours: Vec<u32> = totals.iter().map(|slot| slot.hr).collect();
            assert_eq!(hours, (0..24).collect::<Vec<u32>>());
        }
    }

    #[test]
    fn conserves_the_filtered_cnt_sum() {
        let records = sample_day();
        let totals = hourly_totals(&records, date(2024, 1, 1), None);
        let total: u64 = totals.iter().map(|slot| slot.cnt).sum();
        let expected: u64 = records.iter().map(|r| u64::from(r.cnt)).sum();
        assert_eq!(total, expected);
    }

    #[test]
    fn weather_filter_keeps_only_matching_conditions() {
        let filter: HashSet<WeatherCode> = [WeatherCode::Clear].into();
        let totals = hourly_totals(&sample_day(), date(2024, 1, 1), Some(&filter));

        assert_eq!(totals[5], HourlyTotal { hr: 5, cnt: 10 });
        assert_eq!(totals[9], HourlyTotal { hr: 9, cnt: 7 });
        let rest: u64 = totals
            .iter()
            .filter(|slot| slot.hr != 5 && slot.hr != 9)
            .map(|slot| slot.cnt)
            .sum();
        assert_eq!(rest, 0);
    }

    #[test]
    fn absent_filter_sums_across_conditions() {
        let totals = hourly_totals(&sample_day(), date(2024, 1, 1), None);

        assert_eq!(totals[5], HourlyTotal { hr: 5, cnt: 13 });
        assert_eq!(totals[9], HourlyTotal { hr: 9, cnt: 7 });
        assert_eq!(totals.iter().map(|slot| slot.cnt).sum::<u64>(), 20);
    }

    #[test]
    fn empty_filter_set_disables_filtering() {
        let empty: HashSet<WeatherCode> = HashSet::new();
        let filtered = hourly_totals(&sample_day(), date(2024, 1, 1), Some(&empty));
        let unfiltered = hourly_totals(&sample_day(), date(2024, 1, 1), None);
        assert_eq!(filtered, unfiltered);
    }

    #[test]
    fn filter_with_no_matching_records_yields_all_zeros() {
        let filter: HashSet<WeatherCode> = [WeatherCode::HeavyRain].into();
        let totals = hourly_totals(&sample_day(), date(2024, 1, 1), Some(&filter));
        assert!(totals.iter().all(|slot| slot.cnt == 0));
    }

    #[test]
    fn non_matching_date_yields_all_zeros() {
        let totals = hourly_totals(&sample_day(), date(2024, 1, 2), None);
        assert!(totals.iter().all(|slot| slot.cnt == 0));
    }

    #[test]
    fn out_of_range_hours_are_dropped() {
        let d = date(2024, 3, 3);
        let records = vec![
            rec(d, 24, WeatherCode::Clear, 100),
            rec(d, 2, WeatherCode::Clear, 5),
        ];
        let totals = hourly_totals(&records, d, None);
        assert_eq!(totals.len(), 24);
        assert_eq!(totals.iter().map(|slot| slot.cnt).sum::<u64>(), 5);
    }

    #[test]
    fn hourly_profile_spans_all_dates() {
        let mut records = sample_day();
        records.push(rec(date(2024, 1, 2), 5, WeatherCode::Clear, 4));
        let totals = hourly_profile(&records);
        assert_eq!(totals[5], HourlyTotal { hr: 5, cnt: 17 });
    }

    #[test]
    fn usage_summary_sums_all_three_columns() {
        let d = date(2024, 1, 1);
        let records = vec![
            RentalRecord {
                dteday: d,
                hr: 0,
                weathersit: WeatherCode::Clear,
                casual: 3,
                registered: 13,
                cnt: 16,
            },
            RentalRecord {
                dteday: d,
                hr: 1,
                weathersit: WeatherCode::Mist,
                casual: 8,
                registered: 32,
                cnt: 40,
            },
        ];
        let summary = usage_summary(&records);
        assert_eq!(summary.casual, 11);
        assert_eq!(summary.registered, 45);
        assert_eq!(summary.cnt, 56);
    }

    #[test]
    fn date_range_filter_is_inclusive_on_both_ends() {
        let records = vec![
            rec(date(2024, 1, 1), 0, WeatherCode::Clear, 1),
            rec(date(2024, 1, 2), 0, WeatherCode::Clear, 2),
            rec(date(2024, 1, 3), 0, WeatherCode::Clear, 3),
            rec(date(2024, 1, 4), 0, WeatherCode::Clear, 4),
        ];
        let subset = filter_date_range(&records, date(2024, 1, 2), date(2024, 1, 3));
        let counts: Vec<u32> = subset.iter().map(|r| r.cnt).collect();
        assert_eq!(counts, vec![2, 3]);
    }

    #[test]
    fn weather_breakdown_zero_fills_missing_conditions() {
        let breakdown = weather_breakdown(&sample_day());
        assert_eq!(breakdown.len(), 4);
        assert_eq!(breakdown[0].condition, WeatherCode::Clear);
        assert_eq!(breakdown[0].cnt, 17);
        assert_eq!(breakdown[1].condition, WeatherCode::Mist);
        assert_eq!(breakdown[1].cnt, 3);
        assert_eq!(breakdown[2].cnt, 0);
        assert_eq!(breakdown[3].cnt, 0);
    }

    #[test]
    fn quartile_scoring_separates_well_spread_values() {
        let edges = quartile_edges(&[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(quartile_score(10.0, &edges), 0);
        assert_eq!(quartile_score(20.0, &edges), 1);
        assert_eq!(quartile_score(30.0, &edges), 2);
        assert_eq!(quartile_score(40.0, &edges), 3);
    }

    #[test]
    fn rfm_distribution_counts_combined_scores() {
        // Four records, one per day, rentals growing toward the newest date:
        // each record lands in a distinct quartile of every metric.
        let records = vec![
            rec(date(2011, 1, 1), 0, WeatherCode::Clear, 10),
            rec(date(2011, 1, 2), 0, WeatherCode::Clear, 20),
            rec(date(2011, 1, 3), 0, WeatherCode::Clear, 30),
            rec(date(2011, 1, 4), 0, WeatherCode::Clear, 40),
        ];
        let buckets = rfm_distribution(&records);

        // Oldest/lowest record: R=3, F=0, M=0. Newest/highest: R=0, F=3, M=3.
        let expected = vec![
            RfmBucket { score: 3, customers: 1 },
            RfmBucket { score: 4, customers: 1 },
            RfmBucket { score: 5, customers: 1 },
            RfmBucket { score: 6, customers: 1 },
        ];
        assert_eq!(buckets, expected);
    }

    #[test]
    fn rfm_distribution_of_empty_input_is_empty() {
        assert!(rfm_distribution(&[]).is_empty());
    }

    #[test]
    fn percentile_interpolates_between_samples() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(calculate_percentile(&data, 0.0), 1.0);
        assert_eq!(calculate_percentile(&data, 50.0), 2.5);
        assert_eq!(calculate_percentile(&data, 100.0), 4.0);
        assert_eq!(calculate_percentile(&[], 50.0), 0.0);
    }
}
