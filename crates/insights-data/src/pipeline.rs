//! Data-preparation pipeline: load, clean and join all tracker tables.

use std::path::Path;

use chrono::Utc;
use insights_core::error::Result;
use insights_core::models::{
    CleanHeartRate, CleanHourly, CleanSleep, HourlyMetric, MergedDaily, WeightRecord,
};
use tracing::info;

use crate::cleaner::{clean_activity, clean_heart_rate, clean_hourly, clean_sleep, clean_weight};
use crate::joiner::merge_daily_sleep;
use crate::reader::load_tables;

// ── Output types ──────────────────────────────────────────────────────────────

/// Every cleaned table, ready for validation and analysis.
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Activity ⋈ sleep left join, one row per cleaned activity day.
    pub merged_daily: Vec<MergedDaily>,
    pub sleep: Vec<CleanSleep>,
    pub heart_rate: Vec<CleanHeartRate>,
    pub weight: Vec<WeightRecord>,
    pub hourly_steps: Vec<CleanHourly>,
    pub hourly_calories: Vec<CleanHourly>,
    pub hourly_intensities: Vec<CleanHourly>,
}

/// Bookkeeping produced alongside the prepared tables.
#[derive(Debug, Clone)]
pub struct PrepareSummary {
    /// ISO-8601 timestamp when the preparation ran.
    pub generated_at: String,
    /// Raw rows loaded per daily table, before cleaning.
    pub activity_rows_loaded: usize,
    pub sleep_rows_loaded: usize,
    pub heart_rate_rows_loaded: usize,
    /// Rows dropped by the activity, sleep and heart-rate cleaners.
    pub activity_rows_dropped: usize,
    pub sleep_rows_dropped: usize,
    pub heart_rate_rows_dropped: usize,
    /// Wall-clock seconds spent reading the CSV files.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent cleaning and joining.
    pub clean_time_seconds: f64,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run the full preparation pipeline over `data_dir`.
///
/// 1. Load the seven export files (structural errors are fatal).
/// 2. Clean each table independently.
/// 3. Left-join activity with sleep on `(id, date)`.
///
/// Each stage returns new tables; nothing is mutated in place.
pub fn prepare_all_data(data_dir: &Path) -> Result<(PreparedData, PrepareSummary)> {
    let load_start = std::time::Instant::now();
    let raw = load_tables(data_dir)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let clean_start = std::time::Instant::now();
    let activity = clean_activity(&raw.activity);
    let sleep = clean_sleep(&raw.sleep);
    let heart_rate = clean_heart_rate(&raw.heart_rate);
    let weight = clean_weight(&raw.weight);
    let hourly_steps = clean_hourly(HourlyMetric::Steps, &raw.hourly_steps);
    let hourly_calories = clean_hourly(HourlyMetric::Calories, &raw.hourly_calories);
    let hourly_intensities = clean_hourly(HourlyMetric::Intensities, &raw.hourly_intensities);

    let merged_daily = merge_daily_sleep(&activity, &sleep);
    let clean_time = clean_start.elapsed().as_secs_f64();

    let summary = PrepareSummary {
        generated_at: Utc::now().to_rfc3339(),
        activity_rows_loaded: raw.activity.len(),
        sleep_rows_loaded: raw.sleep.len(),
        heart_rate_rows_loaded: raw.heart_rate.len(),
        activity_rows_dropped: raw.activity.len() - activity.len(),
        sleep_rows_dropped: raw.sleep.len() - sleep.len(),
        heart_rate_rows_dropped: raw.heart_rate.len() - heart_rate.len(),
        load_time_seconds: load_time,
        clean_time_seconds: clean_time,
    };

    info!(
        "Prepared {} daily rows ({} with sleep) in {:.2}s",
        merged_daily.len(),
        merged_daily.iter().filter(|m| m.sleep.is_some()).count(),
        load_time + clean_time
    );

    Ok((
        PreparedData {
            merged_daily,
            sleep,
            heart_rate,
            weight,
            hourly_steps,
            hourly_calories,
            hourly_intensities,
        },
        summary,
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    use crate::reader::{
        ACTIVITY_FILE, HEART_RATE_FILE, HOURLY_CALORIES_FILE, HOURLY_INTENSITIES_FILE,
        HOURLY_STEPS_FILE, SLEEP_FILE, WEIGHT_FILE,
    };

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
    }

    /// Write a small but complete set of the seven export files.
    fn write_dataset(dir: &Path) {
        write_csv(
            dir,
            ACTIVITY_FILE,
            &[
                "Id,ActivityDate,TotalSteps,TotalDistance,VeryActiveMinutes,FairlyActiveMinutes,LightlyActiveMinutes,SedentaryMinutes,Calories",
                "1,4/12/2016,13162,8.5,25,13,328,728,1985",
                "1,4/13/2016,10735,6.97,21,19,217,776,1797",
                "2,4/12/2016,4000,2.5,0,5,100,900,1500",
                // Dropped by the cleaner: zero calories.
                "2,4/13/2016,5000,3.0,1,1,100,800,0",
            ],
        );
        write_csv(
            dir,
            SLEEP_FILE,
            &[
                "Id,SleepDay,TotalSleepRecords,TotalMinutesAsleep,TotalTimeInBed",
                "1,4/12/2016 12:00:00 AM,1,327,346",
                // Dropped by the cleaner: asleep > in bed.
                "2,4/12/2016 12:00:00 AM,1,500,400",
            ],
        );
        write_csv(
            dir,
            HEART_RATE_FILE,
            &[
                "Id,Time,Value",
                "1,4/12/2016 7:21:00 AM,97",
                // Dropped by the cleaner: 250 bpm.
                "1,4/12/2016 7:21:05 AM,250",
            ],
        );
        write_csv(
            dir,
            WEIGHT_FILE,
            &[
                "Id,Date,WeightKg,Fat,BMI",
                "1,5/2/2016 11:59:59 PM,52.6,22,22.65",
            ],
        );
        write_csv(
            dir,
            HOURLY_STEPS_FILE,
            &[
                "Id,ActivityHour,StepTotal",
                "1,4/12/2016 8:00:00 AM,542",
            ],
        );
        write_csv(
            dir,
            HOURLY_CALORIES_FILE,
            &[
                "Id,ActivityHour,Calories",
                "1,4/12/2016 8:00:00 AM,97",
            ],
        );
        write_csv(
            dir,
            HOURLY_INTENSITIES_FILE,
            &[
                "Id,ActivityHour,TotalIntensity,AverageIntensity",
                "1,4/12/2016 8:00:00 AM,12,0.2",
            ],
        );
    }

    #[test]
    fn test_prepare_all_data_end_to_end() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());

        let (data, summary) = prepare_all_data(dir.path()).unwrap();

        // One activity row dropped (zero calories), three kept; the join
        // preserves all of them.
        assert_eq!(data.merged_daily.len(), 3);
        assert_eq!(summary.activity_rows_loaded, 4);
        assert_eq!(summary.activity_rows_dropped, 1);

        // Corrupt sleep row dropped before the join.
        assert_eq!(data.sleep.len(), 1);
        assert_eq!(summary.sleep_rows_dropped, 1);

        // Only user 1 on 4/12 has a sleep match.
        let with_sleep: Vec<_> = data
            .merged_daily
            .iter()
            .filter(|m| m.sleep.is_some())
            .collect();
        assert_eq!(with_sleep.len(), 1);
        assert_eq!(with_sleep[0].activity.activity.id, 1);

        // 250 bpm reading removed.
        assert_eq!(data.heart_rate.len(), 1);
        assert_eq!(summary.heart_rate_rows_dropped, 1);

        assert_eq!(data.weight.len(), 1);
        assert_eq!(data.hourly_steps.len(), 1);
        assert_eq!(data.hourly_calories.len(), 1);
        assert_eq!(data.hourly_intensities.len(), 1);
    }

    #[test]
    fn test_prepare_all_data_missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        // Only the activity file exists.
        write_csv(
            dir.path(),
            ACTIVITY_FILE,
            &[
                "Id,ActivityDate,TotalSteps,TotalDistance,VeryActiveMinutes,FairlyActiveMinutes,LightlyActiveMinutes,SedentaryMinutes,Calories",
                "1,4/12/2016,100,1.0,1,1,1,1,100",
            ],
        );

        assert!(prepare_all_data(dir.path()).is_err());
    }

    #[test]
    fn test_prepare_summary_timings_non_negative() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());

        let (_, summary) = prepare_all_data(dir.path()).unwrap();
        assert!(summary.load_time_seconds >= 0.0);
        assert!(summary.clean_time_seconds >= 0.0);
        assert!(!summary.generated_at.is_empty());
    }
}
