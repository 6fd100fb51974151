//! CSV loading for the seven fixed-name tracker export files.
//!
//! Each loader parses its declared date/time columns eagerly so that every
//! downstream stage works with typed records. Structural problems (missing
//! file, missing column, unparseable declared column) are fatal; row-level
//! quality issues are left for the cleaner.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use insights_core::error::{PipelineError, Result};
use insights_core::models::{
    ActivityRecord, HeartRateRecord, HourlyRecord, SleepRecord, WeightRecord,
};
use serde::Deserialize;
use tracing::{debug, info};

// ── File names and formats ────────────────────────────────────────────────────

pub const ACTIVITY_FILE: &str = "dailyActivity_merged.csv";
pub const SLEEP_FILE: &str = "sleepDay_merged.csv";
pub const HEART_RATE_FILE: &str = "heartrate_seconds_merged.csv";
pub const WEIGHT_FILE: &str = "weightLogInfo_merged.csv";
pub const HOURLY_CALORIES_FILE: &str = "hourlyCalories_merged.csv";
pub const HOURLY_STEPS_FILE: &str = "hourlySteps_merged.csv";
pub const HOURLY_INTENSITIES_FILE: &str = "hourlyIntensities_merged.csv";

/// Date-only columns, e.g. `4/12/2016`.
const DATE_FORMAT: &str = "%m/%d/%Y";
/// Timestamped columns, e.g. `4/12/2016 11:59:59 PM`.
const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

// ── RawTables ─────────────────────────────────────────────────────────────────

/// Every tracker export table, loaded and date-parsed but not yet cleaned.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub activity: Vec<ActivityRecord>,
    pub sleep: Vec<SleepRecord>,
    pub heart_rate: Vec<HeartRateRecord>,
    pub weight: Vec<WeightRecord>,
    pub hourly_steps: Vec<HourlyRecord>,
    pub hourly_calories: Vec<HourlyRecord>,
    pub hourly_intensities: Vec<HourlyRecord>,
}

/// Load all seven export files from `data_dir`.
pub fn load_tables(data_dir: &Path) -> Result<RawTables> {
    let tables = RawTables {
        activity: load_activity(data_dir)?,
        sleep: load_sleep(data_dir)?,
        heart_rate: load_heart_rate(data_dir)?,
        weight: load_weight(data_dir)?,
        hourly_steps: load_hourly_steps(data_dir)?,
        hourly_calories: load_hourly_calories(data_dir)?,
        hourly_intensities: load_hourly_intensities(data_dir)?,
    };

    info!(
        "Loaded {} activity, {} sleep, {} heart-rate, {} weight rows from {}",
        tables.activity.len(),
        tables.sleep.len(),
        tables.heart_rate.len(),
        tables.weight.len(),
        data_dir.display()
    );
    debug!(
        "Hourly rows: {} steps, {} calories, {} intensities",
        tables.hourly_steps.len(),
        tables.hourly_calories.len(),
        tables.hourly_intensities.len()
    );

    Ok(tables)
}

// ── Per-file loaders ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ActivityCsvRow {
    #[serde(rename = "Id")]
    id: u64,
    #[serde(rename = "ActivityDate")]
    activity_date: String,
    #[serde(rename = "TotalSteps")]
    total_steps: i64,
    #[serde(rename = "TotalDistance")]
    total_distance: f64,
    #[serde(rename = "VeryActiveMinutes")]
    very_active_minutes: i64,
    #[serde(rename = "FairlyActiveMinutes")]
    fairly_active_minutes: i64,
    #[serde(rename = "LightlyActiveMinutes")]
    lightly_active_minutes: i64,
    #[serde(rename = "SedentaryMinutes")]
    sedentary_minutes: i64,
    #[serde(rename = "Calories")]
    calories: i64,
}

fn load_activity(data_dir: &Path) -> Result<Vec<ActivityRecord>> {
    let mut rdr = open_reader(
        data_dir,
        ACTIVITY_FILE,
        &[
            "Id",
            "ActivityDate",
            "TotalSteps",
            "TotalDistance",
            "VeryActiveMinutes",
            "FairlyActiveMinutes",
            "LightlyActiveMinutes",
            "SedentaryMinutes",
            "Calories",
        ],
    )?;

    let mut rows = Vec::new();
    for result in rdr.deserialize::<ActivityCsvRow>() {
        let raw = result.map_err(|e| csv_error(ACTIVITY_FILE, e))?;
        rows.push(ActivityRecord {
            id: raw.id,
            activity_date: parse_date(ACTIVITY_FILE, "ActivityDate", &raw.activity_date)?,
            total_steps: raw.total_steps,
            total_distance: raw.total_distance,
            very_active_minutes: raw.very_active_minutes,
            fairly_active_minutes: raw.fairly_active_minutes,
            lightly_active_minutes: raw.lightly_active_minutes,
            sedentary_minutes: raw.sedentary_minutes,
            calories: raw.calories,
        });
    }
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct SleepCsvRow {
    #[serde(rename = "Id")]
    id: u64,
    #[serde(rename = "SleepDay")]
    sleep_day: String,
    #[serde(rename = "TotalSleepRecords")]
    total_sleep_records: i64,
    #[serde(rename = "TotalMinutesAsleep")]
    total_minutes_asleep: i64,
    #[serde(rename = "TotalTimeInBed")]
    total_time_in_bed: i64,
}

fn load_sleep(data_dir: &Path) -> Result<Vec<SleepRecord>> {
    let mut rdr = open_reader(
        data_dir,
        SLEEP_FILE,
        &[
            "Id",
            "SleepDay",
            "TotalSleepRecords",
            "TotalMinutesAsleep",
            "TotalTimeInBed",
        ],
    )?;

    let mut rows = Vec::new();
    for result in rdr.deserialize::<SleepCsvRow>() {
        let raw = result.map_err(|e| csv_error(SLEEP_FILE, e))?;
        rows.push(SleepRecord {
            id: raw.id,
            sleep_day: parse_timestamp(SLEEP_FILE, "SleepDay", &raw.sleep_day)?,
            total_sleep_records: raw.total_sleep_records,
            total_minutes_asleep: raw.total_minutes_asleep,
            total_time_in_bed: raw.total_time_in_bed,
        });
    }
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct HeartRateCsvRow {
    #[serde(rename = "Id")]
    id: u64,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Value")]
    value: i64,
}

fn load_heart_rate(data_dir: &Path) -> Result<Vec<HeartRateRecord>> {
    let mut rdr = open_reader(data_dir, HEART_RATE_FILE, &["Id", "Time", "Value"])?;

    let mut rows = Vec::new();
    for result in rdr.deserialize::<HeartRateCsvRow>() {
        let raw = result.map_err(|e| csv_error(HEART_RATE_FILE, e))?;
        rows.push(HeartRateRecord {
            id: raw.id,
            time: parse_timestamp(HEART_RATE_FILE, "Time", &raw.time)?,
            value: raw.value,
        });
    }
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct WeightCsvRow {
    #[serde(rename = "Id")]
    id: u64,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "WeightKg")]
    weight_kg: f64,
    #[serde(rename = "Fat")]
    fat: Option<f64>,
    #[serde(rename = "BMI")]
    bmi: Option<f64>,
}

fn load_weight(data_dir: &Path) -> Result<Vec<WeightRecord>> {
    let mut rdr = open_reader(
        data_dir,
        WEIGHT_FILE,
        &["Id", "Date", "WeightKg", "Fat", "BMI"],
    )?;

    let mut rows = Vec::new();
    for result in rdr.deserialize::<WeightCsvRow>() {
        let raw = result.map_err(|e| csv_error(WEIGHT_FILE, e))?;
        rows.push(WeightRecord {
            id: raw.id,
            date: parse_timestamp(WEIGHT_FILE, "Date", &raw.date)?,
            weight_kg: raw.weight_kg,
            bmi: raw.bmi,
            fat: raw.fat,
        });
    }
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct HourlyStepsCsvRow {
    #[serde(rename = "Id")]
    id: u64,
    #[serde(rename = "ActivityHour")]
    activity_hour: String,
    #[serde(rename = "StepTotal")]
    step_total: f64,
}

fn load_hourly_steps(data_dir: &Path) -> Result<Vec<HourlyRecord>> {
    let mut rdr = open_reader(
        data_dir,
        HOURLY_STEPS_FILE,
        &["Id", "ActivityHour", "StepTotal"],
    )?;

    let mut rows = Vec::new();
    for result in rdr.deserialize::<HourlyStepsCsvRow>() {
        let raw = result.map_err(|e| csv_error(HOURLY_STEPS_FILE, e))?;
        rows.push(HourlyRecord {
            id: raw.id,
            activity_hour: parse_timestamp(HOURLY_STEPS_FILE, "ActivityHour", &raw.activity_hour)?,
            value: raw.step_total,
            average_intensity: None,
        });
    }
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct HourlyCaloriesCsvRow {
    #[serde(rename = "Id")]
    id: u64,
    #[serde(rename = "ActivityHour")]
    activity_hour: String,
    #[serde(rename = "Calories")]
    calories: f64,
}

fn load_hourly_calories(data_dir: &Path) -> Result<Vec<HourlyRecord>> {
    let mut rdr = open_reader(
        data_dir,
        HOURLY_CALORIES_FILE,
        &["Id", "ActivityHour", "Calories"],
    )?;

    let mut rows = Vec::new();
    for result in rdr.deserialize::<HourlyCaloriesCsvRow>() {
        let raw = result.map_err(|e| csv_error(HOURLY_CALORIES_FILE, e))?;
        rows.push(HourlyRecord {
            id: raw.id,
            activity_hour: parse_timestamp(
                HOURLY_CALORIES_FILE,
                "ActivityHour",
                &raw.activity_hour,
            )?,
            value: raw.calories,
            average_intensity: None,
        });
    }
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct HourlyIntensitiesCsvRow {
    #[serde(rename = "Id")]
    id: u64,
    #[serde(rename = "ActivityHour")]
    activity_hour: String,
    #[serde(rename = "TotalIntensity")]
    total_intensity: f64,
    #[serde(rename = "AverageIntensity")]
    average_intensity: Option<f64>,
}

fn load_hourly_intensities(data_dir: &Path) -> Result<Vec<HourlyRecord>> {
    let mut rdr = open_reader(
        data_dir,
        HOURLY_INTENSITIES_FILE,
        &["Id", "ActivityHour", "TotalIntensity", "AverageIntensity"],
    )?;

    let mut rows = Vec::new();
    for result in rdr.deserialize::<HourlyIntensitiesCsvRow>() {
        let raw = result.map_err(|e| csv_error(HOURLY_INTENSITIES_FILE, e))?;
        rows.push(HourlyRecord {
            id: raw.id,
            activity_hour: parse_timestamp(
                HOURLY_INTENSITIES_FILE,
                "ActivityHour",
                &raw.activity_hour,
            )?,
            value: raw.total_intensity,
            average_intensity: raw.average_intensity,
        });
    }
    Ok(rows)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Open `file` under `data_dir` and verify that every required column is
/// present in the header before any row is deserialized.
fn open_reader(
    data_dir: &Path,
    file: &str,
    required_columns: &[&str],
) -> Result<csv::Reader<std::fs::File>> {
    let path = data_dir.join(file);
    if !path.exists() {
        return Err(PipelineError::MissingFile(path));
    }

    let mut rdr = csv::Reader::from_path(&path).map_err(|e| csv_error(file, e))?;
    let headers = rdr.headers().map_err(|e| csv_error(file, e))?.clone();

    for column in required_columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(PipelineError::Schema {
                file: file.to_string(),
                column: (*column).to_string(),
            });
        }
    }

    Ok(rdr)
}

fn csv_error(file: &str, source: csv::Error) -> PipelineError {
    PipelineError::Csv {
        file: file.to_string(),
        source,
    }
}

fn parse_date(file: &str, column: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| PipelineError::Parse {
        file: file.to_string(),
        column: column.to_string(),
        value: value.to_string(),
    })
}

fn parse_timestamp(file: &str, column: &str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|_| {
        PipelineError::Parse {
            file: file.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
    }

    // ── load_activity ─────────────────────────────────────────────────────────

    #[test]
    fn test_load_activity_basic() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            ACTIVITY_FILE,
            &[
                "Id,ActivityDate,TotalSteps,TotalDistance,VeryActiveMinutes,FairlyActiveMinutes,LightlyActiveMinutes,SedentaryMinutes,Calories",
                "1503960366,4/12/2016,13162,8.5,25,13,328,728,1985",
            ],
        );

        let rows = load_activity(dir.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1503960366);
        assert_eq!(
            rows[0].activity_date,
            NaiveDate::from_ymd_opt(2016, 4, 12).unwrap()
        );
        assert_eq!(rows[0].total_steps, 13162);
        assert_eq!(rows[0].calories, 1985);
    }

    #[test]
    fn test_load_activity_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_activity(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingFile(_)));
    }

    #[test]
    fn test_load_activity_missing_column() {
        let dir = TempDir::new().unwrap();
        // No Calories column.
        write_csv(
            dir.path(),
            ACTIVITY_FILE,
            &[
                "Id,ActivityDate,TotalSteps,TotalDistance,VeryActiveMinutes,FairlyActiveMinutes,LightlyActiveMinutes,SedentaryMinutes",
                "1,4/12/2016,100,1.0,1,1,1,1",
            ],
        );

        let err = load_activity(dir.path()).unwrap_err();
        match err {
            PipelineError::Schema { file, column } => {
                assert_eq!(file, ACTIVITY_FILE);
                assert_eq!(column, "Calories");
            }
            other => panic!("expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_activity_bad_date() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            ACTIVITY_FILE,
            &[
                "Id,ActivityDate,TotalSteps,TotalDistance,VeryActiveMinutes,FairlyActiveMinutes,LightlyActiveMinutes,SedentaryMinutes,Calories",
                "1,2016-04-12,100,1.0,1,1,1,1,100",
            ],
        );

        let err = load_activity(dir.path()).unwrap_err();
        match err {
            PipelineError::Parse { column, value, .. } => {
                assert_eq!(column, "ActivityDate");
                assert_eq!(value, "2016-04-12");
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    // ── load_sleep ────────────────────────────────────────────────────────────

    #[test]
    fn test_load_sleep_parses_am_pm_timestamp() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            SLEEP_FILE,
            &[
                "Id,SleepDay,TotalSleepRecords,TotalMinutesAsleep,TotalTimeInBed",
                "1503960366,4/12/2016 12:00:00 AM,1,327,346",
            ],
        );

        let rows = load_sleep(dir.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].sleep_day.date(),
            NaiveDate::from_ymd_opt(2016, 4, 12).unwrap()
        );
        // 12:00:00 AM is midnight.
        assert_eq!(rows[0].sleep_day.format("%H:%M:%S").to_string(), "00:00:00");
        assert_eq!(rows[0].total_minutes_asleep, 327);
    }

    // ── load_weight ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_weight_empty_fat_and_bmi_are_none() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            WEIGHT_FILE,
            &[
                "Id,Date,WeightKg,Fat,BMI",
                "1503960366,5/2/2016 11:59:59 PM,52.6,22,22.65",
                "1927972279,4/13/2016 1:08:52 AM,133.5,,",
            ],
        );

        let rows = load_weight(dir.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fat, Some(22.0));
        assert_eq!(rows[0].bmi, Some(22.65));
        assert_eq!(rows[1].fat, None);
        assert_eq!(rows[1].bmi, None);
    }

    // ── hourly loaders ────────────────────────────────────────────────────────

    #[test]
    fn test_load_hourly_intensities_average_column() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            HOURLY_INTENSITIES_FILE,
            &[
                "Id,ActivityHour,TotalIntensity,AverageIntensity",
                "1503960366,4/12/2016 1:00:00 AM,8,0.133333",
            ],
        );

        let rows = load_hourly_intensities(dir.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 8.0);
        assert_eq!(rows[0].average_intensity, Some(0.133333));
        assert_eq!(rows[0].activity_hour.format("%H").to_string(), "01");
    }

    #[test]
    fn test_load_hourly_steps_no_average_intensity() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            HOURLY_STEPS_FILE,
            &[
                "Id,ActivityHour,StepTotal",
                "1503960366,4/12/2016 11:00:00 PM,120",
            ],
        );

        let rows = load_hourly_steps(dir.path()).unwrap();
        assert_eq!(rows[0].value, 120.0);
        assert!(rows[0].average_intensity.is_none());
        assert_eq!(rows[0].activity_hour.format("%H").to_string(), "23");
    }

    // ── load_tables ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_tables_requires_all_seven_files() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            ACTIVITY_FILE,
            &[
                "Id,ActivityDate,TotalSteps,TotalDistance,VeryActiveMinutes,FairlyActiveMinutes,LightlyActiveMinutes,SedentaryMinutes,Calories",
                "1,4/12/2016,100,1.0,1,1,1,1,100",
            ],
        );

        // Sleep file (and the rest) absent.
        let err = load_tables(dir.path()).unwrap_err();
        match err {
            PipelineError::MissingFile(path) => {
                assert!(path.ends_with(SLEEP_FILE));
            }
            other => panic!("expected MissingFile, got {:?}", other),
        }
    }
}
