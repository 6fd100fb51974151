use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ── Raw records (as loaded) ───────────────────────────────────────────────────

/// One row of `dailyActivity_merged.csv` after date parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Tracker user identifier.
    pub id: u64,
    /// Calendar day the activity was recorded for.
    pub activity_date: NaiveDate,
    /// Total steps taken that day.
    pub total_steps: i64,
    /// Total distance in kilometres.
    pub total_distance: f64,
    /// Minutes of very active movement.
    pub very_active_minutes: i64,
    /// Minutes of fairly active movement.
    pub fairly_active_minutes: i64,
    /// Minutes of lightly active movement.
    pub lightly_active_minutes: i64,
    /// Sedentary minutes.
    pub sedentary_minutes: i64,
    /// Calories burned that day.
    pub calories: i64,
}

/// One row of `sleepDay_merged.csv` after timestamp parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    pub id: u64,
    /// Timestamp of the sleep-day record (always midnight in the exports).
    pub sleep_day: NaiveDateTime,
    /// Number of sleep sessions recorded for the day.
    pub total_sleep_records: i64,
    pub total_minutes_asleep: i64,
    pub total_time_in_bed: i64,
}

/// One row of `heartrate_seconds_merged.csv` after timestamp parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateRecord {
    pub id: u64,
    pub time: NaiveDateTime,
    /// Heart rate in beats per minute.
    pub value: i64,
}

/// One row of `weightLogInfo_merged.csv` after timestamp parsing.
///
/// `fat` and `bmi` are nullable in the raw exports; the cleaner imputes them
/// where possible and leaves them `None` where no reference value exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
    pub id: u64,
    pub date: NaiveDateTime,
    pub weight_kg: f64,
    pub bmi: Option<f64>,
    /// Body-fat percentage. Sparse in the raw exports.
    pub fat: Option<f64>,
}

/// Which hourly export a set of [`HourlyRecord`]s came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HourlyMetric {
    Steps,
    Calories,
    Intensities,
}

impl HourlyMetric {
    /// Table name used in reports and log messages.
    pub fn name(&self) -> &'static str {
        match self {
            HourlyMetric::Steps => "hourly_steps",
            HourlyMetric::Calories => "hourly_calories",
            HourlyMetric::Intensities => "hourly_intensities",
        }
    }
}

/// One row of an hourly export (`hourlySteps`, `hourlyCalories` or
/// `hourlyIntensities`) after timestamp parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub id: u64,
    pub activity_hour: NaiveDateTime,
    /// The metric value: step total, calories, or total intensity.
    pub value: f64,
    /// Only present for the intensities table.
    pub average_intensity: Option<f64>,
}

// ── Cleaned records (derived columns attached) ────────────────────────────────

/// Activity row with derived columns, produced by the cleaner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanActivity {
    pub activity: ActivityRecord,
    /// Full weekday name, e.g. `"Tuesday"`.
    pub day_of_week: String,
    /// Sum of very + fairly + lightly active minutes.
    pub total_active_minutes: i64,
    /// `total_active_minutes / sedentary_minutes` as IEEE division.
    /// Infinite (or NaN for 0/0) when `sedentary_minutes` is zero.
    pub active_to_sedentary_ratio: f64,
}

/// Sleep row with derived columns, produced by the cleaner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanSleep {
    pub sleep: SleepRecord,
    /// Calendar day of the sleep record, used as the join key.
    pub date: NaiveDate,
    /// `total_minutes_asleep / total_time_in_bed`, always ≤ 1 after cleaning.
    pub sleep_efficiency: f64,
    pub sleep_duration_hours: f64,
}

/// Heart-rate row with its derived calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanHeartRate {
    pub heart_rate: HeartRateRecord,
    pub date: NaiveDate,
}

/// Hourly row with derived calendar day and hour-of-day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanHourly {
    pub hourly: HourlyRecord,
    pub date: NaiveDate,
    /// Hour of day, 0–23.
    pub hour: u32,
}

// ── Merged daily table ────────────────────────────────────────────────────────

/// One row of the date-aligned activity ⋈ sleep left join.
///
/// The sleep side is `None` when the user has no sleep record for that
/// calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedDaily {
    pub activity: CleanActivity,
    pub sleep: Option<CleanSleep>,
}
