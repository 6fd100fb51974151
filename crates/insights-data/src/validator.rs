//! Post-clean validation checks.
//!
//! Every check is a stateless boolean predicate over an already-cleaned
//! table. Failures are recorded as results and surfaced through the report
//! layer; they never abort the pipeline. The cleaner has already dropped
//! known-bad rows, so what fails here is residual quality the filters do
//! not (or cannot) remove.

use insights_core::models::{
    CleanHeartRate, CleanHourly, CleanSleep, HourlyMetric, MergedDaily, WeightRecord,
};

use crate::pipeline::PreparedData;

// ── Result types ──────────────────────────────────────────────────────────────

/// One named check and whether it passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
}

impl CheckResult {
    fn new(name: &'static str, passed: bool) -> Self {
        Self { name, passed }
    }
}

/// All check results for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: &'static str,
    pub checks: Vec<CheckResult>,
}

impl TableReport {
    /// True when every check for this table passed.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Look up a single check by name.
    pub fn check(&self, name: &str) -> Option<bool> {
        self.checks.iter().find(|c| c.name == name).map(|c| c.passed)
    }
}

/// Check results for every table in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    pub tables: Vec<TableReport>,
}

impl ValidationSummary {
    /// Overall pass: logical AND of every check across every table.
    pub fn all_passed(&self) -> bool {
        self.tables.iter().all(|t| t.passed())
    }

    /// Number of failed checks across all tables.
    pub fn failed_count(&self) -> usize {
        self.tables
            .iter()
            .flat_map(|t| t.checks.iter())
            .filter(|c| !c.passed)
            .count()
    }
}

// ── Per-table validators ──────────────────────────────────────────────────────

/// Validate the merged daily table (activity columns plus nullable sleep).
pub fn validate_merged_daily(rows: &[MergedDaily]) -> TableReport {
    // A NaN ratio counts as a missing value, same as an absent sleep record.
    let no_missing = rows
        .iter()
        .all(|r| r.sleep.is_some() && !r.activity.active_to_sedentary_ratio.is_nan());

    let valid_date_range = match (
        rows.iter().map(|r| r.activity.activity.activity_date).min(),
        rows.iter().map(|r| r.activity.activity.activity_date).max(),
    ) {
        (Some(min), Some(max)) => (max - min).num_days() <= 31,
        _ => true,
    };

    let valid_minutes = rows.iter().all(|r| {
        let a = &r.activity.activity;
        a.very_active_minutes >= 0
            && a.fairly_active_minutes >= 0
            && a.lightly_active_minutes >= 0
            && a.sedentary_minutes >= 0
    });

    // 24 hours = 1440 minutes; the four buckets cannot exceed a day.
    let valid_total_minutes = rows.iter().all(|r| {
        let a = &r.activity.activity;
        a.very_active_minutes
            + a.fairly_active_minutes
            + a.lightly_active_minutes
            + a.sedentary_minutes
            <= 1440
    });

    TableReport {
        table: "daily_activity",
        checks: vec![
            CheckResult::new("no_missing_values", no_missing),
            CheckResult::new("valid_date_range", valid_date_range),
            CheckResult::new(
                "valid_steps",
                rows.iter().all(|r| r.activity.activity.total_steps >= 0),
            ),
            CheckResult::new(
                "valid_distance",
                rows.iter().all(|r| r.activity.activity.total_distance >= 0.0),
            ),
            CheckResult::new(
                "valid_calories",
                rows.iter().all(|r| r.activity.activity.calories > 0),
            ),
            CheckResult::new("valid_minutes", valid_minutes),
            CheckResult::new("valid_total_minutes", valid_total_minutes),
        ],
    }
}

/// Validate the cleaned sleep table.
pub fn validate_sleep(rows: &[CleanSleep]) -> TableReport {
    TableReport {
        table: "sleep_data",
        checks: vec![
            CheckResult::new(
                "no_missing_values",
                rows.iter()
                    .all(|r| !r.sleep_efficiency.is_nan() && !r.sleep_duration_hours.is_nan()),
            ),
            CheckResult::new(
                "valid_sleep_duration",
                rows.iter().all(|r| {
                    r.sleep.total_minutes_asleep >= 60 && r.sleep.total_minutes_asleep <= 1440
                }),
            ),
            CheckResult::new(
                "valid_time_in_bed",
                rows.iter()
                    .all(|r| r.sleep.total_time_in_bed >= r.sleep.total_minutes_asleep),
            ),
        ],
    }
}

/// Validate the cleaned heart-rate table.
pub fn validate_heart_rate(rows: &[CleanHeartRate]) -> TableReport {
    TableReport {
        table: "heart_rate",
        checks: vec![
            CheckResult::new("no_missing_values", true),
            CheckResult::new(
                "valid_heart_rate",
                rows.iter()
                    .all(|r| r.heart_rate.value >= 40 && r.heart_rate.value <= 220),
            ),
            // Timestamps parsed at load time; verify the derived calendar day
            // still agrees with them.
            CheckResult::new(
                "valid_timestamps",
                rows.iter().all(|r| r.date == r.heart_rate.time.date()),
            ),
        ],
    }
}

/// Validate the cleaned (imputed) weight table. `fat` may be null; `bmi`
/// may not.
pub fn validate_weight(rows: &[WeightRecord]) -> TableReport {
    TableReport {
        table: "weight_data",
        checks: vec![
            CheckResult::new(
                "valid_weight",
                rows.iter().all(|r| r.weight_kg >= 20.0 && r.weight_kg <= 300.0),
            ),
            CheckResult::new(
                "valid_bmi",
                rows.iter()
                    .all(|r| matches!(r.bmi, Some(b) if (15.0..=50.0).contains(&b))),
            ),
            CheckResult::new(
                "no_missing_required",
                rows.iter().all(|r| r.bmi.is_some()),
            ),
        ],
    }
}

/// Validate one cleaned hourly table. The value check depends on the metric:
/// steps ≥ 0, calories > 0, intensities ≥ 0 in both columns.
pub fn validate_hourly(metric: HourlyMetric, rows: &[CleanHourly]) -> TableReport {
    let no_missing = match metric {
        HourlyMetric::Intensities => rows.iter().all(|r| r.hourly.average_intensity.is_some()),
        _ => true,
    };

    let valid_values = match metric {
        HourlyMetric::Steps => rows.iter().all(|r| r.hourly.value >= 0.0),
        HourlyMetric::Calories => rows.iter().all(|r| r.hourly.value > 0.0),
        HourlyMetric::Intensities => rows.iter().all(|r| {
            r.hourly.value >= 0.0 && r.hourly.average_intensity.map_or(false, |a| a >= 0.0)
        }),
    };

    TableReport {
        table: metric.name(),
        checks: vec![
            CheckResult::new("no_missing_values", no_missing),
            CheckResult::new("valid_hours", rows.iter().all(|r| r.hour <= 23)),
            CheckResult::new("valid_values", valid_values),
        ],
    }
}

/// Run every table validator over the prepared data.
///
/// Deterministic: the same input always yields the same summary, table and
/// check order included.
pub fn validate_all(data: &PreparedData) -> ValidationSummary {
    ValidationSummary {
        tables: vec![
            validate_merged_daily(&data.merged_daily),
            validate_sleep(&data.sleep),
            validate_heart_rate(&data.heart_rate),
            validate_weight(&data.weight),
            validate_hourly(HourlyMetric::Steps, &data.hourly_steps),
            validate_hourly(HourlyMetric::Calories, &data.hourly_calories),
            validate_hourly(HourlyMetric::Intensities, &data.hourly_intensities),
        ],
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
