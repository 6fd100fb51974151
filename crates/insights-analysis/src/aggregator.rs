//! Grouped statistics over the cleaned daily and hourly tables.

use std::collections::BTreeMap;

use insights_core::models::{CleanHourly, MergedDaily};
use insights_core::stats::{mean, pearson, round_to};

// ── Weekday patterns ──────────────────────────────────────────────────────────

/// Weekday names in calendar order, used to sort grouped output.
const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Mean daily metrics for one weekday.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayStats {
    pub day: &'static str,
    pub avg_steps: f64,
    pub avg_calories: f64,
    pub avg_active_minutes: f64,
    pub avg_sedentary_minutes: f64,
}

/// Mean steps, calories and active/sedentary minutes per weekday, ordered
/// Monday → Sunday. Weekdays with no rows are omitted. Values are rounded
/// to 2 decimals.
pub fn weekday_patterns(rows: &[MergedDaily]) -> Vec<WeekdayStats> {
    WEEKDAYS
        .into_iter()
        .filter_map(|day| {
            let day_rows: Vec<&MergedDaily> = rows
                .iter()
                .filter(|r| r.activity.day_of_week == day)
                .collect();
            if day_rows.is_empty() {
                return None;
            }

            let column = |f: fn(&MergedDaily) -> f64| -> f64 {
                let values: Vec<f64> = day_rows.iter().map(|r| f(r)).collect();
                round_to(mean(&values).unwrap_or(0.0), 2)
            };

            Some(WeekdayStats {
                day,
                avg_steps: column(|r| r.activity.activity.total_steps as f64),
                avg_calories: column(|r| r.activity.activity.calories as f64),
                avg_active_minutes: column(|r| r.activity.total_active_minutes as f64),
                avg_sedentary_minutes: column(|r| r.activity.activity.sedentary_minutes as f64),
            })
        })
        .collect()
}

// ── Activity levels ───────────────────────────────────────────────────────────

/// Day-level activity bucket derived from total active minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
}

impl ActivityLevel {
    /// Bucket a day by its total active minutes.
    pub fn classify(total_active_minutes: i64) -> Self {
        match total_active_minutes {
            m if m < 30 => ActivityLevel::Sedentary,
            m if m < 60 => ActivityLevel::LightlyActive,
            m if m < 120 => ActivityLevel::ModeratelyActive,
            _ => ActivityLevel::VeryActive,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly Active",
            ActivityLevel::ModeratelyActive => "Moderately Active",
            ActivityLevel::VeryActive => "Very Active",
        }
    }
}

/// Number of days falling into each activity-level bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityLevelCounts {
    pub sedentary: usize,
    pub lightly_active: usize,
    pub moderately_active: usize,
    pub very_active: usize,
}

/// Count days per activity level across the merged daily table.
pub fn activity_level_distribution(rows: &[MergedDaily]) -> ActivityLevelCounts {
    let mut counts = ActivityLevelCounts::default();
    for row in rows {
        match ActivityLevel::classify(row.activity.total_active_minutes) {
            ActivityLevel::Sedentary => counts.sedentary += 1,
            ActivityLevel::LightlyActive => counts.lightly_active += 1,
            ActivityLevel::ModeratelyActive => counts.moderately_active += 1,
            ActivityLevel::VeryActive => counts.very_active += 1,
        }
    }
    counts
}

// ── Steps achievement ─────────────────────────────────────────────────────────

/// Percentage of days reaching `goal` steps, rounded to 1 decimal.
/// Returns 0.0 for an empty table.
pub fn steps_achievement_pct(rows: &[MergedDaily], goal: i64) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let achieved = rows
        .iter()
        .filter(|r| r.activity.activity.total_steps >= goal)
        .count();
    round_to(achieved as f64 / rows.len() as f64 * 100.0, 1)
}

// ── Hourly patterns ───────────────────────────────────────────────────────────

/// Mean metric value for one hour of day.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyMean {
    pub hour: u32,
    pub avg: f64,
}

/// Mean value per hour of day, sorted by hour, rounded to 2 decimals.
pub fn hourly_means(rows: &[CleanHourly]) -> Vec<HourlyMean> {
    let mut by_hour: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for row in rows {
        by_hour.entry(row.hour).or_default().push(row.hourly.value);
    }
    by_hour
        .into_iter()
        .map(|(hour, values)| HourlyMean {
            hour,
            avg: round_to(mean(&values).unwrap_or(0.0), 2),
        })
        .collect()
}

/// The `n` hours with the highest mean value, highest first. Ties break on
/// the earlier hour.
pub fn peak_hours(means: &[HourlyMean], n: usize) -> Vec<u32> {
    let mut sorted: Vec<&HourlyMean> = means.iter().collect();
    sorted.sort_by(|a, b| {
        b.avg
            .partial_cmp(&a.avg)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.hour.cmp(&b.hour))
    });
    sorted.iter().take(n).map(|m| m.hour).collect()
}

// ── Correlations ──────────────────────────────────────────────────────────────

/// Daily numeric columns included in the correlation matrix.
pub const CORRELATION_COLUMNS: [&str; 7] = [
    "TotalSteps",
    "Calories",
    "TotalActiveMinutes",
    "SedentaryMinutes",
    "VeryActiveMinutes",
    "FairlyActiveMinutes",
    "LightlyActiveMinutes",
];

/// Pearson correlation matrix over the seven daily numeric columns.
///
/// Entries are rounded to 3 decimals; a pair involving a zero-variance
/// column is `NaN`, matching what a dataframe correlation would produce.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<&'static str>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Look up the correlation of two columns by name.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        Some(self.values[i][j])
    }
}

/// Compute the correlation matrix for the merged daily table.
pub fn correlation_matrix(rows: &[MergedDaily]) -> CorrelationMatrix {
    let series: Vec<Vec<f64>> = CORRELATION_COLUMNS
        .iter()
        .map(|column| {
            rows.iter()
                .map(|r| {
                    let a = &r.activity.activity;
                    match *column {
                        "TotalSteps" => a.total_steps as f64,
                        "Calories" => a.calories as f64,
                        "TotalActiveMinutes" => r.activity.total_active_minutes as f64,
                        "SedentaryMinutes" => a.sedentary_minutes as f64,
                        "VeryActiveMinutes" => a.very_active_minutes as f64,
                        "FairlyActiveMinutes" => a.fairly_active_minutes as f64,
                        _ => a.lightly_active_minutes as f64,
                    }
                })
                .collect()
        })
        .collect();

    let values = series
        .iter()
        .map(|x| {
            series
                .iter()
                .map(|y| match pearson(x, y) {
                    Some(r) => round_to(r, 3),
                    None => f64::NAN,
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        columns: CORRELATION_COLUMNS.to_vec(),
        values,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
