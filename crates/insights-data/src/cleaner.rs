//! Per-table cleaning: derived columns and outlier filtering.
//!
//! Each routine is a pure function from one table to a new table. Rows that
//! fail a validity predicate are dropped here, silently; the validator is
//! the only place where residual quality issues are surfaced. Every cleaning
//! function is idempotent: feeding its own output back in yields the same
//! table.

use std::collections::HashMap;

use insights_core::models::{
    ActivityRecord, CleanActivity, CleanHeartRate, CleanHourly, CleanSleep, HeartRateRecord,
    HourlyMetric, HourlyRecord, SleepRecord, WeightRecord,
};
use insights_core::stats;
use tracing::debug;

// ── Activity ──────────────────────────────────────────────────────────────────

/// Clean the daily-activity table.
///
/// Derives `day_of_week`, `total_active_minutes` and
/// `active_to_sedentary_ratio`, then keeps only rows satisfying
/// `TotalSteps ≥ 0 ∧ Calories > 0 ∧ TotalDistance ≥ 0`.
///
/// The ratio is plain IEEE division: a row with zero sedentary minutes gets
/// `inf` (or `NaN` when it also has zero active minutes). That is a known
/// property of the data, not something this stage papers over.
pub fn clean_activity(rows: &[ActivityRecord]) -> Vec<CleanActivity> {
    let cleaned: Vec<CleanActivity> = rows
        .iter()
        .filter(|r| r.total_steps >= 0 && r.calories > 0 && r.total_distance >= 0.0)
        .map(|r| {
            let total_active_minutes =
                r.very_active_minutes + r.fairly_active_minutes + r.lightly_active_minutes;
            CleanActivity {
                activity: r.clone(),
                day_of_week: r.activity_date.format("%A").to_string(),
                total_active_minutes,
                active_to_sedentary_ratio: total_active_minutes as f64
                    / r.sedentary_minutes as f64,
            }
        })
        .collect();

    debug!(
        "clean_activity: kept {} of {} rows",
        cleaned.len(),
        rows.len()
    );
    cleaned
}

// ── Sleep ─────────────────────────────────────────────────────────────────────

/// Clean the sleep table.
///
/// Derives the calendar `date`, `sleep_efficiency` and
/// `sleep_duration_hours`, then keeps only rows with a duration of 1–24
/// hours and efficiency ≤ 1. Rows where time asleep exceeds time in bed are
/// corrupt and are dropped rather than clamped.
pub fn clean_sleep(rows: &[SleepRecord]) -> Vec<CleanSleep> {
    let cleaned: Vec<CleanSleep> = rows
        .iter()
        .map(|r| {
            let sleep_efficiency = r.total_minutes_asleep as f64 / r.total_time_in_bed as f64;
            CleanSleep {
                sleep: r.clone(),
                date: r.sleep_day.date(),
                sleep_efficiency,
                sleep_duration_hours: r.total_minutes_asleep as f64 / 60.0,
            }
        })
        // NaN efficiency (0 minutes in bed) fails the ≤ 1 comparison and is
        // dropped with the rest.
        .filter(|c| {
            c.sleep_duration_hours >= 1.0
                && c.sleep_duration_hours <= 24.0
                && c.sleep_efficiency <= 1.0
        })
        .collect();

    debug!("clean_sleep: kept {} of {} rows", cleaned.len(), rows.len());
    cleaned
}

// ── Heart rate ────────────────────────────────────────────────────────────────

/// Clean the heart-rate table: derive the calendar `date` and keep only
/// readings in the physiological 40–220 bpm range.
pub fn clean_heart_rate(rows: &[HeartRateRecord]) -> Vec<CleanHeartRate> {
    let cleaned: Vec<CleanHeartRate> = rows
        .iter()
        .filter(|r| r.value >= 40 && r.value <= 220)
        .map(|r| CleanHeartRate {
            heart_rate: r.clone(),
            date: r.time.date(),
        })
        .collect();

    debug!(
        "clean_heart_rate: kept {} of {} rows",
        cleaned.len(),
        rows.len()
    );
    cleaned
}

// ── Weight ────────────────────────────────────────────────────────────────────

/// Clean the weight table by imputing missing values. No rows are dropped.
///
/// * Missing `fat` is filled with the per-user median of that user's own
///   non-missing values; a user with no recorded fat keeps `None`.
/// * Missing `bmi` is filled with `weight_kg / mean(weight_kg / bmi)²`,
///   where the mean is taken over the same user's rows that do carry a bmi.
///   When no such reference row exists the value stays `None` instead of
///   dividing by an undefined mean.
pub fn clean_weight(rows: &[WeightRecord]) -> Vec<WeightRecord> {
    // Per-user fat values and weight/bmi ratios from rows that have them.
    let mut fat_values: HashMap<u64, Vec<f64>> = HashMap::new();
    let mut bmi_ratios: HashMap<u64, Vec<f64>> = HashMap::new();
    for r in rows {
        if let Some(fat) = r.fat {
            fat_values.entry(r.id).or_default().push(fat);
        }
        if let Some(bmi) = r.bmi {
            bmi_ratios.entry(r.id).or_default().push(r.weight_kg / bmi);
        }
    }

    let fat_medians: HashMap<u64, f64> = fat_values
        .into_iter()
        .filter_map(|(id, values)| stats::median(&values).map(|m| (id, m)))
        .collect();
    let ratio_means: HashMap<u64, f64> = bmi_ratios
        .into_iter()
        .filter_map(|(id, ratios)| stats::mean(&ratios).map(|m| (id, m)))
        .collect();

    let cleaned: Vec<WeightRecord> = rows
        .iter()
        .map(|r| {
            let mut out = r.clone();
            if out.fat.is_none() {
                out.fat = fat_medians.get(&r.id).copied();
            }
            if out.bmi.is_none() {
                out.bmi = ratio_means.get(&r.id).map(|m| r.weight_kg / (m * m));
            }
            out
        })
        .collect();

    debug!(
        "clean_weight: imputed fat for {} rows, bmi for {} rows",
        cleaned
            .iter()
            .zip(rows.iter())
            .filter(|(c, r)| c.fat.is_some() && r.fat.is_none())
            .count(),
        cleaned
            .iter()
            .zip(rows.iter())
            .filter(|(c, r)| c.bmi.is_some() && r.bmi.is_none())
            .count()
    );
    cleaned
}

// ── Hourly ────────────────────────────────────────────────────────────────────

/// Clean an hourly table uniformly: derive the calendar `date` and the
/// integer `hour` (0–23). Value-range problems are left for the validator.
pub fn clean_hourly(metric: HourlyMetric, rows: &[HourlyRecord]) -> Vec<CleanHourly> {
    use chrono::Timelike;

    let cleaned: Vec<CleanHourly> = rows
        .iter()
        .map(|r| CleanHourly {
            hourly: r.clone(),
            date: r.activity_hour.date(),
            hour: r.activity_hour.hour(),
        })
        .collect();

    debug!("clean_hourly({}): {} rows", metric.name(), cleaned.len());
    cleaned
}

// ── Tests ─────────────────────────────────────────────────────────────────────
