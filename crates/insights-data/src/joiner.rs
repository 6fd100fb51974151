//! Date-aligned left join of cleaned daily activity with cleaned sleep.

use std::collections::HashMap;

use chrono::NaiveDate;
use insights_core::models::{CleanActivity, CleanSleep, MergedDaily};
use tracing::debug;

/// Left-join cleaned activity with cleaned sleep on `(id, calendar date)`.
///
/// Every activity row is preserved exactly once; the sleep side is `None`
/// when no record shares the `(id, date)` key. When multiple sleep records
/// exist for the same key the last one in input order wins, so the output
/// row count always equals the activity row count.
pub fn merge_daily_sleep(activity: &[CleanActivity], sleep: &[CleanSleep]) -> Vec<MergedDaily> {
    // Later inserts overwrite earlier ones: last-match-wins.
    let mut sleep_by_key: HashMap<(u64, NaiveDate), &CleanSleep> = HashMap::new();
    for record in sleep {
        sleep_by_key.insert((record.sleep.id, record.date), record);
    }

    let merged: Vec<MergedDaily> = activity
        .iter()
        .map(|a| MergedDaily {
            activity: a.clone(),
            sleep: sleep_by_key
                .get(&(a.activity.id, a.activity.activity_date))
                .map(|s| (*s).clone()),
        })
        .collect();

    let matched = merged.iter().filter(|m| m.sleep.is_some()).count();
    debug!(
        "merge_daily_sleep: {} activity rows, {} with sleep",
        merged.len(),
        matched
    );
    merged
}

// ── Tests ─────────────────────────────────────────────────────────────────────
