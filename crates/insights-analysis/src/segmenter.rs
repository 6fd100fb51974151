//! User segmentation via k-means over per-user activity averages.
//!
//! Features are z-scored before clustering so steps do not dominate the
//! minute-scale columns. Centroid seeding is deterministic (quantiles of
//! the steps-ordered users), so repeated runs on the same table produce
//! the same segments.

use std::collections::BTreeMap;

use insights_core::models::MergedDaily;
use insights_core::stats::{mean, round_to, std_dev};
use tracing::debug;

const MAX_ITERATIONS: usize = 100;
const FEATURES: usize = 3;

// ── Per-user metrics ──────────────────────────────────────────────────────────

/// Mean daily metrics for one user across their tracked days.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMetrics {
    pub id: u64,
    pub days_tracked: usize,
    pub avg_steps: f64,
    pub avg_calories: f64,
    pub avg_active_minutes: f64,
    pub avg_sedentary_minutes: f64,
}

/// Collapse the merged daily table to one row per user, sorted by id.
/// Averages are rounded to 2 decimals.
pub fn user_metrics(rows: &[MergedDaily]) -> Vec<UserMetrics> {
    let mut by_user: BTreeMap<u64, Vec<&MergedDaily>> = BTreeMap::new();
    for row in rows {
        by_user.entry(row.activity.activity.id).or_default().push(row);
    }

    by_user
        .into_iter()
        .map(|(id, days)| {
            let column = |f: fn(&MergedDaily) -> f64| -> f64 {
                let values: Vec<f64> = days.iter().map(|r| f(r)).collect();
                round_to(mean(&values).unwrap_or(0.0), 2)
            };
            UserMetrics {
                id,
                days_tracked: days.len(),
                avg_steps: column(|r| r.activity.activity.total_steps as f64),
                avg_calories: column(|r| r.activity.activity.calories as f64),
                avg_active_minutes: column(|r| r.activity.total_active_minutes as f64),
                avg_sedentary_minutes: column(|r| r.activity.activity.sedentary_minutes as f64),
            }
        })
        .collect()
}

// ── Segments ──────────────────────────────────────────────────────────────────

/// Human-readable segment label, ranked by the cluster's mean steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentLabel {
    LowActivity,
    ModerateActivity,
    HighActivity,
}

impl SegmentLabel {
    pub fn name(&self) -> &'static str {
        match self {
            SegmentLabel::LowActivity => "Low Activity",
            SegmentLabel::ModerateActivity => "Moderate Activity",
            SegmentLabel::HighActivity => "High Activity",
        }
    }
}

/// One user with their cluster assignment and label.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedUser {
    pub metrics: UserMetrics,
    pub cluster: usize,
    pub label: SegmentLabel,
}

/// Cluster users into at most `k` segments on (steps, calories, active
/// minutes). When there are fewer users than requested clusters, `k` is
/// reduced to the user count.
pub fn segment_users(metrics: &[UserMetrics], k: u32) -> Vec<SegmentedUser> {
    if metrics.is_empty() {
        return Vec::new();
    }
    let k = (k as usize).clamp(1, metrics.len());

    let points = zscore_features(metrics);
    let assignments = kmeans(&points, k, metrics);
    let labels = rank_clusters(metrics, &assignments, k);

    debug!("Segmented {} users into {} clusters", metrics.len(), k);

    metrics
        .iter()
        .zip(assignments)
        .map(|(m, cluster)| SegmentedUser {
            metrics: m.clone(),
            cluster,
            label: labels[cluster],
        })
        .collect()
}

// ── Feature scaling ───────────────────────────────────────────────────────────

fn raw_features(m: &UserMetrics) -> [f64; FEATURES] {
    [m.avg_steps, m.avg_calories, m.avg_active_minutes]
}

/// Z-score each feature column. A zero-variance column maps to all zeros.
fn zscore_features(metrics: &[UserMetrics]) -> Vec<[f64; FEATURES]> {
    let mut means = [0.0; FEATURES];
    let mut stds = [0.0; FEATURES];
    for f in 0..FEATURES {
        let column: Vec<f64> = metrics.iter().map(|m| raw_features(m)[f]).collect();
        means[f] = mean(&column).unwrap_or(0.0);
        stds[f] = std_dev(&column).unwrap_or(0.0);
    }

    metrics
        .iter()
        .map(|m| {
            let raw = raw_features(m);
            let mut scaled = [0.0; FEATURES];
            for f in 0..FEATURES {
                if stds[f] > 0.0 {
                    scaled[f] = (raw[f] - means[f]) / stds[f];
                }
            }
            scaled
        })
        .collect()
}

// ── K-means ───────────────────────────────────────────────────────────────────

fn squared_distance(a: &[f64; FEATURES], b: &[f64; FEATURES]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Seed one centroid per quantile of the users ordered by average steps.
/// Centroid `i` takes the point at the midpoint of the i-th of `k` equal
/// slices, so seeds spread across the activity range.
fn seed_centroids(
    points: &[[f64; FEATURES]],
    metrics: &[UserMetrics],
    k: usize,
) -> Vec<[f64; FEATURES]> {
    let mut order: Vec<usize> = (0..metrics.len()).collect();
    order.sort_by(|&a, &b| {
        metrics[a]
            .avg_steps
            .partial_cmp(&metrics[b].avg_steps)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(metrics[a].id.cmp(&metrics[b].id))
    });

    (0..k)
        .map(|i| {
            let idx = order[(2 * i + 1) * points.len() / (2 * k)];
            points[idx]
        })
        .collect()
}

/// Lloyd's algorithm with deterministic seeding. A cluster that loses all
/// members keeps its previous centroid.
fn kmeans(points: &[[f64; FEATURES]], k: usize, metrics: &[UserMetrics]) -> Vec<usize> {
    let mut centroids = seed_centroids(points, metrics, k);
    let mut assignments = vec![0usize; points.len()];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, point) in points.iter().enumerate() {
            let nearest = (0..k)
                .min_by(|&a, &b| {
                    squared_distance(point, &centroids[a])
                        .partial_cmp(&squared_distance(point, &centroids[b]))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(0);
            if assignments[i] != nearest {
                assignments[i] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        for cluster in 0..k {
            let members: Vec<&[f64; FEATURES]> = points
                .iter()
                .zip(&assignments)
                .filter(|(_, &a)| a == cluster)
                .map(|(p, _)| p)
                .collect();
            if members.is_empty() {
                continue;
            }
            let mut centroid = [0.0; FEATURES];
            for member in &members {
                for f in 0..FEATURES {
                    centroid[f] += member[f];
                }
            }
            for value in &mut centroid {
                *value /= members.len() as f64;
            }
            centroids[cluster] = centroid;
        }
    }

    assignments
}

/// Map each cluster to a label by ranking clusters on their members' mean
/// steps. The lowest-stepping cluster is Low Activity, the highest is High
/// Activity, anything between is Moderate. A single cluster is Moderate.
fn rank_clusters(metrics: &[UserMetrics], assignments: &[usize], k: usize) -> Vec<SegmentLabel> {
    let mut cluster_steps: Vec<(usize, f64)> = (0..k)
        .map(|cluster| {
            let steps: Vec<f64> = metrics
                .iter()
                .zip(assignments)
                .filter(|(_, &a)| a == cluster)
                .map(|(m, _)| m.avg_steps)
                .collect();
            (cluster, mean(&steps).unwrap_or(f64::NEG_INFINITY))
        })
        .collect();
    cluster_steps.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut labels = vec![SegmentLabel::ModerateActivity; k];
    if k > 1 {
        labels[cluster_steps[0].0] = SegmentLabel::LowActivity;
        labels[cluster_steps[k - 1].0] = SegmentLabel::HighActivity;
    }
    labels
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insights_core::models::{ActivityRecord, CleanActivity};

    fn merged_row(id: u64, day: u32, steps: i64, calories: i64, active: i64) -> MergedDaily {
        let activity_date = NaiveDate::from_ymd_opt(2016, 4, day).unwrap();
        MergedDaily {
            activity: CleanActivity {
                day_of_week: activity_date.format("%A").to_string(),
                total_active_minutes: active,
                active_to_sedentary_ratio: active as f64 / 700.0,
                activity: ActivityRecord {
                    id,
                    activity_date,
                    total_steps: steps,
                    total_distance: steps as f64 / 1500.0,
                    very_active_minutes: active / 2,
                    fairly_active_minutes: active / 4,
                    lightly_active_minutes: active - active / 2 - active / 4,
                    sedentary_minutes: 700,
                    calories,
                },
            },
            sleep: None,
        }
    }

    fn user(id: u64, steps: f64, calories: f64, active: f64) -> UserMetrics {
        UserMetrics {
            id,
            days_tracked: 10,
            avg_steps: steps,
            avg_calories: calories,
            avg_active_minutes: active,
            avg_sedentary_minutes: 700.0,
        }
    }

    // ── user_metrics ──────────────────────────────────────────────────────────

    #[test]
    fn test_user_metrics_averages_per_user() {
        let rows = vec![
            merged_row(2, 12, 10_000, 2000, 100),
            merged_row(2, 13, 20_000, 3000, 200),
            merged_row(1, 12, 4000, 1500, 40),
        ];
        let metrics = user_metrics(&rows);

        assert_eq!(metrics.len(), 2);
        // Sorted by id regardless of input order.
        assert_eq!(metrics[0].id, 1);
        assert_eq!(metrics[0].days_tracked, 1);
        assert_eq!(metrics[1].id, 2);
        assert_eq!(metrics[1].days_tracked, 2);
        assert_eq!(metrics[1].avg_steps, 15_000.0);
        assert_eq!(metrics[1].avg_calories, 2500.0);
    }

    #[test]
    fn test_user_metrics_empty() {
        assert!(user_metrics(&[]).is_empty());
    }

    // ── segment_users ─────────────────────────────────────────────────────────

    fn three_tiers() -> Vec<UserMetrics> {
        vec![
            user(1, 2000.0, 1500.0, 20.0),
            user(2, 2500.0, 1550.0, 25.0),
            user(3, 8000.0, 2200.0, 90.0),
            user(4, 8500.0, 2250.0, 95.0),
            user(5, 15_000.0, 3000.0, 200.0),
            user(6, 15_500.0, 3100.0, 210.0),
        ]
    }

    #[test]
    fn test_segment_users_separates_clear_tiers() {
        let segments = segment_users(&three_tiers(), 3);
        assert_eq!(segments.len(), 6);

        let label_of = |id: u64| segments.iter().find(|s| s.metrics.id == id).unwrap().label;
        assert_eq!(label_of(1), SegmentLabel::LowActivity);
        assert_eq!(label_of(2), SegmentLabel::LowActivity);
        assert_eq!(label_of(3), SegmentLabel::ModerateActivity);
        assert_eq!(label_of(4), SegmentLabel::ModerateActivity);
        assert_eq!(label_of(5), SegmentLabel::HighActivity);
        assert_eq!(label_of(6), SegmentLabel::HighActivity);
    }

    #[test]
    fn test_segment_users_deterministic() {
        let first = segment_users(&three_tiers(), 3);
        let second = segment_users(&three_tiers(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_segment_users_fewer_users_than_clusters() {
        let metrics = vec![user(1, 2000.0, 1500.0, 20.0), user(2, 15_000.0, 3000.0, 200.0)];
        let segments = segment_users(&metrics, 3);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].label, SegmentLabel::LowActivity);
        assert_eq!(segments[1].label, SegmentLabel::HighActivity);
    }

    #[test]
    fn test_segment_users_single_cluster_is_moderate() {
        let segments = segment_users(&three_tiers(), 1);
        assert!(segments
            .iter()
            .all(|s| s.label == SegmentLabel::ModerateActivity));
    }

    #[test]
    fn test_segment_users_empty() {
        assert!(segment_users(&[], 3).is_empty());
    }

    #[test]
    fn test_segment_users_identical_users_do_not_panic() {
        // Zero variance in every feature; all land in one cluster.
        let metrics = vec![user(1, 5000.0, 2000.0, 60.0), user(2, 5000.0, 2000.0, 60.0)];
        let segments = segment_users(&metrics, 2);
        assert_eq!(segments.len(), 2);
    }
}
