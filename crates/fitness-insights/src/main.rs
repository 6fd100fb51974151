mod bootstrap;

use anyhow::Result;
use insights_analysis::aggregator::{correlation_matrix, hourly_means, weekday_patterns};
use insights_analysis::insights::{generate_insights, recommendations};
use insights_analysis::segmenter::{segment_users, user_metrics};
use insights_core::settings::Settings;
use insights_data::pipeline::prepare_all_data;
use insights_data::validator::validate_all;
use insights_report::charts::{render_all, ChartInputs};
use insights_report::report::{write_analysis_report, write_validation_report};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::ensure_directories(&settings.reports_dir)?;
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Fitness Insights v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Data: {}, Reports: {}, Clusters: {}",
        settings.data_dir.display(),
        settings.reports_dir.display(),
        settings.clusters
    );

    // 1. Load, clean and join the export files. Structural problems with
    //    the input directory are fatal.
    let (data, summary) = prepare_all_data(&settings.data_dir)?;
    tracing::info!(
        "Loaded {} activity rows ({} dropped), {} sleep rows ({} dropped)",
        summary.activity_rows_loaded,
        summary.activity_rows_dropped,
        summary.sleep_rows_loaded,
        summary.sleep_rows_dropped
    );

    // 2. Validate the cleaned tables. Failures are reported, not fatal.
    let validation = validate_all(&data);
    write_validation_report(&settings.reports_dir, &validation)?;
    if validation.all_passed() {
        tracing::info!("All data quality checks passed");
    } else {
        tracing::warn!(
            "{} data quality checks failed; continuing with analysis",
            validation.failed_count()
        );
    }

    // 3. Analysis.
    let weekdays = weekday_patterns(&data.merged_daily);
    let hourly = hourly_means(&data.hourly_steps);
    let correlations = correlation_matrix(&data.merged_daily);
    let metrics = user_metrics(&data.merged_daily);
    let segments = segment_users(&metrics, settings.clusters);
    let insights = generate_insights(
        &data.merged_daily,
        &data.hourly_steps,
        &segments,
        settings.step_goal,
    );
    for line in insights.summary_lines() {
        tracing::info!("{}", line);
    }

    // 4. Charts.
    if settings.skip_charts {
        tracing::info!("Skipping chart rendering (--skip-charts)");
    } else {
        render_all(
            &settings.figures_dir(),
            &ChartInputs {
                weekday_patterns: &weekdays,
                hourly_steps: &hourly,
                correlations: &correlations,
                merged_daily: &data.merged_daily,
                segments: &segments,
            },
        )?;
    }

    // 5. Final report.
    let report_path = write_analysis_report(
        &settings.reports_dir,
        &insights,
        &recommendations(),
        validation.all_passed(),
    )?;
    tracing::info!("Analysis complete; see {}", report_path.display());

    Ok(())
}
