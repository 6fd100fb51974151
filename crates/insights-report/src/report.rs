//! Markdown report generation.

use std::path::{Path, PathBuf};

use insights_analysis::insights::AnalysisInsights;
use insights_core::error::Result;
use insights_data::validator::ValidationSummary;
use tracing::info;

pub const VALIDATION_REPORT_FILE: &str = "validation_report.md";
pub const ANALYSIS_REPORT_FILE: &str = "analysis_report.md";

// ── Validation report ─────────────────────────────────────────────────────────

/// Render the validation report: one section per table, one PASS/FAIL line
/// per check.
pub fn render_validation_report(summary: &ValidationSummary) -> String {
    let mut out = String::from("# Data Validation Report\n\n");
    for table in &summary.tables {
        out.push_str(&format!("## {}\n", table.table));
        for check in &table.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!("- {}: {}\n", check.name, status));
        }
        out.push('\n');
    }
    out
}

/// Write the validation report into `reports_dir` and return its path.
pub fn write_validation_report(reports_dir: &Path, summary: &ValidationSummary) -> Result<PathBuf> {
    let path = reports_dir.join(VALIDATION_REPORT_FILE);
    std::fs::write(&path, render_validation_report(summary))?;
    info!("Wrote validation report to {}", path.display());
    Ok(path)
}

// ── Analysis report ───────────────────────────────────────────────────────────

/// Render the analysis report from the insight record, the recommendation
/// list and the overall validation outcome.
pub fn render_analysis_report(
    insights: &AnalysisInsights,
    recommendations: &[&str],
    validation_passed: bool,
) -> String {
    let mut out = String::from(
        "# Fitness Tracker Analysis Report\n\n\
         ## Overview\n\
         This report presents the analysis of a fitness tracker data export: \
         daily activity, sleep, heart rate and hourly usage patterns.\n\n\
         ## Data Quality\n",
    );

    if validation_passed {
        out.push_str("All data quality checks passed. The analysis is based on validated data.\n");
    } else {
        out.push_str(
            "Some data quality checks failed. Please refer to the validation_report.md\n\
             for detailed information about data quality issues that may affect the analysis results.\n",
        );
    }

    out.push_str("\n## Key Insights\n");
    for (i, line) in insights.summary_lines().iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, line));
    }

    out.push_str("\n## Recommendations\n");
    for (i, rec) in recommendations.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, rec));
    }

    out.push_str(
        "\n## Visualizations\n\
         The following visualizations can be found in the 'figures' directory:\n\n\
         1. Daily Activity Patterns (daily_patterns.png)\n\
         2. Hourly Activity Patterns (hourly_patterns.png)\n\
         3. User Segments (user_segments.html)\n\
         4. Correlation Matrix (correlations.png)\n\
         5. Sleep Patterns (sleep_patterns.png)\n\
         \n\
         ## Methodology\n\
         The analysis followed these steps:\n\
         1. Data preparation and cleaning\n\
         2. Data quality validation\n\
         3. Activity pattern analysis\n\
         4. User segmentation\n\
         5. Correlation analysis\n\
         6. Insight generation\n\
         \n\
         ## Conclusion\n\
         The analysis reveals how activity, sleep and usage patterns vary across\n\
         users and over the tracked period, and where engagement is strongest.\n\
         \n\
         ## Next Steps\n\
         1. Act on the recommendations above\n\
         2. Tailor follow-ups to each user segment\n\
         3. Re-run the analysis as new export data arrives\n\
         4. Consider collecting additional data points for deeper insights\n",
    );

    out
}

/// Write the analysis report into `reports_dir` and return its path.
pub fn write_analysis_report(
    reports_dir: &Path,
    insights: &AnalysisInsights,
    recommendations: &[&str],
    validation_passed: bool,
) -> Result<PathBuf> {
    let path = reports_dir.join(ANALYSIS_REPORT_FILE);
    std::fs::write(
        &path,
        render_analysis_report(insights, recommendations, validation_passed),
    )?;
    info!("Wrote analysis report to {}", path.display());
    Ok(path)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
