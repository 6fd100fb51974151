use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Batch analysis of fitness-tracker export data
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fitness-insights",
    about = "Batch analysis of fitness-tracker export data",
    version
)]
pub struct Settings {
    /// Directory containing the seven tracker export CSV files
    #[arg(long, default_value = "dataset")]
    pub data_dir: PathBuf,

    /// Directory where reports and figures are written
    #[arg(long, default_value = "reports")]
    pub reports_dir: PathBuf,

    /// Number of user segments produced by clustering (1-10)
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=10))]
    pub clusters: u32,

    /// Daily step goal used for the achievement insight
    #[arg(long, default_value = "10000")]
    pub step_goal: i64,

    /// Skip chart rendering (reports are still written)
    #[arg(long)]
    pub skip_charts: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse CLI arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`Settings::load`] but from an explicit argument list, enabling
    /// unit tests without spawning subprocesses.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Settings::parse_from(args))
    }

    /// Figures subdirectory under the reports directory.
    pub fn figures_dir(&self) -> PathBuf {
        self.reports_dir.join("figures")
    }

    fn resolve(mut settings: Settings) -> Settings {
        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::load_from_args(["fitness-insights"]);

        assert_eq!(settings.data_dir, PathBuf::from("dataset"));
        assert_eq!(settings.reports_dir, PathBuf::from("reports"));
        assert_eq!(settings.clusters, 3);
        assert_eq!(settings.step_goal, 10_000);
        assert!(!settings.skip_charts);
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_explicit_dirs() {
        let settings = Settings::load_from_args([
            "fitness-insights",
            "--data-dir",
            "/data/exports",
            "--reports-dir",
            "/tmp/out",
        ]);
        assert_eq!(settings.data_dir, PathBuf::from("/data/exports"));
        assert_eq!(settings.reports_dir, PathBuf::from("/tmp/out"));
        assert_eq!(settings.figures_dir(), PathBuf::from("/tmp/out/figures"));
    }

    #[test]
    fn test_settings_debug_overrides_log_level() {
        let settings = Settings::load_from_args(["fitness-insights", "--debug"]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_settings_cluster_count() {
        let settings = Settings::load_from_args(["fitness-insights", "--clusters", "4"]);
        assert_eq!(settings.clusters, 4);
    }
}
