//! `weblens analyze` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use weblens_core::config::WeblensConfig;
use weblens_core::error::{ConfigError, WeblensError};
use weblens_core::pipeline::Exporter;
use weblens_core::types::AnalyticsReport;
use weblens_analytics::{AccessLogParser, AnalyticsEngine, CsvExporter, EngineConfig, JsonExporter};

use crate::cli::{AnalyzeArgs, ExportFormat};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `analyze` command.
///
/// Reads the input file, runs the analytics engine, exports all six
/// result sets, and renders a run summary.
///
/// # Errors
///
/// Returns `CliError::Io` if the input file or output sink is
/// unreadable/unwritable, `CliError::Config` for invalid configuration.
pub async fn execute(
    args: AnalyzeArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let core_config = load_config_or_defaults(config_path).await?;
    let engine_config = apply_cli_overrides(&core_config, &args)?;

    info!(input = %args.input.display(), "reading access log");
    let data = tokio::fs::read(&args.input).await?;

    let parser = AccessLogParser::from_config(&engine_config);
    let records = parser.parse_bytes(&data);
    info!(records = records.len(), "records ingested");

    let parallel = engine_config.parallel;
    let engine =
        AnalyticsEngine::new(engine_config).map_err(|e| CliError::Config(e.to_string()))?;

    let report = if parallel {
        engine.analyze_parallel(records).await?
    } else {
        engine.analyze(&records)
    };

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| core_config.general.output_dir.clone().into());

    match args.format {
        ExportFormat::Csv => CsvExporter::new(&output_dir).export(&report)?,
        ExportFormat::Json => JsonExporter::new(&output_dir).export(&report)?,
    }

    let summary = AnalyzeSummary::from_report(
        &report,
        args.input.display().to_string(),
        output_dir.display().to_string(),
        args.format.as_str().to_owned(),
    );
    writer.render(&summary)?;

    Ok(())
}

/// Load the configuration file, falling back to defaults (plus env
/// overrides) when the file does not exist.
///
/// A missing config file is not an error for `analyze`: the engine
/// defaults are a complete, valid configuration.
async fn load_config_or_defaults(config_path: &Path) -> Result<WeblensConfig, CliError> {
    match WeblensConfig::load(config_path).await {
        Ok(config) => Ok(config),
        Err(WeblensError::Config(ConfigError::FileNotFound { .. })) => {
            let mut config = WeblensConfig::default();
            config.apply_env_overrides();
            config
                .validate()
                .map_err(|e| CliError::Config(e.to_string()))?;
            Ok(config)
        }
        Err(e) => Err(CliError::Config(e.to_string())),
    }
}

/// Apply CLI flag overrides on top of the configured analytics section.
fn apply_cli_overrides(
    core_config: &WeblensConfig,
    args: &AnalyzeArgs,
) -> Result<EngineConfig, CliError> {
    let mut config = EngineConfig::from_core(&core_config.analytics);

    if let Some(delimiter) = &args.delimiter {
        let bytes = delimiter.as_bytes();
        if bytes.len() != 1 {
            return Err(CliError::Command(format!(
                "delimiter must be exactly one byte, got '{}'",
                delimiter
            )));
        }
        config.delimiter = bytes[0];
    }
    if let Some(top) = args.top {
        config.top_pages = top;
    }
    if args.no_skip_header {
        config.skip_header = false;
    }
    if args.sequential {
        config.parallel = false;
    }

    config
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;
    Ok(config)
}

/// Run summary rendered after a successful analysis.
#[derive(Debug, Serialize)]
pub struct AnalyzeSummary {
    /// Input file path.
    pub input: String,
    /// Directory the result sets were written to.
    pub output_dir: String,
    /// Export format used.
    pub format: String,
    /// Unique report id.
    pub report_id: String,
    /// Total request count.
    pub total_requests: u64,
    /// Number of distinct status groups (NULL included).
    pub status_groups: usize,
    /// Most visited page, if any.
    pub top_page: Option<String>,
    /// Number of suspicious IPs detected.
    pub suspicious_ips: usize,
    /// Number of minute buckets in the traffic trend.
    pub trend_buckets: usize,
}

impl AnalyzeSummary {
    fn from_report(
        report: &AnalyticsReport,
        input: String,
        output_dir: String,
        format: String,
    ) -> Self {
        Self {
            input,
            output_dir,
            format,
            report_id: report.meta.report_id.clone(),
            total_requests: report.total_requests,
            status_groups: report.status_codes.len(),
            top_page: report.visited_pages.first().map(|p| p.url.clone()),
            suspicious_ips: report.suspicious_ips.len(),
            trend_buckets: report.traffic_trends.len(),
        }
    }
}

impl Render for AnalyzeSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Analysis complete ({})", self.report_id)?;
        writeln!(w, "  Input:           {}", self.input)?;
        writeln!(w, "  Output:          {} ({})", self.output_dir, self.format)?;
        writeln!(w, "  Total requests:  {}", self.total_requests)?;
        writeln!(w, "  Status groups:   {}", self.status_groups)?;
        match &self.top_page {
            Some(url) => writeln!(w, "  Top page:        {}", url)?,
            None => writeln!(w, "  Top page:        (none)")?,
        }
        writeln!(w, "  Suspicious IPs:  {}", self.suspicious_ips)?;
        writeln!(w, "  Trend buckets:   {}", self.trend_buckets)?;
        Ok(())
    }
}
