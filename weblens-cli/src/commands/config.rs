//! `weblens config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use weblens_core::config::WeblensConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Execute the config validate subcommand.
///
/// Attempts to load and validate the configuration file, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (missing file, invalid values, parse errors).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let result = WeblensConfig::load(config_path).await;

    let report = match result {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Execute the config show subcommand.
///
/// Loads and displays the effective configuration (file + env overrides + defaults).
///
/// # Errors
///
/// Returns `CliError::Config` if loading fails or `CliError::Command` if the
/// section name is invalid.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = WeblensConfig::load(config_path)
        .await
        .map_err(|e| CliError::Config(e.to_string()))?;

    let report = if let Some(section_name) = section {
        match section_name.as_str() {
            "general" => ConfigReport {
                source: config_path.display().to_string(),
                section: Some("general".to_owned()),
                config_toml: toml::to_string_pretty(&config.general)
                    .unwrap_or_else(|e| format!("(serialization error: {})", e)),
            },
            "analytics" => ConfigReport {
                source: config_path.display().to_string(),
                section: Some("analytics".to_owned()),
                config_toml: toml::to_string_pretty(&config.analytics)
                    .unwrap_or_else(|e| format!("(serialization error: {})", e)),
            },
            other => {
                return Err(CliError::Command(format!(
                    "unknown config section '{}', expected 'general' or 'analytics'",
                    other
                )));
            }
        }
    } else {
        ConfigReport {
            source: config_path.display().to_string(),
            section: None,
            config_toml: toml::to_string_pretty(&config)
                .unwrap_or_else(|e| format!("(serialization error: {})", e)),
        }
    };

    writer.render(&report)?;
    Ok(())
}

/// Validation outcome payload.
#[derive(Debug, Serialize)]
struct ConfigValidationReport {
    source: String,
    valid: bool,
    errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Config: {}", self.source)?;
        if self.valid {
            writeln!(w, "Status: valid")?;
        } else {
            writeln!(w, "Status: INVALID")?;
            for error in &self.errors {
                writeln!(w, "  - {}", error)?;
            }
        }
        Ok(())
    }
}

/// Effective-configuration payload.
#[derive(Debug, Serialize)]
struct ConfigReport {
    source: String,
    section: Option<String>,
    config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Config: {}", self.source)?;
        if let Some(section) = &self.section {
            writeln!(w, "Section: [{}]", section)?;
        }
        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}
