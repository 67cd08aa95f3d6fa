//! Validate command

use std::path::Path;

use clap::Args;
use console::style;
use tracing::info;

use rustore_api::{resolve_release_time, Artifact, Clock, PublishType, ReleaseTime, SystemClock};
use rustore_core::config::{validate_release_notes, Config};

use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes;

/// Credential variables checked by `validate`
const CREDENTIAL_VARS: [&str; 3] = ["RUSTORE_KEY_ID", "RUSTORE_TIMESTAMP", "RUSTORE_SIGNATURE"];

/// Validate configuration, build files and credentials
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Strict mode - treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(strict = self.strict, "executing validate command");
        let cwd = std::env::current_dir()?;

        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        let (config, config_path) = match cli.load_config(&cwd) {
            Ok((config, path, base_dir)) => {
                check_publish_settings(&config, &base_dir, &mut errors, &mut warnings);
                (Some(config), path)
            }
            Err(e) => {
                errors.push(format!("Configuration: {:#}", e));
                (None, None)
            }
        };
        if config.is_some() && config_path.is_none() {
            warnings.push("No configuration file found, using defaults".to_string());
        }

        for var in CREDENTIAL_VARS {
            if std::env::var(var).map_or(true, |v| v.is_empty()) {
                warnings.push(format!("{} is not set", var));
            }
        }

        if self.strict {
            errors.append(&mut warnings);
        }

        let passed = errors.is_empty();

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "valid": passed,
                    "config_path": config_path.map(|p| p.to_string_lossy().to_string()),
                    "config": config,
                    "errors": errors,
                    "warnings": warnings
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    println!("{}", output::header("Validation Results"));
                    println!();

                    if let Some(path) = &config_path {
                        println!("Config: {}", style(path.display()).cyan());
                    }
                    if let Some(config) = &config {
                        print_settings(config);
                    }
                    println!();

                    if !errors.is_empty() {
                        println!("{}", style("Errors:").red().bold());
                        for error in &errors {
                            println!("  {} {}", style("✗").red(), error);
                        }
                        println!();
                    }

                    for warning in &warnings {
                        output::warning(warning);
                    }

                    if passed {
                        output::success("Validation passed");
                    } else {
                        println!(
                            "{} with {} error(s)",
                            style("✗ Validation failed").red().bold(),
                            errors.len()
                        );
                    }
                }
            }
        }

        if !passed {
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }

        Ok(())
    }
}

fn check_publish_settings(
    config: &Config,
    base_dir: &Path,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let publish = &config.publish;

    if publish.application_id.is_none() {
        warnings.push("publish.application_id is not set, pass --app-id".to_string());
    }

    if publish.artifacts.is_empty() {
        warnings.push("publish.artifacts is empty, pass build files on the command line".to_string());
    }
    for path in publish.artifact_paths(base_dir) {
        if let Err(e) = Artifact::from_path(path) {
            errors.push(format!("Artifact: {}", e));
        }
    }

    match publish.resolve_release_notes(base_dir) {
        Ok(Some(notes)) => {
            if let Err(e) = validate_release_notes(&notes) {
                errors.push(format!("Release notes: {}", e));
            }
        }
        Ok(None) => {}
        Err(e) => errors.push(format!("Release notes: {}", e)),
    }

    if publish.publish_type == PublishType::Delayed {
        let resolved = resolve_release_time(
            publish.publish_type,
            publish.release_time.as_deref(),
            SystemClock.now(),
        );
        if let ReleaseTime::Defaulted { value, reason } = resolved {
            warnings.push(format!("{}, {} will be used", reason, value));
        }
    }
}

fn print_settings(config: &Config) {
    let publish = &config.publish;
    output::info("Effective settings");
    println!(
        "{}",
        output::key_value(
            "Application",
            publish.application_id.as_deref().unwrap_or("-")
        )
    );
    println!("{}", output::key_value("Publish type", &publish.publish_type.to_string()));
    println!(
        "{}",
        output::key_value("Services type", &publish.mobile_services_type.to_string())
    );
    println!(
        "{}",
        output::key_value("Priority", &publish.priority_update.to_string())
    );
    println!("{}", output::key_value("API", &config.api.base_url));
    println!(
        "{}",
        output::key_value(
            "Stale draft recoveries",
            &config.api.max_stale_draft_recoveries.to_string()
        )
    );
}
