//! Publish command

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use rustore_api::{
    Artifact, Credentials, MobileServicesType, PublishReport, PublishRequest, PublishType,
    Publisher, RustoreClient,
};
use rustore_core::config::{validate_release_notes, Config};
use rustore_core::ConfigError;

use crate::cli::{output, Cli, OutputFormat};

/// Publish build files as a new RuStore version
#[derive(Debug, Args)]
pub struct PublishCommand {
    /// Build files (apk or aab); defaults to `publish.artifacts` from the config
    pub artifacts: Vec<PathBuf>,

    /// Application package name
    #[arg(long, env = "RUSTORE_APPLICATION_ID")]
    pub app_id: Option<String>,

    /// API key id
    #[arg(long, env = "RUSTORE_KEY_ID")]
    pub key_id: Option<String>,

    /// Timestamp the signature was computed for
    #[arg(long, env = "RUSTORE_TIMESTAMP")]
    pub timestamp: Option<String>,

    /// Signature of key id and timestamp
    #[arg(long, env = "RUSTORE_SIGNATURE", hide_env_values = true)]
    pub signature: Option<String>,

    /// Publish type (instantly, manual, delayed)
    #[arg(long)]
    pub publish_type: Option<PublishType>,

    /// Release time for delayed publishing (e.g. 2026-10-20T10:00:00+0300)
    #[arg(long)]
    pub release_time: Option<String>,

    /// "What's new" text
    #[arg(long, conflicts_with = "release_notes_file")]
    pub release_notes: Option<String>,

    /// File with the "what's new" text
    #[arg(long)]
    pub release_notes_file: Option<PathBuf>,

    /// Mobile services type of APK uploads (Unknown, HMS)
    #[arg(long)]
    pub services_type: Option<MobileServicesType>,

    /// Update priority (0-5)
    #[arg(long)]
    pub priority: Option<u8>,

    /// API host override
    #[arg(long)]
    pub base_url: Option<String>,

    /// Dry run - validate but don't publish
    #[arg(long)]
    pub dry_run: bool,
}

impl PublishCommand {
    /// Execute the publish command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(dry_run = self.dry_run, "executing publish command");
        let cwd = std::env::current_dir()?;
        let (config, _, base_dir) = cli.load_config(&cwd)?;

        let request = self.build_request(&config, &base_dir, &cwd)?;

        if !cli.quiet && cli.format == OutputFormat::Text {
            println!(
                "{} {} to RuStore ({} file(s))",
                if self.dry_run { style("Validating").yellow() } else { style("Publishing").cyan() },
                style(&request.application_id).bold(),
                request.artifacts.len()
            );
        }

        let base_url = self.base_url.clone().unwrap_or_else(|| config.api.base_url.clone());
        let client = RustoreClient::with_timeout(config.api.timeout())?
            .with_base_url(base_url)
            .with_max_stale_draft_recoveries(config.api.max_stale_draft_recoveries);
        let publisher = Publisher::new(client);

        let rt = tokio::runtime::Runtime::new()?;
        let report = rt.block_on(publisher.publish(&request))?;

        print_report(cli, &report)
    }

    /// Merge flags over the configuration into a publishing request
    pub fn build_request(
        &self,
        config: &Config,
        base_dir: &Path,
        cwd: &Path,
    ) -> anyhow::Result<PublishRequest> {
        let publish = &config.publish;

        let application_id = self
            .app_id
            .clone()
            .or_else(|| publish.application_id.clone())
            .ok_or_else(|| {
                ConfigError::MissingField("application id (--app-id or publish.application_id)".to_string())
            })?;

        let artifact_paths = if self.artifacts.is_empty() {
            publish.artifact_paths(base_dir)
        } else {
            self.artifacts.iter().map(|p| cwd.join(p)).collect()
        };
        let artifacts = artifact_paths
            .into_iter()
            .map(Artifact::from_path)
            .collect::<Result<Vec<_>, _>>()?;

        let release_notes = match (&self.release_notes, &self.release_notes_file) {
            (Some(notes), _) => Some(notes.clone()),
            (None, Some(file)) => Some(std::fs::read_to_string(cwd.join(file))?.trim_end().to_string()),
            (None, None) => publish.resolve_release_notes(base_dir)?,
        };
        if let Some(notes) = &release_notes {
            validate_release_notes(notes)?;
        }

        let credentials = self.credentials()?;

        Ok(PublishRequest {
            credentials,
            application_id,
            publish_type: self.publish_type.unwrap_or(publish.publish_type),
            release_time: self.release_time.clone().or_else(|| publish.release_time.clone()),
            release_notes,
            artifacts,
            mobile_services_type: self.services_type.unwrap_or(publish.mobile_services_type),
            priority_update: self.priority.unwrap_or(publish.priority_update),
            dry_run: self.dry_run,
        })
    }

    fn credentials(&self) -> Result<Credentials, ConfigError> {
        let required = |value: &Option<String>, name: &str| -> Result<String, ConfigError> {
            match value {
                Some(v) => Ok(v.clone()),
                None if self.dry_run => Ok(String::new()),
                None => Err(ConfigError::MissingField(name.to_string())),
            }
        };

        Ok(Credentials {
            key_id: required(&self.key_id, "key id (--key-id or RUSTORE_KEY_ID)")?,
            timestamp: required(&self.timestamp, "timestamp (--timestamp or RUSTORE_TIMESTAMP)")?,
            signature: required(&self.signature, "signature (--signature or RUSTORE_SIGNATURE)")?,
        })
    }
}

fn print_report(cli: &Cli, report: &PublishReport) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => {
            if cli.quiet {
                return Ok(());
            }
            if report.dry_run {
                output::success("Dry run passed, nothing was sent");
            } else {
                output::success("Published to RuStore");
            }
            if let Some(version_id) = report.version_id {
                println!("{}", output::key_value("Version", &style(version_id).cyan().to_string()));
            }
            println!("{}", output::key_value("Publish type", &report.publish_type));
            if let Some(release_time) = &report.release_time {
                println!("{}", output::key_value("Release time", release_time));
            }
            for file in &report.uploaded {
                println!("{}", output::key_value("Uploaded", file));
            }
            println!("{}", output::key_value("Stage", &report.stage.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn command() -> PublishCommand {
        PublishCommand {
            artifacts: Vec::new(),
            app_id: None,
            key_id: Some("42".to_string()),
            timestamp: Some("2026-10-16T12:00:00+03:00".to_string()),
            signature: Some("sig".to_string()),
            publish_type: None,
            release_time: None,
            release_notes: None,
            release_notes_file: None,
            services_type: None,
            priority: None,
            base_url: None,
            dry_run: false,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("cli.aab"), b"aab").unwrap();

        let mut config = Config::default();
        config.publish.application_id = Some("ru.from.config".to_string());
        config.publish.priority_update = 1;
        config.publish.release_notes = Some("from config".to_string());

        let mut cmd = command();
        cmd.artifacts = vec![PathBuf::from("cli.aab")];
        cmd.app_id = Some("ru.from.cli".to_string());
        cmd.priority = Some(4);
        cmd.publish_type = Some(PublishType::Delayed);
        cmd.release_notes = Some("from cli".to_string());

        let request = cmd.build_request(&config, temp.path(), temp.path()).unwrap();
        assert_eq!(request.application_id, "ru.from.cli");
        assert_eq!(request.priority_update, 4);
        assert_eq!(request.publish_type, PublishType::Delayed);
        assert_eq!(request.release_notes.as_deref(), Some("from cli"));
        assert_eq!(request.artifacts.len(), 1);
    }

    #[test]
    fn test_config_artifacts_and_notes_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("app.apk"), b"apk").unwrap();
        std::fs::write(temp.path().join("whatsnew.txt"), "New icons\n").unwrap();

        let mut config = Config::default();
        config.publish.application_id = Some("ru.example.app".to_string());
        config.publish.artifacts = vec![PathBuf::from("app.apk")];
        config.publish.release_notes_file = Some(PathBuf::from("whatsnew.txt"));
        config.publish.mobile_services_type = MobileServicesType::Hms;

        let request = command()
            .build_request(&config, temp.path(), Path::new("/elsewhere"))
            .unwrap();
        assert_eq!(request.release_notes.as_deref(), Some("New icons"));
        assert_eq!(request.mobile_services_type, MobileServicesType::Hms);
        assert_eq!(request.artifacts[0].path, temp.path().join("app.apk"));
    }

    #[test]
    fn test_missing_application_id() {
        let temp = TempDir::new().unwrap();
        let err = command()
            .build_request(&Config::default(), temp.path(), temp.path())
            .unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_missing_credentials_allowed_on_dry_run_only() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("app.apk"), b"apk").unwrap();

        let mut config = Config::default();
        config.publish.application_id = Some("ru.example.app".to_string());
        config.publish.artifacts = vec![PathBuf::from("app.apk")];

        let mut cmd = command();
        cmd.signature = None;
        let err = cmd.build_request(&config, temp.path(), temp.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingField(_))
        ));

        cmd.dry_run = true;
        assert!(cmd.build_request(&config, temp.path(), temp.path()).is_ok());
    }

    #[test]
    fn test_unsupported_artifact() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("app.ipa"), b"ipa").unwrap();

        let mut cmd = command();
        cmd.app_id = Some("ru.example.app".to_string());
        cmd.artifacts = vec![PathBuf::from("app.ipa")];

        let err = cmd
            .build_request(&Config::default(), temp.path(), temp.path())
            .unwrap_err();
        assert!(err.downcast_ref::<rustore_api::PublishError>().is_some());
    }
}
