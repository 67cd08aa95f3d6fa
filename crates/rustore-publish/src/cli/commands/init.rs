//! Init command

use clap::Args;
use console::style;
use tracing::info;

use rustore_core::config::write_default_config;

use crate::cli::Cli;

/// Write a default rustore.toml into the working directory
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, "executing init command");
        let cwd = std::env::current_dir()?;

        let config_path = write_default_config(&cwd, self.force)?;

        if !cli.quiet {
            println!(
                "{} Created configuration at {}",
                style("✓").green().bold(),
                style(config_path.display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!("  1. Set publish.application_id in {}", config_path.display());
            println!(
                "  2. Export RUSTORE_KEY_ID, RUSTORE_TIMESTAMP and RUSTORE_SIGNATURE"
            );
            println!("  3. Run {} to verify your setup", style("rustore-publish validate").cyan());
            println!(
                "  4. Run {} to publish",
                style("rustore-publish publish app-release.aab").cyan()
            );
        }

        Ok(())
    }
}
