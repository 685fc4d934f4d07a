pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

use crate::config::toml_config::{DeploymentConfig, DEFAULT_ARTIFACTS_DIR};
use crate::core::engine::DEFAULT_CHAIN_ID;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_positive_number, Validate};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "contract-ignition")]
#[command(about = "Declare, plan and dry-run smart contract deployment modules")]
pub struct CliConfig {
    /// Path to an ignition.toml deployment file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List registered modules
    List,
    /// Build and print the execution plan of a module
    Plan(RunArgs),
    /// Execute a module's plan without touching any network
    DryRun(RunArgs),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Module name, e.g. EventOrganizerModule
    pub module: String,

    /// Directory holding compiled artifacts
    #[arg(long)]
    pub artifacts: Option<String>,

    #[arg(long)]
    pub chain_id: Option<u64>,

    /// Print JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Directory where plan.json / deployed_addresses.json are written
    #[arg(long)]
    pub output: Option<String>,
}

/// 命令列與設定檔合併後的執行設定；命令列優先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub artifacts_dir: String,
    pub chain_id: u64,
    pub output_path: Option<String>,
}

impl RunSettings {
    pub fn merge(
        artifacts: Option<&str>,
        chain_id: Option<u64>,
        output: Option<&str>,
        file: Option<&DeploymentConfig>,
    ) -> Self {
        Self {
            artifacts_dir: artifacts
                .map(str::to_string)
                .or_else(|| file.map(|f| f.artifacts_dir().to_string()))
                .unwrap_or_else(|| DEFAULT_ARTIFACTS_DIR.to_string()),
            chain_id: chain_id
                .or_else(|| file.map(DeploymentConfig::chain_id))
                .unwrap_or(DEFAULT_CHAIN_ID),
            output_path: output
                .map(str::to_string)
                .or_else(|| file.and_then(|f| f.output_path().map(str::to_string))),
        }
    }
}

#[cfg(feature = "cli")]
impl RunArgs {
    pub fn settings(&self, file: Option<&DeploymentConfig>) -> RunSettings {
        RunSettings::merge(
            self.artifacts.as_deref(),
            self.chain_id,
            self.output.as_deref(),
            file,
        )
    }
}

impl Validate for RunSettings {
    fn validate(&self) -> Result<()> {
        validate_path("artifacts", &self.artifacts_dir)?;
        validate_positive_number("chain_id", self.chain_id, 1)?;
        if let Some(output) = &self.output_path {
            validate_path("output", output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = RunSettings::merge(None, None, None, None);
        assert_eq!(settings.artifacts_dir, DEFAULT_ARTIFACTS_DIR);
        assert_eq!(settings.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(settings.output_path, None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_command_line_overrides_file() {
        let file = DeploymentConfig::from_toml_str(
            "[deployment]\nname = \"x\"\nartifacts_dir = \"./out\"\nchain_id = 5\noutput_path = \"./deployments\"\n",
        )
        .unwrap();

        let from_file = RunSettings::merge(None, None, None, Some(&file));
        assert_eq!(from_file.artifacts_dir, "./out");
        assert_eq!(from_file.chain_id, 5);
        assert_eq!(from_file.output_path.as_deref(), Some("./deployments"));

        let overridden = RunSettings::merge(Some("./other"), Some(10), None, Some(&file));
        assert_eq!(overridden.artifacts_dir, "./other");
        assert_eq!(overridden.chain_id, 10);
        assert_eq!(overridden.output_path.as_deref(), Some("./deployments"));
    }

    #[test]
    fn test_zero_chain_id_is_invalid() {
        let settings = RunSettings::merge(None, Some(0), None, None);
        assert!(settings.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_parse_dry_run_command() {
        let cli = CliConfig::try_parse_from([
            "contract-ignition",
            "--verbose",
            "dry-run",
            "EventOrganizerModule",
            "--artifacts",
            "./artifacts",
            "--json",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::DryRun(args) => {
                assert_eq!(args.module, "EventOrganizerModule");
                assert_eq!(args.artifacts.as_deref(), Some("./artifacts"));
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
