use clap::Parser;
use contract_ignition::config::{Command, RunArgs, RunSettings};
use contract_ignition::domain::ports::Storage;
use contract_ignition::modules::register_builtin;
use contract_ignition::utils::error::{ErrorSeverity, Result};
use contract_ignition::utils::{logger, validation::Validate};
use contract_ignition::{
    CliConfig, DeploymentConfig, DeploymentEngine, DryRunExecutor, ExecutionPlan,
    FsArtifactResolver, LocalStorage, ModuleRegistry, Planner,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Deployment command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: CliConfig) -> Result<()> {
    let file_config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = DeploymentConfig::from_file(path)?;
            config.validate()?;
            Some(config)
        }
        None => None,
    };

    let registry = build_registry(file_config.as_ref())?;

    match &cli.command {
        Command::List => {
            for name in registry.names() {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Plan(args) => {
            let settings = args.settings(file_config.as_ref());
            settings.validate()?;
            let plan = build_plan(&registry, args, &settings)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print!("{}", plan.render());
            }

            if let Some(output) = &settings.output_path {
                let storage = LocalStorage::new(output);
                let path = format!("chain-{}/plan.json", settings.chain_id);
                storage
                    .write_file(&path, serde_json::to_string_pretty(&plan)?.as_bytes())
                    .await?;
                tracing::info!("📁 Plan saved to: {}/{}", output, path);
            }
            Ok(())
        }
        Command::DryRun(args) => {
            let settings = args.settings(file_config.as_ref());
            settings.validate()?;
            let plan = build_plan(&registry, args, &settings)?;

            tracing::info!("🔍 DRY RUN MODE - no transaction will be sent");
            let engine = DeploymentEngine::new(DryRunExecutor::new()).with_chain_id(settings.chain_id);
            let report = engine.run(&plan).await?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("✅ Dry run of {} completed", report.module_id);
                for (name, address) in &report.results {
                    println!("  {} => {}", name, address);
                }
            }

            if let Some(output) = &settings.output_path {
                let storage = LocalStorage::new(output);
                let dir = format!("chain-{}", settings.chain_id);
                storage
                    .write_file(
                        &format!("{}/deployed_addresses.json", dir),
                        serde_json::to_string_pretty(&report.deployed_addresses())?.as_bytes(),
                    )
                    .await?;
                storage
                    .write_file(
                        &format!("{}/report.json", dir),
                        serde_json::to_string_pretty(&report)?.as_bytes(),
                    )
                    .await?;
                tracing::info!("📁 Dry run output saved to: {}/{}", output, dir);
            }
            Ok(())
        }
    }
}

fn build_registry(file_config: Option<&DeploymentConfig>) -> Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    register_builtin(&mut registry)?;

    if let Some(config) = file_config {
        for module in config.modules()? {
            registry.register(module)?;
        }
    }

    Ok(registry)
}

fn build_plan(
    registry: &ModuleRegistry,
    args: &RunArgs,
    settings: &RunSettings,
) -> Result<ExecutionPlan> {
    let module = registry.require(&args.module)?;
    tracing::info!("📦 Artifacts directory: {}", settings.artifacts_dir);

    let planner = Planner::new(FsArtifactResolver::new(&settings.artifacts_dir));
    planner.plan(module)
}
