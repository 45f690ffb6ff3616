use clap::Parser;
use foundation_contributions::core::ConfigProvider;
use foundation_contributions::utils::error::{ContributionError, ErrorSeverity};
use foundation_contributions::utils::{logger, validation::Validate};
use foundation_contributions::{
    aggregate_completed_orders, CliConfig, ContributionPipeline, InMemoryCatalog, LocalStorage,
    ReportEngine, TomlConfig, ViewContext, ViewRegistry, ViewRequest,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入 TOML 配置 (若有指定)
    let toml_config = match cli.config.as_deref() {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => None,
    };

    // 初始化日誌
    let verbose = cli.verbose || toml_config.as_ref().is_some_and(|c| c.verbose());
    if cli.json_logs || toml_config.as_ref().is_some_and(|c| c.json_logs()) {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting foundation-contributions");
    tracing::debug!("CLI config: {:?}", cli);

    let result = match toml_config {
        Some(config) => run(config, &cli).await,
        None => run(cli.clone(), &cli).await,
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Contribution report failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run<C: ConfigProvider + Validate>(config: C, cli: &CliConfig) -> Result<(), ContributionError> {
    config.validate()?;
    tracing::info!("✅ Configuration validated");

    match cli.view.as_deref() {
        Some(tag) => render_view(&config, tag, cli).await,
        None => {
            let storage = LocalStorage::new(".".to_string());
            let engine = ReportEngine::new(ContributionPipeline::new(storage, config));
            let output_path = engine.run().await?;

            println!("✅ Contribution report completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
    }
}

async fn render_view<C: ConfigProvider>(
    config: &C,
    tag: &str,
    cli: &CliConfig,
) -> Result<(), ContributionError> {
    use foundation_contributions::domain::ports::Storage;

    let storage = LocalStorage::new(".".to_string());
    let data = storage.read_file(config.snapshot_path()).await?;
    let catalog = InMemoryCatalog::from_json_slice(&data)?;
    let aggregate = aggregate_completed_orders(&catalog, config.minor_units())?;

    let ctx = ViewContext {
        aggregate: &aggregate,
        catalog: &catalog,
    };
    let request = ViewRequest {
        product_id: cli.product_id(),
        foundation_id: cli.foundation_id(),
        key: cli.key.clone(),
    };

    let output = ViewRegistry::with_defaults().render(tag, &ctx, &request)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
