use clap::Parser;
use frame_ingest::composition::{resolve, Registry};
use frame_ingest::utils::error::{ErrorSeverity, IngestError};
use frame_ingest::utils::logger;
use frame_ingest::CliConfig;

fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting frame-ingest CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config) {
        tracing::error!(
            "❌ Ingestion failed: {} (Stage: {:?}, Severity: {:?})",
            e,
            e.stage(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e);
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

fn run(config: &CliConfig) -> Result<(), IngestError> {
    let registry = Registry::builtin();

    if config.list {
        print_registry(&registry);
        return Ok(());
    }

    let environment = config.load_environment()?;
    tracing::info!("🔧 {}", environment);

    let resolved = resolve(&registry, &environment)?;

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched or written");
        println!("Environment: {}", environment.name());
        println!("  source:      {}", environment.source());
        println!("  transformer: {}", environment.transformer());
        println!("  storage:     {} ({})", environment.storage(), resolved.storage_kind().tag());
        println!("  destination: {}", resolved.storage_config());
        return Ok(());
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = resolved.instantiate(config.monitor)?;
    engine.execute()?;

    tracing::info!("✅ Ingestion completed successfully!");
    println!("✅ Ingestion completed successfully!");
    println!("📁 Output saved to: {}", resolved.storage_config());
    Ok(())
}

fn print_registry(registry: &Registry) {
    println!("Sources:");
    for reference in registry.sources() {
        println!("  {}", reference);
    }
    println!("Transformers:");
    for reference in registry.transformers() {
        println!("  {}", reference);
    }
    println!("Storages:");
    for (reference, kind) in registry.storages() {
        println!("  {} [{}]", reference, kind);
    }
}
