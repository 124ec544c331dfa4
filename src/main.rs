use clap::Parser;
use quake_map::core::ConfigProvider;
use quake_map::utils::error::ErrorSeverity;
use quake_map::utils::{logger, validation::Validate};
use quake_map::{CliArgs, HttpFeedSource, LocalStorage, MapConfig, MapEngine, QuakeMapPipeline};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting quake-map");
    if let Some(path) = &args.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    if args.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if args.dry_run {
        display_config_summary(&config);
        return Ok(());
    }

    let monitor_enabled = config.monitoring_enabled();
    let source = HttpFeedSource::new(Duration::from_secs(config.timeout_seconds()))?;
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = QuakeMapPipeline::new(storage, source, config);
    let engine = MapEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Map written to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "Map build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
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

    Ok(())
}

fn display_config_summary(config: &MapConfig) {
    println!("🔍 Dry run, nothing will be downloaded");
    println!("  Earthquakes: {}", config.earthquakes_url());
    println!("  Plates:      {}", config.plates_url());
    println!("  Timeout:     {}s", config.timeout_seconds());
    println!("  On failure:  {:?}", config.failure_policy());

    let view = config.view_settings();
    println!(
        "  View:        center {:?}, zoom {}, plates {}",
        view.center,
        view.zoom,
        if view.plates_visible { "shown" } else { "hidden" }
    );

    println!("  Base layers:");
    // Templates are shown unresolved so the access token stays out of the terminal
    for layer in &config.base_layers {
        let marker = if layer.name == view.default_base_layer { "*" } else { " " };
        println!("   {} {:<12} {}", marker, layer.name, layer.url_template);
    }

    println!("  Output:      {}/{}", config.output_path(), config.html_filename());
    if let Some(csv) = config.csv_filename() {
        println!("  CSV export:  {}/{}", config.output_path(), csv);
    }
}
