use clap::Parser;
use prayer_clock::app::runner::{self, local_now};
use prayer_clock::utils::error::{ErrorSeverity, PrayerError};
use prayer_clock::utils::{logger, validation::validate_provider};
use prayer_clock::{CliConfig, ConfigProvider, TickOutcome, TomlConfig};

fn exit_code(e: &PrayerError) -> i32 {
    match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: PrayerError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(&e));
}

fn load_config(cli: &CliConfig) -> Result<Box<dyn ConfigProvider>, PrayerError> {
    match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let mut config = TomlConfig::from_file(path)?;
            config.apply_cli_overrides(cli);
            if let Some(name) = config.location_name() {
                tracing::info!("📍 Location: {}", name);
            }
            Ok(Box::new(config))
        }
        None => Ok(Box::new(cli.clone())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting prayer-clock");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = load_config(&cli).unwrap_or_else(|e| fail(e));

    // 驗證配置
    if let Err(e) = validate_provider(config.as_ref()) {
        fail(e);
    }

    tracing::info!(
        "✅ Location {:.4}, {:.4} (method {}), cache in {}",
        config.latitude(),
        config.longitude(),
        config.calculation_method(),
        config.cache_dir()
    );

    let mut scheduler =
        match runner::build_scheduler(config.as_ref(), runner::terminal_display(), local_now()).await {
            Ok(scheduler) => scheduler,
            Err(e) => fail(e),
        };
    scheduler.on_startup();

    if cli.once {
        match scheduler.tick(local_now()).await {
            Ok(TickOutcome::Ready(report)) => {
                println!();
                println!("{}", report.remaining.describe(report.next.prayer()));
            }
            Ok(TickOutcome::Waiting { .. }) => {}
            Err(e) => fail(e),
        }
        return Ok(());
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    runner::run(&mut scheduler, config.poll_interval(), shutdown).await;
    println!();
    Ok(())
}
