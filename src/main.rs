use clap::Parser;
use ticket_sniper::app::prepare_session;
use ticket_sniper::config::cli::LogFormat;
use ticket_sniper::config::search::build_search_url;
use ticket_sniper::utils::{logger, validation::Validate};
use ticket_sniper::{BotConfig, BotError, ChromiumSession, CliArgs, TelegramNotifier, TicketPoller};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    match args.log_format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("🚀 Starting ticket-sniper");

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - browser will not be launched");
        println!("{}", build_search_url(&config.search)?);
        return Ok(());
    }

    let notifier = TelegramNotifier::new(config.notify.clone());
    if !notifier.is_configured() {
        tracing::warn!("⚠️ Telegram not configured. Success will only be logged.");
    }

    // 啟動瀏覽器：這一段的失敗是唯一的非正常結束路徑
    let mut session = match ChromiumSession::launch(&config.browser).await {
        Ok(session) => session,
        Err(e) => fail(e),
    };
    if let Err(e) = prepare_session(&mut session, &config).await {
        fail(e);
    }

    let poller = match TicketPoller::new(session, notifier, &config) {
        Ok(poller) => poller,
        Err(e) => fail(e),
    };

    let ticket = poller.run().await;

    println!("✅ Ticket reserved: {}", ticket.offer.name);
    println!("🔗 Purchase link: {}", ticket.purchase_link);
    Ok(())
}

fn load_config(args: &CliArgs) -> ticket_sniper::Result<BotConfig> {
    if let Some(path) = &args.config {
        tracing::info!("📁 Loading configuration from: {}", path);
    }

    let mut config = BotConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn display_config_summary(config: &BotConfig) {
    tracing::info!(
        "🚆 Route {} → {} on {} ({} adult, {} child, {} infant)",
        config.search.from_station,
        config.search.to_station,
        config.search.go_date,
        config.search.adult,
        config.search.child,
        config.search.infant
    );
    tracing::info!(
        "💰 Max price: {} Rials, blacklist: {:?}",
        config.acceptance.max_price,
        config.acceptance.blacklist
    );
    tracing::debug!("Timing: {:?}", config.timing);
}

fn fail(e: BotError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Severity: {:?})",
        e,
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());

    // 啟動錯誤一律以非零碼結束
    std::process::exit(e.exit_code().max(1));
}
