//! azonwatch CLI
//!
//! Local execution entry point for watching channel feeds.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use azonwatch::{
    delivery::{LogSink, StaticSubscriptions},
    error::Result,
    models::{Config, MosqueRegistry},
    pipeline::{ChannelPoller, Fanout},
    services::{FeedClient, MosqueMatcher, extract_times},
    state::TimetableStore,
    utils::truncate,
};

/// azonwatch - Prayer timetable watcher
#[derive(Parser, Debug)]
#[command(
    name = "azonwatch",
    version,
    about = "Watches channel feeds for mosque prayer timetable changes"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "azonwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch all configured channels until interrupted
    Watch,

    /// Fetch every channel once and report matches and extractions
    Probe,

    /// Validate the configuration file
    Validate,

    /// Show configured channels, mosques and defaults
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Watch => {
            config.validate()?;
            run_watch(&config).await?;
        }

        Command::Probe => {
            config.validate()?;
            run_probe(&config).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            let registry = MosqueRegistry::from_entries(&config.mosques)?;
            FeedClient::new(&config.poller, &config.feed_selectors)?;
            log::info!(
                "Config OK: {} channels, {} mosques, {} subscriptions",
                config.channels.len(),
                registry.len(),
                config.subscriptions.len()
            );
        }

        Command::Info => {
            log::info!("Channels:");
            for channel in &config.channels {
                log::info!("  {} ({})", channel.name, channel.url);
            }
            log::info!("Mosques:");
            match MosqueRegistry::from_entries(&config.mosques) {
                Ok(registry) => {
                    for mosque in registry.mosques() {
                        log::info!(
                            "  {} \"{}\" ({} variants)",
                            mosque.id(),
                            mosque.display_name(),
                            mosque.variants().len()
                        );
                    }
                }
                Err(e) => log::error!("  registry invalid: {}", e),
            }
            log::info!(
                "Default times: {} / {} / {} / {} / {}",
                config.default_times.dawn,
                config.default_times.midday,
                config.default_times.afternoon,
                config.default_times.sunset,
                config.default_times.night
            );
        }
    }

    Ok(())
}

/// Spawn one poller per channel and run until Ctrl-C.
async fn run_watch(config: &Config) -> Result<()> {
    let registry = MosqueRegistry::from_entries(&config.mosques)?;
    let store = TimetableStore::new(&registry, &config.default_times);

    let subscriptions = StaticSubscriptions::from_entries(&config.subscriptions);
    if subscriptions.recipient_count() == 0 {
        log::warn!("No subscriptions configured; changes will only be logged");
    }
    let fanout = Fanout::new(
        Arc::new(LogSink),
        Arc::new(subscriptions),
        Duration::from_millis(config.notify.dispatch_delay_ms),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let mut handles = Vec::new();

    for channel in config.channels.clone() {
        let matcher = MosqueMatcher::new(registry.clone(), &config.matcher);
        let poller = ChannelPoller::new(channel, config, matcher, store.clone(), fanout.clone())?;
        handles.push(tokio::spawn(poller.run(shutdown_rx.clone())));
    }

    log::info!("Watching {} channels. Ctrl-C to stop.", handles.len());
    tokio::signal::ctrl_c().await?;

    log::info!("Interrupt received, stopping pollers...");
    let _ = shutdown_tx.send(true);
    for handle in handles {
        let _ = handle.await;
    }

    // Final snapshot of everything learned this run.
    for (id, timetable) in store.all().await {
        log::info!("{}: {}", id, serde_json::to_string(&timetable)?);
    }

    Ok(())
}

/// Fetch every channel once and report what would be extracted.
async fn run_probe(config: &Config) -> Result<()> {
    let registry = MosqueRegistry::from_entries(&config.mosques)?;
    let matcher = MosqueMatcher::new(registry, &config.matcher);
    let feed = FeedClient::new(&config.poller, &config.feed_selectors)?;

    for (name, result) in feed.probe_all(&config.channels).await {
        match result {
            Ok(messages) => {
                log::info!("[{}] {} recent messages", name, messages.len());
                for message in messages {
                    let mosque = matcher
                        .find(&message.text)
                        .map(|m| m.id().to_string())
                        .unwrap_or_else(|| "-".to_string());
                    let extracted = extract_times(&message.text);
                    log::info!(
                        "  {} mosque={} slots={} text={}",
                        message.id,
                        mosque,
                        extracted.populated(),
                        truncate(&message.text, 60)
                    );
                }
            }
            Err(e) => log::error!("[{}] fetch failed: {}", name, e),
        }
    }

    Ok(())
}
