use chrono::Local;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use nsc_autofire::autofire::AutoFirer;
use nsc_autofire::config::AutofireConfig;
use nsc_autofire::controller::{Action, Event};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Reads "<action> <value>" lines from stdin, runs them through the autofire stage
/// and logs every event that comes out the other end.
#[derive(Parser, Debug)]
#[command(name = "nsc-autofire", about = "Autofire stage for controller input")]
struct Args {
    /// Tick interval in milliseconds
    #[arg(short = 't', long = "tick")]
    tick: Option<u64>,

    /// Default autofire interval in milliseconds
    #[arg(short = 'i', long = "default-autofire-interval")]
    default_autofire_interval: Option<u64>,

    /// Path to the TOML config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Enable autofire with the default interval for a button (repeatable)
    #[arg(short = 'a', long = "autofire")]
    autofire: Vec<Action>,
}

impl Args {
    fn apply_to(&self, config: &mut AutofireConfig) {
        if let Some(tick) = self.tick {
            config.tick_interval_ms = tick;
        }
        if let Some(interval) = self.default_autofire_interval {
            config.default_autofire_interval_ms = interval;
        }
        for action in &self.autofire {
            config.enable_default(*action);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;
    let args = Args::parse();

    let mut config = AutofireConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;
    debug!("Effective config: {:?}", config);

    let (output_sender, output_receiver) = mpsc::unbounded_channel();
    let printer = tokio::spawn(log_forwarded_events(output_receiver));

    let auto_firer = AutoFirer::new(output_sender, Some(config.auto_firer_settings()));
    config.apply(&auto_firer)?;
    auto_firer.run()?;

    info!("Reading events from stdin, one \"<action> <value>\" per line");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Event>() {
                    Ok(event) => auto_firer.consume(&event),
                    Err(e) => warn!("Skipping input line: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    auto_firer.close().await?;
    // Dropping the stage drops the output sender and ends the printer
    drop(auto_firer);
    printer
        .await
        .map_err(|e| eyre!("Event printer panicked: {}", e))?;
    Ok(())
}

async fn log_forwarded_events(mut receiver: mpsc::UnboundedReceiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!("{} -> {}", Local::now().format("%H:%M:%S.%3f"), event);
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    setup_logging();
    Ok(())
}

fn setup_logging() {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
