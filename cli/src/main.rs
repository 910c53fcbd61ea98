pub mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use common::{AppConfig, logger::init_logger};
use extractor::{ChromiumBrowser, ExtractorSettings, PageExtractor};
use monitor::{ConnectionReport, Monitor, run_connection_test, run_continuous, run_once};
use notifier::{Notifier, RetryPolicy, TelegramClient};
use tokio::sync::watch;

use cli::{Cli, Command};

/// Wires browser, Telegram client and state machine from config.
fn build_monitor(cfg: &AppConfig) -> anyhow::Result<Monitor> {
    let extractor = PageExtractor::new(Arc::new(ChromiumBrowser::default()), ExtractorSettings::default());

    let telegram = TelegramClient::new(&cfg.telegram)?;
    let notifier = Notifier::new(Arc::new(telegram), RetryPolicy::default());

    Ok(Monitor::new(Arc::new(cfg.monitor.clone()), extractor, notifier))
}

/// Flips the returned receiver to `true` on Ctrl-C.
fn spawn_shutdown_listener() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown signal received");
                let _ = tx.send(true);
            }
            Err(e) => tracing::error!(error = %e, "could not listen for ctrl-c"),
        }
    });

    rx
}

fn print_report(report: &ConnectionReport, dump_path: &std::path::Path) {
    println!();
    println!("==== connection test ====");
    match &report.extraction {
        Ok(value) => println!("extraction: PASS (${value:.2})"),
        Err(e) => {
            println!("extraction: FAIL ({e})");
            println!("  inspect {} for the rendered page", dump_path.display());
        }
    }
    if report.message_sent {
        println!("telegram:   PASS");
    } else {
        println!("telegram:   FAIL (check TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID)");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let cfg = AppConfig::from_env()?;
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    init_logger("liqwatch", json_logs);

    tracing::info!(command = ?cli.command(), asset = %cfg.monitor.asset_name, "starting liqwatch");

    let mut monitor = build_monitor(&cfg)?;

    match cli.command() {
        Command::Test => {
            let report = run_connection_test(&monitor).await;
            print_report(&report, &monitor.extractor().settings().debug_dump_path);
            Ok(ExitCode::SUCCESS)
        }
        Command::Once => {
            if run_once(&mut monitor).await {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Run => {
            let shutdown = spawn_shutdown_listener();
            run_continuous(&mut monitor, shutdown).await;
            tracing::info!("liqwatch stopped");
            Ok(ExitCode::SUCCESS)
        }
    }
}
