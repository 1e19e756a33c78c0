use std::sync::Arc;

use anyhow::Context;
use paper_trader_core::errors::CoreError;
use paper_trader_core::models::event::SessionEvent;
use paper_trader_core::models::settings::Settings;
use paper_trader_core::PaperTrader;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};

mod commands;
mod telemetry;

use commands::{Command, ExportFormat, HELP};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing("info")?;

    let settings = Settings::from_env();
    info!("Price feed: {}", settings.feed_base_url);
    info!("Refresh interval: {}s", settings.refresh_interval_secs);

    let trader = Arc::new(PaperTrader::with_coingecko(settings).context("invalid settings")?);
    tokio::spawn(print_events(trader.subscribe()));
    trader
        .start_price_sync()
        .context("failed to start price refresh")?;

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match Command::parse(&line) {
            Ok(c) => c,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        // Chart loads run in the background so a slow feed never blocks trading.
        if let Command::Chart { symbol } = &command {
            let trader = Arc::clone(&trader);
            let symbol = symbol.clone();
            tokio::spawn(async move {
                match trader.show_chart(&symbol).await {
                    Ok(series) => print_chart(&series),
                    Err(CoreError::Superseded(_)) => {}
                    Err(e) => println!("could not load chart: {e}"),
                }
            });
            continue;
        }
        run(&trader, command).await;
    }

    trader.stop_price_sync();
    info!("session closed");
    Ok(())
}

async fn run(trader: &PaperTrader, command: Command) {
    match command {
        Command::Buy { symbol, quantity } => report_trade(trader.buy_input(&symbol, &quantity)),
        Command::Sell { symbol, quantity } => report_trade(trader.sell_input(&symbol, &quantity)),
        Command::HideChart => trader.hide_chart(),
        Command::Status => print_status(trader),
        Command::History => {
            let history = trader.history();
            if history.is_empty() {
                println!("no trades yet");
            }
            for tx in history {
                println!("{tx}");
            }
        }
        Command::Refresh => {
            if let Err(e) = trader.refresh_now().await {
                println!("refresh failed, keeping previous prices: {e}");
            } else {
                print_status(trader);
            }
        }
        Command::Export { format } => match format {
            ExportFormat::Json => match trader.export_history_json() {
                Ok(json) => println!("{json}"),
                Err(e) => println!("export failed: {e}"),
            },
            ExportFormat::Csv => print!("{}", trader.export_history_csv()),
        },
        Command::Help => println!("{HELP}"),
        Command::Chart { .. } | Command::Quit => {}
    }
}

fn report_trade(result: Result<paper_trader_core::models::transaction::Transaction, CoreError>) {
    match result {
        Ok(tx) => println!("{}", tx.description()),
        Err(e) if e.is_trade_rejection() => println!("rejected: {e}"),
        Err(e) => println!("error: {e}"),
    }
}

fn print_status(trader: &PaperTrader) {
    let snapshot = trader.ledger_snapshot();
    println!("{:<10} {:>14} {:>14} {:>14}", "coin", "price", "held", "value");
    for line in &snapshot.holdings {
        let price = line
            .price
            .map(|p| format!("{p:.4}"))
            .unwrap_or_else(|| "—".to_string());
        println!(
            "{:<10} {:>14} {:>14.4} {:>14.2}",
            line.symbol, price, line.quantity, line.value_usd
        );
    }
    println!("cash  {:.2} USD", snapshot.cash_usd);
    println!("total {:.2} USD", snapshot.total_value);
}

fn print_chart(series: &paper_trader_core::models::chart::ChartSeries) {
    println!("{} — last 24h ({} samples)", series.asset, series.points.len());
    if let Some(last) = series.latest_price() {
        println!("last {last:.4} USD");
    }
    if let Some((lo, hi)) = series.price_range() {
        println!("low {lo:.4}  high {hi:.4}");
    }
    if let Some(change) = series.change_percent() {
        println!("change {change:+.2}%");
    }
}

async fn print_events(mut rx: broadcast::Receiver<SessionEvent>) {
    loop {
        match rx.recv().await {
            Ok(SessionEvent::RefreshFailed { message }) => {
                warn!("price refresh failed: {message}");
            }
            Ok(SessionEvent::PricesRefreshed(report)) if report.is_partial() => {
                warn!("no fresh quote for {:?}, showing last known price", report.missing);
            }
            Ok(SessionEvent::ChartFailed { symbol, message }) => {
                warn!("chart for {symbol} unavailable: {message}");
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(n)) => warn!("missed {n} session events"),
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
