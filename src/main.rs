//! Ladder Hedge - Main Entry Point
//!
//! Command line front end: fetches the spot anchor and a ladder event, then
//! prints the recommended delta-neutral orders.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ladder_hedge::config::load_with_dotenv;
use ladder_hedge::service::infer_asset;
use ladder_hedge::strategy::{simulate_pair, OneSidedPolicy, PairPosition};
use ladder_hedge::{
    AnalysisRequest, AppConfig, Asset, BinanceRestClient, LadderAnalysis, PolymarketWebClient,
    SnapshotService,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend orders for one ladder event
    Analyze(AnalyzeArgs),
    /// Print the current spot price of an asset
    Price {
        #[arg(long)]
        asset: Asset,
    },
    /// Value a YES/NO pair across a price grid around the anchor
    Scenario(ScenarioArgs),
    /// List active ladder events
    Events {
        /// Comma-separated assets (BTC,ETH,SOL,XRP)
        #[arg(long, value_delimiter = ',', default_value = "BTC,ETH,SOL,XRP")]
        assets: Vec<Asset>,
        /// Bypass page caches
        #[arg(long)]
        refresh: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct AnalyzeArgs {
    /// Event slug, as in https://polymarket.com/event/<slug>
    #[arg(long)]
    slug: String,
    /// Underlying asset; inferred from the slug when omitted
    #[arg(long)]
    asset: Option<Asset>,
    #[arg(long)]
    budget: Option<Decimal>,
    /// -1 (all downside) to 1 (all upside)
    #[arg(long, allow_hyphen_values = true)]
    bias: Option<Decimal>,
    #[arg(long)]
    risk_cap: Option<Decimal>,
    #[arg(long)]
    fee_rate: Option<Decimal>,
    #[arg(long)]
    slippage: Option<Decimal>,
    #[arg(long)]
    beta: Option<Decimal>,
    /// Days to resolution; defaults to the event end date
    #[arg(long)]
    days: Option<Decimal>,
    /// Accept events with strikes on one side of the anchor only
    #[arg(long)]
    allow_one_sided: bool,
    /// Bypass page caches
    #[arg(long)]
    refresh: bool,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(ClapArgs, Debug)]
struct ScenarioArgs {
    /// Underlying price to center the grid on
    #[arg(long)]
    anchor: Decimal,
    #[arg(long)]
    yes_strike: Decimal,
    #[arg(long)]
    yes_price: Decimal,
    #[arg(long, default_value_t = 0)]
    yes_units: u64,
    #[arg(long)]
    no_strike: Decimal,
    #[arg(long)]
    no_price: Decimal,
    #[arg(long, default_value_t = 0)]
    no_units: u64,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let config = load_with_dotenv(Some(&args.config)).context("Failed to load configuration")?;

    // Initialize logging
    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.settings.log_level.clone());
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Configuration file: {}", args.config);

    let timeout = Duration::from_secs(config.settings.request_timeout_seconds);
    let binance = BinanceRestClient::with_timeout(&config.binance.rest_url, timeout)?;
    let polymarket = PolymarketWebClient::from_config(&config.polymarket, timeout)?;

    match args.command {
        Command::Analyze(analyze) => run_analyze(&config, binance, polymarket, analyze).await,
        Command::Scenario(scenario) => {
            print_scenario(scenario)?;
            Ok(())
        }
        Command::Price { asset } => {
            let price = binance.get_asset_price(asset).await?;
            println!("{} {}", asset, price);
            Ok(())
        }
        Command::Events {
            assets,
            refresh,
            json,
        } => {
            let events = polymarket.get_crypto_events(&assets, refresh).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                for event in &events {
                    println!(
                        "{:<4} {:>8} {:>3} markets  {}  ({})",
                        event.asset,
                        event.volume.as_deref().unwrap_or("-"),
                        event.num_markets,
                        event.title,
                        event.slug
                    );
                }
            }
            Ok(())
        }
    }
}

async fn run_analyze(
    config: &AppConfig,
    binance: BinanceRestClient,
    polymarket: PolymarketWebClient,
    args: AnalyzeArgs,
) -> Result<()> {
    let asset = match args.asset {
        Some(asset) => asset,
        None => infer_asset(&args.slug)
            .with_context(|| format!("Cannot infer asset from slug {}; pass --asset", args.slug))?,
    };

    let defaults = &config.strategy;
    let mut params = defaults.to_parameters();
    if let Some(budget) = args.budget {
        params.budget = budget;
        params.risk_cap = defaults.risk_cap.unwrap_or(budget);
    }
    if let Some(risk_cap) = args.risk_cap {
        params.risk_cap = risk_cap;
    }
    if let Some(bias) = args.bias {
        params.bias = bias;
    }
    if let Some(fee_rate) = args.fee_rate {
        params.fee_rate = fee_rate;
    }
    if let Some(slippage) = args.slippage {
        params.slippage = slippage;
    }
    if let Some(beta) = args.beta {
        params.beta = beta;
    }
    if args.allow_one_sided {
        params.one_sided = OneSidedPolicy::AllowFlagged;
    }

    let service = SnapshotService::new(binance, polymarket);
    let mut request = AnalysisRequest::new(asset, args.slug, params);
    request.days_override = args.days;
    request.force_refresh = args.refresh;
    request.highlight_min_pnl = defaults.highlight_min_pnl;

    let analysis = service.analyze(request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis);
    }
    Ok(())
}

fn print_analysis(analysis: &LadderAnalysis) {
    let summary = &analysis.allocation.summary;

    println!("{}", analysis.event.title);
    println!(
        "Anchor: {} {} ({})",
        analysis.asset, analysis.snapshot.anchor, analysis.price_venue
    );
    println!(
        "Budget: {}  Risk cap: {}  Bias: {}  Days: {}",
        analysis.parameters.budget,
        analysis.parameters.risk_cap,
        analysis.parameters.bias,
        analysis.parameters.days_to_resolution.round_dp(2)
    );
    println!();
    println!(
        "{:>12} {:>4} {:>8} {:>10} {:>8} {:>12} {:>12}",
        "Strike", "Side", "Units", "Unit cost", "Limit", "Cost", "Max profit"
    );
    for order in &analysis.allocation.orders {
        println!(
            "{:>12} {:>4} {:>8} {:>10} {:>8} {:>12} {:>12}",
            order.strike_price_level,
            order.side,
            order.units,
            order.unit_cost.round_dp(4),
            order.limit_price.round_dp(4),
            order.total_cost.round_dp(2),
            order.max_profit.round_dp(2)
        );
    }
    println!();
    println!(
        "Total cost: {}  Remaining: {}",
        summary.total_cost.round_dp(2),
        summary.remaining_budget.round_dp(2)
    );
    println!(
        "Upside: {}  Downside: {}  Neutral: {}",
        summary.upside_cost.round_dp(2),
        summary.downside_cost.round_dp(2),
        summary.neutral
    );
    println!(
        "Worst-case loss: {}  Max profit: {}  Expected value: {}",
        summary.worst_case_loss.round_dp(2),
        summary.max_profit.round_dp(2),
        summary.expected_value.round_dp(2)
    );
    match summary.apy {
        Some(apy) => println!("APY: {}%", (apy * Decimal::ONE_HUNDRED).round_dp(2)),
        None => println!("APY: n/a"),
    }

    if analysis.pairs.is_empty() {
        return;
    }
    println!();
    println!(
        "{:>1} {:>12} {:>12} {:>8} {:>8} {:>8}",
        "", "NO strike", "YES strike", "Side", "Cost", "P&L"
    );
    for pair in &analysis.pairs {
        let mark = if analysis.highlights.contains(&pair.no_strike) {
            "*"
        } else {
            ""
        };
        println!(
            "{:>1} {:>12} {:>12} {:>8} {:>8} {:>8}",
            mark,
            pair.no_strike,
            pair.yes_strike,
            pair.direction,
            pair.effective_cost.round_dp(4),
            pair.pnl.round_dp(4)
        );
    }
}

fn print_scenario(args: ScenarioArgs) -> Result<()> {
    let scenario = simulate_pair(&PairPosition {
        anchor: args.anchor,
        yes_strike: args.yes_strike,
        yes_price: args.yes_price,
        yes_units: args.yes_units,
        no_strike: args.no_strike,
        no_price: args.no_price,
        no_units: args.no_units,
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scenario)?);
        return Ok(());
    }

    println!("Invested: {}", scenario.invested.round_dp(2));
    println!("{:>1} {:>12} {:>8} {:>8} {:>12}", "", "Price", "YES", "NO", "Value");
    for (i, price) in scenario.prices.iter().enumerate() {
        let mark = if i == scenario.anchor_index { "*" } else { "" };
        println!(
            "{:>1} {:>12} {:>8} {:>8} {:>12}",
            mark,
            price,
            scenario.yes_values[i].round_dp(4),
            scenario.no_values[i].round_dp(4),
            scenario.position_values[i].round_dp(2)
        );
    }
    Ok(())
}
