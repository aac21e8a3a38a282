//! TradeGate CLI — evaluate one symbol, scan a universe, read sentiment.
//!
//! Commands:
//! - `evaluate` — run one evaluation cycle and print the decision
//! - `scan` — classify a universe into BUY / WATCH / AVOID
//! - `sentiment` — bucket a PCR reading or an option chain CSV
//! - `watchlist` — print today's deterministic watchlist for an index
//! - `session` — report whether the exchange session is open

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tradegate_core::domain::TradeDirection;
use tradegate_core::evaluation::{evaluate, Evaluation, EvaluationContext};
use tradegate_core::provider::{MarketDataProvider, SentimentProvider};
use tradegate_core::sentiment::read_sentiment;
use tradegate_core::universe::{daily_watchlist, Universe};
use tradegate_runner::{
    load_option_chain, write_report, CsvMarketData, OpportunityScanner, ScanReport, ScanResult,
    SyntheticMarketData, TradegateConfig,
};

const DEFAULT_CONFIG: &str = "tradegate.toml";

#[derive(Parser)]
#[command(
    name = "tradegate",
    about = "TradeGate CLI — rule-based intraday trade eligibility"
)]
struct Cli {
    /// Config file. Defaults to ./tradegate.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Long,
    Short,
}

impl From<DirectionArg> for TradeDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Long => TradeDirection::Long,
            DirectionArg::Short => TradeDirection::Short,
        }
    }
}

/// Where market data comes from.
#[derive(clap::Args)]
struct DataArgs {
    /// Directory of <SYMBOL>.csv candle files (and optional quotes.csv).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Use deterministic synthetic sessions instead of real data.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Candles per synthetic session.
    #[arg(long, default_value_t = 60)]
    candles: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one evaluation cycle for a symbol.
    Evaluate {
        /// Symbol to evaluate (e.g., RELIANCE).
        #[arg(long)]
        symbol: String,

        /// Force a direction instead of deriving it from the strategy.
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,

        /// Override the provider's PCR reading.
        #[arg(long)]
        pcr: Option<f64>,

        /// Print the full evaluation as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        data: DataArgs,
    },
    /// Scan a universe and classify every symbol.
    Scan {
        /// Index to scan (overrides [scan].index).
        #[arg(long)]
        index: Option<String>,

        /// Explicit symbols (override the index).
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Only scan today's deterministic watchlist of this size.
        #[arg(long)]
        watchlist: Option<usize>,

        /// Scan even when the exchange session is closed.
        #[arg(long, default_value_t = false)]
        ignore_session: bool,

        /// Evaluate symbols one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Write the report to a .json or .csv file.
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        data: DataArgs,
    },
    /// Bucket a PCR reading, or compute it from an option chain CSV.
    Sentiment {
        /// Raw put/call ratio.
        #[arg(long, conflicts_with = "chain")]
        pcr: Option<f64>,

        /// Option chain CSV (strike,ce_oi,pe_oi,ce_oi_change,pe_oi_change).
        #[arg(long)]
        chain: Option<PathBuf>,

        /// Spot price; restricts the chain to the ATM region.
        #[arg(long, requires = "chain")]
        spot: Option<f64>,

        /// Strike step for ATM rounding.
        #[arg(long, default_value_t = 50.0)]
        step: f64,

        /// Strikes on each side of ATM.
        #[arg(long, default_value_t = 5)]
        width: usize,
    },
    /// Print the deterministic daily watchlist for an index.
    Watchlist {
        #[arg(long)]
        index: Option<String>,

        #[arg(long, default_value_t = 5)]
        size: usize,

        /// Date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Report whether the exchange session is open.
    Session,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Evaluate {
            symbol,
            direction,
            pcr,
            json,
            data,
        } => run_evaluate(&config, &symbol, direction.map(Into::into), pcr, json, &data),
        Commands::Scan {
            index,
            symbols,
            watchlist,
            ignore_session,
            sequential,
            output,
            data,
        } => run_scan(
            &config,
            ScanArgs {
                index,
                symbols,
                watchlist,
                ignore_session,
                sequential,
                output,
            },
            &data,
        ),
        Commands::Sentiment {
            pcr,
            chain,
            spot,
            step,
            width,
        } => run_sentiment(&config, pcr, chain.as_deref(), spot, step, width),
        Commands::Watchlist { index, size, date } => {
            run_watchlist(&config, index.as_deref(), size, date.as_deref())
        }
        Commands::Session => {
            let status = config.session.status(Utc::now());
            println!("Session: {status}");
            Ok(())
        }
    }
}

/// Logs go to stderr so JSON on stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<TradegateConfig> {
    match path {
        Some(path) => TradegateConfig::load(path)
            .with_context(|| format!("loading {}", path.display())),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            TradegateConfig::load(Path::new(DEFAULT_CONFIG))
                .with_context(|| format!("loading {DEFAULT_CONFIG}"))
        }
        None => Ok(TradegateConfig::default()),
    }
}

fn load_universe(config: &TradegateConfig) -> Result<Universe> {
    match &config.scan.universe_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading universe {}", path.display()))?;
            Ok(Universe::from_toml(&content)?)
        }
        None => Ok(Universe::default_nse()),
    }
}

/// Market data and sentiment come from the same source.
enum DataSource {
    Csv(CsvMarketData),
    Synthetic(SyntheticMarketData),
}

impl DataSource {
    fn market(&self) -> &dyn MarketDataProvider {
        match self {
            Self::Csv(data) => data,
            Self::Synthetic(data) => data,
        }
    }

    fn sentiment(&self) -> &dyn SentimentProvider {
        match self {
            Self::Csv(data) => data,
            Self::Synthetic(data) => data,
        }
    }
}

fn open_data(config: &TradegateConfig, args: &DataArgs) -> Result<DataSource> {
    if args.synthetic {
        warn!("using synthetic market data; results are for demonstration only");
        let date = config.session.local_time(Utc::now()).date();
        return Ok(DataSource::Synthetic(SyntheticMarketData::new(
            date,
            args.candles,
            config.engine.candle_interval_minutes,
        )));
    }
    let Some(dir) = args.data_dir.as_ref().or(config.scan.data_dir.as_ref()) else {
        bail!("no market data source: pass --data-dir, set [scan].data_dir, or use --synthetic");
    };
    let data = CsvMarketData::open(dir.clone())
        .with_context(|| format!("opening data directory {}", dir.display()))?;
    Ok(DataSource::Csv(data))
}

fn run_evaluate(
    config: &TradegateConfig,
    symbol: &str,
    direction: Option<TradeDirection>,
    pcr: Option<f64>,
    json: bool,
    data: &DataArgs,
) -> Result<()> {
    let source = open_data(config, data)?;
    let snapshot = source.market().snapshot(symbol)?;
    let pcr = pcr.or_else(|| source.sentiment().pcr(symbol));

    let ctx = EvaluationContext {
        config: &config.engine,
        profile: &config.risk,
        day: &config.day,
    };
    let evaluation = match evaluate(&snapshot, pcr, direction, &ctx) {
        Ok(evaluation) => evaluation,
        Err(err) if err.is_pending() => {
            println!("{symbol}: indicators pending ({err})");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        print_evaluation(&evaluation);
    }
    Ok(())
}

fn print_evaluation(e: &Evaluation) {
    let d = &e.decision;
    let ind = &e.indicators;
    println!("\n=== {} @ {:.2} ({} {}) ===", e.symbol, e.price, e.strategy, e.direction);
    println!(
        "VWAP {:.2} | ORB {:.2}-{:.2} | trend {:?} | volume {}",
        ind.vwap, ind.orb_low, ind.orb_high, ind.trend, ind.volume
    );
    println!("Support:    {:?}", d.levels.support);
    println!("Resistance: {:?}", d.levels.resistance);
    match e.sentiment.pcr {
        Some(pcr) => println!("Sentiment:  {:?} (PCR {pcr:.2})", e.sentiment.label),
        None => println!("Sentiment:  unavailable"),
    }
    let setup = &e.setup;
    println!(
        "Setup:      entry {:.2} stop {:.2} target {:.2} qty {}",
        setup.entry, setup.stop, setup.target, setup.quantity
    );
    println!("Risk:       {:.2} ({})", e.risk.trade_risk, e.risk.code);
    println!("Confidence: {} ({})", d.confidence.score, d.confidence.label);
    for reason in &d.confidence.reasons {
        println!("  - {reason}");
    }
    for warning in &d.warnings {
        println!("  ! {warning}");
    }
    println!(
        "Decision:   {} — {}",
        if d.allowed { "ALLOWED" } else { "BLOCKED" },
        d.reason
    );
    println!("Audit:      {}", d.fingerprint());
}

struct ScanArgs {
    index: Option<String>,
    symbols: Vec<String>,
    watchlist: Option<usize>,
    ignore_session: bool,
    sequential: bool,
    output: Option<PathBuf>,
}

fn run_scan(config: &TradegateConfig, args: ScanArgs, data: &DataArgs) -> Result<()> {
    let status = config.session.status(Utc::now());
    if !status.is_open() && !args.ignore_session && !data.synthetic {
        bail!("market is {status}; pass --ignore-session to scan anyway");
    }

    let mut symbols = if !args.symbols.is_empty() {
        args.symbols
    } else if !config.scan.symbols.is_empty() {
        config.scan.symbols.clone()
    } else {
        let universe = load_universe(config)?;
        let index = args.index.unwrap_or_else(|| config.scan.index.clone());
        match universe.index(&index) {
            Some(list) => list.to_vec(),
            None => bail!(
                "unknown index '{index}'. Known: {}",
                universe.index_names().join(", ")
            ),
        }
    };
    if let Some(size) = args.watchlist.or(config.scan.watchlist_size) {
        let today = config.session.local_time(Utc::now()).date();
        symbols = daily_watchlist(&symbols, today, size);
    }

    let source = open_data(config, data)?;
    let mut options = config.scan.options();
    if args.sequential {
        options.parallel = false;
    }
    let scanner = OpportunityScanner::new(
        &config.engine,
        &config.risk,
        &config.day,
        source.market(),
        source.sentiment(),
        options,
    )?;
    let results = scanner.scan(&symbols);
    print_scan(&results);

    if let Some(path) = args.output {
        let report = ScanReport::new(source.market().name(), results);
        write_report(&path, &report)?;
        info!(path = %path.display(), "scan report written");
    }
    Ok(())
}

fn print_scan(results: &[ScanResult]) {
    println!("\n{:<12} {:<6} {:<6} {:>5}  REASON", "SYMBOL", "CLASS", "DIR", "SCORE");
    for r in results {
        let direction = r.direction.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{:<12} {:<6} {:<6} {:>5}  {}",
            r.symbol, r.classification, direction, r.decision.confidence.score, r.decision.reason
        );
    }
}

fn run_sentiment(
    config: &TradegateConfig,
    pcr: Option<f64>,
    chain: Option<&Path>,
    spot: Option<f64>,
    step: f64,
    width: usize,
) -> Result<()> {
    let thresholds = &config.engine.sentiment;
    match (pcr, chain) {
        (Some(pcr), _) => {
            let reading = read_sentiment(Some(pcr), thresholds);
            println!("PCR {pcr:.2} → {:?}", reading.label);
        }
        (None, Some(path)) => {
            let mut chain = load_option_chain(path)?;
            if let Some(spot) = spot {
                let (region, atm) = chain.atm_region(spot, step, width);
                println!("ATM strike {atm:.0} ({} strikes in region)", region.strikes.len());
                chain = region;
            }
            let reading = chain.sentiment(thresholds);
            match reading.pcr {
                Some(pcr) => println!("PCR {pcr:.2} → {:?}", reading.label),
                None => println!("PCR unavailable (no call open interest) → NEUTRAL"),
            }
            println!("Flow: {:?}", chain.flow());
        }
        (None, None) => bail!("pass --pcr or --chain"),
    }
    Ok(())
}

fn run_watchlist(
    config: &TradegateConfig,
    index: Option<&str>,
    size: usize,
    date: Option<&str>,
) -> Result<()> {
    let universe = load_universe(config)?;
    let index = index.unwrap_or(&config.scan.index);
    let Some(symbols) = universe.index(index) else {
        bail!(
            "unknown index '{index}'. Known: {}",
            universe.index_names().join(", ")
        );
    };
    let date = match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")?,
        None => config.session.local_time(Utc::now()).date(),
    };

    println!("Watchlist for {index} on {date}:");
    for symbol in daily_watchlist(symbols, date, size) {
        println!("  {symbol}");
    }
    Ok(())
}
