use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use smc_checklist::candle_source::load_candles_file;
use smc_checklist::config::{self, DetectorParams};
use smc_checklist::{
    analyze_symbol, compute_session_levels, detect_choch, detect_engulfing, detect_fvg, detect_order_block,
    detect_trend_bias, tag_sessions, BybitSource, Candle, CandleSource, FileSource, Timeframe,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Session levels and smart-money checklist over OHLC candles")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SourceKind {
    /// CSV/JSON files named SYMBOL_TF in the data directory
    File,
    /// Bybit public linear klines
    Bybit,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the D1/H4/H1/M15/M5 checklist for a symbol
    Analyze {
        #[arg(short, long)]
        symbol: String,
        #[arg(long, value_enum, default_value = "file")]
        source: SourceKind,
        /// Directory used by the file source
        #[arg(long, env = "SMC_DATA_DIR")]
        data_dir: Option<PathBuf>,
    },
    /// Print candles for one symbol and timeframe
    Fetch {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "M5")]
        timeframe: Timeframe,
        /// Defaults to the timeframe's usual bar count
        #[arg(short, long)]
        bars: Option<usize>,
        #[arg(long, value_enum, default_value = "file")]
        source: SourceKind,
        #[arg(long, env = "SMC_DATA_DIR")]
        data_dir: Option<PathBuf>,
    },
    /// Tag candles from a file with sessions and compute session levels
    Sessions {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Run the structure detectors over a single candle file
    Scan {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(long, default_value_t = config::ORDER_BLOCK_LOOKBACK)]
        lookback: usize,
        #[arg(long, default_value_t = config::MACRO_THRESHOLD)]
        macro_threshold: usize,
        #[arg(long, default_value_t = config::FVG_LOOKBACK)]
        fvg_lookback: usize,
    },
}

fn file_source(data_dir: Option<PathBuf>) -> FileSource {
    FileSource::new(data_dir.unwrap_or_else(|| PathBuf::from(config::data_dir())))
}

async fn fetch_from(
    kind: SourceKind,
    data_dir: Option<PathBuf>,
    symbol: &str,
    timeframe: Timeframe,
    bars: usize,
) -> Result<Vec<Candle>, Box<dyn std::error::Error>> {
    let candles = match kind {
        SourceKind::File => file_source(data_dir).fetch_candles(symbol, timeframe, bars).await?,
        SourceKind::Bybit => BybitSource::new()?.fetch_candles(symbol, timeframe, bars).await?,
    };
    Ok(candles)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Analyze { symbol, source, data_dir } => {
            let p = DetectorParams::default();
            let report = match source {
                SourceKind::File => analyze_symbol(&file_source(data_dir), &symbol, &p).await?,
                SourceKind::Bybit => analyze_symbol(&BybitSource::new()?, &symbol, &p).await?,
            };
            log::info!("[{}] checklist ready — bias {}", symbol, report.htf_bias);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Fetch { symbol, timeframe, bars, source, data_dir } => {
            let bars = bars.unwrap_or_else(|| config::default_bars(timeframe));
            let candles = fetch_from(source, data_dir, &symbol, timeframe, bars).await?;
            let out = serde_json::json!({
                "symbol":    symbol,
                "timeframe": timeframe,
                "ohlc":      candles,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }

        Command::Sessions { file } => {
            let candles = load_candles_file(&file).await?;
            let tagged = tag_sessions(&candles)?;
            let levels = compute_session_levels(&tagged);
            log::info!("{:?}: {} candles across {} sessions", file, tagged.len(), levels.len());
            let out = serde_json::json!({
                "candles":        tagged,
                "session_levels": levels,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }

        Command::Scan { file, lookback, macro_threshold, fvg_lookback } => {
            let p = config::params(lookback, macro_threshold, fvg_lookback);
            let candles = load_candles_file(&file).await?;
            log::info!("{:?}: scanning {} candles ({:?})", file, candles.len(), p);

            let order_blocks = detect_order_block(&candles, p.ob_lookback, p.macro_threshold);
            let choch = detect_choch(&candles, p.macro_threshold);
            let out = serde_json::json!({
                "order_block":        order_blocks,
                "latest_order_block": order_blocks.as_ref().and_then(|o| o.most_recent()),
                "fvg":                detect_fvg(&candles, p.fvg_lookback),
                "choch":              choch,
                "engulfing":          detect_engulfing(&candles),
                "trend_bias":         detect_trend_bias(&candles),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}
