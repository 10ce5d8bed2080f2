use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use candlescope::params::{ExtractionParams, IndicatorParams, ParamMeta, Parameterized};
use candlescope::prelude::*;
use candlescope::report::{self, Payload};

#[derive(Parser)]
#[command(name = "candlescope")]
#[command(about = "Technical reading of a candlestick chart screenshot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract candles from a chart image and print the analysis
    Analyze {
        /// Chart image (PNG, JPEG, ...)
        image: PathBuf,

        /// Asset label (e.g., "BTCUSDT")
        #[arg(short, long)]
        symbol: String,

        /// Timeframe label (e.g., "1h", "4h", "1d")
        #[arg(short, long)]
        timeframe: String,

        /// Seed the body direction coin flip
        #[arg(long)]
        seed: Option<u64>,

        /// How the open/close end of each body is chosen
        #[arg(long, value_enum, default_value_t = DirectionArg::Random)]
        direction: DirectionArg,

        /// Print the JSON payload instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// List tunable parameters with defaults and ranges
    Params,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Random,
    /// Every body opens at the bottom edge
    Bullish,
    /// Every body opens at the top edge
    Bearish,
    /// Follow the vertical movement between neighbouring bodies
    Slope,
}

impl From<DirectionArg> for DirectionPolicy {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Random => DirectionPolicy::Random,
            DirectionArg::Bullish => DirectionPolicy::Fixed(BodyOrientation::OpenAtBottom),
            DirectionArg::Bearish => DirectionPolicy::Fixed(BodyOrientation::OpenAtTop),
            DirectionArg::Slope => DirectionPolicy::Slope,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            image,
            symbol,
            timeframe,
            seed,
            direction,
            json,
        } => {
            let mut builder = AnalyzerBuilder::new().direction(direction.into());
            if let Some(seed) = seed {
                builder = builder.seed(seed);
            }
            let analyzer = builder.build().context("invalid analyzer configuration")?;

            let analysis = analyzer
                .analyze_path(&image, &symbol, &timeframe)
                .with_context(|| format!("failed to analyze {}", image.display()))?;

            if json {
                let payload = Payload::from(&analysis);
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}", report::render(&analysis));
            }
        }
        Commands::Params => {
            print_section::<ExtractionParams>();
            println!();
            print_section::<IndicatorParams>();
        }
    }

    Ok(())
}

fn print_section<P: Parameterized>() {
    println!("[{}]", P::section());
    for meta in P::param_meta() {
        print_meta(meta);
    }
}

fn print_meta(meta: &ParamMeta) {
    let (min, max, step) = meta.range;
    println!(
        "  {:<22} {:>8} {:<10} [{}, {}] step {}  {}",
        meta.name,
        meta.default,
        format!("{:?}", meta.param_type),
        min,
        max,
        step,
        meta.description
    );
}
