//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_cache_adapter::JsonCacheAdapter;
use crate::adapters::svg_chart::SvgChartAdapter;
use crate::domain::bias_model::{BiasModel, CacheOrigin};
use crate::domain::error::BiasError;
use crate::domain::indicator::bias::{bias_with_rank, BiasRankRow};
use crate::domain::settings::{build_settings, validate_settings, BiasSettings};
use crate::ports::cache_port::CachePort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

pub const DEFAULT_DATA_DIR: &str = "data/bars";

#[derive(Parser, Debug)]
#[command(name = "biasrank", about = "Moving-average bias percentile ranker")]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by every command. Flags override values from `--config`.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    pub symbol: Option<String>,
    #[arg(long, global = true)]
    pub frequency: Option<String>,
    #[arg(long, global = true)]
    pub hist_count: Option<usize>,
    #[arg(long, global = true)]
    pub short: Option<usize>,
    #[arg(long, global = true)]
    pub long: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the signed percentile rank of the current (or given) bias
    Rank {
        #[arg(long, allow_hyphen_values = true)]
        bias: Option<f64>,
    },
    /// Print the bias of the latest bar
    Bias,
    /// Render the price vs. rank diagnostic chart as SVG
    Plot {
        #[arg(short, long, default_value = "bias_diagnostic.svg")]
        output: PathBuf,
    },
    /// Write the bias table with self-referential ranks as CSV ("-" for stdout)
    Series {
        #[arg(short, long, default_value = "-")]
        output: String,
    },
    /// Show where the distribution is cached and how large it is
    Info,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute(cli: Cli) -> Result<(), BiasError> {
    let config = load_config(&cli.source)?;
    let settings = resolve_settings(&config)?;
    let data = open_data_source(&config)?;

    match cli.command {
        Command::Rank { bias } => {
            let model = open_model(data, &settings)?;
            println!("{:.4}", model.rank_now(bias)?);
        }
        Command::Bias => {
            let model = open_model(data, &settings)?;
            println!("{:.6}", model.current_bias()?);
        }
        Command::Plot { output } => {
            let model = open_model(data, &settings)?;
            let rows = model.render_diagnostic(&SvgChartAdapter, &output)?;
            eprintln!("Plotted {} bars to {}", rows.len(), output.display());
        }
        Command::Series { output } => {
            let bars = data.fetch_bars(&settings.symbol, &settings.frequency, settings.hist_count)?;
            let rows = bias_with_rank(&bars, settings.short_window, settings.long_window);
            if output == "-" {
                write_series(io::stdout().lock(), &rows)?;
            } else {
                write_series(File::create(Path::new(&output))?, &rows)?;
                eprintln!("Wrote {} rows to {}", rows.len(), output);
            }
        }
        Command::Info => {
            let cache = JsonCacheAdapter::new(settings.cache_dir.clone());
            let path = cache.path_for(&settings.cache_key());
            let model = BiasModel::open(data, &cache, settings)?;
            print_info(&model, &path);
        }
    }
    Ok(())
}

pub fn load_config(args: &SourceArgs) -> Result<FileConfigAdapter, BiasError> {
    let mut config = match &args.config {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)?
        }
        None => FileConfigAdapter::empty(),
    };

    if let Some(dir) = &args.data_dir {
        config.set("data", "dir", dir.display().to_string());
    }
    if let Some(dir) = &args.cache_dir {
        config.set("cache", "dir", dir.display().to_string());
    }
    if let Some(symbol) = &args.symbol {
        config.set("bias", "symbol", symbol.clone());
    }
    if let Some(frequency) = &args.frequency {
        config.set("bias", "frequency", frequency.clone());
    }
    if let Some(n) = args.hist_count {
        config.set("bias", "hist_count", n.to_string());
    }
    if let Some(n) = args.short {
        config.set("bias", "short_window", n.to_string());
    }
    if let Some(n) = args.long {
        config.set("bias", "long_window", n.to_string());
    }
    Ok(config)
}

pub fn resolve_settings(config: &dyn ConfigPort) -> Result<BiasSettings, BiasError> {
    let settings = build_settings(config)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Build the data adapter and run its one-time session setup.
pub fn open_data_source(config: &dyn ConfigPort) -> Result<CsvAdapter, BiasError> {
    let dir = config
        .get_string("data", "dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    let adapter = CsvAdapter::new(PathBuf::from(dir));
    adapter.authenticate()?;
    Ok(adapter)
}

pub fn open_model<D: DataPort>(
    data: D,
    settings: &BiasSettings,
) -> Result<BiasModel<D>, BiasError> {
    let cache = JsonCacheAdapter::new(settings.cache_dir.clone());
    BiasModel::open(data, &cache, settings.clone())
}

pub fn write_series<W: io::Write>(writer: W, rows: &[BiasRankRow]) -> Result<(), BiasError> {
    let csv_err = |e: csv::Error| BiasError::Io(io::Error::other(e));
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["datetime", "close", "short_ma", "long_ma", "bias", "rank"])
        .map_err(csv_err)?;

    let cell = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    for row in rows {
        wtr.write_record([
            row.time.format("%Y-%m-%d %H:%M:%S").to_string(),
            row.close.to_string(),
            cell(row.short_ma),
            cell(row.long_ma),
            cell(row.bias),
            cell(row.rank),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

fn print_info<D: DataPort>(model: &BiasModel<D>, path: &Path) {
    let dist = model.distribution();
    println!("key:      {}", model.cache_key());
    println!("cache:    {}", path.display());
    println!(
        "origin:   {}",
        match model.cache_origin() {
            CacheOrigin::Loaded => "loaded from disk",
            CacheOrigin::Built => "built from history",
        }
    );
    println!("positive: {}", dist.positive.len());
    println!("negative: {}", dist.negative.len());
    if let Some(reason) = model.load_log() {
        println!("previous cache rejected: {}", reason);
    }
}
