//! Portfolio Architect CLI — optimize, diagnose, and preset commands.
//!
//! Commands:
//! - `optimize` — submit a portfolio to the optimization service and print the results
//! - `diagnose` — classify a regime from a lookback and shrinkage without calling the service
//! - `presets list|show|save|delete` — manage the saved portfolio presets

mod report;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use architect_client::export::{write_comparison_csv, write_result_json};
use architect_client::{submit_blocking, ClientConfig, HttpOptimizer};
use architect_core::request::parse_tickers;
use architect_core::{
    classify_regime, AlignmentPolicy, Completion, FileBackend, LeverageMode, PortfolioConfig,
    PresetStore, ViewController,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "architect",
    about = "Portfolio Architect CLI — strategy optimization against the portfolio service"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to the user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a portfolio and print the diagnosis and per-strategy metrics.
    Optimize {
        #[command(flatten)]
        portfolio: PortfolioArgs,

        /// Fail instead of tolerating series with missing dates.
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Write the merged growth-of-100 comparison table as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the full service response as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Classify a market regime from a lookback and a shrinkage intensity.
    Diagnose {
        /// Lookback window in trading days.
        #[arg(long)]
        lookback: u32,

        /// Covariance shrinkage intensity in [0, 1].
        #[arg(long)]
        shrinkage: f64,
    },
    /// Saved preset management.
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand)]
enum PresetAction {
    /// List saved presets with their index.
    List,
    /// Print one preset as JSON.
    Show { index: usize },
    /// Save the given configuration under a name.
    Save {
        name: String,

        #[command(flatten)]
        portfolio: PortfolioArgs,
    },
    /// Delete the preset at an index.
    Delete { index: usize },
}

#[derive(Args, Debug, Clone)]
struct PortfolioArgs {
    /// Comma-separated tickers (e.g. "VTI, TLT, GLD").
    #[arg(long, default_value = "VTI, TLT, GLD, VNQ")]
    tickers: String,

    /// Minimum weight per asset, percent.
    #[arg(long, default_value_t = 0.0)]
    min: f64,

    /// Maximum weight per asset, percent.
    #[arg(long, default_value_t = 100.0)]
    max: f64,

    /// Leverage target; 0 disables leverage.
    #[arg(long, default_value_t = 0.0)]
    target: f64,

    /// Leverage target mode: volatility or var.
    #[arg(long, default_value = "volatility")]
    mode: LeverageMode,
}

impl PortfolioArgs {
    fn to_config(&self) -> PortfolioConfig {
        PortfolioConfig {
            tickers: parse_tickers(&self.tickers),
            min_weight: self.min,
            max_weight: self.max,
            leverage_target_value: self.target,
            leverage_target_mode: self.mode,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Optimize {
            portfolio,
            strict,
            csv,
            json,
        } => run_optimize(&config, &portfolio, strict, csv.as_deref(), json.as_deref()),
        Commands::Diagnose {
            lookback,
            shrinkage,
        } => run_diagnose(lookback, shrinkage),
        Commands::Presets { action } => {
            let store = PresetStore::open(FileBackend::in_dir(config.resolved_presets_dir()));
            match action {
                PresetAction::List => {
                    print!("{}", report::preset_list(&store.presets()));
                    Ok(())
                }
                PresetAction::Show { index } => run_preset_show(&store, index),
                PresetAction::Save { name, portfolio } => {
                    let saved = store.save(&name, &portfolio.to_config())?;
                    println!("Saved preset '{}' ({} total).", saved.name, store.len());
                    Ok(())
                }
                PresetAction::Delete { index } => {
                    let removed = store.delete_at(index)?;
                    println!("Deleted preset '{}' ({} left).", removed.name, store.len());
                    Ok(())
                }
            }
        }
    }
}

/// Log to stderr so stdout stays clean for the report.
fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_optimize(
    config: &ClientConfig,
    portfolio: &PortfolioArgs,
    strict: bool,
    csv: Option<&Path>,
    json: Option<&Path>,
) -> Result<()> {
    let policy = if strict {
        AlignmentPolicy::Strict
    } else {
        config.alignment
    };
    let service = HttpOptimizer::new(config)?;
    let mut view = ViewController::new(policy);
    let portfolio = portfolio.to_config();
    tracing::debug!(?policy, tickers = portfolio.tickers.len(), "starting optimization");

    println!(
        "Optimizing {} tickers against {}...",
        portfolio.tickers.len(),
        service.endpoint()
    );
    match submit_blocking(&mut view, &service, &portfolio)? {
        Completion::Applied => {}
        Completion::Stale => bail!("response superseded by a newer request"),
    }

    let Some(result) = view.result() else {
        bail!("service returned no result");
    };
    if let Some(diagnosis) = view.diagnosis() {
        print!("\n{}", report::diagnosis(diagnosis));
    }
    print!(
        "{}",
        report::result(
            result,
            view.diagnosis().map(|d| d.recommended),
            (portfolio.min_weight, portfolio.max_weight),
        )
    );

    if let Some(err) = view.merge_error() {
        eprintln!("\nComparison chart unavailable: {err}");
    }

    if let Some(path) = json {
        write_result_json(path, result)?;
        println!("\nResponse written to {}", path.display());
    }
    if let Some(path) = csv {
        match (view.comparison(), view.merge_error()) {
            (Some(table), _) => {
                write_comparison_csv(path, table)?;
                println!(
                    "Comparison ({} dates) written to {}",
                    table.rows.len(),
                    path.display()
                );
            }
            (None, Some(err)) => bail!("cannot export comparison: {err}"),
            (None, None) => bail!("cannot export comparison: no merged table"),
        }
    }

    Ok(())
}

fn run_diagnose(lookback: u32, shrinkage: f64) -> Result<()> {
    if !shrinkage.is_finite() {
        bail!("shrinkage must be a finite number");
    }
    print!("{}", report::diagnosis(&classify_regime(lookback, shrinkage)));
    Ok(())
}

fn run_preset_show(store: &PresetStore, index: usize) -> Result<()> {
    let Some(preset) = store.get(index) else {
        bail!("no preset at index {index} ({} saved)", store.len());
    };
    let text = serde_json::to_string_pretty(&preset).context("failed to encode preset")?;
    println!("{text}");
    Ok(())
}
