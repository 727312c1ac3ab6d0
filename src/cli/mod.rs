//! Command-line parsing for the reliability curve tool.
//!
//! Argument parsing and command dispatch stay separate from the models.
//! Model parameters are taken as plain text and validated by
//! `domain::params`, the same boundary the TUI uses, so both front ends
//! report identical errors.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "relc", version, about = "Binomial, Weibull and OC curves for reliability work")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Append logs to this file (the TUI logs nowhere else).
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Binomial pmf/cdf table for n trials with failure probability p.
    Binomial(BinomialArgs),
    /// Weibull pdf/cdf/hazard over a time grid.
    Weibull(WeibullArgs),
    /// OC curve of a single sampling plan with AQL/RQL.
    Oc(OcArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI (default).
    Tui,
}

/// Plot and export options shared by the model commands.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the sampled curve to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the sampled curve (with parameters) to JSON.
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,
}

impl OutputArgs {
    pub fn show_plot(&self) -> bool {
        self.plot && !self.no_plot
    }
}

#[derive(Debug, Args, Clone)]
pub struct BinomialArgs {
    /// Number of trials (sample size).
    #[arg(long, value_name = "N")]
    pub n: Option<String>,

    /// Per-trial failure probability in [0, 1].
    #[arg(long, value_name = "P")]
    pub p: Option<String>,

    /// Also print P(X = K) and P(X <= K).
    #[arg(long, value_name = "K")]
    pub exactly: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct WeibullArgs {
    /// Shape parameter m (> 0).
    #[arg(long, value_name = "M")]
    pub m: Option<String>,

    /// Scale parameter c, the characteristic life (> 0).
    #[arg(long, value_name = "C")]
    pub c: Option<String>,

    /// First time value (> 0).
    #[arg(long, value_name = "T")]
    pub t_start: Option<String>,

    /// Last time value.
    #[arg(long, value_name = "T")]
    pub t_end: Option<String>,

    /// Number of time points.
    #[arg(long, value_name = "COUNT")]
    pub t_count: Option<String>,

    /// Function to plot: cdf, pdf or hazard.
    #[arg(long, value_enum, default_value_t = PlotFunction::Cdf)]
    pub function: PlotFunction,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PlotFunction {
    Cdf,
    Pdf,
    Hazard,
}

#[derive(Debug, Args, Clone)]
pub struct OcArgs {
    /// Sample size n.
    #[arg(long, value_name = "N")]
    pub n: Option<String>,

    /// Acceptance number k (0 <= k < n).
    #[arg(long, value_name = "K")]
    pub k: Option<String>,

    /// Producer risk; AQL is the p accepted with probability 1 - alpha.
    #[arg(long, value_name = "ALPHA")]
    pub alpha: Option<String>,

    /// Consumer risk; RQL is the p accepted with probability beta.
    #[arg(long, value_name = "BETA")]
    pub beta: Option<String>,

    /// Exclusive end of the lot defect rate grid.
    #[arg(long, value_name = "P")]
    pub p_end: Option<String>,

    /// Step of the lot defect rate grid.
    #[arg(long, value_name = "STEP")]
    pub p_step: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Curve JSON file produced by `--export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
