//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - loads settings (defaults, `.env`, `RELC_*` variables, then flags)
//! - builds the requested model and prints reports/plots
//! - writes optional exports

use chrono::Utc;
use clap::Parser;
use tracing::debug;

use crate::cli::{BinomialArgs, Command, OcArgs, OutputArgs, PlotArgs, PlotFunction, WeibullArgs};
use crate::config::Settings;
use crate::domain::{CurveFile, params};
use crate::error::{AppError, ModelResult};
use crate::logging::LogTarget;
use crate::models::{BinomialModel, OcCurve, WeibullFunction, WeibullModel};

pub mod session;

pub use session::{ModelEvent, ModelObserver, Session};

/// Entry point for the `relc` binary.
pub fn run() -> Result<(), AppError> {
    // `relc` with no subcommand (or only global flags) opens the TUI.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let target = match (&cli.command, cli.log_file.as_deref()) {
        (_, Some(path)) => LogTarget::File(path),
        (Command::Tui, None) => LogTarget::Off,
        _ => LogTarget::Stderr,
    };
    crate::logging::init(target, cli.verbose)?;

    let settings = Settings::from_env()?;
    debug!(?settings, "settings loaded");

    match cli.command {
        Command::Binomial(args) => handle_binomial(args, settings),
        Command::Weibull(args) => handle_weibull(args, settings),
        Command::Oc(args) => handle_oc(args, settings),
        Command::Plot(args) => handle_plot(args),
        Command::Tui => crate::tui::run(settings),
    }
}

fn handle_binomial(args: BinomialArgs, settings: Settings) -> Result<(), AppError> {
    let settings = apply_binomial_args(&args, settings)?;
    let model = BinomialModel::new(settings.binomial)?;

    println!("{}", crate::report::format_binomial_summary(&model));
    if let Some(text) = &args.exactly {
        let k = params::parse_integer("failure count", text)?;
        let k = u32::try_from(k)
            .ok()
            .filter(|&k| k <= model.sample_size())
            .ok_or_else(|| {
                crate::error::ModelError::invalid(
                    "failure count",
                    k as f64,
                    format!("must be within [0, {}]", model.sample_size()),
                )
            })?;
        println!(
            "{}",
            crate::report::format_exactly(k, model.sample_size(), model.p_fail())
        );
    }

    if args.output.show_plot() {
        println!(
            "{}",
            crate::plot::render_binomial(&model, args.output.width, args.output.height)
        );
    }

    write_exports(&args.output, &crate::io::binomial_curve(&model, Utc::now()))
}

fn handle_weibull(args: WeibullArgs, settings: Settings) -> Result<(), AppError> {
    let settings = apply_weibull_args(&args, settings)?;
    let model = WeibullModel::new(settings.weibull)?;

    let check = crate::report::weibull_area_check(model.series())?;
    println!("{}", crate::report::format_weibull_summary(&model, &check));

    if args.output.show_plot() {
        let function = match args.function {
            PlotFunction::Cdf => WeibullFunction::Cdf,
            PlotFunction::Pdf => WeibullFunction::Pdf,
            PlotFunction::Hazard => WeibullFunction::Hazard,
        };
        println!(
            "{}",
            crate::plot::render_weibull(&model, function, args.output.width, args.output.height)
        );
    }

    write_exports(&args.output, &crate::io::weibull_curve(&model, Utc::now()))
}

fn handle_oc(args: OcArgs, settings: Settings) -> Result<(), AppError> {
    let settings = apply_oc_args(&args, settings)?;
    let curve = OcCurve::new(settings.oc)?;

    let report = crate::report::oc_limit_report(&curve);
    println!("{}", crate::report::format_oc_summary(&curve, &report));

    if args.output.show_plot() {
        println!(
            "{}",
            crate::plot::render_oc(&curve, args.output.width, args.output.height)
        );
    }

    write_exports(&args.output, &crate::io::oc_curve(&curve, Utc::now()))
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::read_curve_json(&args.curve)?;
    println!(
        "{}",
        crate::plot::render_curve_file(&curve, args.width, args.height)
    );
    Ok(())
}

fn write_exports(output: &OutputArgs, curve: &CurveFile) -> Result<(), AppError> {
    if let Some(path) = &output.export {
        crate::io::write_curve_csv(path, curve)?;
    }
    if let Some(path) = &output.export_curve {
        crate::io::write_curve_json(path, curve)?;
    }
    Ok(())
}

/// Flag text overrides the environment; every value passes the same checks.
pub fn apply_binomial_args(args: &BinomialArgs, mut s: Settings) -> ModelResult<Settings> {
    if let Some(text) = &args.n {
        s.binomial.sample_size = params::parse_sample_size(text, s.binomial.max_sample_size)?;
    }
    if let Some(text) = &args.p {
        s.binomial.p_fail = params::parse_probability("probability of failure", text)?;
    }
    Ok(s)
}

pub fn apply_weibull_args(args: &WeibullArgs, mut s: Settings) -> ModelResult<Settings> {
    if let Some(text) = &args.m {
        s.weibull.shape = params::parse_positive("shape parameter", text)?;
    }
    if let Some(text) = &args.c {
        s.weibull.scale = params::parse_positive("scale parameter", text)?;
    }
    if let Some(text) = &args.t_start {
        s.weibull.t_start = params::parse_positive("t start", text)?;
    }
    if let Some(text) = &args.t_end {
        s.weibull.t_end = params::parse_positive("t end", text)?;
    }
    if let Some(text) = &args.t_count {
        s.weibull.t_count = params::parse_grid_count("t count", text)?;
    }
    s.validate()?;
    Ok(s)
}

pub fn apply_oc_args(args: &OcArgs, mut s: Settings) -> ModelResult<Settings> {
    if let Some(text) = &args.n {
        s.oc.sample_size = params::parse_sample_size(text, s.oc.max_sample_size)?;
    }
    if let Some(text) = &args.k {
        s.oc.acceptance_number = params::parse_acceptance_number(text, s.oc.sample_size)?;
    }
    if let Some(text) = &args.alpha {
        s.oc.alpha = params::parse_probability("alpha", text)?;
    }
    if let Some(text) = &args.beta {
        s.oc.beta = params::parse_probability("beta", text)?;
    }
    if let Some(text) = &args.p_end {
        s.oc.p_end = params::parse_probability("p end", text)?;
    }
    if let Some(text) = &args.p_step {
        s.oc.p_step = params::parse_positive("p step", text)?;
    }
    s.validate()?;
    Ok(s)
}

/// Rewrite argv so `relc` defaults to `relc tui`.
///
/// Rules:
/// - `relc`                      -> `relc tui`
/// - `relc -v --log-file x`      -> `relc -v --log-file x tui` (globals only)
/// - `relc --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let has_subcommand = argv
        .iter()
        .skip(1)
        .any(|a| matches!(a.as_str(), "binomial" | "weibull" | "oc" | "plot" | "tui"));
    if !has_subcommand && arg1.starts_with('-') {
        argv.push("tui".to_string());
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::error::ModelError;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["relc"])), argv(&["relc", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["relc", "-v", "--log-file", "x.log"])),
            argv(&["relc", "-v", "--log-file", "x.log", "tui"])
        );
        assert_eq!(rewrite_args(argv(&["relc", "--help"])), argv(&["relc", "--help"]));
        assert_eq!(rewrite_args(argv(&["relc", "-v", "oc"])), argv(&["relc", "-v", "oc"]));
    }

    fn oc_args(extra: &[&str]) -> OcArgs {
        let mut all = vec!["relc", "oc"];
        all.extend_from_slice(extra);
        match Cli::parse_from(all).command {
            Command::Oc(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn oc_flags_override_settings() {
        let s = apply_oc_args(&oc_args(&["--n", "150", "--k", "2", "--alpha", "0.1"]), Settings::default()).unwrap();
        assert_eq!(s.oc.sample_size, 150);
        assert_eq!(s.oc.acceptance_number, 2);
        assert_eq!(s.oc.alpha, 0.1);
        assert_eq!(s.oc.beta, 0.10);
    }

    #[test]
    fn oc_flags_reject_bad_text() {
        let err = apply_oc_args(&oc_args(&["--k", "three"]), Settings::default()).unwrap_err();
        assert!(matches!(err, ModelError::Parse { name: "acceptance number", .. }));
        assert!(apply_oc_args(&oc_args(&["--n", "3"]), Settings::default()).is_err());
        assert!(apply_oc_args(&oc_args(&["--n", "3", "--k", "2"]), Settings::default()).is_ok());
        assert!(apply_oc_args(&oc_args(&["--n", "3", "--k", "3"]), Settings::default()).is_err());
        assert!(apply_oc_args(&oc_args(&["--alpha", "2"]), Settings::default()).is_err());
    }

    #[test]
    fn weibull_range_is_cross_checked() {
        let args = match Cli::parse_from(["relc", "weibull", "--t-start", "3", "--t-end", "1"]).command {
            Command::Weibull(args) => args,
            _ => unreachable!(),
        };
        assert!(apply_weibull_args(&args, Settings::default()).is_err());
    }

    #[test]
    fn tiny_p_step_is_rejected_before_allocation() {
        let err = apply_oc_args(&oc_args(&["--p-step", "1e-300"]), Settings::default()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { name: "p step", .. }));
        assert!(apply_oc_args(&oc_args(&["--p-step", "1e-12"]), Settings::default()).is_err());
        assert!(apply_oc_args(&oc_args(&["--p-step", "0.0005"]), Settings::default()).is_ok());

        let args = match Cli::parse_from(["relc", "weibull", "--t-count", "4000000000"]).command {
            Command::Weibull(args) => args,
            _ => unreachable!(),
        };
        assert!(apply_weibull_args(&args, Settings::default()).is_err());
    }

    #[test]
    fn binomial_flags_override_settings() {
        let args = match Cli::parse_from(["relc", "binomial", "--n", "20", "--p", "0.1"]).command {
            Command::Binomial(args) => args,
            _ => unreachable!(),
        };
        let s = apply_binomial_args(&args, Settings::default()).unwrap();
        assert_eq!(s.binomial.sample_size, 20);
        assert_eq!(s.binomial.p_fail, 0.1);
    }
}
