use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use eureka_finder::{
    SearchConfig, SearchInputs, SearchReport, deadline_from_seconds, parse_inputs, search,
    tolerance_from_precision,
};
use log::{info, warn};

/// Log level for the application
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_log_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Eureka - Find expressions over a few digits that approximate a number
#[derive(Parser, Debug)]
#[command(name = "eureka")]
#[command(
    about = "Search for an arithmetic expression over the given digits whose value is closest to an objective"
)]
#[command(version)]
pub struct CliArgs {
    /// Comma-separated operators and digits, e.g. "+,-,*,/,^,neg,sqrt,1-9"
    pub inputs: String,

    /// Value the expression should approach
    #[arg(allow_negative_numbers = true)]
    pub objective: f64,

    /// Number of correct decimal digits to aim for
    #[arg(short, long, default_value_t = 4.0)]
    pub precision: f64,

    /// Search budget in whole seconds
    #[arg(short, long, default_value_t = 15.0)]
    pub seconds: f64,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of parallel search chains (default: one per core)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Probability of perturbing the best expression instead of building a new one
    #[arg(long, default_value_t = 0.5)]
    pub perturbation_ratio: f64,

    /// Maximum number of nodes in an expression
    #[arg(long, default_value_t = 31)]
    pub max_size: usize,

    /// Stop each chain after this many iterations
    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// Also print the expression as LaTeX
    #[arg(long)]
    pub latex: bool,

    /// Log level (default: warn)
    #[arg(short, long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

/// Configuration for the CLI application
pub struct CliConfig {
    pub inputs: SearchInputs,
    pub search: SearchConfig,
    pub latex: bool,
    pub log_level: LogLevel,
}

impl CliArgs {
    /// Turn the raw arguments into a validated configuration
    pub fn into_config(self) -> Result<CliConfig> {
        let inputs = parse_inputs(&self.inputs).context("Invalid inputs")?;

        let deadline = deadline_from_seconds(self.seconds);
        if deadline == Duration::ZERO {
            bail!("Search budget must be at least one second, got {}", self.seconds);
        }

        let mut search = SearchConfig::new(
            self.objective,
            tolerance_from_precision(self.precision),
            deadline,
        )
        .with_perturbation_ratio(self.perturbation_ratio)
        .with_max_size(self.max_size);
        if let Some(seed) = self.seed {
            search = search.with_seed(seed);
        }
        if let Some(threads) = self.threads {
            search = search.with_threads(threads);
        }
        if let Some(iterations) = self.max_iterations {
            search = search.with_max_iterations(iterations);
        }
        search.validate().context("Invalid search parameters")?;

        Ok(CliConfig {
            inputs,
            search,
            latex: self.latex,
            log_level: self.log_level,
        })
    }
}

/// Parse command line arguments and return configuration
pub fn parse_args() -> Result<CliConfig> {
    CliArgs::parse().into_config()
}

/// Initialize logging based on the provided log level
pub fn init_logging(log_level: &LogLevel) -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log_level.to_log_level_filter())
        .init();
    Ok(())
}

fn print_report(report: &SearchReport, latex: bool) {
    println!("{}", report.expression);
    println!("{}", report.result);
    println!("{:e}", report.distance);
    if latex && let Some(tex) = &report.latex {
        println!("{}", tex);
    }
}

/// Run the main application logic
pub fn run() -> Result<()> {
    let config = parse_args()?;

    // Initialize logging
    init_logging(&config.log_level)?;

    info!(
        "Searching for {} within {:e} using {} digit(s) and {} operator(s)",
        config.search.objective,
        config.search.tolerance,
        config.inputs.pool().total_units(),
        config.inputs.operators().len()
    );

    let report = search(config.inputs, config.search).context("Search failed")?;
    if !report.found() {
        warn!("No valid expression found");
    } else if !report.is_exact() {
        warn!("Deadline reached before the requested precision");
    }

    print_report(&report, config.latex);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(inputs: &str, objective: f64) -> CliArgs {
        CliArgs {
            inputs: inputs.to_string(),
            objective,
            precision: 4.0,
            seconds: 15.0,
            seed: None,
            threads: None,
            perturbation_ratio: 0.5,
            max_size: 31,
            max_iterations: None,
            latex: false,
            log_level: LogLevel::Warn,
        }
    }

    #[test]
    fn test_cli_args_parsing() {
        let parsed = CliArgs::try_parse_from([
            "eureka",
            "+,-,*,/,1-9",
            "-2.5",
            "--precision",
            "6",
            "--seconds",
            "3",
            "--seed",
            "7",
            "--threads",
            "2",
            "--latex",
            "--log-level",
            "debug",
        ]);
        assert!(parsed.is_ok());
        if let Ok(args) = parsed {
            assert_eq!(args.inputs, "+,-,*,/,1-9");
            assert_eq!(args.objective, -2.5);
            assert_eq!(args.precision, 6.0);
            assert_eq!(args.seconds, 3.0);
            assert_eq!(args.seed, Some(7));
            assert_eq!(args.threads, Some(2));
            assert!(args.latex);
            assert!(matches!(args.log_level, LogLevel::Debug));
        }
    }

    #[test]
    fn test_cli_defaults() {
        let parsed = CliArgs::try_parse_from(["eureka", "sqrt,5", "2.2"]);
        assert!(parsed.is_ok());
        if let Ok(args) = parsed {
            assert_eq!(args.precision, 4.0);
            assert_eq!(args.seconds, 15.0);
            assert_eq!(args.perturbation_ratio, 0.5);
            assert_eq!(args.max_size, 31);
            assert!(args.seed.is_none());
            assert!(!args.latex);
            assert!(matches!(args.log_level, LogLevel::Warn));
        }
    }

    #[test]
    fn test_into_config() {
        let mut raw = args("+,1-3", 6.0);
        raw.seconds = 2.9;
        raw.threads = Some(1);
        raw.seed = Some(11);
        let config = raw.into_config();
        assert!(config.is_ok());
        if let Ok(config) = config {
            assert_eq!(config.search.deadline, Duration::from_secs(2));
            assert_eq!(config.search.threads, 1);
            assert_eq!(config.search.seed, Some(11));
            assert_eq!(config.inputs.pool().total_units(), 3);
        }
    }

    #[test]
    fn test_into_config_rejects_bad_input() {
        assert!(args("1-9", 1.0).into_config().is_err());
        assert!(args("+,x", 1.0).into_config().is_err());

        let mut short = args("+,1", 1.0);
        short.seconds = 0.5;
        assert!(short.into_config().is_err());

        let mut ratio = args("+,1", 1.0);
        ratio.perturbation_ratio = 2.0;
        assert!(ratio.into_config().is_err());
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            LogLevel::Error.to_log_level_filter(),
            log::LevelFilter::Error
        );
        assert_eq!(LogLevel::Warn.to_log_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::Info.to_log_level_filter(), log::LevelFilter::Info);
        assert_eq!(
            LogLevel::Debug.to_log_level_filter(),
            log::LevelFilter::Debug
        );
        assert_eq!(
            LogLevel::Trace.to_log_level_filter(),
            log::LevelFilter::Trace
        );
    }
}
