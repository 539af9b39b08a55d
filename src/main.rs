mod report;

use clap::{Parser, Subcommand, ValueEnum};
use metricrule::{
    Options, Rule, ViolationKinds, generate_rules, match_metrics_verbose_with, read_graph_defs, read_metrics, read_rules,
    render_rules,
};
use report::ansi::Palette;
use std::fs::File;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const LOG_TARGET: &str = "metricrule";

const STDIN_NAME: &str = "<stdin>";

#[derive(Parser, Debug)]
#[command(name = "metricrule", version, about = "Verify Graphite plaintext metrics against a rule file")]
struct Cli {
    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check metrics against the rules
    ///
    /// Reads each FILE (stdin when none is given) as Graphite plaintext and
    /// reports out-of-range, missing and unexpected metrics.
    Check {
        /// Rule file
        #[arg(short = 'f', long = "rules", value_name = "FILE", default_value = "metricrules")]
        rules: PathBuf,

        /// Metric files
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Do not report metrics no rule covers
        #[arg(long)]
        allow_unexpected: bool,

        /// Do not report required rules that matched nothing
        #[arg(long)]
        allow_missing: bool,

        /// Do not report values rejected by their rules
        #[arg(long)]
        allow_out_of_range: bool,

        /// Print per-input counts and timings
        #[arg(long)]
        summary: bool,

        /// Control when to use colored output
        #[arg(long, value_name = "WHEN", default_value = "auto")]
        color: ColorMode,
    },

    /// Generate rules from graph definition JSON
    Graphdef {
        /// Graph definition files
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,
    },
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    /// No logging output
    None,
    /// Only error messages
    Error,
    /// Warning and error messages
    Warn,
    /// Info, warning, and error messages
    Info,
    /// Debug and above messages
    Debug,
    /// All messages including trace
    Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn enabled(self) -> bool {
        matches!(self, ColorMode::Always) || (matches!(self, ColorMode::Auto) && io::stdout().is_terminal())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Commands::Check { rules, files, allow_unexpected, allow_missing, allow_out_of_range, summary, color } => {
            let mut report = ViolationKinds::all();
            report.set(ViolationKinds::UNEXPECTED, !allow_unexpected);
            report.set(ViolationKinds::MISSING, !allow_missing);
            report.set(ViolationKinds::OUT_OF_RANGE, !allow_out_of_range);
            let check = Check { options: Options { report }, summary, palette: Palette::new(color.enabled()) };
            check.run(&rules, &files)
        }
        Commands::Graphdef { files } => graphdef(&files),
    }
}

fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => "off",
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .init();
}

/// Inputs named on the command line, or stdin when there are none.
fn inputs(files: &[PathBuf]) -> Vec<Option<&Path>> {
    if files.is_empty() { vec![None] } else { files.iter().map(|f| Some(f.as_path())).collect() }
}

fn source_name(path: Option<&Path>) -> String {
    path.map_or_else(|| STDIN_NAME.to_string(), |p| p.display().to_string())
}

fn open(path: Option<&Path>) -> io::Result<Box<dyn Read>> {
    match path {
        Some(path) => Ok(Box::new(File::open(path)?)),
        None => Ok(Box::new(io::stdin().lock())),
    }
}

struct Check {
    options: Options,
    summary: bool,
    palette: Palette,
}

impl Check {
    fn run(&self, rules_path: &Path, files: &[PathBuf]) -> ExitCode {
        let source = rules_path.display().to_string();
        let rules = match File::open(rules_path).map_err(metricrule::Error::from).and_then(read_rules) {
            Ok(rules) => rules,
            Err(err) => {
                report::print_input_error(&source, &err, &self.palette);
                return ExitCode::from(2);
            }
        };
        log::info!(target: LOG_TARGET, "loaded {} rules from {source}", rules.len());

        let mut failed = false;
        for path in inputs(files) {
            failed |= !self.check_input(&rules, path);
        }
        if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
    }

    /// Returns false when the input had violations or could not be read.
    fn check_input(&self, rules: &[Rule], path: Option<&Path>) -> bool {
        let source = source_name(path);
        let metrics = match open(path).map_err(metricrule::Error::from).and_then(read_metrics) {
            Ok(metrics) => metrics,
            Err(err) => {
                report::print_input_error(&source, &err, &self.palette);
                return false;
            }
        };
        log::info!(target: LOG_TARGET, "checking {} metrics from {source}", metrics.len());

        let res = match_metrics_verbose_with(rules, &metrics, &self.options);
        for violation in &res.violations {
            report::print_violation(&source, violation, &self.palette);
        }
        if self.summary {
            report::print_summary(&source, &res.violations, res.elapsed, &res.details, &self.palette);
        }
        res.violations.is_empty()
    }
}

fn graphdef(files: &[PathBuf]) -> ExitCode {
    let palette = Palette::new(false);
    let mut stdout = io::stdout().lock();
    for path in inputs(files) {
        let defs = match open(path).map_err(metricrule::Error::from).and_then(read_graph_defs) {
            Ok(defs) => defs,
            Err(err) => {
                report::print_input_error(&source_name(path), &err, &palette);
                return ExitCode::from(2);
            }
        };
        if let Err(err) = stdout.write_all(render_rules(&generate_rules(&defs)).as_bytes()) {
            log::error!(target: LOG_TARGET, "cannot write rules: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
