use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use covrep::config::Config;
use covrep::coverage::{validate_threshold, ThresholdStatistic, ThresholdTypeFlags};
use covrep::model::CoverageResult;
use covrep::report_writer::{ReportOutput, ReportWriter};
use covrep::reporters::{create_reporter, render_summary, OutputType, REPORT_FORMATS};

const CONFIG_FILE: &str = "covrep.toml";
/// Exit code when coverage is below a configured threshold
const THRESHOLD_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(name = "covrep")]
#[command(about = "Coverage aggregation, threshold gating and report generation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: covrep.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate reports and check thresholds
    Report {
        /// Coverage result in JSON module layout
        input: PathBuf,

        /// Report formats, comma separated
        #[arg(short, long = "format", value_delimiter = ',')]
        formats: Vec<String>,

        /// Output directory (trailing separator) or file name
        #[arg(short, long)]
        output: Option<String>,

        /// Build target qualifier inserted into output file names
        #[arg(long)]
        target_framework: Option<String>,

        /// Produce environment independent paths
        #[arg(long)]
        deterministic: bool,

        /// Keep document paths verbatim (source link)
        #[arg(long)]
        source_link: bool,

        /// Minimum coverage percentage
        #[arg(long)]
        threshold: Option<f64>,

        /// Categories the threshold applies to
        #[arg(long, default_value = "line,branch,method")]
        threshold_type: ThresholdTypeFlags,

        /// How module percentages are combined
        #[arg(long, value_enum)]
        threshold_stat: Option<ThresholdStatistic>,
    },

    /// Print the coverage summary table
    Summary {
        /// Coverage result in JSON module layout
        input: PathBuf,
    },

    /// List available report formats
    Formats,
}

fn main() {
    init_tracing();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Report {
            input,
            formats,
            output,
            target_framework,
            deterministic,
            source_link,
            threshold,
            threshold_type,
            threshold_stat,
        } => {
            if !formats.is_empty() {
                config.report.formats = formats;
            }
            if let Some(output) = output {
                config.report.output = output;
            }
            if target_framework.is_some() {
                config.report.target_framework = target_framework;
            }
            config.parameters.deterministic_report |= deterministic;
            config.parameters.use_source_link |= source_link;
            if let Some(value) = threshold {
                config.threshold.apply(threshold_type, value);
            }
            if let Some(statistic) = threshold_stat {
                config.threshold.statistic = statistic;
            }
            config.validate()?;

            cmd_report(&config, &input)
        }
        Commands::Summary { input } => cmd_summary(&config, &input),
        Commands::Formats => cmd_formats(),
    }
}

/// Explicit config must exist; the default one is optional
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None if Path::new(CONFIG_FILE).exists() => Config::load(Path::new(CONFIG_FILE)),
        None => Ok(Config::default()),
    }
}

fn load_result(config: &Config, input: &Path) -> Result<CoverageResult> {
    let modules = CoverageResult::load_modules(input)?;
    Ok(CoverageResult::new(modules, config.parameters.clone()))
}

fn cmd_report(config: &Config, input: &Path) -> Result<i32> {
    let result = load_result(config, input)?;
    let translator = config.source_root_mapping();
    let writer = ReportWriter::new(
        config.report.output.clone(),
        config.report.target_framework.clone(),
    );

    println!("\n{} {}\n", "📊".cyan(), "Calculating coverage result...".bold());

    for format in &config.report.formats {
        let reporter = create_reporter(format)?;

        match writer.write_report(reporter.as_ref(), &result, &translator)? {
            ReportOutput::File(path) => {
                println!(
                    "  {} {} report: {}",
                    "✓".green(),
                    reporter.format().cyan(),
                    path.display().to_string().green()
                );
            }
            ReportOutput::Console(text) => {
                print!("{}", text);
            }
        }
    }

    println!();
    print_summary(&result);

    let thresholds = config.threshold.to_map();
    if thresholds.is_empty() {
        return Ok(0);
    }

    let check = validate_threshold(&result, &thresholds, config.threshold.statistic);
    println!("{}", "Thresholds:".bold());
    check.print_summary();

    if !check.passed() {
        eprintln!(
            "\n{} {} coverage is below the specified threshold",
            "✗".red(),
            check.failed.to_string().red().bold()
        );
        return Ok(THRESHOLD_EXIT_CODE);
    }

    Ok(0)
}

fn cmd_summary(config: &Config, input: &Path) -> Result<i32> {
    let result = load_result(config, input)
        .with_context(|| format!("Could not load coverage result {}", input.display()))?;
    print_summary(&result);
    Ok(0)
}

fn print_summary(result: &CoverageResult) {
    match render_summary(result) {
        Some(table) => println!("{}", table),
        None => println!("  {}", "No modules instrumented".dimmed()),
    }
}

fn cmd_formats() -> Result<i32> {
    println!("{}", "Formats:".bold());

    for format in REPORT_FORMATS {
        let reporter = create_reporter(format)?;
        let target = match (reporter.output_type(), reporter.extension()) {
            (OutputType::File, Some(extension)) => format!("file (*.{})", extension),
            _ => "console".to_string(),
        };
        println!("  {} {} {}", "•".green(), format.cyan(), target.dimmed());
    }

    Ok(0)
}
