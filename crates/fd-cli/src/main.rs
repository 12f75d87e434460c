use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use fd_core::{AnalysisConfig, Analysis, InputError, InputErrors, RuleFileLoader};
use fd_report::{ConsoleRenderer, ExportFormat, ReportDocument, Tone};
use fd_rules::RuleSetComparator;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fwdelta")]
#[command(version, about = "Compare two iptables rule sets and assess the impact of the change", long_about = None)]
struct Cli {
    /// Rule file before the change
    #[arg(short, long)]
    before: PathBuf,

    /// Rule file after the change
    #[arg(short, long)]
    after: PathBuf,

    /// Write an HTML report to this path
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write a plain-text report to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the analysis as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Analysis config file (defaults to ./fwdelta.yaml, then /etc/fwdelta/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compare raw lines instead of normalized ones
    #[arg(long)]
    no_normalize: bool,

    /// Keep file order when normalizing
    #[arg(long)]
    no_sort: bool,

    /// Skip the terminal charts
    #[arg(long)]
    no_visualization: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AnalysisConfig) {
        if self.no_normalize {
            config.normalize = false;
        }
        if self.no_sort {
            config.sort_rules = false;
        }
        if self.no_visualization {
            config.visualization = false;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = AnalysisConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let console = ConsoleRenderer::new(io::stdout().is_terminal());

    console.print(&ReportDocument::notice("Reading configurations...", Tone::Info));
    let (before, after) = RuleFileLoader::new().load_pair(&cli.before, &cli.after)?;

    console.print(&ReportDocument::notice("Comparing configurations...", Tone::Info));
    let analysis = RuleSetComparator::new(&config).compare(&before.lines, &after.lines);

    if let Some(path) = &cli.json {
        write_json(&analysis, path)?;
    }

    if !analysis.has_differences() {
        console.print(&ReportDocument::notice(
            "No differences detected between the configurations.",
            Tone::Warning,
        ));
        return Ok(());
    }

    console.print(&ReportDocument::notice("Analyzing changes...", Tone::Info));
    let report = ReportDocument::from_analysis(&analysis);
    console.print(&report);

    if config.visualization {
        if let Err(e) = fd_report::show_dashboard(&analysis.metrics) {
            warn!("Skipping visualization: {:#}", e);
        }
    }

    if let Some(path) = &cli.export {
        fd_report::export(&report, path, ExportFormat::Html)?;
        println!("\n📄 Report exported to {}", path.display());
    }

    if let Some(path) = &cli.output {
        fd_report::export(&report, path, ExportFormat::Text)?;
        println!("\n📄 Text report exported to {}", path.display());
    }

    Ok(())
}

fn write_json(analysis: &Analysis, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(analysis)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write JSON analysis to {}", path.display()))?;
    println!("📄 Analysis written to {}", path.display());
    Ok(())
}

fn report_error(err: &anyhow::Error) {
    if let Some(errors) = err.downcast_ref::<InputErrors>() {
        for e in errors.errors() {
            eprintln!("❌ Error: {}", e);
        }
    } else if let Some(e) = err.downcast_ref::<InputError>() {
        eprintln!("❌ Error: {}", e);
    } else {
        eprintln!("❌ An unexpected error occurred: {:#}", err);
    }
}
