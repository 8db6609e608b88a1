//! nci - Narrative Coercion Index command line.
//!
//! Reads a delimited table of dated statements, runs the index pipeline and
//! writes the daily series as CSV together with a text summary.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use nci_common::config::{Config, Mode, PipelineConfig, PrimaryMetric, SeriesView};
use nci_common::config_loader::check_modular_files;
use nci_common::logging::init_logging_with_exclusions;
use nci_index::{export, ingest, report, Lexicon, ResultCache};
use std::path::PathBuf;
use std::process::ExitCode;

/// Narrative Coercion Index
#[derive(Parser, Debug)]
#[command(name = "nci")]
#[command(version)]
#[command(about = "Daily escalation-rhetoric index from dated statements", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.nci/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the index and write the CSV
    Run {
        /// Input table (CSV or TSV)
        input: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print the most frequent lexicon terms per bag
    Terms {
        /// Input table (CSV or TSV)
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print retained sentences with bag markers
    Highlight {
        /// Input table (CSV or TSV)
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

/// Pipeline overrides; anything unset keeps the configured value.
#[derive(Args, Debug, Default)]
struct PipelineArgs {
    /// Moving-average window in days
    #[arg(long)]
    ma: Option<usize>,

    /// Lead shift in days (negative lags)
    #[arg(long, allow_hyphen_values = true)]
    lead: Option<i64>,

    /// Reference window start (YYYY-MM-DD)
    #[arg(long)]
    win_start: Option<NaiveDate>,

    /// Reference window end (YYYY-MM-DD)
    #[arg(long)]
    win_end: Option<NaiveDate>,

    /// Weight of the level component / justify series
    #[arg(long)]
    w1: Option<f64>,

    /// Weight of the volatility component / deter series
    #[arg(long)]
    w2: Option<f64>,

    /// Weight of the acceleration component / escalate series
    #[arg(long)]
    w3: Option<f64>,

    /// Pipeline mode (hit_count, label)
    #[arg(long)]
    mode: Option<Mode>,

    /// Primary metric (docs, keywords, chars, intent)
    #[arg(long)]
    metric: Option<PrimaryMetric>,

    /// Skip the log10(count+1) step in label mode
    #[arg(long)]
    no_log: bool,

    /// Keep records that open with a reporter question
    #[arg(long)]
    keep_questions: bool,

    /// Series shown in the report (all, nci, justify, deter, escalate)
    #[arg(long)]
    view: Option<SeriesView>,

    /// Number of top terms per bag
    #[arg(long)]
    top_n: Option<usize>,

    /// Only count records mentioning this text
    #[arg(long)]
    focus: Option<String>,
}

impl PipelineArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(ma) = self.ma {
            config.ma = ma;
        }
        if let Some(lead) = self.lead {
            config.lead = lead;
        }
        if self.win_start.is_some() {
            config.win_start = self.win_start;
        }
        if self.win_end.is_some() {
            config.win_end = self.win_end;
        }
        if let Some(w) = self.w1 {
            config.w1 = w;
        }
        if let Some(w) = self.w2 {
            config.w2 = w;
        }
        if let Some(w) = self.w3 {
            config.w3 = w;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(metric) = self.metric {
            config.primary_metric = metric;
        }
        if self.no_log {
            config.log_transform = false;
        }
        if self.keep_questions {
            config.drop_reporter_questions = false;
        }
        if let Some(view) = self.view {
            config.view = view;
        }
        if let Some(n) = self.top_n {
            config.top_n = n;
        }
        if self.focus.is_some() {
            config.focus = self.focus.clone();
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<nci_common::Error>())
                .map_or(1, |err| err.exit_code());
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let mut config = Config::load_with_env(cli.config.as_deref())?;

    let (input, pipeline_args) = match &cli.command {
        Commands::Run { input, pipeline, .. }
        | Commands::Terms { input, pipeline }
        | Commands::Highlight { input, pipeline } => (input, pipeline),
    };
    pipeline_args.apply(&mut config.pipeline);

    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    config
        .validate()
        .map_err(|e| nci_common::Error::Config(e.to_string()))?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "nci starting");
    if cli.config.is_none() {
        for (file, present) in check_modular_files(None) {
            tracing::debug!(file = %file, present, "Config file");
        }
    }

    let lexicon = Lexicon::from_config(&config.lexicon).context("Failed to build lexicon")?;
    let records = ingest::load_records(input)?;

    let cache = ResultCache::new();
    let result = cache.get_or_compute(&records, &lexicon, &config.pipeline)?;

    match &cli.command {
        Commands::Run { out, .. } => {
            let text = report::format_text_report(&result, config.pipeline.view);
            match out {
                Some(path) => {
                    export::write_csv(&result, path)?;
                    print!("{}", text);
                }
                None => {
                    print!("{}", export::render_csv(&result));
                    eprint!("{}", text);
                }
            }
        }
        Commands::Terms { .. } => {
            print!("{}", report::format_terms_report(&result));
        }
        Commands::Highlight { .. } => {
            print!("{}", report::format_highlights(&result, &lexicon));
        }
    }

    Ok(())
}
