//! caltrack CLI - Calibration Schedule Tracker
//!
//! Inspect calibration workbooks and record realization dates.

mod config;
mod report;

use anyhow::{anyhow, Context, Result};
use caltrack_core::{filter::ALL, PeriodFilter, Session};
use caltrack_workbook::{export_file_name, XlsxCodec};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::report::ShowReport;

#[derive(Parser)]
#[command(name = "caltrack")]
#[command(author, version, about = "Calibration schedule tracker", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Settings file (defaults to ./caltrack.toml when present)
    #[arg(long, global = true, env = "CALTRACK_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets of a workbook
    Sheets {
        /// Workbook path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the years and months present in a sheet's plan dates
    Periods {
        /// Workbook path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sheet name (first sheet if not specified)
        #[arg(short, long)]
        sheet: Option<String>,
    },

    /// Show metrics, the status-ordered table and the group summary
    Show {
        /// Workbook path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sheet name (first sheet if not specified)
        #[arg(short, long)]
        sheet: Option<String>,

        #[command(flatten)]
        period: PeriodArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Record the realization date of one row and write the workbook
    Update {
        /// Workbook path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sheet name (first sheet if not specified)
        #[arg(short, long)]
        sheet: Option<String>,

        #[command(flatten)]
        period: PeriodArgs,

        /// Row number as shown by `show` with the same filters
        #[arg(long, conflicts_with = "label", required_unless_present = "label")]
        no: Option<usize>,

        /// Row label as "[NO] name - code"
        #[arg(long)]
        label: Option<String>,

        /// Realization date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Output file (calibration_update_<timestamp>.xlsx if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct PeriodArgs {
    /// Month name or ALL
    #[arg(long, default_value = ALL)]
    month: String,

    /// Four-digit year or ALL
    #[arg(long, default_value = ALL)]
    year: String,
}

impl PeriodArgs {
    fn filter(&self) -> Result<PeriodFilter> {
        Ok(PeriodFilter::parse(&self.month, &self.year)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let settings = config::load_settings(cli.config.as_deref())?;
    let codec = XlsxCodec::from_bindings(&settings.columns);

    match cli.command {
        Commands::Sheets { file } => {
            let session = open(&codec, &file, settings)?;
            print!("{}", report::sheets_text(session.sheets().iter()));
        }
        Commands::Periods { file, sheet } => {
            let session = open(&codec, &file, settings)?;
            let sheet = resolve_sheet(&session, sheet)?;
            let periods = session
                .periods(&sheet)
                .ok_or_else(|| anyhow!("Sheet not found: {sheet}"))?;
            println!("Years: {}", periods.year_labels().join(", "));
            println!("Months: {}", periods.month_labels().join(", "));
        }
        Commands::Show {
            file,
            sheet,
            period,
            format,
        } => {
            let session = open(&codec, &file, settings)?;
            let sheet = resolve_sheet(&session, sheet)?;
            let period = period.filter()?;

            let view = session
                .view(&sheet, &period)
                .ok_or_else(|| anyhow!("Sheet not found: {sheet}"))?;
            let report = ShowReport::new(&view, &period, session.group_column(&sheet));

            match format {
                OutputFormat::Text => print!("{}", report.to_text()),
                OutputFormat::Json => println!("{}", report.to_json()?),
            }
        }
        Commands::Update {
            file,
            sheet,
            period,
            no,
            label,
            date,
            output,
        } => {
            let mut session = open(&codec, &file, settings)?;
            let sheet = resolve_sheet(&session, sheet)?;
            let period = period.filter()?;

            let origin = match (no, label) {
                (Some(no), _) => session.apply_edit(&sheet, &period, no, date)?,
                (None, Some(label)) => session.apply_edit_by_label(&sheet, &period, &label, date)?,
                (None, None) => return Err(anyhow!("Either --no or --label is required")),
            };

            let output = output
                .unwrap_or_else(|| PathBuf::from(export_file_name(chrono::Local::now().naive_local())));
            codec
                .save_path(&output, session.sheets())
                .with_context(|| format!("Failed to write {}", output.display()))?;

            println!(
                "Recorded {date} for row {origin} of {sheet}, saved to {}",
                output.display()
            );
        }
    }

    Ok(())
}

fn open(codec: &XlsxCodec, file: &Path, settings: caltrack_core::Settings) -> Result<Session> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    Session::load(codec, &bytes, settings).with_context(|| format!("Failed to load {}", file.display()))
}

/// Requested sheet, or the workbook's first sheet
fn resolve_sheet(session: &Session, sheet: Option<String>) -> Result<String> {
    match sheet {
        Some(name) if session.sheets().get(&name).is_some() => Ok(name),
        Some(name) => Err(anyhow!(
            "Sheet not found: {name} (available: {})",
            session.sheets().names().collect::<Vec<_>>().join(", ")
        )),
        None => session
            .sheets()
            .names()
            .next()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Workbook contains no sheets")),
    }
}
