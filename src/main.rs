use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod columns;
mod config;
mod error;
mod export;
mod graph;
mod import;
mod ingest;
mod models;
mod session;

use config::Config;
use error::OrgChartError;
use export::ExportFormat;
use models::format_date;
use session::{Rendering, Session};

#[derive(Parser)]
#[command(name = "daily-orgchart")]
#[command(about = "Daily team org chart from a personnel assignment spreadsheet", long_about = None)]
struct Cli {
    /// Spreadsheet with date, name, role, lead and supervisor columns
    #[arg(long, global = true)]
    input: Option<PathBuf>,
    /// JSON file with synonym, style and export overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG is set
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which header each canonical column was matched to
    Columns,
    /// List the dates present in the spreadsheet, newest first
    Dates,
    /// Write the Graphviz description of one day's teams
    Render {
        /// Day to draw (dd/mm/yyyy); defaults to the newest one
        #[arg(long)]
        date: Option<String>,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export one day's rows as a spreadsheet
    Export {
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "daily_orgchart=debug"
    } else {
        "daily_orgchart=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_session(input: &Path, config: &Config) -> anyhow::Result<Session> {
    let table = ingest::read_table(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let mut session = Session::Empty;
    let summary = session.load(&table, config)?;
    if !summary.unparsable_dates.is_empty() {
        eprintln!(
            "{} of {} rows have no valid date and were left out of every day.",
            summary.unparsable_dates.len(),
            summary.rows
        );
        for skipped in &summary.unparsable_dates {
            eprintln!("  row {}: '{}'", skipped.row, skipped.value);
        }
    }
    Ok(session)
}

fn pick_date(session: &Session, requested: Option<&str>) -> anyhow::Result<NaiveDate> {
    match requested {
        Some(value) => Ok(ingest::parse_selected_date(value)?),
        None => session
            .available_dates()
            .first()
            .copied()
            .context("spreadsheet has no rows with a valid date"),
    }
}

/// Visualize a day, turning an empty selection into a warning.
fn render_day(
    session: &Session,
    date: NaiveDate,
    config: &Config,
) -> anyhow::Result<Option<Rendering>> {
    match session::visualize(session, date, config) {
        Ok(rendering) => Ok(Some(rendering)),
        Err(OrgChartError::EmptySelection { date }) => {
            eprintln!("No records for {date}.");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let input = cli
        .input
        .as_deref()
        .ok_or(OrgChartError::NoDatasetLoaded)
        .context("pass the spreadsheet with --input")?;

    match cli.command {
        Commands::Columns => {
            let table = ingest::read_table(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let mapping = columns::map_columns(&table.headers, &config.synonyms);
            for field in models::CanonicalField::ALL {
                match mapping.header(field) {
                    Some(header) => println!("{field:<12} <- {header}"),
                    None => println!("{field:<12} <- (missing)"),
                }
            }
            mapping.require_complete()?;
        }
        Commands::Dates => {
            let session = load_session(input, &config)?;
            let dates = session.available_dates();
            if dates.is_empty() {
                println!("No rows with a valid date.");
            }
            for date in dates {
                println!("{}", format_date(Some(date)));
            }
        }
        Commands::Render { date, out } => {
            let session = load_session(input, &config)?;
            let date = pick_date(&session, date.as_deref())?;
            let Some(rendering) = render_day(&session, date, &config)? else {
                return Ok(());
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, &rendering.dot)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Diagram for {} written to {}.", format_date(Some(date)), path.display());
                }
                None => print!("{}", rendering.dot),
            }
        }
        Commands::Export {
            date,
            out_dir,
            format,
        } => {
            let session = load_session(input, &config)?;
            let date = pick_date(&session, date.as_deref())?;
            let Some(rendering) = render_day(&session, date, &config)? else {
                warn!("nothing exported");
                return Ok(());
            };
            let path = export::export_rows(
                &out_dir,
                rendering.date,
                &rendering.headers,
                &rendering.rows,
                format.unwrap_or(config.export_format),
            )?;
            println!("Exported {} rows to {}.", rendering.rows.len(), path.display());
        }
    }

    Ok(())
}
