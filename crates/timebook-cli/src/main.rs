//! timebook CLI - book hours and absences into the time-sheet workbook

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{ArgGroup, Args, Parser, Subcommand};
use timebook::month_sheet;
use timebook::prelude::*;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILE_NAME: &str = "Stundennachweis DLV 2026 1.0.xlsm";

#[derive(Parser)]
#[command(name = "timebook")]
#[command(
    author,
    version,
    about = "Book project hours and absences into the time-sheet workbook"
)]
struct Cli {
    #[command(flatten)]
    workbook: WorkbookArgs,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct WorkbookArgs {
    /// Workbook file; takes precedence over --base-dir and --file-name
    #[arg(long, env = "TIMEBOOK_WORKBOOK")]
    workbook: Option<PathBuf>,

    /// Directory holding the workbook
    #[arg(long, env = "TIMEBOOK_BASE_DIR", default_value = ".")]
    base_dir: PathBuf,

    /// Workbook file name inside --base-dir
    #[arg(long, env = "TIMEBOOK_FILE_NAME", default_value = DEFAULT_FILE_NAME)]
    file_name: String,

    /// Attempts to open a locked workbook
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Pause between open attempts, in milliseconds
    #[arg(long, default_value_t = 1200)]
    retry_delay_ms: u64,
}

impl WorkbookArgs {
    fn config(&self) -> ServiceConfig {
        let config = match &self.workbook {
            Some(path) => ServiceConfig::new(path.clone()),
            None => ServiceConfig::from_parts(&self.base_dir, &self.file_name),
        };
        config.with_retry(RetryPolicy {
            attempts: self.retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the employee, project and absence-type lists
    Lists,

    /// Show the days of a month that already hold a booking
    Filled {
        /// Employee as labeled on the month sheets
        #[arg(short, long)]
        employee: String,

        /// Month (YYYY-MM)
        #[arg(short, long, value_parser = parse_month)]
        month: NaiveDate,
    },

    /// Book project hours or an absence on every weekday of a date range
    Book(BookArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("kind").required(true).args(["project", "absence"])))]
struct BookArgs {
    /// Employee as labeled on the month sheets
    #[arg(short, long)]
    employee: String,

    /// Project to book hours on
    #[arg(short, long, requires = "hours")]
    project: Option<String>,

    /// Hours per day (3.5 or 7)
    #[arg(long)]
    hours: Option<f64>,

    /// Absence type to book
    #[arg(short, long)]
    absence: Option<String>,

    /// First day (YYYY-MM-DD or DD.MM.YYYY)
    #[arg(long, value_parser = parse_date)]
    from: NaiveDate,

    /// Last day, defaults to --from
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,

    /// Book the remaining 3.5 h per day on this project
    #[arg(long, requires = "project")]
    rest_project: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let service = BookingService::new(cli.workbook.config());

    match cli.command {
        Commands::Lists => show_lists(&service),
        Commands::Filled { employee, month } => show_filled(&service, &employee, month),
        Commands::Book(args) => book(&service, args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .map_err(|_| format!("'{}' is not a date (YYYY-MM-DD or DD.MM.YYYY)", s))
}

fn parse_month(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a month (YYYY-MM)", s))
}

fn show_lists(service: &BookingService) -> Result<()> {
    let lists = match service.load_lists() {
        Ok(lists) => lists,
        Err(e) => {
            error!("could not read lists: {}", e);
            eprintln!("Warning: workbook not readable, showing default lists");
            CategoryLists::fallback()
        }
    };

    if lists.is_empty() {
        eprintln!(
            "Warning: no lists found in '{}'",
            service.workbook_path().display()
        );
    }

    print_list("Employees", &lists.employees);
    print_list("Projects", &lists.projects);
    print_list("Absence types", &lists.absences);
    Ok(())
}

fn print_list(title: &str, items: &[String]) {
    println!("{}:", title);
    for item in items {
        println!("  {}", item);
    }
}

fn show_filled(service: &BookingService, employee: &str, month: NaiveDate) -> Result<()> {
    let filled = service
        .filled_dates(employee, month)
        .with_context(|| format!("Failed to read '{}'", service.workbook_path().display()))?;

    for date in &filled {
        println!("{}", date.format("%d.%m.%Y"));
    }
    println!();
    print_calendar(month, &filled);
    Ok(())
}

/// Print a Monday-first month calendar, booked days marked with `*`
fn print_calendar(first: NaiveDate, filled: &BTreeSet<NaiveDate>) {
    println!(
        "{:^28}",
        format!("{} {}", month_sheet(first), first.year())
    );
    println!("  Mo  Di  Mi  Do  Fr  Sa  So");

    let offset = first.weekday().num_days_from_monday() as usize;
    let mut line = "    ".repeat(offset);
    for date in first.iter_days().take_while(|d| d.month() == first.month()) {
        let mark = if filled.contains(&date) { '*' } else { ' ' };
        line.push_str(&format!("{:>3}{}", date.day(), mark));
        if date.weekday() == chrono::Weekday::Sun {
            println!("{}", line.trim_end());
            line.clear();
        }
    }
    if !line.is_empty() {
        println!("{}", line.trim_end());
    }
}

fn book(service: &BookingService, args: BookArgs) -> Result<()> {
    let booking = match (args.project, args.absence) {
        (Some(project), _) => Booking::project(project, args.hours.unwrap_or_default()),
        (None, Some(absence)) => Booking::absence(absence),
        (None, None) => bail!("Choose a project (--project) or an absence (--absence)"),
    };
    let request = BookingRequest {
        employee: args.employee,
        booking,
        date_from: Some(args.from),
        date_to: args.to,
    };

    let booking = request.validate()?;
    let rest = args
        .rest_project
        .as_deref()
        .map(|project| booking.remaining_hours_booking(project))
        .transpose()?;

    let summary = service
        .book(&booking)
        .with_context(|| format!("Failed to book into '{}'", service.workbook_path().display()))?;

    if summary.nothing_written() {
        print_failures(&summary);
        bail!(
            "Nothing was written. Usually the employee or project was not found on the month sheet.\n\
             Check the name in row 3 (header) and the project in row 4 (subheader)."
        );
    }
    println!("Saved: {} day(s).", summary.ok);
    print_failures(&summary);

    if let Some(rest) = rest {
        let rest_summary = service
            .book(&rest)
            .context("Failed to book the remaining hours")?;
        println!(
            "Remaining hours booked: {} day(s) on {}.",
            rest_summary.ok, rest.booking
        );
        print_failures(&rest_summary);
    }

    Ok(())
}

fn print_failures(summary: &WriteSummary) {
    if summary.failed == 0 {
        return;
    }
    eprintln!("Failed: {} day(s)", summary.failed);
    for (date, reason) in &summary.failures {
        eprintln!("  {}: {}", date.format("%d.%m.%Y"), reason);
    }
}
