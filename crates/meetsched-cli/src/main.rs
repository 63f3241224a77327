//! `meetsched`: schedule meetings against calendar fixtures from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Schedule a request (stdin → stdout), calendars from a JSON fixture
//! meetsched schedule --calendars calendars.json < request.json
//!
//! # Pin "now" and business hours, write the result to a file
//! meetsched schedule -i request.json --calendars calendars.json \
//!     --config meetsched.toml --now 2026-03-16T08:00:00Z -o result.json
//!
//! # Dry run: ranked slots without booking
//! meetsched slots -i request.json --calendars calendars.json
//!
//! # Classify a list of conflicts
//! meetsched resolve -i conflicts.json
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr (`RUST_LOG`, or `-v`).
//! `schedule` exits with status 2 when booking fails.

use std::io::{self, Read};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use meeting_scheduler::{InMemoryProvider, SchedulerConfig, SchedulingOrchestrator, SchedulingRequest};
use slot_engine::{analyze, Conflict};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "meetsched",
    version,
    about = "Find, rank and book meeting slots across attendee calendars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log pipeline transitions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct RequestArgs {
    /// Scheduling request JSON (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Calendar fixture JSON backing the in-memory provider
    #[arg(long)]
    calendars: String,
    /// TOML configuration file (defaults apply if omitted)
    #[arg(long)]
    config: Option<String>,
    /// Request receipt time, RFC 3339 (defaults to the current time)
    #[arg(long)]
    now: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and book the best slot
    Schedule(RequestArgs),
    /// Show ranked slots without booking
    Slots(RequestArgs),
    /// Classify conflicts into resolution strategies
    Resolve {
        /// Conflict list JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Schedule(args) => {
            let (orchestrator, request, now) = prepare(&args)?;
            let run = orchestrator.schedule(&request, now).await;
            let json = serde_json::to_string_pretty(&run)?;
            write_output(args.output.as_deref(), &json)?;
            if run.result.is_error() {
                process::exit(2);
            }
        }
        Commands::Slots(args) => {
            let (orchestrator, request, now) = prepare(&args)?;
            let plan = orchestrator
                .plan(&request, now)
                .await
                .context("Failed to search for slots")?;
            let unavailable = plan.unavailable_attendees();
            let report = serde_json::json!({
                "requestId": plan.meeting.request_id,
                "durationMinutes": plan.meeting.duration_minutes,
                "windowStart": plan.meeting.window_start,
                "windowEnd": plan.meeting.window_end,
                "candidatesChecked": plan.outcome.candidates_checked,
                "slots": plan.outcome.slots,
                "blockingConflicts": plan.outcome.blocking_conflicts,
                "unavailableAttendees": unavailable,
                "parseWarnings": plan.warnings,
            });
            write_output(args.output.as_deref(), &serde_json::to_string_pretty(&report)?)?;
        }
        Commands::Resolve { input, output } => {
            let json = read_input(input.as_deref())?;
            let conflicts: Vec<Conflict> =
                serde_json::from_str(&json).context("Failed to parse conflict list")?;
            let analysis = analyze(&conflicts);
            write_output(output.as_deref(), &serde_json::to_string_pretty(&analysis)?)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn prepare(args: &RequestArgs) -> Result<(SchedulingOrchestrator, SchedulingRequest, DateTime<Utc>)> {
    let config = match &args.config {
        Some(path) => SchedulerConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => SchedulerConfig::default(),
    };
    let provider = InMemoryProvider::from_fixture_file(&args.calendars)
        .with_context(|| format!("Failed to load calendars: {}", args.calendars))?;
    let orchestrator = SchedulingOrchestrator::new(config, Arc::new(provider))?;

    let json = read_input(args.input.as_deref())?;
    let request: SchedulingRequest =
        serde_json::from_str(&json).context("Failed to parse scheduling request")?;

    let now = match &args.now {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --now timestamp: {}", raw))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    tracing::debug!("Request received at {}", now);

    Ok((orchestrator, request, now))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
