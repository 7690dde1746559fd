//! Lock-In CLI - Command-line interface for the Lock-In session engine
//!
//! Commands:
//! - guard: Evaluate an end-of-session request and print the verdict
//! - replay: Drive a full session from a focus-event stream
//! - schema: Print schema information
//! - doctor: Diagnose engine health and input files

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use lockin_core::types::{FocusEvent, FocusEventKind, SessionPlan};
use lockin_core::{GuardError, SessionContext, SessionMetrics, Verdict};
use lockin_core::{ENGINE_VERSION, PRODUCER_NAME};

/// Lock-In - Deterministic engine for accountable focus sessions
#[derive(Parser)]
#[command(name = "lockin")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Evaluate and replay focus sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an end-of-session request and print the verdict
    Guard {
        /// Input file with session metrics JSON (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Drive a full session from a focus-event stream (NDJSON)
    Replay {
        /// Input file with focus events, one per line (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Session goal text
        #[arg(long, default_value = "replayed session")]
        goal: String,

        /// Target duration in minutes
        #[arg(long)]
        goal_minutes: f64,

        /// End-of-session reflection text
        #[arg(long, default_value = "")]
        reflection: String,

        /// Read the reflection from a file instead
        #[arg(long, conflicts_with = "reflection")]
        reflection_file: Option<PathBuf>,

        /// Seed for roast selection (omit for entropy)
        #[arg(long)]
        seed: Option<u64>,

        /// Do not treat fullscreen exit as loss of focus
        #[arg(long)]
        no_fullscreen: bool,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },

    /// Diagnose engine health and input files
    Doctor {
        /// Check a focus-event stream file
        #[arg(long)]
        events: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Guard input (session metrics)
    Input,
    /// Guard output (verdict)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, LockinCliError> {
    match cli.command {
        Commands::Guard {
            input,
            output_format,
        } => cmd_guard(&input, output_format),

        Commands::Replay {
            input,
            goal,
            goal_minutes,
            reflection,
            reflection_file,
            seed,
            no_fullscreen,
            output_format,
        } => cmd_replay(
            &input,
            &goal,
            goal_minutes,
            &reflection,
            reflection_file.as_deref(),
            seed,
            no_fullscreen,
            output_format,
        ),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),

        Commands::Doctor { events, json } => cmd_doctor(events.as_deref(), json),
    }
}

fn read_input(input: &PathBuf) -> Result<String, LockinCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn format_verdict(verdict: &Verdict, format: &OutputFormat) -> Result<String, LockinCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(verdict)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(verdict)?),
    }
}

fn cmd_guard(input: &PathBuf, output_format: OutputFormat) -> Result<ExitCode, LockinCliError> {
    let input_data = read_input(input)?;
    let metrics: SessionMetrics = serde_json::from_str(&input_data)?;
    let verdict = lockin_core::evaluate(&metrics)?;

    println!("{}", format_verdict(&verdict, &output_format)?);

    // A denied end is not an error, but scripts need to see it
    if verdict.allow {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn parse_events(input_data: &str) -> Result<Vec<FocusEvent>, LockinCliError> {
    let mut events: Vec<FocusEvent> = Vec::new();

    for (lineno, line) in input_data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: FocusEvent = serde_json::from_str(trimmed).map_err(|e| {
            LockinCliError::ParseError(format!("line {}: {}", lineno + 1, e))
        })?;
        events.push(event);
    }

    if events.is_empty() {
        return Err(LockinCliError::NoEvents);
    }

    for pair in events.windows(2) {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(LockinCliError::ParseError(
                "events must be ordered by timestamp".to_string(),
            ));
        }
    }

    Ok(events)
}

#[allow(clippy::too_many_arguments)]
fn cmd_replay(
    input: &PathBuf,
    goal: &str,
    goal_minutes: f64,
    reflection: &str,
    reflection_file: Option<&std::path::Path>,
    seed: Option<u64>,
    no_fullscreen: bool,
    output_format: OutputFormat,
) -> Result<ExitCode, LockinCliError> {
    let input_data = read_input(input)?;
    let events = parse_events(&input_data)?;

    let reflection = match reflection_file {
        Some(path) => fs::read_to_string(path)?,
        None => reflection.to_string(),
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let started_at = events[0].timestamp;
    let plan = SessionPlan::new(goal, goal_minutes);
    let mut ctx = SessionContext::start(plan, !no_fullscreen, started_at);

    // The one-second clock is synthesized from event timestamps: before
    // applying each event, tick up to the whole second it lands on
    let mut ticks: i64 = 0;
    let mut last_seen = started_at;

    for event in &events {
        let target = (event.timestamp - started_at).num_seconds();
        while ticks < target {
            ctx.tick();
            ticks += 1;
        }

        match event.kind {
            FocusEventKind::Visibility => {
                ctx.handle_visibility(event.value, event.timestamp, &mut rng);
            }
            FocusEventKind::Fullscreen => {
                ctx.handle_fullscreen(event.value, event.timestamp, &mut rng);
            }
        }

        last_seen = event.timestamp;
    }

    let verdict = ctx.request_end(&reflection)?;
    let allowed = verdict.allow;
    let report = ctx.finish(verdict, last_seen);

    let output = match output_format {
        OutputFormat::Json => serde_json::to_string(&report)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&report)?,
    };
    println!("{}", output);

    if allowed {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<ExitCode, LockinCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: session metrics");
                println!();
                println!("A single JSON object with camelCase fields:");
                println!();
                println!("- goalMinutes        Target duration in minutes (> 0)");
                println!("- elapsedSeconds     Wall-clock seconds since session start");
                println!("- violations         Count of debounced focus-loss events");
                println!("- reflection         Free-form end-of-session writeup");
                println!("- checklistComplete  All pre-declared checklist items done");
                println!("- focusPercentage    Focused share of elapsed time (0-100)");
                println!();
                println!("Replay input is NDJSON focus events, one per line:");
                println!("- timestamp  RFC 3339 instant");
                println!("- kind       \"visibility\" or \"fullscreen\"");
                println!("- value      New value of the signal");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: verdict");
                println!();
                println!("A single JSON object with camelCase fields:");
                println!();
                println!("- allow     Whether the session may end now");
                println!("- feedback  Feedback shown to the user");
                println!("- roast     Admonishing one-liner (empty when allowed)");
                println!();
                println!("Replay prints a session report instead:");
                println!("- session_id, goal, goal_minutes");
                println!("- started_at, ended_at, elapsed_seconds, focused_seconds");
                println!("- focus_percentage, violations, roasts, verdict");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_doctor(events: Option<&std::path::Path>, json: bool) -> Result<ExitCode, LockinCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Lock-In version {}", ENGINE_VERSION),
    });

    if let Some(events_path) = events {
        if events_path.exists() {
            match fs::read_to_string(events_path) {
                Ok(content) => match parse_events(&content) {
                    Ok(parsed) => {
                        checks.push(DoctorCheck {
                            name: "events".to_string(),
                            status: CheckStatus::Ok,
                            message: format!("Event stream valid ({} events)", parsed.len()),
                        });
                    }
                    Err(e) => {
                        checks.push(DoctorCheck {
                            name: "events".to_string(),
                            status: CheckStatus::Error,
                            message: format!("Invalid event stream: {}", CliError::from(e).message),
                        });
                    }
                },
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "events".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Cannot read events file: {}", e),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "events".to_string(),
                status: CheckStatus::Warning,
                message: "Events file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Lock-In Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(LockinCliError::DoctorFailed)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

// Helper functions

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "lockin.session_metrics.v1",
        "description": "Lock-In end-of-session metrics",
        "type": "object",
        "required": [
            "goalMinutes", "elapsedSeconds", "violations",
            "reflection", "checklistComplete", "focusPercentage"
        ],
        "properties": {
            "goalMinutes": { "type": "number", "exclusiveMinimum": 0 },
            "elapsedSeconds": { "type": "number", "minimum": 0 },
            "violations": { "type": "integer", "minimum": 0 },
            "reflection": { "type": "string" },
            "checklistComplete": { "type": "boolean" },
            "focusPercentage": { "type": "number", "minimum": 0, "maximum": 100 }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "lockin.verdict.v1",
        "description": "Lock-In guard verdict",
        "type": "object",
        "required": ["allow", "feedback", "roast"],
        "properties": {
            "allow": { "type": "boolean" },
            "feedback": { "type": "string" },
            "roast": { "type": "string" }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum LockinCliError {
    Io(io::Error),
    Guard(GuardError),
    Json(serde_json::Error),
    NoEvents,
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for LockinCliError {
    fn from(e: io::Error) -> Self {
        LockinCliError::Io(e)
    }
}

impl From<GuardError> for LockinCliError {
    fn from(e: GuardError) -> Self {
        LockinCliError::Guard(e)
    }
}

impl From<serde_json::Error> for LockinCliError {
    fn from(e: serde_json::Error) -> Self {
        LockinCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LockinCliError> for CliError {
    fn from(e: LockinCliError) -> Self {
        match e {
            LockinCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LockinCliError::Guard(e) => CliError {
                code: "GUARD_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure metrics are valid (run 'lockin schema input')".to_string()),
            },
            LockinCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            LockinCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No focus events found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            LockinCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            LockinCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check event stream format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
