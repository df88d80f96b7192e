//! human-input - Main Entry Point
//!
//! Command line front end for the input engine. It handles CLI argument
//! parsing, configuration loading, and either plans or performs a single
//! humanized action, printing the result as JSON.

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use human_input::{
    config::{CliArgs, HumanizerSettings},
    input::{
        generate_path, generate_pattern, EventLog, HumanInput, InputBackend, MouseButton,
        MovementHistory, Position, RecordingBackend, ScrollDirection, SeededRandom, TypeOptions,
    },
    NAME, VERSION,
};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Print a one-line header to stderr so stdout stays valid JSON
fn print_banner(settings: &HumanizerSettings, dry_run: bool) {
    eprintln!(
        "{cyan}{bold}{name}{reset} {dim}v{version} | {wpm} WPM | {mode}{reset}",
        name = NAME,
        version = VERSION,
        wpm = settings.typing.wpm,
        mode = if dry_run { "dry run" } else { "live input" },
        cyan = colors::CYAN,
        bold = colors::BOLD,
        dim = colors::DIM,
        reset = colors::RESET
    );
}

fn coordinate(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .allow_negative_numbers(true)
        .value_parser(clap::value_parser!(i32))
}

/// Build the CLI command parser
fn build_cli() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .about("Human-like pointer and keyboard input synthesis")
        .long_about(
            "human-input performs or plans pointer and keyboard actions with\n\
             human timing: curved paths, overshoots, typos and fatigue.",
        )
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file (TOML or JSON)")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("N")
                .help("Seed for reproducible plans")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("wpm")
                .long("wpm")
                .value_name("WPM")
                .help("Typing speed in words per minute")
                .global(true)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("error-rate")
                .long("error-rate")
                .value_name("RATE")
                .help("Base probability of a typo per character")
                .global(true)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("no-pauses")
                .long("no-pauses")
                .help("Disable thinking pauses while typing")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("base-speed")
                .long("base-speed")
                .value_name("MS")
                .help("Pointer milliseconds per path step")
                .global(true)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("overshoot-probability")
                .long("overshoot-probability")
                .value_name("P")
                .help("Chance of overshooting the target and correcting back")
                .global(true)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("no-micro-movement")
                .long("no-micro-movement")
                .help("Do not nudge the pointer before pressing a button")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Record primitives instead of touching the real pointer and keyboard")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .global(true)
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress output except errors")
                .global(true)
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .subcommand(
            Command::new("move")
                .about("Move the pointer to a position")
                .arg(coordinate("x", "Target x"))
                .arg(coordinate("y", "Target y")),
        )
        .subcommand(
            Command::new("click")
                .about("Click, optionally after moving to a position")
                .arg(
                    Arg::new("at")
                        .long("at")
                        .value_names(["X", "Y"])
                        .num_args(2)
                        .allow_negative_numbers(true)
                        .value_parser(clap::value_parser!(i32)),
                )
                .arg(
                    Arg::new("button")
                        .short('b')
                        .long("button")
                        .default_value("left")
                        .value_parser(["left", "right", "middle"]),
                )
                .arg(
                    Arg::new("double")
                        .long("double")
                        .help("Double-click")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("drag")
                .about("Drag with the left button from one position to another")
                .arg(coordinate("x1", "Start x"))
                .arg(coordinate("y1", "Start y"))
                .arg(coordinate("x2", "End x"))
                .arg(coordinate("y2", "End y")),
        )
        .subcommand(
            Command::new("type")
                .about("Type text")
                .arg(Arg::new("text").required(true)),
        )
        .subcommand(
            Command::new("scroll")
                .about("Scroll the wheel by a number of notches")
                .arg(
                    Arg::new("direction")
                        .required(true)
                        .value_parser(["up", "down", "left", "right"]),
                )
                .arg(
                    Arg::new("amount")
                        .default_value("3")
                        .value_parser(clap::value_parser!(u32)),
                ),
        )
        .subcommand(
            Command::new("plan-path")
                .about("Print the planned path between two positions without moving")
                .arg(coordinate("x1", "Start x"))
                .arg(coordinate("y1", "Start y"))
                .arg(coordinate("x2", "End x"))
                .arg(coordinate("y2", "End y")),
        )
        .subcommand(
            Command::new("plan-text")
                .about("Print the planned keystrokes for a text without typing")
                .arg(Arg::new("text").required(true)),
        )
}

/// Parse CLI arguments into CliArgs struct
fn parse_cli_args(matches: &ArgMatches) -> CliArgs {
    let mut args = CliArgs::default();

    args.config_file = matches.get_one::<PathBuf>("config").cloned();
    args.seed = matches.get_one::<u64>("seed").copied();
    args.wpm = matches.get_one::<f64>("wpm").copied();
    args.error_rate = matches.get_one::<f64>("error-rate").copied();

    if matches.get_flag("no-pauses") {
        args.thinking_pauses = Some(false);
    }

    args.base_speed = matches.get_one::<f64>("base-speed").copied();
    args.overshoot_probability = matches.get_one::<f64>("overshoot-probability").copied();
    if matches.get_flag("no-micro-movement") {
        args.micro_movement = Some(false);
    }

    args
}

/// Builds the log filter; a valid `RUST_LOG` wins over the verbosity flags
fn log_filter(level: Level, rust_log: Option<String>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(level.into()))
}

/// Initialize the tracing/logging subsystem
fn init_tracing(verbosity: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbosity {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = log_filter(level, std::env::var(EnvFilter::DEFAULT_ENV).ok());

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn i32_arg(matches: &ArgMatches, name: &str) -> i32 {
    matches.get_one::<i32>(name).copied().unwrap_or_default()
}

/// Perform one action through the engine and report its stats
async fn perform<B: InputBackend>(
    mut input: HumanInput<B>,
    command: (&str, &ArgMatches),
    events: Option<EventLog>,
) -> Result<serde_json::Value> {
    match command {
        ("move", m) => {
            input
                .move_to_position(i32_arg(m, "x"), i32_arg(m, "y"))
                .await?
        }
        ("click", m) => {
            let button: MouseButton = m
                .get_one::<String>("button")
                .map(String::as_str)
                .unwrap_or("left")
                .parse()
                .map_err(anyhow::Error::msg)?;
            if let Some(at) = m.get_many::<i32>("at") {
                let at: Vec<i32> = at.copied().collect();
                input.move_to_position(at[0], at[1]).await?;
            }
            if m.get_flag("double") {
                input.double_click(button).await?;
            } else {
                input.click(button).await?;
            }
        }
        ("drag", m) => {
            input
                .drag(
                    i32_arg(m, "x1"),
                    i32_arg(m, "y1"),
                    i32_arg(m, "x2"),
                    i32_arg(m, "y2"),
                )
                .await?
        }
        ("type", m) => {
            let text = m.get_one::<String>("text").cloned().unwrap_or_default();
            input.type_text(&text, TypeOptions::default()).await?;
        }
        ("scroll", m) => {
            let direction: ScrollDirection = m
                .get_one::<String>("direction")
                .map(String::as_str)
                .unwrap_or("down")
                .parse()
                .map_err(anyhow::Error::msg)?;
            let amount = m.get_one::<u32>("amount").copied().unwrap_or(3);
            input.scroll(direction, amount).await?;
        }
        (other, _) => bail!("Unknown command: {}", other),
    }

    let mut report = json!({
        "movement": input.movement_stats(),
        "typing": input.typing_stats(),
    });
    if let Some(events) = events {
        report["events"] = serde_json::to_value(&*events.lock())?;
    }
    Ok(report)
}

/// Plan without executing
fn plan(settings: &HumanizerSettings, command: (&str, &ArgMatches)) -> Result<serde_json::Value> {
    let mut rng = SeededRandom::from_optional_seed(settings.seed);
    match command {
        ("plan-path", m) => {
            let path = generate_path(
                Position::new(i32_arg(m, "x1"), i32_arg(m, "y1")),
                Position::new(i32_arg(m, "x2"), i32_arg(m, "y2")),
                &settings.movement,
                0.0,
                &MovementHistory::new(),
                &mut rng,
            );
            debug!("Planned {} points", path.len());
            Ok(json!({
                "points": path.len(),
                "total_ms": path.total_delay_ms(),
                "steps": path.steps,
            }))
        }
        ("plan-text", m) => {
            let text = m.get_one::<String>("text").cloned().unwrap_or_default();
            let pattern = generate_pattern(
                &text,
                settings.typing.wpm,
                &settings.typing,
                0.0,
                &mut rng,
            );
            Ok(json!({
                "wpm": pattern.wpm,
                "planned_ms": pattern.planned_ms(),
                "errors": pattern.error_count(),
                "pauses": pattern.pause_count(),
                "steps": pattern.steps,
            }))
        }
        (other, _) => bail!("Unknown plan command: {}", other),
    }
}

/// Main application entry point
#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let verbosity = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");
    init_tracing(verbosity, quiet);

    let cli_args = parse_cli_args(&matches);
    let settings = cli_args
        .load_settings()
        .context("Failed to load configuration")?;

    let Some((name, sub)) = matches.subcommand() else {
        bail!("No command given");
    };

    let report = if name.starts_with("plan-") {
        plan(&settings, (name, sub))?
    } else {
        let dry_run = matches.get_flag("dry-run") || !cfg!(feature = "os-input");
        if !quiet {
            print_banner(&settings, dry_run);
        }
        info!("Running '{}'", name);

        if dry_run {
            let backend = RecordingBackend::new();
            let events = backend.events();
            perform(settings.build_engine(backend), (name, sub), Some(events)).await?
        } else {
            run_live(&settings, (name, sub)).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(feature = "os-input")]
async fn run_live(
    settings: &HumanizerSettings,
    command: (&str, &ArgMatches),
) -> Result<serde_json::Value> {
    let backend = human_input::input::EnigoBackend::new()
        .context("Failed to open the desktop input device")?;
    perform(settings.build_engine(backend), command, None).await
}

#[cfg(not(feature = "os-input"))]
async fn run_live(
    _settings: &HumanizerSettings,
    _command: (&str, &ArgMatches),
) -> Result<serde_json::Value> {
    bail!("Live input requires the 'os-input' feature; use --dry-run")
}
