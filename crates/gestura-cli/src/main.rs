//! Gestura CLI - replay pointer traces and inspect presets.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use gestura_core::{Manager, ManagerOptions};
use gestura_yaml::{Format, Preset, RecordedGesture, Trace};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gestura")]
#[command(about = "Multi-pointer gesture recognition toolkit")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a pointer trace and print the gestures it produces
    Replay {
        /// Trace file (yaml, toml or json)
        trace: PathBuf,

        /// Preset file; the stock recognizers are used when omitted
        #[arg(short, long)]
        preset: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Output::Text)]
        format: Output,
    },

    /// Check that a preset parses and its relations resolve
    Check {
        /// Preset file (yaml, toml or json)
        preset: PathBuf,
    },

    /// Print the stock preset
    Preset {
        /// Output format (yaml, toml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// One line per gesture
    Text,
    /// A JSON array
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay {
            trace,
            preset,
            format,
        } => run_replay(&trace, preset.as_deref(), format),
        Commands::Check { preset } => run_check(&preset),
        Commands::Preset { format } => run_preset(&format),
    }
}

fn load_manager(preset: Option<&Path>) -> anyhow::Result<Manager> {
    match preset {
        Some(path) => {
            let preset = Preset::load(path)
                .with_context(|| format!("failed to load preset {}", path.display()))?;
            Ok(preset.build()?)
        }
        None => Ok(Manager::with_default_preset(ManagerOptions::default())),
    }
}

fn run_replay(trace_path: &Path, preset: Option<&Path>, output: Output) -> anyhow::Result<()> {
    let trace = Trace::load(trace_path)
        .with_context(|| format!("failed to load trace {}", trace_path.display()))?;
    trace.validate()?;

    let mut manager = load_manager(preset)?;
    info!(
        events = trace.events.len(),
        recognizers = manager.recognizers().len(),
        "replaying"
    );
    let gestures = trace.replay(&mut manager);

    match output {
        Output::Text => {
            for gesture in &gestures {
                println!("{}", describe(gesture));
            }
        }
        Output::Json => println!("{}", serde_json::to_string_pretty(&gestures)?),
    }
    Ok(())
}

fn describe(gesture: &RecordedGesture) -> String {
    let mut line = format!(
        "{:>7}ms  {:<14} x={:<7.1} y={:<7.1} dx={:<7.1} dy={:.1}",
        gesture.at, gesture.event, gesture.center.x, gesture.center.y, gesture.delta_x,
        gesture.delta_y
    );
    if let Some(count) = gesture.tap_count {
        line.push_str(&format!(" taps={count}"));
    }
    line
}

fn run_check(path: &Path) -> anyhow::Result<()> {
    let preset =
        Preset::load(path).with_context(|| format!("failed to load preset {}", path.display()))?;
    let manager = preset.build()?;
    debug!(?manager, "preset manager");

    println!("Preset valid: {}", path.display());
    println!("  Recognizers: {}", manager.recognizers().len());
    for recognizer in manager.recognizers() {
        let status = if recognizer.is_enabled() { "" } else { " (disabled)" };
        println!(
            "    {:<12} {}{status}",
            recognizer.event(),
            recognizer.kind().kind_name()
        );
    }
    println!("  Touch action: {}", manager.touch_action());
    Ok(())
}

fn run_preset(format: &str) -> anyhow::Result<()> {
    let format: Format = format.parse()?;
    print!("{}", Preset::default_preset().render(format)?);
    Ok(())
}
