use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use marker_servo::replay::{self, ReplayStep};
use marker_servo::{ConfigIoError, TrackError, TrackingConfig};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigIoError),
    #[error("tracking: {0}")]
    Track(#[from] TrackError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "marker-servo", version, about = "Marker tracking PID loop tools")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a recorded session through the tracking loop and print each cycle.
    Replay {
        /// Tracking config (JSON).
        #[arg(long)]
        config: PathBuf,
        /// Recorded frames (JSON).
        #[arg(long)]
        frames: PathBuf,
        /// Print one JSON object per cycle instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print the default tracking config as JSON.
    PrintConfig,
}

fn init_logging(verbose: u8) {
    let level = marker_servo::core::level_from_verbosity(verbose);
    #[cfg(feature = "tracing")]
    {
        marker_servo::core::init_tracing(false, level);
        let _ = tracing_log::LogTracer::init();
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = marker_servo::core::init_with_level(level);
    }
}

fn format_step(step: &ReplayStep) -> String {
    let Some(id) = step.report.marker else {
        return format!("t={:.3} no target", step.t);
    };
    let axes: Vec<String> = step
        .report
        .axes
        .iter()
        .map(|a| {
            let flag = if a.pid.timing.is_some() { " !dt" } else { "" };
            format!(
                "{} measured={:.3} output={:+.6}{}",
                a.name, a.measured, a.pid.output, flag
            )
        })
        .collect();
    format!("t={:.3} marker={} {}", step.t, id, axes.join(" | "))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Replay {
            config,
            frames,
            json,
        } => {
            let config = TrackingConfig::load_json(&config)?;
            let recording = replay::Recording::load_json(&frames)?;
            let mut json_err = None;
            replay::replay_with(&config, &recording, |step| {
                if json {
                    match serde_json::to_string(step) {
                        Ok(line) => println!("{line}"),
                        Err(err) => json_err = Some(err),
                    }
                } else {
                    println!("{}", format_step(step));
                }
            })?;
            if let Some(err) = json_err {
                return Err(err.into());
            }
        }
        Command::PrintConfig => {
            println!("{}", serde_json::to_string_pretty(&TrackingConfig::default())?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
