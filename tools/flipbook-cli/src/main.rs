//! Flipbook CLI: turn a pile of still images into an animated GIF.
//!
//! Usage:
//!   flipbook export <FILES>...   Export frames to an animated GIF
//!   flipbook inspect <FILES>...  List frames, sizes and durations
//!   flipbook play <FILES>...     Cycle through frames in the terminal
//!   flipbook config              Show or initialize the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use flipbook_common::config::{AppConfig, LoopCount};

mod commands;

#[derive(Parser)]
#[command(
    name = "flipbook",
    about = "Assemble still images into animated GIFs",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export frames to an animated GIF
    Export {
        /// Image files, in sequence order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file path (defaults to the configured file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output size as a multiple of the preview surface
        #[arg(long)]
        scale: Option<f64>,

        /// Duration applied to every frame (ms)
        #[arg(short, long)]
        duration: Option<String>,

        /// Background color (#rgb, #rrggbb or #rrggbbaa)
        #[arg(long)]
        background: Option<String>,

        /// Quantization quality: 1 = best, 30 = fastest
        #[arg(long)]
        quality: Option<u8>,

        /// Encoder worker threads
        #[arg(long)]
        workers: Option<usize>,

        /// Loop behavior: forever, once, or a repeat count
        #[arg(long, value_parser = parse_loop_count)]
        repeat: Option<LoopCount>,

        /// Write a JSON export report next to the output
        #[arg(long)]
        report: bool,
    },

    /// List frames, sizes and durations
    Inspect {
        /// Image files, in sequence order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Cycle through frames, printing the status line
    Play {
        /// Image files, in sequence order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Duration applied to every frame (ms)
        #[arg(short, long)]
        duration: Option<String>,

        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(long)]
        seconds: Option<f64>,
    },

    /// Show the effective configuration
    Config {
        /// Write the current configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

fn parse_loop_count(value: &str) -> Result<LoopCount, String> {
    match value {
        "forever" | "infinite" => Ok(LoopCount::Forever),
        "once" => Ok(LoopCount::Once),
        n => n
            .parse::<u16>()
            .map(LoopCount::Times)
            .map_err(|_| format!("expected forever, once, or a count, got {n:?}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load();
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    flipbook_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Export {
            files,
            output,
            scale,
            duration,
            background,
            quality,
            workers,
            repeat,
            report,
        } => {
            let overrides = commands::export::ExportOverrides {
                scale,
                duration,
                background,
                quality,
                workers,
                repeat,
            };
            commands::export::run(config, files, output, overrides, report).await
        }
        Commands::Inspect { files } => commands::inspect::run(config, files),
        Commands::Play {
            files,
            duration,
            seconds,
        } => commands::play::run(config, files, duration, seconds).await,
        Commands::Config { init } => commands::config::run(config, init),
    }
}
