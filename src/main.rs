// SPDX-License-Identifier: MPL-2.0

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Photobooth with filters, face effects and photo strips")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available filters
    Filters,

    /// Capture a photo from an image file
    Capture {
        /// Image used as the camera frame
        #[arg(long)]
        frame: PathBuf,

        #[command(flatten)]
        look: cli::LookArgs,
    },

    /// Capture 3 or 4 image files into a photo strip
    Strip {
        /// Images used as camera frames, one per strip photo
        #[arg(long, num_args = 3..=4, required = true)]
        frames: Vec<PathBuf>,

        #[command(flatten)]
        look: cli::LookArgs,
    },

    /// Render the live preview from still-image cameras
    Preview {
        /// Images exposed as cameras
        #[arg(long, num_args = 1.., required = true)]
        camera: Vec<PathBuf>,

        /// Render loop ticks to run before saving
        #[arg(long, default_value = "3")]
        ticks: u64,

        /// Do not mirror the preview
        #[arg(long)]
        no_mirror: bool,

        #[command(flatten)]
        look: cli::LookArgs,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photobooth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Filters => cli::list_filters(),
        Commands::Capture { frame, look } => cli::capture_photo(frame, look),
        Commands::Strip { frames, look } => cli::build_strip(frames, look),
        Commands::Preview {
            camera,
            ticks,
            no_mirror,
            look,
        } => cli::render_preview(camera, ticks, !no_mirror, look),
    }
}
