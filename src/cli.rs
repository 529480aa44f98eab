// SPDX-License-Identifier: MPL-2.0

//! CLI commands for photobooth operations
//!
//! This module provides command-line functionality for:
//! - Listing filters
//! - Capturing a single photo from an image file
//! - Building a photo strip from several image files
//! - Rendering the live preview against still-image cameras

use clap::Args;
use photobooth::backends::camera::StillImageBackend;
use photobooth::backends::landmarks::StaticLandmarks;
use photobooth::config::Config;
use photobooth::constants::DOWNLOAD_PREFIX;
use photobooth::errors::DetectorError;
use photobooth::pipelines::effects::{BeautyIntensity, DetectorStatus, EffectRenderer, FaceEffect};
use photobooth::pipelines::filters::FilterType;
use photobooth::pipelines::photo::AspectRatio;
use photobooth::session::{CaptureOutcome, PhotoMode, StripCount};
use photobooth::{AppError, Photobooth};
use std::path::PathBuf;
use std::time::{Duration, Instant};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// How long to wait for the render loop to produce an overlay
const OVERLAY_TIMEOUT: Duration = Duration::from_secs(5);

/// Look and face-effect options shared by the commands
#[derive(Args, Debug, Clone)]
pub struct LookArgs {
    /// Filter name (see `photobooth filters`); unknown names mean normal
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Crop ratio: 1:1, 4:5 or 16:9
    #[arg(short, long)]
    pub aspect: Option<AspectRatio>,

    /// Face effect: none, blush, freckles, flowers or glitter
    #[arg(short, long)]
    pub effect: Option<FaceEffect>,

    /// Skin smoothing intensity, 0-100
    #[arg(short, long)]
    pub beauty: Option<i64>,

    /// Landmark JSON file used as the face detector
    #[arg(short, long)]
    pub landmarks: Option<PathBuf>,

    /// Seed for effect randomness (reproducible output)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output directory (default: configured or ~/Pictures/photobooth)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl LookArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(filter) = &self.filter {
            config.filter = FilterType::from_name(filter);
        }
        if let Some(aspect) = self.aspect {
            config.aspect_ratio = aspect;
        }
        if let Some(effect) = self.effect {
            config.face_effect = effect;
        }
        if let Some(beauty) = self.beauty {
            config.beauty_intensity = BeautyIntensity::new(beauty);
        }
        if let Some(output) = &self.output {
            config.output_dir = Some(output.clone());
        }
    }

    fn wants_effects(&self, config: &Config) -> bool {
        self.landmarks.is_some()
            && (config.face_effect != FaceEffect::None || config.beauty_intensity.is_enabled())
    }

    fn renderer(&self) -> EffectRenderer {
        match self.seed {
            Some(seed) => EffectRenderer::seeded(seed),
            None => EffectRenderer::from_entropy(),
        }
    }
}

/// List all filters with their base expressions
pub fn list_filters() -> CliResult {
    println!("Available filters:");
    println!();
    for filter in FilterType::ALL {
        let overlay = if filter.preset().overlay.is_some() {
            " + overlay"
        } else {
            ""
        };
        println!("  {:<12} {}", filter.name(), filter.display_name());
        println!("      {}{}", filter.css(), overlay);
    }
    Ok(())
}

/// Capture one photo from an image file
pub fn capture_photo(frame: PathBuf, look: LookArgs) -> CliResult {
    let mut config = load_config();
    look.apply(&mut config);
    config.photo_mode = PhotoMode::Single;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_capture(config, frame, look))
}

async fn run_capture(config: Config, frame: PathBuf, look: LookArgs) -> CliResult {
    let output_dir = config.resolved_output_dir()?;
    let mut booth = start_booth(config, vec![frame], &look).await?;
    let result = match booth.capture().await {
        Ok(CaptureOutcome::Photo { id }) => booth.export_photo(&id, &output_dir).await,
        Ok(other) => Err(AppError::Config(format!("unexpected capture outcome {:?}", other))),
        Err(e) => Err(e),
    };
    booth.shutdown().await;

    let path = result?;
    println!("Photo saved: {}", path.display());
    Ok(())
}

/// Capture 3 or 4 image files into a strip and export it
pub fn build_strip(frames: Vec<PathBuf>, look: LookArgs) -> CliResult {
    let count = StripCount::try_from(frames.len())?;
    let mut config = load_config();
    look.apply(&mut config);
    config.photo_mode = PhotoMode::Strip;
    config.photos_per_strip = count;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_strip(config, frames, look))
}

async fn run_strip(config: Config, frames: Vec<PathBuf>, look: LookArgs) -> CliResult {
    let output_dir = config.resolved_output_dir()?;
    let count = config.photos_per_strip.get();
    let mut booth = start_booth(config, frames, &look).await?;

    let mut strip_id = None;
    for shot in 0..count {
        if shot > 0 {
            // Each image file is one camera; move on to the next one
            booth.switch_camera().await?;
            wait_for_overlay(&booth, &look).await;
        }
        match booth.capture().await? {
            CaptureOutcome::StripPhotoAdded(progress) => {
                println!("Photo {}/{}", progress.taken, progress.target);
            }
            CaptureOutcome::StripCompleted { id } => {
                println!("Photo {}/{}", count, count);
                strip_id = Some(id);
            }
            CaptureOutcome::Photo { .. } => {}
        }
    }

    let result = match strip_id {
        Some(id) => booth.export_strip(&id, &output_dir).await,
        None => Err(AppError::Config("strip was not completed".into())),
    };
    booth.shutdown().await;

    match result {
        Ok(path) => {
            println!("Strip saved: {}", path.display());
            Ok(())
        }
        Err(AppError::Strip(e)) => Err(e.user_message().into()),
        Err(e) => Err(e.into()),
    }
}

/// Run the live pipeline for a number of ticks and save the preview
pub fn render_preview(cameras: Vec<PathBuf>, ticks: u64, mirror: bool, look: LookArgs) -> CliResult {
    let mut config = load_config();
    look.apply(&mut config);
    config.mirror_preview = mirror;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_preview(config, cameras, ticks, look))
}

async fn run_preview(config: Config, cameras: Vec<PathBuf>, ticks: u64, look: LookArgs) -> CliResult {
    let output_dir = config.resolved_output_dir()?;
    let mut booth = start_booth(config, cameras, &look).await?;
    if let Some(render_loop) = booth.render_loop() {
        let start = Instant::now();
        while render_loop.ticks() < ticks && start.elapsed() < OVERLAY_TIMEOUT {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        if let Some(text) = render_loop.status().indicator() {
            println!("{}", text);
        }
    }

    let preview = booth.preview();
    booth.shutdown().await;
    let preview = preview.ok_or("No camera frame available")?;

    tokio::fs::create_dir_all(&output_dir).await?;
    let path = output_dir.join(format!(
        "{}-preview-{}.png",
        DOWNLOAD_PREFIX,
        chrono::Utc::now().timestamp_millis()
    ));
    tokio::task::spawn_blocking({
        let path = path.clone();
        move || preview.save(path)
    })
    .await??;
    println!("Preview saved: {}", path.display());
    Ok(())
}

fn load_config() -> Config {
    Config::default_path()
        .map(|path| Config::load_or_default(&path))
        .unwrap_or_default()
}

async fn start_booth(
    config: Config,
    cameras: Vec<PathBuf>,
    look: &LookArgs,
) -> Result<Photobooth<StillImageBackend>, Box<dyn std::error::Error>> {
    let wants_effects = look.wants_effects(&config);
    let mut booth = Photobooth::new(config, StillImageBackend::new(cameras));
    if let Err(e) = booth.start_camera().await {
        return Err(format!("{} ({})", e.user_message(), e).into());
    }

    if wants_effects && let Some(path) = look.landmarks.clone() {
        booth.start_effects(detector(path), look.renderer());
        wait_for_overlay(&booth, look).await;
    }
    Ok(booth)
}

async fn detector(path: PathBuf) -> Result<StaticLandmarks, DetectorError> {
    StaticLandmarks::load(&path).await
}

/// Wait until the detector settled and the overlay matches the current frame
async fn wait_for_overlay(booth: &Photobooth<StillImageBackend>, look: &LookArgs) {
    let Some(render_loop) = booth.render_loop() else {
        return;
    };
    let Some(frame) = booth.camera().current_frame() else {
        return;
    };
    let start = Instant::now();
    let baseline = render_loop.ticks();
    while start.elapsed() < OVERLAY_TIMEOUT {
        let status = render_loop.status();
        let aligned = render_loop.overlay().snapshot().dimensions() == frame.image.dimensions();
        match status {
            DetectorStatus::Failed(reason) => {
                eprintln!("Face effects disabled: {}", reason);
                return;
            }
            DetectorStatus::Ready if aligned && render_loop.ticks() > baseline => return,
            _ => tokio::time::sleep(Duration::from_millis(5)).await,
        }
    }
    if look.landmarks.is_some() {
        eprintln!("Face effects not ready, capturing without them");
    }
}
