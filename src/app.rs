// SPDX-License-Identifier: MPL-2.0

//! Photobooth controller
//!
//! Wires the camera, the face-effect render loop, the capture pipeline and
//! the session together. Every method here corresponds to one user action
//! or lifecycle event; the render loop is the only thing running on its own.

use crate::backends::camera::{CameraBackend, CameraDevice, CameraManager};
use crate::backends::landmarks::LandmarkProvider;
use crate::config::Config;
use crate::errors::{AppResult, CameraError, DetectorError, PhotoError, StripError};
use crate::flash::FlashIndicator;
use crate::pipelines::effects::{
    BeautyIntensity, DetectorStatus, EffectRenderer, FaceEffect, RenderLoopHandle,
    RenderLoopOptions, RenderSettings, spawn_render_loop,
};
use crate::pipelines::filters::FilterType;
use crate::pipelines::photo::{self, AspectRatio, CaptureSettings, EncodedImage};
use crate::pipelines::{preview, strip};
use crate::session::{CaptureOutcome, PhotoMode, Session, StripCount};
use crate::storage::{self, DownloadKind};
use image::RgbaImage;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// One running photobooth
pub struct Photobooth<B: CameraBackend> {
    config: Config,
    camera: CameraManager<B>,
    camera_error: Option<CameraError>,
    render_settings: watch::Sender<RenderSettings>,
    render_loop: Option<RenderLoopHandle>,
    session: Session,
    flash: FlashIndicator,
}

impl<B: CameraBackend> Photobooth<B> {
    pub fn new(config: Config, backend: B) -> Self {
        let (render_settings, _) = watch::channel(RenderSettings {
            effect: config.face_effect,
            beauty: config.beauty_intensity,
        });
        let session = Session::new(config.photo_mode, config.photos_per_strip);
        Self {
            config,
            camera: CameraManager::new(backend),
            camera_error: None,
            render_settings,
            render_loop: None,
            session,
            flash: FlashIndicator::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn camera(&self) -> &CameraManager<B> {
        &self.camera
    }

    pub fn flash(&self) -> &FlashIndicator {
        &self.flash
    }

    /// Open the default camera
    ///
    /// A failure leaves the booth running without a live frame; the error
    /// stays available through [`Photobooth::camera_notice`].
    pub async fn start_camera(&mut self) -> Result<CameraDevice, CameraError> {
        let result = self.camera.start().await;
        self.record_camera_result(&result);
        result
    }

    /// Move to the next camera or facing mode
    pub async fn switch_camera(&mut self) -> Result<CameraDevice, CameraError> {
        let result = self.camera.switch().await;
        self.record_camera_result(&result);
        result
    }

    fn record_camera_result(&mut self, result: &Result<CameraDevice, CameraError>) {
        match result {
            Ok(_) => self.camera_error = None,
            Err(e) => {
                error!(error = %e, "Camera unavailable");
                self.camera_error = Some(e.clone());
            }
        }
    }

    /// Blocking notice to show while the camera is unusable
    pub fn camera_notice(&self) -> Option<&'static str> {
        self.camera_error.as_ref().map(CameraError::user_message)
    }

    /// Start face tracking with a one-shot detector acquisition
    ///
    /// Replaces any running render loop.
    pub fn start_effects<P, F>(&mut self, detector: F, renderer: EffectRenderer)
    where
        P: LandmarkProvider + 'static,
        F: Future<Output = Result<P, DetectorError>> + Send + 'static,
    {
        if let Some(previous) = self.render_loop.take() {
            previous.cancel();
        }
        let options = RenderLoopOptions {
            interval: Duration::from_millis(self.config.render_interval_ms.max(1)),
        };
        self.render_loop = Some(spawn_render_loop(
            self.camera.frames(),
            detector,
            self.render_settings.subscribe(),
            renderer,
            options,
        ));
    }

    /// Face tracking status; `Loading` until effects are started
    pub fn detector_status(&self) -> DetectorStatus {
        self.render_loop
            .as_ref()
            .map(RenderLoopHandle::status)
            .unwrap_or_default()
    }

    pub fn render_loop(&self) -> Option<&RenderLoopHandle> {
        self.render_loop.as_ref()
    }

    pub fn set_filter(&mut self, filter: FilterType) {
        info!(filter = filter.name(), "Filter selected");
        self.config.filter = filter;
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        info!(aspect = %aspect_ratio, "Aspect ratio selected");
        self.config.aspect_ratio = aspect_ratio;
    }

    pub fn set_face_effect(&mut self, effect: FaceEffect) {
        info!(effect = effect.name(), "Face effect selected");
        self.config.face_effect = effect;
        self.render_settings.send_modify(|s| s.effect = effect);
    }

    pub fn set_beauty_intensity(&mut self, beauty: BeautyIntensity) {
        self.config.beauty_intensity = beauty;
        self.render_settings.send_modify(|s| s.beauty = beauty);
    }

    pub fn set_mirror_preview(&mut self, mirror: bool) {
        self.config.mirror_preview = mirror;
    }

    pub fn set_photo_mode(&mut self, mode: PhotoMode) {
        info!(mode = mode.name(), "Photo mode selected");
        self.config.photo_mode = mode;
        self.session.set_mode(mode);
    }

    /// Change photos per strip; returns the id of a strip sealed by the change
    pub fn set_photos_per_strip(&mut self, count: StripCount) -> Option<String> {
        self.config.photos_per_strip = count;
        self.session.set_photos_per_strip(count)
    }

    pub fn reset_current_strip(&mut self) -> usize {
        self.session.reset_current_strip()
    }

    pub fn delete_photo(&mut self, id: &str) -> Result<(), PhotoError> {
        self.session.delete_photo(id).map(|_| ())
    }

    pub fn delete_strip(&mut self, id: &str) -> Result<(), StripError> {
        self.session.delete_strip(id).map(|_| ())
    }

    fn overlay_snapshot(&self) -> Option<std::sync::Arc<RgbaImage>> {
        self.render_loop.as_ref().map(|r| r.overlay().snapshot())
    }

    /// Current live preview: filtered frame, overlay, optional mirror
    pub fn preview(&self) -> Option<RgbaImage> {
        let frame = self.camera.current_frame()?;
        let overlay = self.overlay_snapshot();
        Some(preview::compose_preview(
            &frame.image,
            self.config.filter,
            overlay.as_deref(),
            self.config.mirror_preview,
        ))
    }

    /// Take a photo from the current frame and route it into the session
    pub async fn capture(&mut self) -> AppResult<CaptureOutcome> {
        let frame = self
            .camera
            .current_frame()
            .ok_or(PhotoError::NoFrameAvailable)?;
        self.flash.fire();

        let settings = CaptureSettings {
            filter: self.config.filter,
            aspect_ratio: self.config.aspect_ratio,
        };
        let image = photo::capture_photo(frame.image, self.overlay_snapshot(), settings).await?;
        let outcome = self.session.record_capture(image);
        info!(?outcome, "Capture stored");
        Ok(outcome)
    }

    /// Encoded strip ready for download
    pub async fn assemble_strip(&self, id: &str) -> Result<EncodedImage, StripError> {
        let strip = self
            .session
            .strip(id)
            .ok_or_else(|| StripError::NotFound(id.to_string()))?;
        strip::assemble_strip(strip).await
    }

    /// Write a single photo to `dir` under its download name
    pub async fn export_photo(&self, id: &str, dir: &Path) -> AppResult<PathBuf> {
        let photo = self
            .session
            .photo(id)
            .ok_or_else(|| PhotoError::NotFound(id.to_string()))?;
        let filename = storage::download_filename(DownloadKind::Photo, photo.captured_at);
        storage::export_to_dir(dir, &filename, &photo.image).await
    }

    /// Assemble a strip and write it to `dir` under its download name
    pub async fn export_strip(&self, id: &str, dir: &Path) -> AppResult<PathBuf> {
        let strip = self
            .session
            .strip(id)
            .ok_or_else(|| StripError::NotFound(id.to_string()))?;
        let image = strip::assemble_strip(strip).await.inspect_err(|e| {
            warn!(id, error = %e, notice = e.user_message(), "Strip download failed");
        })?;
        let filename = storage::download_filename(DownloadKind::Strip, strip.created_at());
        storage::export_to_dir(dir, &filename, &image).await
    }

    /// Stop the render loop and release the camera
    pub async fn shutdown(&mut self) {
        if let Some(render_loop) = self.render_loop.take() {
            render_loop.shutdown().await;
        }
        self.camera.stop();
        info!("Photobooth stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::StillImageBackend;
    use image::Rgba;

    fn write_frame(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(64, 48, Rgba([120, 130, 140, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_capture_without_camera_fails() {
        let mut booth = Photobooth::new(Config::default(), StillImageBackend::default());
        assert!(booth.start_camera().await.is_err());
        assert!(booth.camera_notice().is_some());
        assert!(booth.capture().await.is_err());
        assert!(booth.session().photos().is_empty());
    }

    #[tokio::test]
    async fn test_single_capture_lands_in_session() {
        let dir = tempfile::tempdir().unwrap();
        let frame = write_frame(dir.path(), "cam.png");
        let config = Config {
            photo_mode: PhotoMode::Single,
            aspect_ratio: AspectRatio::Widescreen,
            ..Config::default()
        };
        let mut booth = Photobooth::new(config, StillImageBackend::new([frame]));
        booth.start_camera().await.unwrap();

        let outcome = booth.capture().await.unwrap();
        let CaptureOutcome::Photo { id } = outcome else {
            panic!("expected single photo, got {:?}", outcome);
        };
        let photo = booth.session().photo(&id).unwrap();
        assert_eq!((photo.image.width, photo.image.height), (1080, 608));

        let out = dir.path().join("exports");
        let path = booth.export_photo(&id, &out).await.unwrap();
        assert!(path.exists());
        booth.shutdown().await;
    }
}
