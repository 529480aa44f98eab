// SPDX-License-Identifier: MPL-2.0

//! Cancellable render loop for the face-effect overlay
//!
//! One tokio task owns the overlay surface. It waits for the one-shot
//! detector acquisition, then on every tick pulls the latest camera frame,
//! runs a detection pass and redraws the surface. Readers (capture, preview)
//! take cheap snapshots through [`OverlaySurface`] and never mutate it.
//!
//! Settings arrive through a watch channel and are read once per tick.
//! Cancelling the returned handle stops the task; a detector that finishes
//! loading after that is dropped without being used.

use super::{EffectRenderer, RenderSettings, prepare_surface};
use crate::backends::camera::FrameFeed;
use crate::backends::landmarks::LandmarkProvider;
use crate::constants::DEFAULT_RENDER_INTERVAL_MS;
use crate::errors::DetectorError;
use image::RgbaImage;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

/// Face tracking availability, shown as a small status indicator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetectorStatus {
    /// Detector still being acquired
    #[default]
    Loading,
    Ready,
    /// Acquisition failed; effects stay off for the rest of the session
    Failed(String),
}

impl DetectorStatus {
    /// Indicator text, `None` when nothing needs to be shown
    pub fn indicator(&self) -> Option<&'static str> {
        match self {
            DetectorStatus::Loading => Some("Loading AR…"),
            DetectorStatus::Ready => None,
            DetectorStatus::Failed(_) => Some("AR unavailable"),
        }
    }
}

/// Read side of the overlay surface
#[derive(Debug, Clone, Default)]
pub struct OverlaySurface(Arc<RwLock<Arc<RgbaImage>>>);

impl OverlaySurface {
    /// The surface as of the last completed tick
    pub fn snapshot(&self) -> Arc<RgbaImage> {
        let guard = self.0.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swap in a new surface and hand back the one it replaces
    fn publish(&self, surface: Arc<RgbaImage>) -> Arc<RgbaImage> {
        let mut guard = self.0.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, surface)
    }
}

/// Render loop tuning
#[derive(Debug, Clone, Copy)]
pub struct RenderLoopOptions {
    /// Time between ticks (one display refresh by default)
    pub interval: Duration,
}

impl Default for RenderLoopOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_RENDER_INTERVAL_MS),
        }
    }
}

/// Handle to a running render loop; dropping it stops the loop
pub struct RenderLoopHandle {
    shutdown: watch::Sender<bool>,
    status: watch::Receiver<DetectorStatus>,
    overlay: OverlaySurface,
    ticks: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl RenderLoopHandle {
    pub fn overlay(&self) -> OverlaySurface {
        self.overlay.clone()
    }

    pub fn status(&self) -> DetectorStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to detector status changes
    pub fn status_receiver(&self) -> watch::Receiver<DetectorStatus> {
        self.status.clone()
    }

    /// Number of completed ticks
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Ask the loop to stop; no tick starts after this returns
    pub fn cancel(&self) {
        self.shutdown.send_replace(true);
    }

    /// Cancel and wait for the task to finish
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
            && !e.is_cancelled()
        {
            warn!(error = %e, "Render loop task failed");
        }
    }
}

impl Drop for RenderLoopHandle {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Start the render loop on the current tokio runtime
///
/// `detector` is the one-shot detector acquisition. Until it resolves the
/// overlay is kept cleared at the frame size.
pub fn spawn_render_loop<P, F>(
    frames: FrameFeed,
    detector: F,
    settings: watch::Receiver<RenderSettings>,
    renderer: EffectRenderer,
    options: RenderLoopOptions,
) -> RenderLoopHandle
where
    P: LandmarkProvider + 'static,
    F: Future<Output = Result<P, DetectorError>> + Send + 'static,
{
    let (shutdown, shutdown_rx) = watch::channel(false);
    let (status_tx, status) = watch::channel(DetectorStatus::Loading);
    let overlay = OverlaySurface::default();
    let ticks = Arc::new(AtomicU64::new(0));

    let state = LoopState {
        frames,
        settings,
        renderer,
        overlay: overlay.clone(),
        status: status_tx,
        ticks: Arc::clone(&ticks),
        detector: None,
        spare: None,
        started: Instant::now(),
    };

    info!(interval_ms = options.interval.as_millis() as u64, "Starting render loop");
    let task = tokio::spawn(state.run(detector, shutdown_rx, options));

    RenderLoopHandle {
        shutdown,
        status,
        overlay,
        ticks,
        task: Some(task),
    }
}

struct LoopState<P> {
    frames: FrameFeed,
    settings: watch::Receiver<RenderSettings>,
    renderer: EffectRenderer,
    overlay: OverlaySurface,
    status: watch::Sender<DetectorStatus>,
    ticks: Arc<AtomicU64>,
    detector: Option<P>,
    /// Previously published surface, reused once no reader holds it
    spare: Option<Arc<RgbaImage>>,
    started: Instant,
}

impl<P: LandmarkProvider> LoopState<P> {
    async fn run<F>(
        mut self,
        acquisition: F,
        mut shutdown: watch::Receiver<bool>,
        options: RenderLoopOptions,
    ) where
        F: Future<Output = Result<P, DetectorError>>,
    {
        let mut ticker = tokio::time::interval(options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut acquisition = std::pin::pin!(acquisition);
        let mut acquiring = true;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                result = &mut acquisition, if acquiring => {
                    acquiring = false;
                    self.on_detector(result);
                }
                _ = ticker.tick() => {
                    if *shutdown.borrow() {
                        break;
                    }
                    self.tick();
                }
            }
        }
        debug!(ticks = self.ticks.load(Ordering::SeqCst), "Render loop stopped");
    }

    fn on_detector(&mut self, result: Result<P, DetectorError>) {
        match result {
            Ok(provider) => {
                info!(layout = provider.layout().name, "Face landmark detector ready");
                self.renderer.set_layout(provider.layout());
                self.detector = Some(provider);
                self.status.send_replace(DetectorStatus::Ready);
            }
            Err(e) => {
                warn!(error = %e, "Face landmark detector unavailable, effects disabled");
                self.status.send_replace(DetectorStatus::Failed(e.to_string()));
            }
        }
    }

    fn tick(&mut self) {
        let Some(frame) = self.frames.borrow().clone() else {
            return;
        };
        let (width, height) = (frame.width(), frame.height());
        if width == 0 || height == 0 {
            return;
        }

        let settings = *self.settings.borrow();
        let mut surface = back_buffer(self.spare.take(), width, height);
        match self.detector.as_mut() {
            None => prepare_surface(&mut surface, width, height),
            Some(detector) => {
                let timestamp_ms = self.started.elapsed().as_secs_f64() * 1000.0;
                let faces = detector.detect(&frame.image, timestamp_ms).unwrap_or_else(|e| {
                    // Expected while the model warms up
                    trace!(error = %e, "Detection failed, treating as no face");
                    Vec::new()
                });
                let passes = self.renderer.render(&mut surface, &frame.image, &faces, settings);
                trace!(?passes, faces = faces.len(), "Overlay redrawn");
            }
        }

        self.spare = Some(self.overlay.publish(Arc::new(surface)));
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
}

/// Buffer to draw the next surface into
///
/// Reuses `spare` when no snapshot still points at it. The contents are
/// stale either way; the renderer clears them.
fn back_buffer(spare: Option<Arc<RgbaImage>>, width: u32, height: u32) -> RgbaImage {
    spare
        .and_then(|spare| Arc::try_unwrap(spare).ok())
        .unwrap_or_else(|| RgbaImage::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_back_buffer_reuses_unshared_surface() {
        let overlay = OverlaySurface::default();
        let first = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 4]));
        let first_ptr = first.as_raw().as_ptr();
        overlay.publish(Arc::new(first));

        let spare = overlay.publish(Arc::new(RgbaImage::new(4, 4)));
        let reused = back_buffer(Some(spare), 4, 4);
        assert_eq!(reused.as_raw().as_ptr(), first_ptr);
    }

    #[test]
    fn test_back_buffer_leaves_held_snapshot_untouched() {
        let overlay = OverlaySurface::default();
        overlay.publish(Arc::new(RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]))));
        let snapshot = overlay.snapshot();

        let spare = overlay.publish(Arc::new(RgbaImage::new(4, 4)));
        let mut fresh = back_buffer(Some(spare), 4, 4);
        assert_eq!(fresh.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        fresh.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        assert_eq!(snapshot.get_pixel(0, 0), &Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn test_back_buffer_allocates_first_surface() {
        assert_eq!(back_buffer(None, 6, 3).dimensions(), (6, 3));
    }
}
