// SPDX-License-Identifier: MPL-2.0

//! Camera lifecycle manager
//!
//! The manager provides:
//! - Start, switch and stop of the live camera
//! - A single frame feed that survives camera switches
//!
//! The running stream is always released before another one is requested,
//! so the manager never holds two device handles at once.

use super::{CameraBackend, CameraDevice, CameraRequest, FacingMode, Frame, FrameFeed, LiveStream};
use crate::errors::CameraError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Owns the active camera stream of one backend
pub struct CameraManager<B: CameraBackend> {
    backend: B,
    devices: Vec<CameraDevice>,
    current_index: usize,
    facing: FacingMode,
    /// Set once a single-device switch asked for a facing mode
    facing_requested: bool,
    active: Option<LiveStream>,
    feed: watch::Sender<Option<Frame>>,
    forwarder: Option<JoinHandle<()>>,
}

impl<B: CameraBackend> CameraManager<B> {
    pub fn new(backend: B) -> Self {
        let (feed, _) = watch::channel(None);
        Self {
            backend,
            devices: Vec::new(),
            current_index: 0,
            facing: FacingMode::User,
            facing_requested: false,
            active: None,
            feed,
            forwarder: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Enumerate cameras and open the first one (or any front camera)
    pub async fn start(&mut self) -> Result<CameraDevice, CameraError> {
        self.devices = self.backend.enumerate_cameras();
        info!(count = self.devices.len(), "Cameras enumerated");
        self.current_index = 0;
        self.facing_requested = false;
        let request = self.request_for_current();
        self.open(request).await
    }

    /// Move to the next camera
    ///
    /// With several devices this cycles through them. With one or none it
    /// alternates the requested facing mode instead.
    pub async fn switch(&mut self) -> Result<CameraDevice, CameraError> {
        if self.devices.len() > 1 {
            self.current_index = (self.current_index + 1) % self.devices.len();
        } else {
            self.facing = self.facing.toggled();
            self.facing_requested = true;
        }
        let request = self.request_for_current();
        info!(%request, "Switching camera");
        self.open(request).await
    }

    /// Release the running camera, if any
    pub fn stop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        if let Some(stream) = self.active.take() {
            self.backend.release(stream);
        }
        self.feed.send_replace(None);
    }

    /// Subscribe to the frames of whichever camera is running
    pub fn frames(&self) -> FrameFeed {
        self.feed.subscribe()
    }

    /// Most recent frame, if a camera is running
    pub fn current_frame(&self) -> Option<Frame> {
        self.feed.borrow().clone()
    }

    pub fn active_device(&self) -> Option<&CameraDevice> {
        self.active.as_ref().map(LiveStream::device)
    }

    pub fn devices(&self) -> &[CameraDevice] {
        &self.devices
    }

    fn request_for_current(&self) -> CameraRequest {
        if (self.devices.len() > 1 || !self.facing_requested)
            && let Some(device) = self.devices.get(self.current_index)
        {
            return CameraRequest::Device(device.id.clone());
        }
        CameraRequest::Facing(self.facing)
    }

    async fn open(&mut self, request: CameraRequest) -> Result<CameraDevice, CameraError> {
        // Free the hardware before asking for the next device
        self.stop();

        let stream = match self.backend.acquire(&request).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(%request, error = %e, "Failed to acquire camera");
                return Err(e);
            }
        };

        if let CameraRequest::Facing(wanted) = &request
            && stream.facing() != Some(*wanted)
        {
            // Keep whatever the device delivers
            info!(
                requested = %wanted,
                device = %stream.device().name,
                "Device did not honor requested facing mode, keeping stream"
            );
        }

        let device = stream.device().clone();
        self.forwarder = Some(spawn_forwarder(stream.frames(), self.feed.clone()));
        self.active = Some(stream);
        info!(device = %device.name, "Camera started");
        Ok(device)
    }
}

impl<B: CameraBackend> Drop for CameraManager<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_forwarder(
    mut source: FrameFeed,
    feed: watch::Sender<Option<Frame>>,
) -> JoinHandle<()> {
    let first = source.borrow_and_update().clone();
    feed.send_replace(first);
    tokio::spawn(async move {
        while source.changed().await.is_ok() {
            let frame = source.borrow_and_update().clone();
            feed.send_replace(frame);
        }
        debug!("Camera frame source closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::StillImageBackend;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    fn write_image(dir: &Path, name: &str, width: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::new(width, 4).save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_switch_cycles_devices_and_releases_first() {
        let dir = tempfile::tempdir().unwrap();
        let backend = StillImageBackend::new([
            write_image(dir.path(), "a.png", 10),
            write_image(dir.path(), "b.png", 20),
        ]);
        let mut manager = CameraManager::new(backend.clone());

        assert_eq!(manager.start().await.unwrap().id, "still-0");
        assert_eq!(manager.current_frame().unwrap().width(), 10);

        assert_eq!(manager.switch().await.unwrap().id, "still-1");
        assert_eq!(manager.current_frame().unwrap().width(), 20);
        assert_eq!(manager.switch().await.unwrap().id, "still-0");

        assert_eq!(backend.peak_open_streams(), 1);
        drop(manager);
        assert_eq!(backend.open_streams(), 0);
    }

    /// Backend that records every request it is handed
    #[derive(Clone, Default)]
    struct RecordingBackend {
        inner: StillImageBackend,
        requests: Arc<Mutex<Vec<CameraRequest>>>,
    }

    impl RecordingBackend {
        fn requests(&self) -> Vec<CameraRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl CameraBackend for RecordingBackend {
        fn enumerate_cameras(&self) -> Vec<CameraDevice> {
            self.inner.enumerate_cameras()
        }

        async fn acquire(&self, request: &CameraRequest) -> Result<LiveStream, CameraError> {
            self.requests.lock().unwrap().push(request.clone());
            self.inner.acquire(request).await
        }

        fn release(&self, stream: LiveStream) {
            self.inner.release(stream);
        }
    }

    #[tokio::test]
    async fn test_single_device_alternates_facing_mode() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend {
            inner: StillImageBackend::new([write_image(dir.path(), "only.png", 8)]),
            ..Default::default()
        };
        let mut manager = CameraManager::new(backend.clone());
        manager.start().await.unwrap();
        // The still image ignores the facing hint; the stream is kept
        assert_eq!(manager.switch().await.unwrap().id, "still-0");
        manager.switch().await.unwrap();

        assert_eq!(
            backend.requests(),
            vec![
                CameraRequest::Device("still-0".into()),
                CameraRequest::Facing(FacingMode::Environment),
                CameraRequest::Facing(FacingMode::User),
            ]
        );
        assert_eq!(backend.inner.open_streams(), 1);

        // A fresh start goes back to the enumerated device
        manager.start().await.unwrap();
        assert_eq!(
            backend.requests().last(),
            Some(&CameraRequest::Device("still-0".into()))
        );
    }

    #[tokio::test]
    async fn test_multiple_devices_never_request_facing() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend {
            inner: StillImageBackend::new([
                write_image(dir.path(), "a.png", 10),
                write_image(dir.path(), "b.png", 20),
            ]),
            ..Default::default()
        };
        let mut manager = CameraManager::new(backend.clone());
        manager.start().await.unwrap();
        manager.switch().await.unwrap();
        assert!(
            backend
                .requests()
                .iter()
                .all(|request| matches!(request, CameraRequest::Device(_)))
        );
    }

    #[tokio::test]
    async fn test_stop_clears_feed() {
        let dir = tempfile::tempdir().unwrap();
        let backend = StillImageBackend::new([write_image(dir.path(), "a.png", 8)]);
        let mut manager = CameraManager::new(backend.clone());
        let feed = manager.frames();
        manager.start().await.unwrap();
        assert!(feed.borrow().is_some());
        manager.stop();
        assert!(feed.borrow().is_none());
        assert_eq!(backend.open_streams(), 0);
    }

    #[tokio::test]
    async fn test_start_without_devices_fails() {
        let mut manager = CameraManager::new(StillImageBackend::new(Vec::new()));
        assert_eq!(manager.start().await.unwrap_err(), CameraError::NoCameraFound);
        assert!(manager.current_frame().is_none());
    }
}
