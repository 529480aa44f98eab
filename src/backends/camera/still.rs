// SPDX-License-Identifier: MPL-2.0

//! Image files exposed as cameras
//!
//! Each file is one device that keeps delivering the same frame. Open
//! streams are counted so callers can verify no two handles overlap.

use super::{CameraBackend, CameraDevice, CameraRequest, Frame, LiveStream};
use crate::errors::CameraError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct HandleCount {
    open: AtomicUsize,
    peak: AtomicUsize,
}

/// Camera backend over still image files
#[derive(Debug, Clone, Default)]
pub struct StillImageBackend {
    sources: Vec<(CameraDevice, PathBuf)>,
    handles: Arc<HandleCount>,
}

impl StillImageBackend {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let sources = paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("Image {}", index + 1));
                let device = CameraDevice {
                    id: format!("still-{}", index),
                    name,
                    facing: None,
                };
                (device, path)
            })
            .collect();
        Self {
            sources,
            handles: Arc::default(),
        }
    }

    /// Streams currently held
    pub fn open_streams(&self) -> usize {
        self.handles.open.load(Ordering::SeqCst)
    }

    /// Highest number of streams ever held at the same time
    pub fn peak_open_streams(&self) -> usize {
        self.handles.peak.load(Ordering::SeqCst)
    }

    fn source_for(&self, request: &CameraRequest) -> Result<&(CameraDevice, PathBuf), CameraError> {
        match request {
            CameraRequest::Device(id) => self
                .sources
                .iter()
                .find(|(device, _)| &device.id == id)
                .ok_or_else(|| CameraError::UnknownDevice(id.clone())),
            // Image files have no facing; any request resolves to the first one
            CameraRequest::Facing(_) => self.sources.first().ok_or(CameraError::NoCameraFound),
        }
    }
}

async fn load_frame(path: &Path) -> Result<Frame, CameraError> {
    let owned = path.to_path_buf();
    let image = tokio::task::spawn_blocking(move || image::open(&owned).map(|img| img.to_rgba8()))
        .await
        .map_err(|e| CameraError::InitializationFailed(e.to_string()))?
        .map_err(|e| open_error(path, e))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(CameraError::InitializationFailed(format!(
            "{}: empty image",
            path.display()
        )));
    }
    Ok(Frame::new(image))
}

fn open_error(path: &Path, error: image::ImageError) -> CameraError {
    match &error {
        image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            warn!(path = %path.display(), "Camera source is not readable");
            CameraError::PermissionDenied
        }
        _ => CameraError::InitializationFailed(format!("{}: {}", path.display(), error)),
    }
}

impl CameraBackend for StillImageBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        self.sources.iter().map(|(device, _)| device.clone()).collect()
    }

    async fn acquire(&self, request: &CameraRequest) -> Result<LiveStream, CameraError> {
        let (device, path) = self.source_for(request)?;
        info!(device = %device.name, %request, "Opening still image camera");

        let frame = load_frame(path).await?;
        debug!(width = frame.width(), height = frame.height(), "Still frame loaded");

        let open = self.handles.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.handles.peak.fetch_max(open, Ordering::SeqCst);

        let (_sender, frames) = watch::channel(Some(frame));
        Ok(LiveStream::new(device.clone(), frames))
    }

    fn release(&self, stream: LiveStream) {
        info!(device = %stream.device().name, "Releasing still image camera");
        let _ = self
            .handles
            .open
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::FacingMode;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::new(width, height).save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_acquire_by_device_and_facing() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_image(dir.path(), "a.png", 8, 6);
        let b = write_image(dir.path(), "b.png", 4, 4);
        let backend = StillImageBackend::new([a, b]);

        let stream = backend
            .acquire(&CameraRequest::Device("still-1".into()))
            .await
            .unwrap();
        assert_eq!(stream.frames().borrow().as_ref().unwrap().width(), 4);
        assert_eq!(backend.open_streams(), 1);
        backend.release(stream);
        assert_eq!(backend.open_streams(), 0);

        let stream = backend
            .acquire(&CameraRequest::Facing(FacingMode::Environment))
            .await
            .unwrap();
        assert_eq!(stream.device().id, "still-0");
        assert_eq!(stream.facing(), None);
        backend.release(stream);
    }

    #[test]
    fn test_unreadable_source_reports_permission_denied() {
        let denied = image::ImageError::IoError(std::io::ErrorKind::PermissionDenied.into());
        assert_eq!(
            open_error(Path::new("cam.png"), denied),
            CameraError::PermissionDenied
        );
        let missing = image::ImageError::IoError(std::io::ErrorKind::NotFound.into());
        assert!(matches!(
            open_error(Path::new("cam.png"), missing),
            CameraError::InitializationFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_devices() {
        let backend = StillImageBackend::new(Vec::new());
        assert_eq!(
            backend
                .acquire(&CameraRequest::Facing(FacingMode::User))
                .await
                .unwrap_err(),
            CameraError::NoCameraFound
        );
        let dir = tempfile::tempdir().unwrap();
        let backend = StillImageBackend::new([dir.path().join("missing.png")]);
        assert!(matches!(
            backend.acquire(&CameraRequest::Device("still-0".into())).await,
            Err(CameraError::InitializationFailed(_))
        ));
        assert!(matches!(
            backend.acquire(&CameraRequest::Device("still-9".into())).await,
            Err(CameraError::UnknownDevice(_))
        ));
        assert_eq!(backend.open_streams(), 0);
    }
}
