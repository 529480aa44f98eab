// SPDX-License-Identifier: MPL-2.0

//! Shared types for camera backends

use image::RgbaImage;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Which way a camera points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FacingMode {
    /// Front camera, towards the user
    #[default]
    User,
    /// Rear camera
    Environment,
}

impl FacingMode {
    /// The opposite facing mode
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::User => write!(f, "user"),
            FacingMode::Environment => write!(f, "environment"),
        }
    }
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Stable identifier used to request this device
    pub id: String,
    pub name: String,
    /// Facing mode, when the platform reports one
    pub facing: Option<FacingMode>,
}

/// What to ask the platform for when acquiring a camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraRequest {
    /// An exact device
    Device(String),
    /// Any device with this facing mode (a hint the hardware may ignore)
    Facing(FacingMode),
}

impl fmt::Display for CameraRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraRequest::Device(id) => write!(f, "device {}", id),
            CameraRequest::Facing(mode) => write!(f, "facing {}", mode),
        }
    }
}

/// One decoded RGBA frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: Arc<RgbaImage>,
    /// Timestamp when frame was captured
    pub captured_at: Instant,
}

impl Frame {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
            captured_at: Instant::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Latest-frame channel; `None` while no camera is running
pub type FrameFeed = watch::Receiver<Option<Frame>>;

/// An acquired camera: holds the device handle until released
#[derive(Debug)]
pub struct LiveStream {
    device: CameraDevice,
    frames: FrameFeed,
}

impl LiveStream {
    pub fn new(device: CameraDevice, frames: FrameFeed) -> Self {
        Self { device, frames }
    }

    pub fn device(&self) -> &CameraDevice {
        &self.device
    }

    /// Facing mode the stream actually delivers, if known
    pub fn facing(&self) -> Option<FacingMode> {
        self.device.facing
    }

    /// Subscribe to this stream's frames
    pub fn frames(&self) -> FrameFeed {
        self.frames.clone()
    }
}
