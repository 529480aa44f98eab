// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │    Photobooth app   │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │    CameraManager    │  ← start / switch / stop, frame feed
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackend trait │  ← acquire / release
//! └──────────┬──────────┘
//!            │
//!            ▼
//!     ┌─────────────┐
//!     │ Still image │  ← image files as cameras
//!     └─────────────┘
//! ```

pub mod manager;
pub mod still;
pub mod types;

pub use manager::CameraManager;
pub use still::StillImageBackend;
pub use types::*;

use crate::errors::CameraError;
use std::future::Future;

/// Platform camera access
///
/// A backend hands out [`LiveStream`]s and takes them back. Every acquired
/// stream holds the device until it is passed to [`CameraBackend::release`].
pub trait CameraBackend: Send + Sync {
    /// Enumerate available cameras
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Open a camera for `request`
    fn acquire(
        &self,
        request: &CameraRequest,
    ) -> impl Future<Output = Result<LiveStream, CameraError>> + Send;

    /// Stop a stream and free its device
    fn release(&self, stream: LiveStream);
}
