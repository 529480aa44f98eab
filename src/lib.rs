// SPDX-License-Identifier: MPL-2.0

//! Photobooth - capture, filter and compose photos from a live camera
//!
//! This library provides the core of the photobooth: filter presets,
//! face-tracked overlay effects, single photo capture and photo strip
//! assembly, together with the session state they feed.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Controller wiring camera, render loop, capture and session
//! - [`backends`]: Camera and face landmark collaborators
//! - [`pipelines`]: Filters, effects, photo capture, preview and strips
//! - [`session`]: Captured photos, strips and the strip in progress
//! - [`config`]: User configuration handling
//! - [`storage`]: Download names and file export
//!
//! # Example
//!
//! ```ignore
//! let mut booth = Photobooth::new(Config::default(), StillImageBackend::new(paths));
//! booth.start_camera().await?;
//! let outcome = booth.capture().await?;
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flash;
pub mod pipelines;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use app::Photobooth;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use pipelines::effects::FaceEffect;
pub use pipelines::filters::FilterType;
pub use pipelines::photo::{AspectRatio, EncodedImage};
pub use session::{CaptureOutcome, PhotoMode, Session, StripCount};
