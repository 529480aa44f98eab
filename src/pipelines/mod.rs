// SPDX-License-Identifier: MPL-2.0

//! Image pipelines for preview, capture and strips
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐
//! │ Camera Frame │ ──▶ │  Effects loop     │ ──▶ overlay surface
//! │   (RGBA)     │     │  - landmarks      │          │
//! └──────┬───────┘     │  - smoothing      │          │
//!        │             │  - one effect     │          │
//!        │             └───────────────────┘          │
//!        ▼                                            ▼
//! ┌───────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Photo Pipeline   │ ──▶ │  PNG photo   │ ──▶ │    Strip     │
//! │  - crop + scale   │     │              │     │  assembler   │
//! │  - filter         │     │              │     │              │
//! │  - watermark      │     │              │     │              │
//! └───────────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`canvas`]: Blending, shape and text primitives on RGBA buffers
//! - [`filters`]: Filter presets shared by preview and capture
//! - [`effects`]: Face-tracked overlay effects and their render loop
//! - [`photo`]: Crop, compose and encode one photo
//! - [`preview`]: Live preview composition
//! - [`strip`]: Photo strip layout and assembly

pub mod canvas;
pub mod effects;
pub mod filters;
pub mod photo;
pub mod preview;
pub mod strip;
