// SPDX-License-Identifier: MPL-2.0

//! Collaborators at the edge of the photobooth
//!
//! - [`camera`]: camera acquisition, switching and the live frame feed
//! - [`landmarks`]: face landmark detection contract and index layouts

pub mod camera;
pub mod landmarks;
