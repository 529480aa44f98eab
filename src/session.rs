// SPDX-License-Identifier: MPL-2.0

//! Session state: captured photos, finished strips and the strip in progress
//!
//! Everything here is owned values. A photo or strip never changes after it
//! is stored; the only mutations are add, remove and reset, each issued by a
//! user action.

use crate::errors::{PhotoError, StripError};
use crate::pipelines::photo::EncodedImage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Where a capture goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoMode {
    /// Each capture is a standalone photo
    Single,
    /// Captures fill a strip of 3 or 4 photos
    #[default]
    Strip,
}

impl PhotoMode {
    pub const ALL: [PhotoMode; 2] = [PhotoMode::Single, PhotoMode::Strip];

    pub fn name(self) -> &'static str {
        match self {
            PhotoMode::Single => "single",
            PhotoMode::Strip => "strip",
        }
    }
}

impl FromStr for PhotoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown photo mode '{}'", s))
    }
}

/// Photos per strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StripCount {
    Three,
    #[default]
    Four,
}

impl StripCount {
    pub fn get(self) -> usize {
        match self {
            StripCount::Three => 3,
            StripCount::Four => 4,
        }
    }
}

impl TryFrom<usize> for StripCount {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(StripCount::Three),
            4 => Ok(StripCount::Four),
            other => Err(format!("a strip holds 3 or 4 photos, not {}", other)),
        }
    }
}

impl TryFrom<u8> for StripCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        StripCount::try_from(value as usize)
    }
}

impl From<StripCount> for u8 {
    fn from(count: StripCount) -> Self {
        count.get() as u8
    }
}

impl fmt::Display for StripCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// A standalone captured photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    pub id: String,
    pub image: EncodedImage,
    pub captured_at: DateTime<Utc>,
}

/// A photo taken for a strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripPhoto {
    pub id: String,
    pub image: EncodedImage,
}

/// A sealed strip of exactly 3 or 4 photos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoStrip {
    id: String,
    photos: Vec<StripPhoto>,
    created_at: DateTime<Utc>,
}

impl PhotoStrip {
    /// Seal `photos` into a strip; only 3 or 4 photos are accepted
    pub fn new(photos: Vec<StripPhoto>, created_at: DateTime<Utc>) -> Result<Self, StripError> {
        StripCount::try_from(photos.len()).map_err(|_| StripError::UnsupportedCount(photos.len()))?;
        Ok(Self {
            id: new_id(created_at),
            photos,
            created_at,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Photos in capture order
    pub fn photos(&self) -> &[StripPhoto] {
        &self.photos
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Strip in progress: `taken` of `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripProgress {
    pub taken: usize,
    pub target: usize,
}

/// What happened to a capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Stored as a single photo
    Photo { id: String },
    /// Added to the strip in progress
    StripPhotoAdded(StripProgress),
    /// The capture completed a strip
    StripCompleted { id: String },
}

/// Photos, strips and mode selections of one booth session
#[derive(Debug, Clone, Default)]
pub struct Session {
    mode: PhotoMode,
    per_strip: StripCount,
    photos: Vec<CapturedPhoto>,
    strips: Vec<PhotoStrip>,
    current_strip: Vec<StripPhoto>,
}

impl Session {
    pub fn new(mode: PhotoMode, per_strip: StripCount) -> Self {
        Self {
            mode,
            per_strip,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> PhotoMode {
        self.mode
    }

    /// Switch capture routing; a strip in progress is kept
    pub fn set_mode(&mut self, mode: PhotoMode) {
        self.mode = mode;
    }

    pub fn photos_per_strip(&self) -> StripCount {
        self.per_strip
    }

    /// Change the strip size
    ///
    /// If the strip in progress already holds enough photos for the new
    /// size, the first ones are sealed right away and the id is returned.
    pub fn set_photos_per_strip(&mut self, count: StripCount) -> Option<String> {
        self.per_strip = count;
        self.seal_if_full(Utc::now())
    }

    /// Newest first
    pub fn photos(&self) -> &[CapturedPhoto] {
        &self.photos
    }

    /// Newest first
    pub fn strips(&self) -> &[PhotoStrip] {
        &self.strips
    }

    /// Photos of the strip in progress, in capture order
    pub fn current_strip_photos(&self) -> &[StripPhoto] {
        &self.current_strip
    }

    pub fn progress(&self) -> StripProgress {
        StripProgress {
            taken: self.current_strip.len(),
            target: self.per_strip.get(),
        }
    }

    pub fn photo(&self, id: &str) -> Option<&CapturedPhoto> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn strip(&self, id: &str) -> Option<&PhotoStrip> {
        self.strips.iter().find(|s| s.id == id)
    }

    /// Route a finished capture according to the current mode
    pub fn record_capture(&mut self, image: EncodedImage) -> CaptureOutcome {
        self.record_capture_at(image, Utc::now())
    }

    /// Same as [`Session::record_capture`] with an explicit capture time
    pub fn record_capture_at(&mut self, image: EncodedImage, at: DateTime<Utc>) -> CaptureOutcome {
        let id = new_id(at);
        match self.mode {
            PhotoMode::Single => {
                debug!(%id, "Photo added");
                self.photos.insert(
                    0,
                    CapturedPhoto {
                        id: id.clone(),
                        image,
                        captured_at: at,
                    },
                );
                CaptureOutcome::Photo { id }
            }
            PhotoMode::Strip => {
                self.current_strip.push(StripPhoto { id, image });
                match self.seal_if_full(at) {
                    Some(id) => CaptureOutcome::StripCompleted { id },
                    None => CaptureOutcome::StripPhotoAdded(self.progress()),
                }
            }
        }
    }

    /// Remove one photo; the others keep their order
    pub fn delete_photo(&mut self, id: &str) -> Result<CapturedPhoto, PhotoError> {
        let index = self
            .photos
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PhotoError::NotFound(id.to_string()))?;
        Ok(self.photos.remove(index))
    }

    /// Remove one strip; the others keep their order
    pub fn delete_strip(&mut self, id: &str) -> Result<PhotoStrip, StripError> {
        let index = self
            .strips
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StripError::NotFound(id.to_string()))?;
        Ok(self.strips.remove(index))
    }

    /// Discard the strip in progress; returns how many photos were dropped
    pub fn reset_current_strip(&mut self) -> usize {
        let dropped = self.current_strip.len();
        self.current_strip.clear();
        if dropped > 0 {
            info!(dropped, "Strip in progress discarded");
        }
        dropped
    }

    fn seal_if_full(&mut self, at: DateTime<Utc>) -> Option<String> {
        let target = self.per_strip.get();
        if self.current_strip.len() < target {
            return None;
        }
        let photos: Vec<StripPhoto> = self.current_strip.drain(..target).collect();
        // Length is exactly the target, 3 or 4
        let strip = PhotoStrip::new(photos, at).ok()?;
        let id = strip.id.clone();
        info!(%id, photos = target, "Photo strip completed");
        self.strips.insert(0, strip);
        Some(id)
    }
}

/// Time-derived unique identifier: `<millis>-<8 hex>`
fn new_id(at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", at.timestamp_millis(), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(tag: u32) -> EncodedImage {
        EncodedImage {
            data: tag.to_le_bytes().to_vec(),
            width: tag,
            height: 1,
        }
    }

    #[test]
    fn test_single_mode_prepends() {
        let mut session = Session::new(PhotoMode::Single, StripCount::Four);
        session.record_capture(image(1));
        session.record_capture(image(2));
        let widths: Vec<u32> = session.photos().iter().map(|p| p.image.width).collect();
        assert_eq!(widths, vec![2, 1]);
        assert!(session.strips().is_empty());
    }

    #[test]
    fn test_strip_seals_at_target() {
        let mut session = Session::new(PhotoMode::Strip, StripCount::Three);
        assert_eq!(
            session.record_capture(image(1)),
            CaptureOutcome::StripPhotoAdded(StripProgress { taken: 1, target: 3 })
        );
        session.record_capture(image(2));
        let outcome = session.record_capture(image(3));
        let CaptureOutcome::StripCompleted { id } = outcome else {
            panic!("expected a completed strip, got {:?}", outcome);
        };
        let strip = session.strip(&id).unwrap();
        let widths: Vec<u32> = strip.photos().iter().map(|p| p.image.width).collect();
        assert_eq!(widths, vec![1, 2, 3]);
        assert!(session.current_strip_photos().is_empty());
    }

    #[test]
    fn test_shrinking_count_seals_full_buffer() {
        let mut session = Session::new(PhotoMode::Strip, StripCount::Four);
        for i in 0..3 {
            session.record_capture(image(i));
        }
        let sealed = session.set_photos_per_strip(StripCount::Three);
        assert!(sealed.is_some());
        assert_eq!(session.strips()[0].photos().len(), 3);
        assert_eq!(session.progress(), StripProgress { taken: 0, target: 3 });
    }

    #[test]
    fn test_growing_count_keeps_buffer() {
        let mut session = Session::new(PhotoMode::Strip, StripCount::Three);
        session.record_capture(image(1));
        session.record_capture(image(2));
        assert_eq!(session.set_photos_per_strip(StripCount::Four), None);
        assert_eq!(session.progress(), StripProgress { taken: 2, target: 4 });
    }

    #[test]
    fn test_reset_and_unknown_deletes() {
        let mut session = Session::default();
        session.record_capture(image(1));
        assert_eq!(session.reset_current_strip(), 1);
        assert_eq!(session.reset_current_strip(), 0);
        assert!(matches!(session.delete_photo("nope"), Err(PhotoError::NotFound(_))));
        assert!(matches!(session.delete_strip("nope"), Err(StripError::NotFound(_))));
    }

    #[test]
    fn test_strip_rejects_other_sizes() {
        let photos = vec![
            StripPhoto {
                id: "a".into(),
                image: image(1),
            };
            5
        ];
        assert_eq!(
            PhotoStrip::new(photos, Utc::now()).unwrap_err(),
            StripError::UnsupportedCount(5)
        );
    }

    #[test]
    fn test_ids_are_time_prefixed_and_unique() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let a = new_id(at);
        let b = new_id(at);
        assert!(a.starts_with("1700000000123-"));
        assert_eq!(a.len(), "1700000000123-".len() + 8);
        assert_ne!(a, b);
    }

    #[test]
    fn test_strip_count_serde() {
        assert_eq!(serde_json::from_str::<StripCount>("3").unwrap(), StripCount::Three);
        assert!(serde_json::from_str::<StripCount>("5").is_err());
        assert_eq!(serde_json::to_string(&StripCount::Four).unwrap(), "4");
    }
}
