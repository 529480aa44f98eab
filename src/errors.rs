// SPDX-License-Identifier: MPL-2.0

//! Error types for the photobooth
//!
//! Only resource acquisition failures (camera, landmark detector) and
//! whole-artifact failures (one photo, one strip) surface here. Transient
//! per-frame detection errors and overlay composition failures are recovered
//! where they happen and never become an [`AppError`].

use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Camera-related errors
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),
    /// Landmark detector errors
    #[error("Face tracking error: {0}")]
    Detector(#[from] DetectorError),
    /// Photo capture errors
    #[error("Photo error: {0}")]
    Photo(#[from] PhotoError),
    /// Photo strip errors
    #[error("Photo strip error: {0}")]
    Strip(#[from] StripError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// Storage/filesystem errors
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Camera-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// No camera devices found
    #[error("No camera devices found")]
    NoCameraFound,
    /// The user (or platform) refused camera access
    #[error("Camera access was denied")]
    PermissionDenied,
    /// Requested device does not exist
    #[error("Unknown camera device: {0}")]
    UnknownDevice(String),
    /// Camera opened but could not produce frames
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
}

/// Landmark detector errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    /// One-time detector acquisition failed; face effects stay disabled
    #[error("Failed to load face landmark model: {0}")]
    LoadFailed(String),
    /// A single detection pass failed (expected during warm-up)
    #[error("Detection failed: {0}")]
    DetectionFailed(String),
}

/// Photo capture errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoError {
    /// No frame available for capture
    #[error("No frame available for capture")]
    NoFrameAvailable,
    /// Frame has a zero dimension
    #[error("Invalid frame dimensions {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },
    /// Bundled font could not be loaded
    #[error("Font unavailable: {0}")]
    FontUnavailable(String),
    /// Encoding failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
    /// Background task failed
    #[error("Capture task failed: {0}")]
    TaskFailed(String),
    /// No photo with the given identifier
    #[error("Photo not found: {0}")]
    NotFound(String),
}

/// Photo strip errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StripError {
    /// Strips hold exactly 3 or 4 photos
    #[error("Unsupported photo count {0} (expected 3 or 4)")]
    UnsupportedCount(usize),
    /// One of the source photos could not be decoded; nothing was rendered
    #[error("Failed to load photo {index}: {reason}")]
    ImageLoad { index: usize, reason: String },
    /// Encoding failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
    /// No strip with the given identifier
    #[error("Photo strip not found: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl StripError {
    /// Message shown to the user when a strip download fails
    pub fn user_message(&self) -> &'static str {
        match self {
            StripError::ImageLoad { .. } | StripError::EncodingFailed(_) => {
                "Failed to create the photo strip. Please try again."
            }
            StripError::UnsupportedCount(_) => "A photo strip needs 3 or 4 photos.",
            StripError::NotFound(_) => "That photo strip no longer exists.",
        }
    }
}

impl CameraError {
    /// Message shown in the blocking notice when the camera is unusable
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied | CameraError::NoCameraFound => {
                "Cannot access the camera. Make sure camera permission has been granted."
            }
            CameraError::UnknownDevice(_) | CameraError::InitializationFailed(_) => {
                "The selected camera could not be started."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_errors_convert_into_app_error() {
        let err: AppError = StripError::UnsupportedCount(5).into();
        assert!(matches!(err, AppError::Strip(StripError::UnsupportedCount(5))));
        assert_eq!(
            err.to_string(),
            "Photo strip error: Unsupported photo count 5 (expected 3 or 4)"
        );
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(AppError::from(io), AppError::Storage(_)));
    }
}
