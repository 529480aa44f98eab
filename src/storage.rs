// SPDX-License-Identifier: MPL-2.0

//! Download names and file export for photos and strips

use crate::constants::DOWNLOAD_PREFIX;
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::EncodedImage;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What kind of artifact is being downloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Photo,
    Strip,
}

/// `photobooth-<ms>.png` or `photobooth-strip-<ms>.png`
///
/// `created_at` is the creation time of the photo or strip.
pub fn download_filename(kind: DownloadKind, created_at: DateTime<Utc>) -> String {
    let millis = created_at.timestamp_millis();
    match kind {
        DownloadKind::Photo => format!("{}-{}.png", DOWNLOAD_PREFIX, millis),
        DownloadKind::Strip => format!("{}-strip-{}.png", DOWNLOAD_PREFIX, millis),
    }
}

/// Write `image` into `dir` as `filename`, creating the directory
///
/// Returns the full path of the written file.
pub async fn export_to_dir(dir: &Path, filename: &str, image: &EncodedImage) -> AppResult<PathBuf> {
    if filename.is_empty() || filename.contains(['/', '\\']) {
        return Err(AppError::Storage(format!("invalid file name '{}'", filename)));
    }
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    debug!(path = %path.display(), bytes = image.data.len(), "Writing export");
    tokio::fs::write(&path, &image.data).await?;
    info!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        "Image exported"
    );
    Ok(path)
}
