// SPDX-License-Identifier: MPL-2.0

//! Capture flash
//!
//! A short full-screen white flash shown when a photo is taken. The flash
//! runs on its own timer and never waits for encoding. Firing again while
//! the flash is visible restarts the window.

use crate::constants::FLASH_DURATION;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Default)]
struct FlashState {
    active: AtomicBool,
    generation: AtomicU64,
}

/// Shared flash flag, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct FlashIndicator {
    state: Arc<FlashState>,
    duration: Option<Duration>,
}

impl FlashIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flash with a custom visible duration
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            state: Arc::default(),
            duration: Some(duration),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration.unwrap_or(FLASH_DURATION)
    }

    /// Whether the flash is currently visible
    pub fn is_active(&self) -> bool {
        self.state.active.load(Ordering::SeqCst)
    }

    /// Show the flash; it turns itself off after [`FlashIndicator::duration`]
    ///
    /// Must be called from within a tokio runtime.
    pub fn fire(&self) {
        let generation = self.state.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.active.store(true, Ordering::SeqCst);
        trace!(generation, "Flash on");

        let state = Arc::clone(&self.state);
        let duration = self.duration();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            // A newer fire owns the flag now
            if state.generation.load(Ordering::SeqCst) == generation {
                state.active.store(false, Ordering::SeqCst);
                trace!(generation, "Flash off");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flash_turns_off_after_duration() {
        let flash = FlashIndicator::new();
        assert!(!flash.is_active());
        flash.fire();
        assert!(flash.is_active());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(flash.is_active());
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(!flash.is_active());
    }

    #[tokio::test]
    async fn test_refire_restarts_window() {
        let flash = FlashIndicator::with_duration(Duration::from_millis(150));
        flash.fire();
        tokio::time::sleep(Duration::from_millis(100)).await;
        flash.fire();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(flash.is_active());
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!flash.is_active());
    }
}
