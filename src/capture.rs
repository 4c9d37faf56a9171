//! Webcam frame intake
//!
//! The capture loop lives outside this crate and pushes frames as they
//! arrive. Only the newest frame is kept; the session reads it on demand.

use std::sync::{Arc, Mutex, PoisonError};

use crate::bitmap::Bitmap;

/// Read side of a capture pipeline
pub trait FrameSource: Send + Sync {
    /// The most recently captured frame, if any has arrived yet
    fn latest_frame(&self) -> Option<Bitmap>;
}

/// Single-slot frame holder shared between the capture loop and readers
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    slot: Arc<Mutex<Option<Bitmap>>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held frame
    pub fn publish(&self, frame: Bitmap) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
    }
}

impl FrameSource for LatestFrame {
    fn latest_frame(&self) -> Option<Bitmap> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(value: u8) -> Bitmap {
        Bitmap::from_rgb(1, 1, vec![value; 3]).unwrap()
    }

    #[test]
    fn empty_until_first_frame() {
        assert!(LatestFrame::new().latest_frame().is_none());
    }

    #[test]
    fn newer_frames_overwrite_older() {
        let frames = LatestFrame::new();
        let reader = frames.clone();
        frames.publish(solid(1));
        frames.publish(Bitmap::from_rgb(2, 1, vec![2; 6]).unwrap());
        assert_eq!(reader.latest_frame().unwrap().width(), 2);
    }

    #[test]
    fn reading_does_not_consume() {
        let frames = LatestFrame::new();
        frames.publish(solid(9));
        assert!(frames.latest_frame().is_some());
        assert!(frames.latest_frame().is_some());
    }
}
