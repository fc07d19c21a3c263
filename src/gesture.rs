//! Fingertip gesture tracking.
//!
//! Turns a per-frame fingertip position and pinch signal into discrete key
//! presses. A key is pressed by pinching over it or by hovering over it for
//! `dwell_frames` consecutive frames; after a press, `cooldown_frames`
//! frames pass before another press can fire.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::keypad::{Key, KeyLabel, Layout, Point};

/// Tunable thresholds for press detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Consecutive frames over the same key that count as a press
    pub dwell_frames: u32,
    /// Frames after a press during which no press fires
    pub cooldown_frames: u32,
    /// Pinch distance threshold as a fraction of the frame width
    pub pinch_ratio: f64,
    /// Lower bound of the pinch threshold in pixels
    pub pinch_floor_px: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            dwell_frames: 12,
            cooldown_frames: 12,
            pinch_ratio: 0.04,
            pinch_floor_px: 12.0,
        }
    }
}

/// Landmarks reported for one hand in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSample {
    /// Index fingertip, used for hovering
    pub fingertip: Point,
    /// Thumb tip, used for pinch distance
    pub thumb: Point,
}

/// Pinch distance threshold in pixels for a frame of the given width.
pub fn pinch_threshold(frame_width: u32, config: &GestureConfig) -> f64 {
    (f64::from(frame_width) * config.pinch_ratio)
        .trunc()
        .max(config.pinch_floor_px)
}

/// Check if fingertip and thumb are close enough to count as a pinch.
pub fn is_pinch(hand: &HandSample, frame_width: u32, config: &GestureConfig) -> bool {
    hand.fingertip.distance(&hand.thumb) < pinch_threshold(frame_width, config)
}

/// What a single frame produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameOutcome<'a> {
    /// Key under the fingertip
    pub hovered: Option<&'a Key>,
    /// Key pressed this frame
    pub pressed: Option<&'a Key>,
}

/// Per-session press detection state, advanced once per frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GestureState {
    dwell_counter: u32,
    last_highlighted: Option<KeyLabel>,
    cooldown: u32,
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dwell_counter(&self) -> u32 {
        self.dwell_counter
    }

    pub fn last_highlighted(&self) -> Option<KeyLabel> {
        self.last_highlighted
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Advance by one frame.
    ///
    /// `fingertip` is `None` when no hand was detected; such frames keep the
    /// hover and dwell state as they were and only count down the cooldown.
    /// At most one key is pressed per frame.
    pub fn advance<'a>(
        &mut self,
        layout: &'a Layout,
        fingertip: Option<Point>,
        pinch: bool,
        config: &GestureConfig,
    ) -> FrameOutcome<'a> {
        let hovered = fingertip.and_then(|point| layout.key_at(point));

        if fingertip.is_some() {
            let label = hovered.map(|key| key.label);
            if label.is_some() && label == self.last_highlighted {
                self.dwell_counter = self.dwell_counter.saturating_add(1);
            } else {
                if label != self.last_highlighted {
                    trace!(from = ?self.last_highlighted, to = ?label, "hover changed");
                }
                self.dwell_counter = 0;
            }
            self.last_highlighted = label;
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
            return FrameOutcome {
                hovered,
                pressed: None,
            };
        }

        let pressed = hovered.filter(|_| pinch || self.dwell_counter >= config.dwell_frames);
        if let Some(key) = pressed {
            debug!(
                label = %key.label,
                pinch,
                dwell = self.dwell_counter,
                "key pressed"
            );
            self.cooldown = config.cooldown_frames;
        }

        FrameOutcome { hovered, pressed }
    }
}
