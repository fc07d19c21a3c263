//! Frame-by-frame driver tying the keypad, gesture tracking and session
//! together.

use serde::Deserialize;
use tracing::info;

use crate::config::Config;
use crate::gesture::{GestureConfig, GestureState, HandSample, is_pinch};
use crate::keypad::{KeyLabel, Layout, LayoutConfig, build_layout};
use crate::overlay::Overlay;
use crate::session::CalculatorSession;

/// One captured frame as reported by the hand tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// `None` when no hand was detected
    #[serde(default)]
    pub hand: Option<HandSample>,
}

/// Input to the calculator: a tracked frame or a key pressed by other means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Frame(Frame),
    Key { label: KeyLabel },
}

/// A single gesture calculator session.
#[derive(Debug, Clone)]
pub struct AirCalculator {
    gesture_config: GestureConfig,
    layout_config: LayoutConfig,
    layout: Option<Layout>,
    gesture: GestureState,
    session: CalculatorSession,
    frames: u64,
}

impl AirCalculator {
    pub fn new(config: &Config) -> Self {
        Self {
            gesture_config: config.gesture.clone(),
            layout_config: config.layout.clone(),
            layout: None,
            gesture: GestureState::new(),
            session: CalculatorSession::new(),
            frames: 0,
        }
    }

    pub fn session(&self) -> &CalculatorSession {
        &self.session
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Handle any input event.
    pub fn handle(&mut self, event: &InputEvent) -> Overlay {
        match event {
            InputEvent::Frame(frame) => self.process_frame(frame),
            InputEvent::Key { label } => self.press(*label),
        }
    }

    /// Advance by one frame and apply the key it pressed, if any.
    pub fn process_frame(&mut self, frame: &Frame) -> Overlay {
        let index = self.frames;
        self.frames += 1;

        if self
            .layout
            .as_ref()
            .is_some_and(|layout| !layout.fits(frame.width, frame.height))
        {
            self.layout = None;
        }
        let layout: &Layout = self.layout.get_or_insert_with(|| {
            info!(width = frame.width, height = frame.height, "building keypad layout");
            build_layout(frame.width, frame.height, &self.layout_config)
        });

        let fingertip = frame.hand.map(|hand| hand.fingertip);
        let pinch = frame
            .hand
            .is_some_and(|hand| is_pinch(&hand, frame.width, &self.gesture_config));

        let outcome = self
            .gesture
            .advance(layout, fingertip, pinch, &self.gesture_config);
        let hovered = outcome.hovered.map(|key| key.label);
        let pressed = outcome.pressed.map(|key| key.label);

        if let Some(label) = pressed {
            self.session.apply_key(label);
        }

        let mut overlay = Overlay::new(index, &layout.keys, &self.session);
        overlay.hovered = hovered;
        overlay.pressed = pressed;
        overlay.fingertip = fingertip;
        overlay.pinch = pinch;
        overlay
    }

    /// Press a key without a gesture, e.g. from a keyboard shortcut. Does
    /// not advance the frame count or touch the gesture state.
    pub fn press(&mut self, label: KeyLabel) -> Overlay {
        self.session.apply_key(label);
        let keys = self
            .layout
            .as_ref()
            .map(|layout| layout.keys.as_slice())
            .unwrap_or_default();
        Overlay::new(self.frames, keys, &self.session)
    }
}
