//! Per-frame snapshot handed to the renderer.

use serde::Serialize;

use crate::keypad::{Key, KeyLabel, Point};
use crate::session::{CalculatorSession, ERROR_RESULT};

/// Everything the renderer needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Overlay {
    /// Index of the frame this overlay belongs to.
    pub frame: u64,
    /// All keys of the current layout.
    pub keys: Vec<Key>,
    /// Key under the fingertip, drawn highlighted.
    pub hovered: Option<KeyLabel>,
    /// Key pressed this frame, drawn filled for one frame.
    pub pressed: Option<KeyLabel>,
    /// Fingertip marker position.
    pub fingertip: Option<Point>,
    /// Whether the hand is pinching, drawn as a line to the thumb.
    pub pinch: bool,
    /// The expression typed so far.
    pub expression: String,
    /// The last result, or the error marker.
    pub last_result: String,
    /// Whether `last_result` is the error marker.
    pub is_error: bool,
}

impl Overlay {
    /// Snapshot the session text alongside the frame's key state.
    pub fn new(frame: u64, keys: &[Key], session: &CalculatorSession) -> Self {
        Self {
            frame,
            keys: keys.to_vec(),
            hovered: None,
            pressed: None,
            fingertip: None,
            pinch: false,
            expression: session.expression().to_string(),
            last_result: session.last_result().to_string(),
            is_error: session.last_result() == ERROR_RESULT,
        }
    }

    /// First status line, e.g. `Expr: 12+3`.
    pub fn expression_line(&self) -> String {
        format!("Expr: {}", self.expression)
    }

    /// Second status line, e.g. `Result: 15`.
    pub fn result_line(&self) -> String {
        format!("Result: {}", self.last_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_of_session() {
        let mut session = CalculatorSession::new();
        session.apply_key(KeyLabel::Nine);
        session.apply_key(KeyLabel::Div);
        session.apply_key(KeyLabel::Zero);
        session.apply_key(KeyLabel::Equals);

        let overlay = Overlay::new(3, &[], &session);
        assert!(overlay.is_error);
        assert_eq!(overlay.expression_line(), "Expr: ");
        assert_eq!(overlay.result_line(), "Result: ERROR");
    }

    #[test]
    fn test_serializes_labels_as_text() {
        let mut overlay = Overlay::new(0, &[], &CalculatorSession::new());
        overlay.pressed = Some(KeyLabel::Equals);

        let json = serde_json::to_value(&overlay).unwrap();
        assert_eq!(json["pressed"], "=");
        assert_eq!(json["hovered"], serde_json::Value::Null);
        assert_eq!(json["is_error"], false);
    }
}
