//! Calculator session: the expression being typed and the last result.

use serde::Serialize;
use tracing::{debug, warn};

use crate::calculator::evaluate;
use crate::keypad::KeyLabel;

/// Shown in place of a result when evaluation fails.
pub const ERROR_RESULT: &str = "ERROR";

/// Text state of one calculator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CalculatorSession {
    expression: String,
    last_result: String,
}

impl CalculatorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The expression typed so far.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Empty, a formatted number, or [`ERROR_RESULT`].
    pub fn last_result(&self) -> &str {
        &self.last_result
    }

    /// Apply one key press. Gesture presses and manual overrides both go
    /// through here.
    ///
    /// Digits and operators are appended without validation. `=` evaluates
    /// the expression and, on success, replaces it with the result so the
    /// next keys continue from it. Any evaluation failure shows
    /// [`ERROR_RESULT`] and clears the expression.
    pub fn apply_key(&mut self, label: KeyLabel) {
        match label {
            KeyLabel::Clear => {
                self.expression.clear();
                self.last_result.clear();
            }
            KeyLabel::Equals => self.evaluate(),
            input => self.expression.push_str(input.as_str()),
        }
    }

    fn evaluate(&mut self) {
        if self.expression.trim().is_empty() {
            self.last_result.clear();
            return;
        }

        match evaluate(&self.expression) {
            Ok(value) => {
                let formatted = value.to_string();
                debug!(expression = %self.expression, result = %formatted, "evaluated");
                self.last_result.clone_from(&formatted);
                self.expression = formatted;
            }
            Err(err) => {
                warn!(expression = %self.expression, error = %err, "evaluation failed");
                self.last_result = ERROR_RESULT.to_string();
                self.expression.clear();
            }
        }
    }
}
