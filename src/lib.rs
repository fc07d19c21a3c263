//! Gesture keypad calculator core.
//!
//! Turns tracked fingertip positions into debounced key presses on an
//! on-screen keypad and evaluates the typed arithmetic without ever
//! executing anything but arithmetic.

pub mod app;
pub mod calculator;
pub mod config;
pub mod gesture;
pub mod keypad;
pub mod overlay;
pub mod session;

pub use app::{AirCalculator, Frame, InputEvent};
pub use calculator::{EvalError, EvalErrorKind, Number, evaluate};
pub use config::Config;
pub use session::CalculatorSession;
