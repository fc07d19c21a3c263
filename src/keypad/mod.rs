//! On-screen keypad: labels, key rectangles and their placement.

mod label;
mod layout;

pub use label::{KEYPAD_LABELS, KeyLabel, UnknownLabel};
pub use layout::{Key, Layout, LayoutConfig, Point, build_layout};
