//! Key labels.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The symbol printed on a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyLabel {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Add,
    Sub,
    Mul,
    Div,
    /// Clears the expression and the result
    Clear,
    /// Evaluates the expression
    Equals,
}

/// Labels in keypad order, row-major over a 4x4 grid.
pub const KEYPAD_LABELS: [KeyLabel; 16] = [
    KeyLabel::One,
    KeyLabel::Two,
    KeyLabel::Three,
    KeyLabel::Add,
    KeyLabel::Four,
    KeyLabel::Five,
    KeyLabel::Six,
    KeyLabel::Sub,
    KeyLabel::Seven,
    KeyLabel::Eight,
    KeyLabel::Nine,
    KeyLabel::Mul,
    KeyLabel::Clear,
    KeyLabel::Zero,
    KeyLabel::Equals,
    KeyLabel::Div,
];

/// Digit keys indexed by their value.
const DIGITS: [KeyLabel; 10] = [
    KeyLabel::Zero,
    KeyLabel::One,
    KeyLabel::Two,
    KeyLabel::Three,
    KeyLabel::Four,
    KeyLabel::Five,
    KeyLabel::Six,
    KeyLabel::Seven,
    KeyLabel::Eight,
    KeyLabel::Nine,
];

impl KeyLabel {
    /// Get the text shown on the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Clear => "C",
            Self::Equals => "=",
        }
    }

    /// Get the key for a digit value, `None` above 9.
    pub fn digit(value: u8) -> Option<Self> {
        DIGITS.get(usize::from(value)).copied()
    }

    /// Check if pressing this key appends its text to the expression.
    pub fn is_input(&self) -> bool {
        !matches!(self, Self::Clear | Self::Equals)
    }
}

impl fmt::Display for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text does not name a key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key label: {0:?}")]
pub struct UnknownLabel(pub String);

impl FromStr for KeyLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Add),
            "-" => Ok(Self::Sub),
            "*" => Ok(Self::Mul),
            "/" => Ok(Self::Div),
            "C" | "c" => Ok(Self::Clear),
            "=" => Ok(Self::Equals),
            _ => match s.as_bytes() {
                [d @ b'0'..=b'9'] => Self::digit(d - b'0').ok_or_else(|| UnknownLabel(s.to_string())),
                _ => Err(UnknownLabel(s.to_string())),
            },
        }
    }
}

impl TryFrom<u8> for KeyLabel {
    type Error = UnknownLabel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::digit(value).ok_or_else(|| UnknownLabel(value.to_string()))
    }
}

impl Serialize for KeyLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for KeyLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
