//! Calculator module for evaluating arithmetic expressions.
//!
//! This module provides functionality to:
//! - Parse user-built text into an expression tree
//! - Evaluate the tree, allowing only numeric literals and arithmetic operators
//! - Report why an expression was rejected

mod error;
mod evaluation;
pub mod parser;

pub use error::{EvalError, EvalErrorKind};
pub use evaluation::{Number, evaluate};
