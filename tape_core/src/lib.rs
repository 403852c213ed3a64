//! # tape_core - Measurement Calculator Engine
//!
//! `tape_core` is the computational heart of Tapeline, a construction-trade
//! calculator that works in feet, inches, and sixteenths. It parses the
//! notation people write on plans (`12' 6-1/2"`), chains calculator
//! operations left to right, and keeps a replayable history for undo.
//!
//! ## Design Philosophy
//!
//! - **Exact**: measurements are integer feet/inches plus a reduced fraction
//! - **No UI coupling**: the calculator session is a plain value type driven by inputs
//! - **Rich Errors**: every failure is a typed [`CalcError`], never a panic
//!
//! ## Quick Start
//!
//! ```rust
//! use tape_core::evaluator::evaluate_expression;
//! use tape_core::tokenizer::FractionRule;
//!
//! let result = evaluate_expression("12' 6\" + 8' 3\"", FractionRule::default()).unwrap();
//! assert_eq!(result.value.to_fraction_string(), "20' 9\"");
//! assert_eq!(result.value.to_decimal_string(), "249.0000");
//! ```
//!
//! ## Modules
//!
//! - [`measurement`] - Feet/inch/fraction value type: parsing, formatting, arithmetic
//! - [`tokenizer`] - Splits expressions, resolving fraction-vs-division ambiguity
//! - [`evaluator`] - Left-to-right chain evaluation with percent operands
//! - [`session`] - Calculator state machine with memory and replay-based undo
//! - [`settings`] - Display and tokenizer settings loaded from JSON
//! - [`errors`] - Structured error types

pub mod errors;
pub mod evaluator;
pub mod measurement;
pub mod session;
pub mod settings;
pub mod tokenizer;

// Re-export commonly used types at crate root for convenience
pub use errors::{CalcError, CalcResult};
pub use evaluator::{evaluate, evaluate_expression, Evaluation};
pub use measurement::MeasurementValue;
pub use session::{CalculationSession, Input, SessionState};
pub use settings::{CalculatorSettings, DisplayFormat};
pub use tokenizer::{tokenize, FractionRule, Operator, Token};
