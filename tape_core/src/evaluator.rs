//! # Chain Evaluator
//!
//! Evaluates tokenized expressions strictly left to right, the way a
//! handheld calculator does: `2 + 3 * 4` is `(2 + 3) * 4 = 20`, not 14.
//!
//! ## Operands
//!
//! - `+` and `-` add or subtract the operand as a measurement.
//! - `*` and `/` use the operand's total inches as a bare scalar.
//! - An operand with a `%` suffix is a percentage of the running result:
//!   `100 + 10%` is 110, `100 * 10%` is 10, `100 / 50%` is 200.
//!
//! ## Example
//!
//! ```rust
//! use tape_core::evaluator::evaluate_expression;
//! use tape_core::tokenizer::FractionRule;
//!
//! let eval = evaluate_expression("12' 6\" + 8' 3\"", FractionRule::default()).unwrap();
//! assert_eq!(eval.value.to_fraction_string(), "20' 9\"");
//! assert_eq!(eval.chain, vec!["12' 6\" + 8' 3\"".to_string()]);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::measurement::{MeasurementValue, MAX_MAGNITUDE_INCHES};
use crate::tokenizer::{tokenize, FractionRule, Operator, Token};

/// Result of evaluating a whole expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Final value
    pub value: MeasurementValue,

    /// Chain the caller should adopt: the whole expression as one entry
    pub chain: Vec<String>,
}

/// Tokenize and evaluate `text`.
///
/// Expression results replace the caller's chain with a single entry
/// holding the original text, rather than a step-by-step history.
pub fn evaluate_expression(text: &str, rule: FractionRule) -> CalcResult<Evaluation> {
    let tokens = tokenize(text, rule)?;
    let value = evaluate(&tokens)?;
    debug!(expression = text, result = %value, "evaluated expression");
    Ok(Evaluation {
        value,
        chain: vec![text.trim().to_string()],
    })
}

/// Evaluate alternating `[value, op, value, ...]` tokens left to right.
///
/// # Errors
///
/// - [`CalcError::Format`] when a value does not parse or the tokens do not
///   alternate
/// - [`CalcError::DivideByZero`] for a zero divisor or zero percent divisor
/// - [`CalcError::Domain`] when a scaled result leaves the representable range
pub fn evaluate(tokens: &[Token<'_>]) -> CalcResult<MeasurementValue> {
    let mut iter = tokens.iter();

    let mut result = match iter.next() {
        Some(Token::Value(text)) => MeasurementValue::parse(text)?,
        Some(Token::Operator(op)) => {
            return Err(CalcError::format(op.to_string(), "expression starts with an operator"))
        }
        None => return Err(CalcError::format("", "empty expression")),
    };

    while let Some(token) = iter.next() {
        let op = match token {
            Token::Operator(op) => *op,
            Token::Value(text) => {
                return Err(CalcError::format(*text, "expected an operator between values"))
            }
        };
        result = match iter.next() {
            Some(Token::Value(text)) => apply_token(op, result, text)?,
            _ => return Err(CalcError::format(op.to_string(), "operator has no operand")),
        };
    }

    Ok(result)
}

/// Apply `op` with an operand given as text, honoring a `%` suffix.
pub fn apply_token(op: Operator, lhs: MeasurementValue, operand: &str) -> CalcResult<MeasurementValue> {
    let operand = operand.trim();
    match operand.strip_suffix('%') {
        Some(percent) => {
            let value = MeasurementValue::parse(percent)?;
            apply_percent(op, lhs, value.to_total_inches() / 100.0, operand)
        }
        None => apply(op, lhs, MeasurementValue::parse(operand)?),
    }
}

/// Apply one calculator step.
///
/// `*` and `/` reduce `rhs` to its total inches and scale `lhs` by it.
pub fn apply(op: Operator, lhs: MeasurementValue, rhs: MeasurementValue) -> CalcResult<MeasurementValue> {
    match op {
        Operator::Add => Ok(lhs + rhs),
        Operator::Subtract => Ok(lhs - rhs),
        Operator::Multiply => scaled(op, lhs, lhs.to_total_inches() * rhs.to_total_inches()),
        Operator::Divide => {
            let divisor = rhs.to_total_inches();
            if divisor == 0.0 {
                return Err(CalcError::divide_by_zero(format!("{} / {}", lhs, rhs)));
            }
            scaled(op, lhs, lhs.to_total_inches() / divisor)
        }
    }
}

fn apply_percent(op: Operator, lhs: MeasurementValue, pct: f64, operand: &str) -> CalcResult<MeasurementValue> {
    let inches = lhs.to_total_inches();
    match op {
        Operator::Add => Ok(lhs + scaled(op, lhs, inches * pct)?),
        Operator::Subtract => Ok(lhs - scaled(op, lhs, inches * pct)?),
        Operator::Multiply => scaled(op, lhs, inches * pct),
        Operator::Divide => {
            if pct == 0.0 {
                return Err(CalcError::divide_by_zero(format!("{} / {}", lhs, operand)));
            }
            scaled(op, lhs, inches / pct)
        }
    }
}

/// Round a scaled result to 1/16", rejecting values a measurement cannot hold.
fn scaled(op: Operator, lhs: MeasurementValue, inches: f64) -> CalcResult<MeasurementValue> {
    if !inches.is_finite() || inches.abs() > MAX_MAGNITUDE_INCHES {
        return Err(CalcError::domain(
            op.to_string(),
            lhs.to_string(),
            "result is out of range",
        ));
    }
    Ok(MeasurementValue::from_decimal_inches(inches))
}
