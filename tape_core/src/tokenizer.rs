//! # Expression Tokenizer
//!
//! Splits a calculator buffer such as `12' 6" + 8' 3"` or `100 + 10%` into
//! alternating value and operator tokens.
//!
//! The grammar is ambiguous in two places:
//!
//! - `/` separates a fraction (`3/4`) and also divides (`10 / 4`).
//! - `'` and `"` end a measurement, and `- 1/2"` can be either an inch
//!   fraction or a subtraction.
//!
//! Two modes resolve this:
//!
//! - **Quote adjacency** (the text contains `'` or `"`): an operator
//!   character splits only when the last non-whitespace character before it
//!   was a unit marker (or a `%` suffix). Everything else belongs to the
//!   measurement being typed.
//! - **Digit adjacency** (no unit markers): `+`, `-` and `*` always split,
//!   and `/` splits unless digits sit directly on both sides of it. The
//!   [`FractionRule`] decides whether those digits must also be valid
//!   sixteenths (`<= 16`).
//!
//! `%` never splits: it stays on its value (`"10%"`) and the evaluator
//! interprets it.
//!
//! ## Example
//!
//! ```rust
//! use tape_core::tokenizer::{tokenize, FractionRule, Operator, Token};
//!
//! let tokens = tokenize("12' 6\" + 8' 3\"", FractionRule::default()).unwrap();
//! assert_eq!(
//!     tokens,
//!     vec![
//!         Token::Value("12' 6\""),
//!         Token::Operator(Operator::Add),
//!         Token::Value("8' 3\""),
//!     ]
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::{CalcError, CalcResult};

/// A binary calculator operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Operator for an input character, if it is one
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' | 'x' | '×' => Some(Operator::Multiply),
            '/' | '÷' => Some(Operator::Divide),
            _ => None,
        }
    }

    /// Parse a chain entry that holds exactly one operator symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let mut chars = symbol.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    /// ASCII symbol used in chains and expressions
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One piece of a tokenized expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Measurement text, trimmed; may end in a `%` suffix
    Value(&'a str),
    Operator(Operator),
}

impl<'a> Token<'a> {
    /// True for a value carrying a `%` suffix
    pub fn is_percent(&self) -> bool {
        matches!(self, Token::Value(text) if text.ends_with('%'))
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Value(text) => f.write_str(text),
            Token::Operator(op) => write!(f, "{}", op),
        }
    }
}

/// How a `/` between digits is classified when no unit markers are present.
///
/// Both variants exist in the field; [`FractionRule::DigitAdjacent`] is the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FractionRule {
    /// `/` with a digit directly on each side is a fraction (`10/4` = 2-1/2")
    #[default]
    DigitAdjacent,
    /// As above, and both digit runs must be at most 16 (`100/4` divides)
    SixteenthsBounded,
}

/// Split `text` into alternating value and operator tokens.
///
/// # Errors
///
/// [`CalcError::Format`] for empty input, a missing operand between two
/// operators, or a leading or trailing binary operator.
pub fn tokenize(text: &str, rule: FractionRule) -> CalcResult<Vec<Token<'_>>> {
    let split_points = if has_unit_markers(text) {
        quote_split_points(text)
    } else {
        digit_split_points(text, rule)
    };

    let mut tokens = Vec::with_capacity(split_points.len() * 2 + 1);
    let mut start = 0;
    for (idx, op) in split_points {
        tokens.push(Token::Value(value_slice(text, start, idx)?));
        tokens.push(Token::Operator(op));
        start = idx + op_len(text, idx);
    }
    tokens.push(Token::Value(value_slice(text, start, text.len())?));

    trace!(input = text, count = tokens.len(), "tokenized expression");
    Ok(tokens)
}

/// True when `text` holds at least one binary operator under `rule`.
///
/// Text that fails to tokenize is not an expression.
pub fn is_expression(text: &str, rule: FractionRule) -> bool {
    tokenize(text, rule).is_ok_and(|tokens| tokens.len() > 1)
}

fn has_unit_markers(text: &str) -> bool {
    text.contains(['\'', '"'])
}

fn op_len(text: &str, idx: usize) -> usize {
    text[idx..].chars().next().map_or(1, char::len_utf8)
}

/// Trimmed value between two split points.
///
/// A value may open with one unary `-`, but not with any other operator and
/// not with a sign that has nothing after it.
fn value_slice(text: &str, start: usize, end: usize) -> CalcResult<&str> {
    let value = text[start..end].trim();
    if value.is_empty() {
        return Err(CalcError::format(text, "missing value between operators"));
    }
    let mut chars = value.chars().filter(|c| !c.is_whitespace());
    match chars.next().and_then(binary_operator) {
        Some(Operator::Subtract) if chars.next().is_some_and(|c| binary_operator(c).is_none()) => {}
        Some(op) => {
            return Err(CalcError::format(text, format!("operator {} has no operand", op)));
        }
        None => {}
    }
    Ok(value)
}

/// Marker-closed splitting. A `-` with no closed value before it is a sign.
fn quote_split_points(text: &str) -> Vec<(usize, Operator)> {
    let mut points = Vec::new();
    let mut after_marker = false;

    for (idx, c) in text.char_indices() {
        if c == '\'' || c == '"' || c == '%' {
            after_marker = true;
            continue;
        }
        if c.is_whitespace() {
            continue;
        }
        if after_marker {
            if let Some(op) = binary_operator(c) {
                trace!(index = idx, op = %op, "split after unit marker");
                points.push((idx, op));
            }
        }
        after_marker = false;
    }
    points
}

fn digit_split_points(text: &str, rule: FractionRule) -> Vec<(usize, Operator)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut points = Vec::new();
    let mut expect_value = true;

    for (pos, &(idx, c)) in chars.iter().enumerate() {
        if c.is_whitespace() {
            continue;
        }
        let Some(op) = binary_operator(c) else {
            expect_value = false;
            continue;
        };

        if expect_value {
            // Unary minus belongs to the value; any other operator here leaves
            // an empty operand and fails in `tokenize`.
            if op != Operator::Subtract {
                points.push((idx, op));
            }
            expect_value = false;
            continue;
        }

        if op == Operator::Divide && is_fraction_slash(&chars, pos, rule) {
            continue;
        }

        trace!(index = idx, op = %op, "split on operator");
        points.push((idx, op));
        expect_value = true;
    }
    points
}

fn binary_operator(c: char) -> Option<Operator> {
    match c {
        '+' | '-' | '*' | '/' => Operator::from_char(c),
        _ => None,
    }
}

fn is_fraction_slash(chars: &[(usize, char)], pos: usize, rule: FractionRule) -> bool {
    let before: String = chars[..pos]
        .iter()
        .rev()
        .map(|&(_, c)| c)
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let after: String = chars[pos + 1..]
        .iter()
        .map(|&(_, c)| c)
        .take_while(char::is_ascii_digit)
        .collect();

    if before.is_empty() || after.is_empty() {
        return false;
    }

    match rule {
        FractionRule::DigitAdjacent => true,
        FractionRule::SixteenthsBounded => {
            within_sixteenths(&before) && within_sixteenths(&after)
        }
    }
}

fn within_sixteenths(digits: &str) -> bool {
    digits.parse::<u32>().is_ok_and(|n| n <= 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Value(v) => Some(*v),
                Token::Operator(_) => None,
            })
            .collect()
    }

    fn ops(tokens: &[Token<'_>]) -> Vec<Operator> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Operator(op) => Some(*op),
                Token::Value(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_bare_fraction_is_one_value() {
        let tokens = tokenize("3/4", FractionRule::DigitAdjacent).unwrap();
        assert_eq!(tokens, vec![Token::Value("3/4")]);
        let tokens = tokenize("3/4", FractionRule::SixteenthsBounded).unwrap();
        assert_eq!(tokens, vec![Token::Value("3/4")]);
    }

    #[test]
    fn test_feet_inch_expression() {
        let tokens = tokenize("12' 6\" + 8' 3\"", FractionRule::default()).unwrap();
        assert_eq!(values(&tokens), vec!["12' 6\"", "8' 3\""]);
        assert_eq!(ops(&tokens), vec![Operator::Add]);
    }

    #[test]
    fn test_quote_mode_keeps_inner_fraction_and_hyphen() {
        let tokens = tokenize("16' 3-1/2\" * 30%", FractionRule::default()).unwrap();
        assert_eq!(values(&tokens), vec!["16' 3-1/2\"", "30%"]);
        assert_eq!(ops(&tokens), vec![Operator::Multiply]);
        assert!(tokens[2].is_percent());
    }

    #[test]
    fn test_quote_mode_percent_closes_value() {
        let tokens = tokenize("10% + 6\"", FractionRule::default()).unwrap();
        assert_eq!(values(&tokens), vec!["10%", "6\""]);
    }

    #[test]
    fn test_quote_mode_unary_minus() {
        let tokens = tokenize("12' + -6\"", FractionRule::default()).unwrap();
        assert_eq!(values(&tokens), vec!["12'", "-6\""]);
        assert_eq!(ops(&tokens), vec![Operator::Add]);
    }

    #[test]
    fn test_quote_mode_operator_without_marker_does_not_split() {
        let tokens = tokenize("6\" * 2 + 3", FractionRule::default()).unwrap();
        assert_eq!(values(&tokens), vec!["6\"", "2 + 3"]);
    }

    #[test]
    fn test_digit_mode_splits() {
        let tokens = tokenize("100 + 10%", FractionRule::default()).unwrap();
        assert_eq!(values(&tokens), vec!["100", "10%"]);

        let tokens = tokenize("6 1/2 - 3/4 * 2", FractionRule::default()).unwrap();
        assert_eq!(values(&tokens), vec!["6 1/2", "3/4", "2"]);
        assert_eq!(ops(&tokens), vec![Operator::Subtract, Operator::Multiply]);

        let tokens = tokenize("10 / 4", FractionRule::default()).unwrap();
        assert_eq!(ops(&tokens), vec![Operator::Divide]);
    }

    #[test]
    fn test_digit_mode_unary_minus() {
        let tokens = tokenize("-6 * -2", FractionRule::default()).unwrap();
        assert_eq!(values(&tokens), vec!["-6", "-2"]);
        assert_eq!(ops(&tokens), vec![Operator::Multiply]);
    }

    #[test]
    fn test_fraction_rules_disagree_on_large_operands() {
        let adjacent = tokenize("100/4", FractionRule::DigitAdjacent).unwrap();
        assert_eq!(adjacent, vec![Token::Value("100/4")]);

        let bounded = tokenize("100/4", FractionRule::SixteenthsBounded).unwrap();
        assert_eq!(values(&bounded), vec!["100", "4"]);
        assert_eq!(ops(&bounded), vec![Operator::Divide]);

        let bounded = tokenize("5 3/8", FractionRule::SixteenthsBounded).unwrap();
        assert_eq!(bounded, vec![Token::Value("5 3/8")]);
    }

    #[test]
    fn test_invalid_sequences() {
        for bad in [
            "",
            "   ",
            "6 + + 4",
            "6 +",
            "* 6",
            "6 * / 2",
            "6\" + ",
            "6 --",
            "6\" + + 4\"",
            "6\" - -",
            "12' * -",
        ] {
            let err = tokenize(bad, FractionRule::default()).unwrap_err();
            assert_eq!(err.error_code(), "FORMAT_ERROR", "input {:?}", bad);
        }
    }

    #[test]
    fn test_is_expression() {
        assert!(is_expression("6 + 4", FractionRule::default()));
        assert!(!is_expression("6 3/4", FractionRule::default()));
        assert!(!is_expression("-6", FractionRule::default()));
        assert!(!is_expression("12' 6\"", FractionRule::default()));
        assert!(!is_expression("6 + ", FractionRule::default()));
        assert!(!is_expression("6\" + + 4\"", FractionRule::default()));
        assert!(is_expression("6\" - -4\"", FractionRule::default()));
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(Operator::from_symbol("+"), Some(Operator::Add));
        assert_eq!(Operator::from_symbol("÷"), Some(Operator::Divide));
        assert_eq!(Operator::from_symbol("-6"), None);
        assert_eq!(Operator::Multiply.to_string(), "*");
    }
}
