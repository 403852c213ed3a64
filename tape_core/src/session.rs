//! # Calculation Session
//!
//! [`CalculationSession`] is the state behind a calculator display: the text
//! being typed, the running value, the pending operator, the history chain,
//! and an independent memory cell. It has no UI coupling; a front end feeds
//! it [`Input`]s and renders the text each transition returns.
//!
//! ## States
//!
//! ```text
//! Empty ──value, op──▶ Accumulating ──value, =──▶ Result
//!   ▲                    │    ▲                     │
//!   └──────── C ─────────┘    └──────── op ─────────┘
//! ```
//!
//! ## Undo
//!
//! Clear-Entry pops the last chain entry and rebuilds the running value by
//! replaying the remaining chain from scratch. If any entry fails to replay,
//! the session resets to Empty instead of keeping a half-built state.
//!
//! ## Example
//!
//! ```rust
//! use tape_core::session::{CalculationSession, Input};
//! use tape_core::tokenizer::Operator;
//!
//! let mut session = CalculationSession::new();
//! session.handle(Input::Text("6".into())).unwrap();
//! session.handle(Input::Operator(Operator::Add)).unwrap();
//! session.handle(Input::Text("4".into())).unwrap();
//! let shown = session.handle(Input::Equals).unwrap();
//!
//! assert_eq!(shown, "10\"");
//! assert_eq!(session.chain(), ["6", "+", "4"]);
//!
//! session.handle(Input::ClearEntry).unwrap();
//! assert_eq!(session.chain(), ["6", "+"]);
//! assert_eq!(session.current_operator(), Some(Operator::Add));
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{CalcError, CalcResult};
use crate::evaluator::{apply, apply_token, evaluate_expression};
use crate::measurement::{MeasurementValue, MAX_MAGNITUDE_INCHES};
use crate::settings::CalculatorSettings;
use crate::tokenizer::{is_expression, FractionRule, Operator};

/// Display text for an empty entry
const PLACEHOLDER: &str = "0";

const SQRT_LABEL: &str = "√";
const SQUARE_LABEL: &str = "sqr";
const PERCENT_LABEL: &str = "pct";
const NEGATE_LABEL: &str = "negate";

/// One user action on the calculator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    /// A single typed character (digit, unit marker, space, `/`, `.`)
    Key(char),
    /// Pasted or typed text, appended like a run of keys
    Text(String),
    /// Remove the last typed character
    Backspace,
    /// Binary operator button
    Operator(Operator),
    /// `=`
    Equals,
    /// `C`: reset everything except memory
    Clear,
    /// `CE`: clear the typed entry, or undo the last chain entry
    ClearEntry,
    MemoryClear,
    MemoryRecall,
    MemoryAdd,
    MemorySubtract,
    SquareRoot,
    Square,
    Percent,
    ToggleSign,
}

/// Coarse session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Nothing stored, empty chain
    Empty,
    /// A value is stored and an operator is waiting for its operand
    Accumulating,
    /// A value is stored with no operator pending
    Result,
}

/// Calculator state machine.
///
/// Each [`Input`] is applied to a copy of the session, so a failed
/// transition never leaves partial changes behind.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationSession {
    settings: CalculatorSettings,
    display: String,
    stored_value: Option<MeasurementValue>,
    current_operator: Option<Operator>,
    pending_clear_display: bool,
    chain: Vec<String>,
    memory: Option<MeasurementValue>,
}

impl Default for CalculationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculationSession {
    /// Create an empty session with default settings
    pub fn new() -> Self {
        Self::with_settings(CalculatorSettings::default())
    }

    /// Create an empty session with the given settings
    pub fn with_settings(settings: CalculatorSettings) -> Self {
        CalculationSession {
            settings,
            display: PLACEHOLDER.to_string(),
            stored_value: None,
            current_operator: None,
            pending_clear_display: false,
            chain: Vec::new(),
            memory: None,
        }
    }

    /// Compute the session that results from `input`, leaving `self` as is.
    ///
    /// Returns the next session and the text to show.
    pub fn transition(&self, input: Input) -> CalcResult<(CalculationSession, String)> {
        let mut next = self.clone();
        next.step(&input)?;
        debug!(?input, state = ?next.state(), chain = ?next.chain, "session transition");
        let shown = next.shown();
        Ok((next, shown))
    }

    /// Apply `input` in place. On error the session is unchanged.
    pub fn handle(&mut self, input: Input) -> CalcResult<String> {
        let (next, shown) = self.transition(input)?;
        *self = next;
        Ok(shown)
    }

    /// Raw display buffer (empty right after an operator press)
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Text a front end should render
    pub fn shown(&self) -> String {
        if !self.display.trim().is_empty() {
            return self.display.clone();
        }
        match &self.stored_value {
            Some(value) => self.render(value),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn stored_value(&self) -> Option<MeasurementValue> {
        self.stored_value
    }

    pub fn current_operator(&self) -> Option<Operator> {
        self.current_operator
    }

    pub fn pending_clear_display(&self) -> bool {
        self.pending_clear_display
    }

    pub fn memory(&self) -> Option<MeasurementValue> {
        self.memory
    }

    pub fn settings(&self) -> &CalculatorSettings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        match (self.stored_value, self.current_operator) {
            (None, _) if self.chain.is_empty() => SessionState::Empty,
            (_, Some(_)) => SessionState::Accumulating,
            _ => SessionState::Result,
        }
    }

    fn step(&mut self, input: &Input) -> CalcResult<()> {
        match input {
            Input::Key(c) => {
                let mut buf = [0u8; 4];
                self.type_text(c.encode_utf8(&mut buf));
                Ok(())
            }
            Input::Text(text) => {
                self.type_text(text);
                Ok(())
            }
            Input::Backspace => {
                self.backspace();
                Ok(())
            }
            Input::Operator(op) => self.press_operator(*op),
            Input::Equals => self.equals(),
            Input::Clear => {
                self.reset();
                Ok(())
            }
            Input::ClearEntry => {
                self.clear_entry();
                Ok(())
            }
            Input::MemoryClear => {
                self.memory = None;
                Ok(())
            }
            Input::MemoryRecall => {
                self.memory_recall();
                Ok(())
            }
            Input::MemoryAdd => self.memory_combine(false),
            Input::MemorySubtract => self.memory_combine(true),
            Input::SquareRoot => self.unary(SQRT_LABEL, square_root),
            Input::Square => self.unary(SQUARE_LABEL, square),
            Input::Percent => self.unary(PERCENT_LABEL, |v| Ok(v * 0.01)),
            Input::ToggleSign => self.unary(NEGATE_LABEL, |v| Ok(-v)),
        }
    }

    fn type_text(&mut self, text: &str) {
        if self.pending_clear_display {
            self.display.clear();
            self.pending_clear_display = false;
        }
        if is_placeholder(&self.display) {
            self.display.clear();
        }
        self.display.push_str(text);
    }

    fn backspace(&mut self) {
        if self.pending_clear_display {
            return;
        }
        self.display.pop();
        if self.display.trim().is_empty() {
            self.display = PLACEHOLDER.to_string();
        }
    }

    fn press_operator(&mut self, op: Operator) -> CalcResult<()> {
        let text = self.display.trim().to_string();

        if text.is_empty() {
            match (self.stored_value, self.current_operator) {
                // Operator pressed twice: swap the pending one
                (Some(_), Some(_)) => {
                    if let Some(last) = self.chain.last_mut() {
                        if Operator::from_symbol(last).is_some() {
                            *last = op.symbol().to_string();
                        }
                    }
                }
                (Some(_), None) => self.chain.push(op.symbol().to_string()),
                (None, _) => {
                    self.chain = vec![PLACEHOLDER.to_string(), op.symbol().to_string()];
                    self.stored_value = Some(MeasurementValue::ZERO);
                }
            }
        } else {
            let rule = self.settings.fraction_rule;
            match (self.stored_value, self.current_operator) {
                (Some(stored), Some(pending)) => {
                    self.stored_value = Some(operand_step(pending, stored, &text, rule)?);
                    self.chain.push(text);
                }
                (Some(_), None) if self.pending_clear_display && self.display_shows_stored() => {}
                _ => {
                    self.stored_value = Some(entry_value(&text, rule)?);
                    self.chain = vec![text];
                }
            }
            self.chain.push(op.symbol().to_string());
        }

        self.current_operator = Some(op);
        self.pending_clear_display = true;
        self.display.clear();
        Ok(())
    }

    fn equals(&mut self) -> CalcResult<()> {
        let text = self.display.trim().to_string();
        let rule = self.settings.fraction_rule;

        if !text.is_empty() && is_expression(&text, rule) {
            let evaluation = evaluate_expression(&text, rule)?;
            self.chain = evaluation.chain;
            self.show_result(evaluation.value);
            return Ok(());
        }

        match (self.stored_value, self.current_operator) {
            (Some(stored), Some(pending)) => {
                if text.is_empty() {
                    return Ok(());
                }
                let result = operand_step(pending, stored, &text, rule)?;
                self.chain.push(text);
                self.show_result(result);
            }
            _ => {
                if text.is_empty() || (self.pending_clear_display && self.display_shows_stored()) {
                    return Ok(());
                }
                let value = entry_value(&text, rule)?;
                self.chain = vec![text];
                self.show_result(value);
            }
        }
        Ok(())
    }

    /// Drop a typed entry, or pop the chain and rebuild state by replay.
    fn clear_entry(&mut self) {
        if !self.pending_clear_display && !is_placeholder(&self.display) {
            self.display = PLACEHOLDER.to_string();
            return;
        }

        self.chain.pop();
        if self.chain.is_empty() {
            self.reset();
            return;
        }

        match replay(&self.chain, self.settings.fraction_rule) {
            Ok((stored, operator)) => {
                self.stored_value = stored;
                self.current_operator = operator;
                self.pending_clear_display = true;
                self.display = match (operator, stored) {
                    (None, Some(value)) => self.render(&value),
                    _ => String::new(),
                };
            }
            Err(err) => {
                warn!(error = %err, chain = ?self.chain, "replay failed, resetting session");
                self.reset();
            }
        }
    }

    fn memory_recall(&mut self) {
        if let Some(value) = self.memory {
            self.display = self.render(&value);
            self.pending_clear_display = true;
        }
    }

    fn memory_combine(&mut self, subtract: bool) -> CalcResult<()> {
        let (_, value) = self.current_operand()?;
        self.memory = Some(match (self.memory, subtract) {
            (Some(memory), false) => memory + value,
            (Some(memory), true) => memory - value,
            (None, false) => value,
            (None, true) => -value,
        });
        self.pending_clear_display = true;
        Ok(())
    }

    fn unary<F>(&mut self, label: &str, op: F) -> CalcResult<()>
    where
        F: Fn(MeasurementValue) -> CalcResult<MeasurementValue>,
    {
        let (text, value) = self.current_operand()?;
        let result = op(value).map_err(|err| match err {
            CalcError::Domain { operation, reason, .. } => CalcError::domain(operation, text.clone(), reason),
            other => other,
        })?;
        self.chain = vec![format!("{}({})", label, text)];
        self.show_result(result);
        Ok(())
    }

    /// Text and value the unary and memory keys act on
    fn current_operand(&self) -> CalcResult<(String, MeasurementValue)> {
        let text = self.display.trim();
        if text.is_empty() {
            let value = self.stored_value.unwrap_or(MeasurementValue::ZERO);
            return Ok((self.render(&value), value));
        }
        let value = entry_value(text, self.settings.fraction_rule)?;
        Ok((text.to_string(), value))
    }

    fn show_result(&mut self, value: MeasurementValue) {
        self.stored_value = Some(value);
        self.current_operator = None;
        self.display = self.render(&value);
        self.pending_clear_display = true;
    }

    fn display_shows_stored(&self) -> bool {
        self.stored_value
            .is_some_and(|value| self.render(&value) == self.display.trim())
    }

    fn reset(&mut self) {
        self.display = PLACEHOLDER.to_string();
        self.stored_value = None;
        self.current_operator = None;
        self.pending_clear_display = false;
        self.chain.clear();
    }

    fn render(&self, value: &MeasurementValue) -> String {
        self.settings.display_format.render(value)
    }
}

/// Rebuild the running value and pending operator from chain entries.
///
/// # Errors
///
/// [`CalcError::Replay`] naming the first entry that does not re-evaluate.
pub fn replay(
    chain: &[String],
    rule: FractionRule,
) -> CalcResult<(Option<MeasurementValue>, Option<Operator>)> {
    let mut stored: Option<MeasurementValue> = None;
    let mut pending: Option<Operator> = None;

    for entry in chain {
        if let Some(op) = Operator::from_symbol(entry) {
            if stored.is_none() {
                return Err(CalcError::replay(entry.as_str(), "operator before any value"));
            }
            pending = Some(op);
            continue;
        }

        let value = match (stored, pending.take()) {
            (Some(lhs), Some(op)) => operand_step(op, lhs, entry, rule),
            (None, _) => entry_value(entry, rule),
            (Some(_), None) => {
                return Err(CalcError::replay(entry.as_str(), "value without an operator"))
            }
        };
        stored = Some(value.map_err(|err| CalcError::replay(entry.as_str(), err.to_string()))?);
    }

    Ok((stored, pending))
}

/// Value of a display or chain entry: a measurement, an embedded
/// expression, or a unary label such as `√(144)`.
fn entry_value(text: &str, rule: FractionRule) -> CalcResult<MeasurementValue> {
    let text = text.trim();
    if let Some(inner) = unwrap_label(text, SQRT_LABEL) {
        return square_root(entry_value(inner, rule)?);
    }
    if let Some(inner) = unwrap_label(text, SQUARE_LABEL) {
        return square(entry_value(inner, rule)?);
    }
    if let Some(inner) = unwrap_label(text, PERCENT_LABEL) {
        return Ok(entry_value(inner, rule)? * 0.01);
    }
    if let Some(inner) = unwrap_label(text, NEGATE_LABEL) {
        return Ok(-entry_value(inner, rule)?);
    }
    if is_expression(text, rule) {
        return evaluate_expression(text, rule).map(|evaluation| evaluation.value);
    }
    MeasurementValue::parse(text)
}

/// One pending-operator step with `text` as the operand
fn operand_step(
    op: Operator,
    lhs: MeasurementValue,
    text: &str,
    rule: FractionRule,
) -> CalcResult<MeasurementValue> {
    if text.trim_end().ends_with('%') {
        return apply_token(op, lhs, text);
    }
    apply(op, lhs, entry_value(text, rule)?)
}

fn unwrap_label<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.strip_prefix(label)?.strip_prefix('(')?.strip_suffix(')')
}

fn is_placeholder(display: &str) -> bool {
    matches!(display.trim(), "" | "0" | "0\"")
}

fn square_root(value: MeasurementValue) -> CalcResult<MeasurementValue> {
    let inches = value.to_total_inches();
    if inches < 0.0 {
        return Err(CalcError::domain("square root", value.to_string(), "value is negative"));
    }
    Ok(MeasurementValue::from_decimal_inches(inches.sqrt()))
}

fn square(value: MeasurementValue) -> CalcResult<MeasurementValue> {
    let inches = value.to_total_inches();
    let squared = inches * inches;
    if squared > MAX_MAGNITUDE_INCHES {
        return Err(CalcError::domain("square", value.to_string(), "result is out of range"));
    }
    Ok(MeasurementValue::from_decimal_inches(squared))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DisplayFormat;

    fn run(session: &mut CalculationSession, inputs: Vec<Input>) -> String {
        let mut shown = String::new();
        for input in inputs {
            shown = session.handle(input).unwrap();
        }
        shown
    }

    fn text(s: &str) -> Input {
        Input::Text(s.to_string())
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = CalculationSession::new();
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.shown(), "0");
        assert!(session.chain().is_empty());
    }

    #[test]
    fn test_typing_replaces_placeholder() {
        let mut session = CalculationSession::new();
        run(&mut session, vec![Input::Key('1'), Input::Key('2'), Input::Key('\'')]);
        assert_eq!(session.display(), "12'");

        run(&mut session, vec![Input::Clear, text("0\""), Input::Key('7')]);
        assert_eq!(session.display(), "7");
    }

    #[test]
    fn test_backspace() {
        let mut session = CalculationSession::new();
        run(&mut session, vec![text("45"), Input::Backspace]);
        assert_eq!(session.display(), "4");
        run(&mut session, vec![Input::Backspace]);
        assert_eq!(session.display(), "0");
    }

    #[test]
    fn test_operator_chaining_computes_silently() {
        let mut session = CalculationSession::new();
        let shown = run(
            &mut session,
            vec![text("6"), Input::Operator(Operator::Add), text("4"), Input::Operator(Operator::Multiply)],
        );
        assert_eq!(shown, "10\"");
        assert_eq!(session.chain(), ["6", "+", "4", "*"]);
        assert_eq!(session.state(), SessionState::Accumulating);

        let shown = run(&mut session, vec![text("2"), Input::Equals]);
        assert_eq!(shown, "1' 8\"");
        assert_eq!(session.state(), SessionState::Result);
    }

    #[test]
    fn test_repeated_operator_replaces_pending() {
        let mut session = CalculationSession::new();
        run(
            &mut session,
            vec![text("6"), Input::Operator(Operator::Add), Input::Operator(Operator::Subtract)],
        );
        assert_eq!(session.chain(), ["6", "-"]);
        assert_eq!(session.current_operator(), Some(Operator::Subtract));
    }

    #[test]
    fn test_operator_after_result_continues_chain() {
        let mut session = CalculationSession::new();
        run(
            &mut session,
            vec![
                text("6"),
                Input::Operator(Operator::Add),
                text("4"),
                Input::Equals,
                Input::Operator(Operator::Subtract),
                text("1"),
                Input::Equals,
            ],
        );
        assert_eq!(session.chain(), ["6", "+", "4", "-", "1"]);
        assert_eq!(session.stored_value().unwrap().to_total_inches(), 9.0);
    }

    #[test]
    fn test_new_entry_after_result_starts_new_chain() {
        let mut session = CalculationSession::new();
        run(
            &mut session,
            vec![text("6"), Input::Operator(Operator::Add), text("4"), Input::Equals, text("3"), Input::Operator(Operator::Add)],
        );
        assert_eq!(session.chain(), ["3", "+"]);
        assert_eq!(session.stored_value().unwrap().to_total_inches(), 3.0);
    }

    #[test]
    fn test_equals_with_embedded_expression() {
        let mut session = CalculationSession::new();
        let shown = run(&mut session, vec![text("12' 6\" + 8' 3\""), Input::Equals]);
        assert_eq!(shown, "20' 9\"");
        assert_eq!(session.chain(), ["12' 6\" + 8' 3\""]);
    }

    #[test]
    fn test_failed_transition_leaves_state() {
        let mut session = CalculationSession::new();
        run(&mut session, vec![text("6"), Input::Operator(Operator::Divide), text("0")]);
        let before = session.clone();

        let err = session.handle(Input::Equals).unwrap_err();
        assert!(matches!(err, CalcError::DivideByZero { .. }));
        assert_eq!(session, before);

        let err = session.transition(Input::Operator(Operator::Add)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot divide by zero");
    }

    #[test]
    fn test_clear_entry_clears_typed_entry_first() {
        let mut session = CalculationSession::new();
        run(&mut session, vec![text("6"), Input::Operator(Operator::Add), text("4"), Input::ClearEntry]);
        assert_eq!(session.display(), "0");
        assert_eq!(session.chain(), ["6", "+"]);
    }

    #[test]
    fn test_clear_entry_replays() {
        let mut session = CalculationSession::new();
        run(
            &mut session,
            vec![text("6"), Input::Operator(Operator::Add), text("4"), Input::Operator(Operator::Multiply)],
        );
        run(&mut session, vec![Input::ClearEntry]);
        assert_eq!(session.chain(), ["6", "+", "4"]);
        assert_eq!(session.current_operator(), None);
        assert_eq!(session.stored_value().unwrap().to_total_inches(), 10.0);
        assert_eq!(session.shown(), "10\"");

        run(&mut session, vec![Input::ClearEntry, Input::ClearEntry]);
        assert_eq!(session.chain(), ["6"]);
        assert_eq!(session.state(), SessionState::Result);

        run(&mut session, vec![Input::ClearEntry]);
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.shown(), "0");
    }

    #[test]
    fn test_replay_failure_resets() {
        let chain = vec!["6".to_string(), "+".to_string(), "banana".to_string()];
        let err = replay(&chain, FractionRule::default()).unwrap_err();
        assert!(matches!(err, CalcError::Replay { ref entry, .. } if entry == "banana"));

        let chain = vec!["+".to_string()];
        assert!(replay(&chain, FractionRule::default()).is_err());
    }

    #[test]
    fn test_clear_entry_resets_when_replay_fails() {
        let mut session = CalculationSession::new();
        session.chain = ["6", "+", "oops", "*"].iter().map(|s| s.to_string()).collect();
        session.stored_value = Some(MeasurementValue::ZERO);
        session.current_operator = Some(Operator::Multiply);
        session.pending_clear_display = true;
        session.display.clear();
        session.memory = Some(MeasurementValue::ZERO);

        let shown = session.handle(Input::ClearEntry).unwrap();
        assert_eq!(shown, "0");
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.memory().is_some());
    }

    #[test]
    fn test_replay_handles_labels_and_percent() {
        let chain: Vec<String> = ["√(144)", "+", "10%"].iter().map(|s| s.to_string()).collect();
        let (stored, op) = replay(&chain, FractionRule::default()).unwrap();
        // 12" + 10% of 12", with the 1.2" increment rounded to 1-3/16"
        assert_eq!(stored.unwrap().to_total_inches(), 13.1875);
        assert_eq!(op, None);
    }

    #[test]
    fn test_memory() {
        let mut session = CalculationSession::new();
        run(&mut session, vec![text("6"), Input::MemoryAdd, text("2"), Input::MemoryAdd]);
        assert_eq!(session.memory().unwrap().to_total_inches(), 8.0);

        run(&mut session, vec![text("3"), Input::MemorySubtract, Input::Clear]);
        assert_eq!(session.memory().unwrap().to_total_inches(), 5.0);

        let shown = run(&mut session, vec![Input::MemoryRecall]);
        assert_eq!(shown, "5\"");
        assert!(session.pending_clear_display());

        run(&mut session, vec![Input::MemoryClear, text("4"), Input::MemorySubtract]);
        assert_eq!(session.memory().unwrap().to_total_inches(), -4.0);
    }

    #[test]
    fn test_memory_recall_as_operand() {
        let mut session = CalculationSession::new();
        run(&mut session, vec![text("5"), Input::MemoryAdd, Input::Clear]);
        let shown = run(
            &mut session,
            vec![text("6"), Input::Operator(Operator::Add), Input::MemoryRecall, Input::Equals],
        );
        assert_eq!(shown, "11\"");
        assert_eq!(session.chain(), ["6", "+", "5\""]);
    }

    #[test]
    fn test_unary_operations_collapse_chain() {
        let mut session = CalculationSession::new();
        let shown = run(&mut session, vec![text("144"), Input::SquareRoot]);
        assert_eq!(shown, "1' 0\"");
        assert_eq!(session.chain(), ["√(144)"]);

        let shown = run(&mut session, vec![Input::Square]);
        assert_eq!(shown, "12' 0\"");
        assert_eq!(session.chain(), ["sqr(1' 0\")"]);

        let shown = run(&mut session, vec![Input::ToggleSign]);
        assert_eq!(shown, "-12' 0\"");

        let shown = run(&mut session, vec![text("50"), Input::Percent]);
        assert_eq!(shown, "0-1/2\"");
        assert_eq!(session.chain(), ["pct(50)"]);
    }

    #[test]
    fn test_square_root_of_negative() {
        let mut session = CalculationSession::new();
        run(&mut session, vec![text("-4")]);
        let err = session.handle(Input::SquareRoot).unwrap_err();
        assert_eq!(err.error_code(), "DOMAIN_ERROR");
        assert_eq!(session.display(), "-4");
    }

    #[test]
    fn test_unary_then_undo_replays_label() {
        let mut session = CalculationSession::new();
        run(
            &mut session,
            vec![text("144"), Input::SquareRoot, Input::Operator(Operator::Add), text("6"), Input::Equals],
        );
        assert_eq!(session.shown(), "1' 6\"");

        run(&mut session, vec![Input::ClearEntry]);
        assert_eq!(session.chain(), ["√(144)", "+"]);
        assert_eq!(session.stored_value().unwrap().to_total_inches(), 12.0);
        assert_eq!(session.current_operator(), Some(Operator::Add));
    }

    #[test]
    fn test_decimal_display() {
        let settings = CalculatorSettings {
            display_format: DisplayFormat::Decimal,
            ..CalculatorSettings::default()
        };
        let mut session = CalculationSession::with_settings(settings);
        let shown = run(&mut session, vec![text("6 1/2"), Input::Operator(Operator::Add), text("1/4"), Input::Equals]);
        assert_eq!(shown, "6.7500");

        let shown = run(&mut session, vec![Input::Operator(Operator::Add), text("1/4"), Input::Equals]);
        assert_eq!(shown, "7.0000");
        assert_eq!(session.chain(), ["6 1/2", "+", "1/4", "+", "1/4"]);
    }
}
