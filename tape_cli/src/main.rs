//! # Tapeline CLI Application
//!
//! Terminal front end for the tape_core measurement calculator.
//!
//! ```text
//! tape eval "12' 6\" + 8' 3\""
//! tape parse "16' 3-1/2\"" --json
//! tape tokenize "100/4 + 10%" --bounded-fractions
//! tape repl
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tape_core::settings::load_settings;
use tape_core::{
    evaluate_expression, tokenize, CalcError, CalcResult, CalculationSession, CalculatorSettings,
    DisplayFormat, FractionRule, Input, MeasurementValue, Operator, Token,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tape",
    version,
    about = "Tapeline - feet, inches, and sixteenths calculator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings file (JSON)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log filter directive (e.g. `debug`, `tape_core=trace`); overrides -v
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(flatten)]
    overrides: Overrides,
}

/// Flags that override the settings file
#[derive(Args)]
struct Overrides {
    /// Show results as decimal inches
    #[arg(long, global = true)]
    decimal: bool,

    /// Treat `/` as a fraction only between numbers up to 16
    #[arg(long, global = true)]
    bounded_fractions: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an expression left to right
    Eval {
        expression: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse a single measurement and show its components
    Parse {
        text: String,
        /// Print the components as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show how an expression splits into tokens
    Tokenize { expression: String },
    /// Interactive calculator, one key or entry per line
    Repl,
}

#[derive(Serialize)]
struct EvalOutput<'a> {
    expression: &'a str,
    fraction: String,
    decimal: String,
    value: MeasurementValue,
}

#[derive(Serialize)]
struct Components {
    feet: i64,
    inches: i64,
    numerator: i64,
    denominator: i64,
    total_inches: f64,
    fraction: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_level.as_deref());

    let settings = match resolve_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            report_error(&e);
            return ExitCode::from(exit_status(&e));
        }
    };
    debug!(?settings, "resolved settings");

    let result = match &cli.command {
        Command::Eval { expression, json } => run_eval(expression, *json, &settings),
        Command::Parse { text, json } => run_parse(text, *json),
        Command::Tokenize { expression } => run_tokenize(expression, settings.fraction_rule),
        Command::Repl => run_repl(settings),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::from(exit_status(&e))
        }
    }
}

fn init_logging(verbose: u8, log_level: Option<&str>) {
    let filter = match (log_level, verbose) {
        (Some(directive), _) => EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn")),
        (None, 0) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        (None, 1) => EnvFilter::new("debug"),
        (None, _) => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn resolve_settings(cli: &Cli) -> CalcResult<CalculatorSettings> {
    let mut settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => CalculatorSettings::default(),
    };
    if cli.overrides.decimal {
        settings.display_format = DisplayFormat::Decimal;
    }
    if cli.overrides.bounded_fractions {
        settings.fraction_rule = FractionRule::SixteenthsBounded;
    }
    Ok(settings)
}

fn run_eval(expression: &str, json: bool, settings: &CalculatorSettings) -> CalcResult<()> {
    let evaluation = evaluate_expression(expression, settings.fraction_rule)?;
    let value = evaluation.value;

    if json {
        let output = EvalOutput {
            expression,
            fraction: value.to_fraction_string(),
            decimal: value.to_decimal_string(),
            value,
        };
        print_json(&output)?;
    } else {
        println!("{}", settings.display_format.render(&value));
        match settings.display_format {
            DisplayFormat::Fraction => println!("  = {} in", value.to_decimal_string()),
            DisplayFormat::Decimal => println!("  = {}", value.to_fraction_string()),
        }
    }
    Ok(())
}

fn run_parse(text: &str, json: bool) -> CalcResult<()> {
    let value = MeasurementValue::parse(text)?;
    let components = Components {
        feet: value.feet(),
        inches: value.inches(),
        numerator: value.numerator(),
        denominator: value.denominator(),
        total_inches: value.to_total_inches(),
        fraction: value.to_fraction_string(),
    };

    if json {
        print_json(&components)?;
    } else {
        println!("Input:    {}", text);
        println!("Feet:     {}", components.feet);
        println!("Inches:   {}", components.inches);
        println!("Fraction: {}/{}", components.numerator, components.denominator);
        println!("Total:    {} in", value.to_decimal_string());
        println!("Renders:  {}", components.fraction);
    }
    Ok(())
}

fn run_tokenize(expression: &str, rule: FractionRule) -> CalcResult<()> {
    for token in tokenize(expression, rule)? {
        match token {
            Token::Value(text) if token.is_percent() => println!("value    {}  (percent)", text),
            Token::Value(text) => println!("value    {}", text),
            Token::Operator(op) => println!("operator {}", op),
        }
    }
    Ok(())
}

fn run_repl(settings: CalculatorSettings) -> CalcResult<()> {
    println!("Tapeline - measurement calculator");
    println!("==================================");
    println!("Enter measurements or keys: + - * / = C CE MC MR M+ M- sqrt sqr % neg back quit");
    println!();

    let mut session = CalculationSession::with_settings(settings);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("[{}] > ", session.shown());
        if io::stdout().flush().is_err() {
            break;
        }

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                return Err(CalcError::file_error("read", "stdin", e.to_string()));
            }
            None => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit" | "q") {
            break;
        }

        match session.handle(parse_key(line)) {
            Ok(shown) => {
                println!("  {}", shown);
                if !session.chain().is_empty() {
                    println!("  chain: {}", session.chain().join(" "));
                }
            }
            Err(e) => println!("  error: {}", e),
        }
    }
    Ok(())
}

/// Map one REPL line to a session input; anything unrecognized is typed text.
fn parse_key(line: &str) -> Input {
    match line.to_ascii_uppercase().as_str() {
        "=" => Input::Equals,
        "C" => Input::Clear,
        "CE" => Input::ClearEntry,
        "MC" => Input::MemoryClear,
        "MR" => Input::MemoryRecall,
        "M+" => Input::MemoryAdd,
        "M-" => Input::MemorySubtract,
        "SQRT" | "√" => Input::SquareRoot,
        "SQR" | "X2" | "X²" => Input::Square,
        "%" => Input::Percent,
        "NEG" | "+/-" | "±" => Input::ToggleSign,
        "BACK" | "<" => Input::Backspace,
        _ => match Operator::from_symbol(line) {
            Some(op) => Input::Operator(op),
            None => Input::Text(line.to_string()),
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;
    println!("{}", json);
    Ok(())
}

/// 1 for bad input, 2 for file, settings and other environment failures
fn exit_status(error: &CalcError) -> u8 {
    if error.is_user_error() {
        1
    } else {
        2
    }
}

fn report_error(error: &CalcError) {
    eprintln!("Error: {}", error);
    if let Ok(json) = serde_json::to_string_pretty(error) {
        eprintln!();
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("ce"), Input::ClearEntry);
        assert_eq!(parse_key("m+"), Input::MemoryAdd);
        assert_eq!(parse_key("-"), Input::Operator(Operator::Subtract));
        assert_eq!(parse_key("x"), Input::Operator(Operator::Multiply));
        assert_eq!(parse_key("-6"), Input::Text("-6".to_string()));
        assert_eq!(parse_key("12' 6\""), Input::Text("12' 6\"".to_string()));
    }

    #[test]
    fn test_exit_status_separates_input_errors() {
        let err = evaluate_expression("6 / 0", FractionRule::default()).unwrap_err();
        assert_eq!(exit_status(&err), 1);

        let cli = Cli::try_parse_from(["tape", "--config", "/nonexistent/tape.json", "repl"]).unwrap();
        let err = resolve_settings(&cli).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
        assert_eq!(exit_status(&err), 2);
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::try_parse_from(["tape", "eval", "6 + 4", "--decimal"]).unwrap();
        let settings = resolve_settings(&cli).unwrap();
        assert_eq!(settings.display_format, DisplayFormat::Decimal);
        assert_eq!(settings.fraction_rule, FractionRule::DigitAdjacent);
    }
}
