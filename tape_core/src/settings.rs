//! # Calculator Settings
//!
//! `CalculatorSettings` controls how a [`CalculationSession`] formats results
//! and which fraction rule its tokenizer applies. Settings are plain JSON:
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "display_format": "Fraction",
//!   "fraction_rule": "DigitAdjacent"
//! }
//! ```
//!
//! Missing fields fall back to their defaults, so `{}` is a valid file.
//!
//! ## Example
//!
//! ```rust
//! use tape_core::settings::{settings_from_json, DisplayFormat};
//!
//! let settings = settings_from_json(r#"{ "display_format": "Decimal" }"#).unwrap();
//! assert_eq!(settings.display_format, DisplayFormat::Decimal);
//! ```
//!
//! [`CalculationSession`]: crate::session::CalculationSession

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::measurement::MeasurementValue;
use crate::tokenizer::FractionRule;

/// Current schema version for settings files
pub const SETTINGS_VERSION: &str = "0.1.0";

/// How computed values are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayFormat {
    /// `4' 10-5/8"`
    #[default]
    Fraction,
    /// `58.6250`
    Decimal,
}

impl DisplayFormat {
    /// Render a value in this format
    pub fn render(&self, value: &MeasurementValue) -> String {
        match self {
            DisplayFormat::Fraction => value.to_fraction_string(),
            DisplayFormat::Decimal => value.to_decimal_string(),
        }
    }
}

/// Settings shared by the session and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    /// Schema version (checked on load)
    pub version: String,

    /// Result rendering
    pub display_format: DisplayFormat,

    /// Fraction-vs-division rule for text without unit markers
    pub fraction_rule: FractionRule,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        CalculatorSettings {
            version: SETTINGS_VERSION.to_string(),
            display_format: DisplayFormat::default(),
            fraction_rule: FractionRule::default(),
        }
    }
}

/// Parse settings from a JSON string.
///
/// # Errors
///
/// - [`CalcError::SerializationError`] for malformed JSON
/// - [`CalcError::VersionMismatch`] when the major version differs
pub fn settings_from_json(json: &str) -> CalcResult<CalculatorSettings> {
    let settings: CalculatorSettings =
        serde_json::from_str(json).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })?;

    if !is_version_compatible(&settings.version) {
        return Err(CalcError::VersionMismatch {
            file_version: settings.version,
            expected_version: SETTINGS_VERSION.to_string(),
        });
    }

    Ok(settings)
}

/// Load settings from a JSON file.
///
/// # Example
///
/// ```rust,no_run
/// use tape_core::settings::load_settings;
/// use std::path::Path;
///
/// let settings = load_settings(Path::new("tapeline.json"))?;
/// # Ok::<(), tape_core::errors::CalcError>(())
/// ```
pub fn load_settings(path: &Path) -> CalcResult<CalculatorSettings> {
    let contents = fs::read_to_string(path).map_err(|e| {
        CalcError::file_error("read settings", path.display().to_string(), e.to_string())
    })?;
    let settings = settings_from_json(&contents)?;
    debug!(path = %path.display(), ?settings, "loaded settings");
    Ok(settings)
}

/// Major version must match
fn is_version_compatible(file_version: &str) -> bool {
    let file_major = file_version.split('.').next().unwrap_or("0");
    let current_major = SETTINGS_VERSION.split('.').next().unwrap_or("0");
    file_major == current_major
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CalculatorSettings::default();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.display_format, DisplayFormat::Fraction);
        assert_eq!(settings.fraction_rule, FractionRule::DigitAdjacent);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let settings = settings_from_json("{}").unwrap();
        assert_eq!(settings, CalculatorSettings::default());
    }

    #[test]
    fn test_settings_serialization() {
        let settings = CalculatorSettings {
            display_format: DisplayFormat::Decimal,
            fraction_rule: FractionRule::SixteenthsBounded,
            ..CalculatorSettings::default()
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        assert!(json.contains("SixteenthsBounded"));
        assert_eq!(settings_from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_version_mismatch() {
        let err = settings_from_json(r#"{ "version": "2.0.0" }"#).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
        assert!(settings_from_json(r#"{ "version": "0.9.3" }"#).is_ok());
    }

    #[test]
    fn test_malformed_json() {
        let err = settings_from_json(r#"{ "display_format": "Metric" }"#).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_missing_file() {
        let err = load_settings(Path::new("/nonexistent/tapeline.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_render() {
        let value = MeasurementValue::parse("4' 10-5/8\"").unwrap();
        assert_eq!(DisplayFormat::Fraction.render(&value), "4' 10-5/8\"");
        assert_eq!(DisplayFormat::Decimal.render(&value), "58.6250");
    }
}
