//! Effect parameters
//!
//! Effects exchange settings with their host as named values. `ParamValue`
//! is a single typed value; `Parameters` is an ordered collection in the
//! string form used by batch commands:
//!
//! ```text
//! PeakLevel=-1 ApplyGain=true Name="Lead vocal"
//! ```

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single typed parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Unparsed text (as read from a parameter string)
    Text(String),
}

impl ParamValue {
    /// Interpret the value as a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Interpret the value as a flag
    ///
    /// Accepts `true/false`, `yes/no`, `on/off` and `1/0` for text values.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int(0) => Some(false),
            Self::Int(1) => Some(true),
            Self::Text(s) => parse_bool(s),
            Self::Int(_) | Self::Float(_) => None,
        }
    }

    /// Interpret the value as text
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Ordered collection of named parameters
///
/// Names are matched case-insensitively; setting an existing name replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, ParamValue)>,
}

impl Parameters {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Key=Value Key2="quoted value"` string
    ///
    /// Inside quotes, `\"` and `\\` escape a quote and a backslash.
    ///
    /// # Errors
    /// Returns `CoreError::MalformedParameters` for a missing `=`, an empty
    /// name, or an unterminated quote.
    pub fn parse(input: &str) -> Result<Self> {
        let mut params = Self::new();
        let mut chars = input.chars().peekable();

        loop {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if chars.peek().is_none() {
                break;
            }

            let mut name = String::new();
            while let Some(c) = chars.next_if(|c| *c != '=' && !c.is_whitespace()) {
                name.push(c);
            }
            if chars.next_if_eq(&'=').is_none() {
                return Err(CoreError::MalformedParameters(format!(
                    "expected '=' after '{}'",
                    name
                )));
            }
            if name.is_empty() {
                return Err(CoreError::MalformedParameters(
                    "parameter name is empty".to_string(),
                ));
            }

            let mut value = String::new();
            if chars.next_if_eq(&'"').is_some() {
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        '"' => {
                            closed = true;
                            break;
                        }
                        _ => value.push(c),
                    }
                }
                if !closed {
                    return Err(CoreError::MalformedParameters(format!(
                        "unterminated quote in value of '{}'",
                        name
                    )));
                }
            } else {
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    value.push(c);
                }
            }

            params.set(name, ParamValue::Text(value));
        }

        Ok(params)
    }

    /// Set a parameter, replacing any existing value with the same name
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style `set`
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a parameter by name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Get a numeric parameter
    ///
    /// Returns `Ok(None)` when absent.
    pub fn get_f64(&self, name: &str) -> Result<Option<f64>> {
        self.get(name)
            .map(|value| {
                value
                    .as_f64()
                    .ok_or_else(|| CoreError::invalid_parameter(name, format!("'{}' is not a number", value)))
            })
            .transpose()
    }

    /// Get a flag parameter
    ///
    /// Returns `Ok(None)` when absent.
    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        self.get(name)
            .map(|value| {
                value
                    .as_bool()
                    .ok_or_else(|| CoreError::invalid_parameter(name, format!("'{}' is not a boolean", value)))
            })
            .transpose()
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for Parameters {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            let text = value.to_string();
            if text.is_empty() || text.contains(|c: char| c.is_whitespace() || c == '"' || c == '\\') {
                let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "{}=\"{}\"", name, escaped)?;
            } else {
                write!(f, "{}={}", name, text)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_pairs() {
        let params = Parameters::parse("PeakLevel=-1.5 ApplyGain=true  RemoveDcOffset=0").unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params.get_f64("PeakLevel").unwrap(), Some(-1.5));
        assert_eq!(params.get_bool("ApplyGain").unwrap(), Some(true));
        assert_eq!(params.get_bool("RemoveDcOffset").unwrap(), Some(false));
    }

    #[test]
    fn names_are_case_insensitive() {
        let params = Parameters::parse("peaklevel=-3").unwrap();
        assert_eq!(params.get_f64("PeakLevel").unwrap(), Some(-3.0));
    }

    #[test]
    fn quoted_values_keep_spaces_and_escapes() {
        let params = Parameters::parse(r#"Name="Lead \"vox\" take" Path="C:\\audio""#).unwrap();
        assert_eq!(params.get("Name"), Some(&ParamValue::Text("Lead \"vox\" take".into())));
        assert_eq!(params.get("Path"), Some(&ParamValue::Text("C:\\audio".into())));
    }

    #[test]
    fn later_duplicate_wins() {
        let params = Parameters::parse("PeakLevel=-1 PeakLevel=-2").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get_f64("PeakLevel").unwrap(), Some(-2.0));
    }

    #[test]
    fn empty_string_is_empty() {
        assert!(Parameters::parse("   ").unwrap().is_empty());
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert!(matches!(
            Parameters::parse("PeakLevel"),
            Err(CoreError::MalformedParameters(_))
        ));
        assert!(matches!(
            Parameters::parse("=5"),
            Err(CoreError::MalformedParameters(_))
        ));
        assert!(matches!(
            Parameters::parse("Name=\"open"),
            Err(CoreError::MalformedParameters(_))
        ));
    }

    #[test]
    fn typed_getters_report_bad_values() {
        let params = Parameters::parse("PeakLevel=loud ApplyGain=maybe").unwrap();
        assert!(matches!(
            params.get_f64("PeakLevel"),
            Err(CoreError::InvalidParameter { .. })
        ));
        assert!(params.get_bool("ApplyGain").is_err());
        assert_eq!(params.get_f64("Missing").unwrap(), None);
    }

    #[test]
    fn display_quotes_when_needed() {
        let params = Parameters::new()
            .with("PeakLevel", -1.0)
            .with("ApplyGain", true)
            .with("Name", "Lead vocal")
            .with("Empty", "");
        assert_eq!(
            params.to_string(),
            r#"PeakLevel=-1 ApplyGain=true Name="Lead vocal" Empty="""#
        );
        assert_eq!(Parameters::parse(&params.to_string()).unwrap().len(), 4);
    }

    #[test]
    fn value_conversions() {
        assert_eq!(ParamValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(ParamValue::Bool(true).as_f64(), None);
        assert_eq!(ParamValue::Int(1).as_bool(), Some(true));
        assert_eq!(ParamValue::Float(0.5).as_bool(), None);
        assert_eq!(ParamValue::Text(" Off ".into()).as_bool(), Some(false));
    }

    #[test]
    fn values_serialize_untagged() {
        let json = serde_json::to_string(&ParamValue::Float(-1.5)).unwrap();
        assert_eq!(json, "-1.5");
        let json = serde_json::to_string(&ParamValue::Bool(true)).unwrap();
        assert_eq!(json, "true");
    }
}
