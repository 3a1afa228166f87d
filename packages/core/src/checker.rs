//! Checkers: validation rules over typed values.
//!
//! A checker carries only its configuration. `check` either returns whether
//! the value passes or raises an error; callers treat `Ok(false)` and a
//! raised [`Error::Check`] as the same failure.

use std::fmt::Display;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::{CheckerDoc, Error, Result};

/// Validates a value against configured parameters.
pub trait Checker<T>: Send + Sync {
    /// Check a value. Never mutates it.
    fn check(&self, value: &T) -> Result<bool>;

    /// Describe this checker for introspection documents.
    fn doc(&self) -> CheckerDoc;
}

impl Error {
    /// A validation failure raised from inside a checker.
    ///
    /// The key is filled in by the field that ran the check.
    pub fn check(message: impl Into<String>) -> Self {
        Error::Check {
            key: String::new(),
            message: message.into(),
        }
    }
}

fn params<const N: usize>(entries: [(&str, Json); N]) -> Map<String, Json> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Numeric types usable as [`Range`] bounds.
pub trait RangeBound: PartialOrd + Copy + Display + Serialize + Send + Sync {
    /// Checker name shown in documents.
    const KIND: &'static str;
}

impl RangeBound for i64 {
    const KIND: &'static str = "IntegerRange";
}

impl RangeBound for f64 {
    const KIND: &'static str = "FloatRange";
}

/// Value within `[lo, hi]`. A bound of `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    lo: Option<T>,
    hi: Option<T>,
}

/// Integer range checker.
pub type IntegerRange = Range<i64>;

/// Float range checker.
pub type FloatRange = Range<f64>;

impl<T: RangeBound> Range<T> {
    pub fn new(lo: Option<T>, hi: Option<T>) -> Self {
        Self { lo, hi }
    }

    pub fn lo(&self) -> Option<T> {
        self.lo
    }

    pub fn hi(&self) -> Option<T> {
        self.hi
    }
}

impl<T: RangeBound> Checker<T> for Range<T> {
    fn check(&self, value: &T) -> Result<bool> {
        if let Some(lo) = self.lo {
            match value.partial_cmp(&lo) {
                Some(std::cmp::Ordering::Less) => {
                    return Err(Error::check(format!("value {} is below range", value)))
                }
                None => return Err(Error::check(format!("value {} is not comparable", value))),
                _ => {}
            }
        }
        if let Some(hi) = self.hi {
            match value.partial_cmp(&hi) {
                Some(std::cmp::Ordering::Greater) => {
                    return Err(Error::check(format!("value {} is above range", value)))
                }
                None => return Err(Error::check(format!("value {} is not comparable", value))),
                _ => {}
            }
        }
        Ok(true)
    }

    fn doc(&self) -> CheckerDoc {
        CheckerDoc {
            kind: T::KIND.to_string(),
            description: "Check for value within range [lo, hi]; a missing bound is unbounded."
                .to_string(),
            params: params([
                ("lo", serde_json::to_value(self.lo).unwrap_or(Json::Null)),
                ("hi", serde_json::to_value(self.hi).unwrap_or(Json::Null)),
            ]),
        }
    }
}

/// Value must equal one of a fixed list.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOf<T> {
    values: Vec<T>,
}

impl<T> OneOf<T> {
    pub fn new(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: PartialEq + Serialize + Send + Sync> Checker<T> for OneOf<T> {
    fn check(&self, value: &T) -> Result<bool> {
        Ok(self.values.contains(value))
    }

    fn doc(&self) -> CheckerDoc {
        CheckerDoc {
            kind: "OneOf".to_string(),
            description: "Check for value to match one of a list of values.".to_string(),
            params: params([(
                "values",
                serde_json::to_value(&self.values).unwrap_or(Json::Null),
            )]),
        }
    }
}

/// String must match a regular expression at its start.
///
/// The pattern is compiled on first use; a bad pattern surfaces as
/// [`Error::Checker`] from `check`, not from construction.
#[derive(Debug)]
pub struct Regexp {
    pattern: String,
    compiled: OnceLock<std::result::Result<Regex, String>>,
}

impl Regexp {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn regex(&self) -> Result<&Regex> {
        self.compiled
            .get_or_init(|| Regex::new(&self.pattern).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|message| Error::Checker {
                message: format!("bad regular expression '{}': {}", self.pattern, message),
            })
    }
}

impl Checker<String> for Regexp {
    fn check(&self, value: &String) -> Result<bool> {
        let regex = self.regex()?;
        Ok(regex.find(value).is_some_and(|m| m.start() == 0))
    }

    fn doc(&self) -> CheckerDoc {
        CheckerDoc {
            kind: "Regexp".to_string(),
            description: "Check that string value is matched by regular expression.".to_string(),
            params: params([("regexp", Json::String(self.pattern.clone()))]),
        }
    }
}

/// String must be a URL of the form `<scheme>://<host>...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Url;

impl Checker<String> for Url {
    fn check(&self, value: &String) -> Result<bool> {
        let parsed = url::Url::parse(value)
            .map_err(|e| Error::check(format!("'{}' is not a URL: {}", value, e)))?;
        if parsed.scheme().is_empty() || parsed.host().is_none() {
            return Err(Error::check(format!("'{}' lacks a scheme or host", value)));
        }
        Ok(true)
    }

    fn doc(&self) -> CheckerDoc {
        CheckerDoc {
            kind: "URL".to_string(),
            description: "URL with format: <scheme>://<host>.".to_string(),
            params: Map::new(),
        }
    }
}

/// Ad-hoc checker built from a closure.
pub struct Predicate<F> {
    description: String,
    predicate: F,
}

impl<F> Predicate<F> {
    pub fn new(description: impl Into<String>, predicate: F) -> Self {
        Self {
            description: description.into(),
            predicate,
        }
    }
}

impl<T, F> Checker<T> for Predicate<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn check(&self, value: &T) -> Result<bool> {
        Ok((self.predicate)(value))
    }

    fn doc(&self) -> CheckerDoc {
        CheckerDoc {
            kind: "Predicate".to_string(),
            description: self.description.clone(),
            params: Map::new(),
        }
    }
}
