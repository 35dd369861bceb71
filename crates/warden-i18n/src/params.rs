//! Placeholder discovery, parameter validation, and single-pass
//! interpolation of `{name}` templates.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::I18nError;

/// `{identifier}` with a leading letter or underscore, as in
/// `"Hello, {name}!"`. A `{` without a matching close, or `{}` with an
/// empty identifier, is not a placeholder.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex"));

/// A parameter value with a canonical textual form.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(v) => v.fmt(f),
            Self::Int(v) => v.fmt(f),
            Self::Uint(v) => v.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::Bool(v) => v.fmt(f),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        Self::Uint(v as u64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Named interpolation parameters.
pub type Params = HashMap<String, ParamValue>;

/// Build a [`Params`] map literally:
///
/// `params! { "name" => "Ada", "count" => 3 }`
#[macro_export]
macro_rules! params {
    () => {
        $crate::params::Params::new()
    };
    ( $( $key:expr => $value:expr ),+ $(,)? ) => {{
        let mut map = $crate::params::Params::new();
        $( map.insert(($key).to_string(), $crate::params::ParamValue::from($value)); )+
        map
    }};
}

/// Distinct placeholder identifiers appearing in `template`.
pub fn required_params(template: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Check `supplied` against `declared`.
///
/// A declared name absent from `supplied` always fails; names supplied
/// beyond the declared set are rejected only in strict mode.
pub fn validate_params(
    declared: &[String],
    supplied: &Params,
    strict: bool,
) -> Result<(), I18nError> {
    for name in declared {
        if !supplied.contains_key(name) {
            return Err(I18nError::MissingParameter(name.clone()));
        }
    }

    if strict {
        let declared: HashSet<&str> = declared.iter().map(String::as_str).collect();
        let mut extras: Vec<&String> = supplied
            .keys()
            .filter(|k| !declared.contains(k.as_str()))
            .collect();
        extras.sort();
        if let Some(extra) = extras.first() {
            return Err(I18nError::ExtraParameter((*extra).clone()));
        }
    }

    Ok(())
}

/// Replace every `{name}` whose name is present in `supplied`.
///
/// Unresolved placeholders are left verbatim and the first missing name is
/// reported alongside the partially interpolated result. Single pass:
/// substituted values are never re-scanned for placeholders.
pub fn interpolate(template: &str, supplied: &Params) -> (String, Option<I18nError>) {
    let mut missing: Option<String> = None;

    let result = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        match supplied.get(name) {
            Some(value) => value.to_string(),
            None => {
                if missing.is_none() {
                    missing = Some(name.to_string());
                }
                caps[0].to_string()
            }
        }
    });

    (
        result.into_owned(),
        missing.map(I18nError::MissingParameter),
    )
}
