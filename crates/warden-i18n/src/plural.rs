//! Plural form selection.

use serde::{Deserialize, Serialize};

/// Six optional CLDR-category forms for one message key.
///
/// At least `other` must be non-empty for the key to be pluralizable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluralRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub few: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub many: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
}

impl PluralRule {
    /// True when no form carries any text.
    pub fn is_empty(&self) -> bool {
        form(&self.zero).is_none()
            && form(&self.one).is_none()
            && form(&self.two).is_none()
            && form(&self.few).is_none()
            && form(&self.many).is_none()
            && form(&self.other).is_none()
    }
}

/// A form counts as set only when it carries text.
fn form(opt: &Option<String>) -> Option<&str> {
    opt.as_deref().filter(|s| !s.is_empty())
}

/// Pick a form for count `n`, applying the precedence ladder on |n|:
///
/// zero (|n| = 0), one (|n| = 1), two (|n| = 2), few (2 ≤ |n| ≤ 4),
/// many (|n| ≥ 5), other.
///
/// Returns `None` when no earlier branch matched and `other` is unset; the
/// caller surfaces that as `PluralMissing`.
pub fn select(rule: &PluralRule, n: i64) -> Option<&str> {
    let magnitude = n.unsigned_abs();

    if magnitude == 0 {
        if let Some(text) = form(&rule.zero) {
            return Some(text);
        }
    }
    if magnitude == 1 {
        if let Some(text) = form(&rule.one) {
            return Some(text);
        }
    }
    if magnitude == 2 {
        if let Some(text) = form(&rule.two) {
            return Some(text);
        }
    }
    if (2..=4).contains(&magnitude) {
        if let Some(text) = form(&rule.few) {
            return Some(text);
        }
    }
    if magnitude >= 5 {
        if let Some(text) = form(&rule.many) {
            return Some(text);
        }
    }
    form(&rule.other)
}

/// Language-aware entry point.
///
/// No language gets its own table in this core; an overlay would return a
/// category here before the shared ladder runs.
pub fn select_for_lang<'a>(rule: &'a PluralRule, n: i64, _lang: &str) -> Option<&'a str> {
    select(rule, n)
}
