//! Log line sanitization.
//!
//! Masks credentials and personal data before a line reaches any sink:
//! bot tokens, API keys, database URIs, passwords, card numbers, email
//! addresses, IPv4 addresses.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static BOT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{8,10}:[A-Za-z0-9_-]{35}\b").expect("bot token regex"));

static DB_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(mongodb|redis)://[^@\s]+:[^@\s]+@[^\s]+").expect("db uri regex")
});

static API_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(api[_-]?key|token|secret)["\s]*[:=]["\s]*[A-Za-z0-9_-]{20,}"#)
        .expect("api key regex")
});

static PASSWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(password|pwd|pass)["\s]*[:=]["\s]*[^\s"]{6,}"#).expect("password regex")
});

static CARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b").expect("card regex")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email regex")
});

static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("ipv4 regex"));

/// Mask sensitive substrings in a log line.
///
/// Card numbers keep their last four digits and IPv4 addresses keep the
/// first octet; everything else is replaced by a labeled marker.
pub fn sanitize_line(line: &str) -> String {
    let out = BOT_TOKEN.replace_all(line, "[REDACTED_TOKEN]");
    let out = DB_URI.replace_all(&out, |caps: &Captures<'_>| match &caps[1] {
        "redis" => "[REDACTED_REDIS_URI]".to_string(),
        _ => "[REDACTED_DB_URI]".to_string(),
    });
    let out = API_KEY.replace_all(&out, "[REDACTED_TOKEN]");
    let out = PASSWORD.replace_all(&out, "[REDACTED_PASSWORD]");
    let out = CARD.replace_all(&out, |caps: &Captures<'_>| {
        let digits: String = caps[0].chars().filter(char::is_ascii_digit).collect();
        format!("****-****-****-{}", &digits[digits.len() - 4..])
    });
    let out = EMAIL.replace_all(&out, "[REDACTED_EMAIL]");
    let out = IPV4.replace_all(&out, |caps: &Captures<'_>| {
        let first = caps[0].split('.').next().unwrap_or("*");
        format!("{first}.***.***.***")
    });
    out.into_owned()
}
