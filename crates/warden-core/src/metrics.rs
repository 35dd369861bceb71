//! Process-wide metrics facade.
//!
//! Plain atomic counters bumped from the hot paths; exporting them to a
//! metrics backend is a deployment concern and lives outside this crate.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Translations successfully resolved (any language in the chain).
pub static TRANSLATIONS_SERVED: Counter = Counter::new();
/// Resolutions that succeeded through a fallback language.
pub static FALLBACK_HITS: Counter = Counter::new();
/// Resolutions that found nothing anywhere in the chain.
pub static MISSING_KEYS: Counter = Counter::new();
/// Completed locale reloads.
pub static LOCALE_RELOADS: Counter = Counter::new();
/// Diagnostic events that passed rate limiting and were written.
pub static EVENTS_EMITTED: Counter = Counter::new();
/// Diagnostic events suppressed by the rate limiter.
pub static EVENTS_RATE_LIMITED: Counter = Counter::new();

/// Current value of every counter, keyed by name.
pub fn snapshot() -> Vec<(&'static str, u64)> {
    vec![
        ("translations_served", TRANSLATIONS_SERVED.get()),
        ("fallback_hits", FALLBACK_HITS.get()),
        ("missing_keys", MISSING_KEYS.get()),
        ("locale_reloads", LOCALE_RELOADS.get()),
        ("events_emitted", EVENTS_EMITTED.get()),
        ("events_rate_limited", EVENTS_RATE_LIMITED.get()),
    ]
}

/// Zero every counter. For tests.
pub fn reset_all() {
    TRANSLATIONS_SERVED.reset();
    FALLBACK_HITS.reset();
    MISSING_KEYS.reset();
    LOCALE_RELOADS.reset();
    EVENTS_EMITTED.reset();
    EVENTS_RATE_LIMITED.reset();
}
