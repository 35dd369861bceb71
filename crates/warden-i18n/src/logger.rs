//! Rate-limited diagnostics for unresolved translations.
//!
//! Events are admitted per identity at most once per threshold window,
//! formatted as JSON or plain text, and handed to a line sink. The
//! resolution path never blocks on the sink: with a runtime present,
//! lines go through a bounded channel and are dropped when it is full.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, Notify};
use tracing::{error, info, warn};
use warden_core::{metrics, sanitize};

use crate::config::{self, LogLevel};

/// How often identical events may be emitted.
pub const RATE_LIMIT_THRESHOLD: Duration = Duration::from_secs(300);
/// Cleanup cadence for stale rate-limiter entries.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(600);
/// Queued lines beyond this are dropped rather than blocking resolution.
const SINK_QUEUE_DEPTH: usize = 256;
/// Without a background task, evict stale entries every this many events.
const LAZY_CLEANUP_EVERY: u64 = 512;

/// What happened during a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    MissingKey,
    FallbackUsed,
    KeyNotFound,
}

/// One diagnostic event; doubles as the structured payload.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub key: String,
    pub lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_lang: Option<String>,
    pub fallback_used: bool,
    pub env: String,
    pub level: &'static str,
    pub message: String,
}

/// Line-oriented output target.
pub trait LogSink: Send + Sync {
    fn write_line(&self, level: LogLevel, line: &str);
}

/// Default sink: sanitize, then forward to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_line(&self, level: LogLevel, line: &str) {
        let line = sanitize::sanitize_line(line);
        match level {
            LogLevel::Error => error!(target: "warden_i18n", "{line}"),
            LogLevel::Warn => warn!(target: "warden_i18n", "{line}"),
            LogLevel::Info => info!(target: "warden_i18n", "{line}"),
        }
    }
}

/// Per-identity emission throttle.
#[derive(Debug)]
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Instant>>,
    threshold: Duration,
}

impl RateLimiter {
    pub fn new(threshold: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            threshold,
        }
    }

    /// Admit at most one event per identity per threshold window.
    pub fn admit(&self, identity: &str) -> bool {
        let mut entries = self.entries.lock().expect("rate limiter lock poisoned");
        let now = Instant::now();
        match entries.get(identity) {
            Some(last) if now.duration_since(*last) <= self.threshold => false,
            _ => {
                entries.insert(identity.to_string(), now);
                true
            }
        }
    }

    /// Drop entries older than twice the threshold.
    pub fn cleanup(&self) {
        let mut entries = self.entries.lock().expect("rate limiter lock poisoned");
        let now = Instant::now();
        let horizon = self.threshold * 2;
        entries.retain(|_, last| now.duration_since(*last) <= horizon);
    }

    pub fn tracked(&self) -> usize {
        self.entries.lock().expect("rate limiter lock poisoned").len()
    }

    pub fn reset(&self) {
        self.entries
            .lock()
            .expect("rate limiter lock poisoned")
            .clear();
    }
}

/// Counters and limiter state, for `stats()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerStats {
    pub tracked_identities: usize,
    pub threshold: Duration,
}

/// Emits missing-key diagnostics without blocking the resolution path.
pub struct Logger {
    limiter: Arc<RateLimiter>,
    sink: Arc<dyn LogSink>,
    tx: Option<mpsc::Sender<(LogLevel, String)>>,
    shutdown: Arc<Notify>,
    admitted: AtomicU64,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Logger writing to the default tracing sink.
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Logger writing to `sink`.
    ///
    /// When called inside a tokio runtime, a drain task owns the sink and
    /// a cleanup task evicts stale limiter entries; otherwise lines are
    /// written inline and eviction happens lazily on admission.
    pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
        let limiter = Arc::new(RateLimiter::new(RATE_LIMIT_THRESHOLD));
        let shutdown = Arc::new(Notify::new());

        let tx = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let (tx, rx) = mpsc::channel(SINK_QUEUE_DEPTH);
                handle.spawn(drain_loop(rx, sink.clone(), shutdown.clone()));
                handle.spawn(cleanup_loop(limiter.clone(), shutdown.clone()));
                Some(tx)
            }
            Err(_) => None,
        };

        Self {
            limiter,
            sink,
            tx,
            shutdown,
            admitted: AtomicU64::new(0),
        }
    }

    /// Stop the background drain and cleanup tasks.
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }

    /// A key missing from the requested language.
    pub fn missing_key(&self, key: &str, lang: &str, fallback_used: bool) {
        self.emit(
            EventKind::MissingKey,
            key,
            lang,
            None,
            fallback_used,
            LogLevel::Warn,
            format!("Missing translation key '{key}' for language '{lang}'"),
            format!("missing:{key}:{lang}"),
        );
    }

    /// Resolution succeeded through the fallback chain.
    pub fn fallback_used(&self, key: &str, from_lang: &str, to_lang: &str) {
        self.emit(
            EventKind::FallbackUsed,
            key,
            from_lang,
            Some(to_lang.to_string()),
            true,
            LogLevel::Info,
            format!(
                "Used fallback language '{to_lang}' for key '{key}' (requested: '{from_lang}')"
            ),
            format!("fallback:{key}:{from_lang}->{to_lang}"),
        );
    }

    /// Nothing in the chain produced a value.
    pub fn key_not_found(&self, key: &str, lang: &str) {
        self.emit(
            EventKind::KeyNotFound,
            key,
            lang,
            None,
            false,
            LogLevel::Error,
            format!("Translation key '{key}' not found for language '{lang}' or any fallback"),
            format!("notfound:{key}:{lang}"),
        );
    }

    /// A truncated fallback chain. Shares the limiter; plain line output.
    pub fn recursive_fallback(&self, lang: &str) {
        if !config::config().log_missing_keys {
            return;
        }
        if !self.limiter.admit(&format!("recursive:{lang}")) {
            return;
        }
        self.write(
            LogLevel::Warn,
            format!("Recursive fallback chain truncated for language '{lang}'"),
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn emit(
        &self,
        kind: EventKind,
        key: &str,
        lang: &str,
        fallback_lang: Option<String>,
        fallback_used: bool,
        level: LogLevel,
        message: String,
        identity: String,
    ) {
        let cfg = config::config();
        if !cfg.log_missing_keys || level < cfg.log_level {
            return;
        }

        if !self.limiter.admit(&identity) {
            if cfg.enable_metrics {
                metrics::EVENTS_RATE_LIMITED.inc();
            }
            return;
        }
        self.maybe_lazy_cleanup();

        let event = TranslationEvent {
            timestamp: Utc::now(),
            kind,
            key: key.to_string(),
            lang: lang.to_string(),
            fallback_lang,
            fallback_used,
            env: cfg.environment.as_str().to_string(),
            level: level.as_str(),
            message,
        };

        let line = if cfg.structured_logging {
            serde_json::to_string(&event).unwrap_or(event.message)
        } else {
            event.message
        };

        if cfg.enable_metrics {
            metrics::EVENTS_EMITTED.inc();
        }
        self.write(level, line);
    }

    fn write(&self, level: LogLevel, line: String) {
        match &self.tx {
            // Dropped on a full queue; a slow sink must not stall lookups.
            Some(tx) => {
                let _ = tx.try_send((level, line));
            }
            None => self.sink.write_line(level, &line),
        }
    }

    fn maybe_lazy_cleanup(&self) {
        let admitted = self.admitted.fetch_add(1, Ordering::Relaxed) + 1;
        if self.tx.is_none() && admitted % LAZY_CLEANUP_EVERY == 0 {
            self.limiter.cleanup();
        }
    }

    pub fn stats(&self) -> LoggerStats {
        LoggerStats {
            tracked_identities: self.limiter.tracked(),
            threshold: RATE_LIMIT_THRESHOLD,
        }
    }

    /// Forget all rate-limiting history. For tests.
    pub fn reset(&self) {
        self.limiter.reset();
    }
}

async fn drain_loop(
    mut rx: mpsc::Receiver<(LogLevel, String)>,
    sink: Arc<dyn LogSink>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some((level, line)) => sink.write_line(level, &line),
                None => break,
            },
            _ = shutdown.notified() => break,
        }
    }
}

async fn cleanup_loop(limiter: Arc<RateLimiter>, shutdown: Arc<Notify>) {
    let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => limiter.cleanup(),
            _ = shutdown.notified() => break,
        }
    }
}
