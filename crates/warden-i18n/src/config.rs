//! Environment-driven configuration for the i18n subsystem.
//!
//! Loaded once under a single-shot latch, read under a read lock, and
//! reloadable in place via [`reload_config`].

use std::collections::HashMap;
use std::env;
use std::sync::{OnceLock, RwLock};

/// Deployment environment, from `ENVIRONMENT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Development,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::Test => "test",
        }
    }
}

/// What a failed resolution returns to the user, from `I18N_FALLBACK_MODE`.
///
/// `Mixed` shows the friendly message in production and the `@@key@@`
/// debug marker everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackMode {
    Friendly,
    Debug,
    #[default]
    Mixed,
}

/// Minimum level for missing-key diagnostics, from `I18N_LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warning",
            Self::Error => "error",
        }
    }
}

/// Runtime configuration of the i18n subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct I18nConfig {
    pub environment: Environment,
    pub fallback_mode: FallbackMode,
    pub log_missing_keys: bool,
    pub log_level: LogLevel,
    pub structured_logging: bool,
    pub enable_metrics: bool,
    /// User-visible "message unavailable" text per language.
    pub fallback_messages: HashMap<String, String>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            fallback_mode: FallbackMode::default(),
            log_missing_keys: true,
            log_level: LogLevel::default(),
            structured_logging: true,
            enable_metrics: true,
            fallback_messages: default_fallback_messages(),
        }
    }
}

impl I18nConfig {
    /// Read every recognized variable from the process environment.
    pub fn from_env() -> Self {
        let mut config = Self {
            environment: parse_environment(&env_str("ENVIRONMENT")),
            fallback_mode: parse_fallback_mode(&env_str("I18N_FALLBACK_MODE")),
            log_missing_keys: parse_bool(&env_str("I18N_LOG_MISSING_KEYS"), true),
            log_level: parse_log_level(&env_str("I18N_LOG_LEVEL")),
            structured_logging: parse_bool(&env_str("I18N_ENABLE_STRUCTURED_LOGGING"), true),
            enable_metrics: parse_bool(&env_str("I18N_ENABLE_METRICS"), true),
            fallback_messages: default_fallback_messages(),
        };

        // A custom message overrides the table for every language.
        let custom = env_str("I18N_FALLBACK_MESSAGE");
        if !custom.is_empty() {
            for message in config.fallback_messages.values_mut() {
                *message = custom.clone();
            }
        }

        config
    }

    /// Friendly text shown when a key cannot be resolved at all.
    pub fn fallback_message(&self, lang: &str) -> &str {
        self.fallback_messages
            .get(lang)
            .or_else(|| self.fallback_messages.get("en"))
            .map(String::as_str)
            .unwrap_or("Message not available")
    }

    /// Whether failed resolutions show the friendly text instead of the
    /// `@@key@@` debug marker.
    pub fn use_friendly_fallback(&self) -> bool {
        match self.fallback_mode {
            FallbackMode::Friendly => true,
            FallbackMode::Debug => false,
            FallbackMode::Mixed => self.environment == Environment::Production,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn env_str(key: &str) -> String {
    env::var(key).unwrap_or_default()
}

pub(crate) fn parse_environment(value: &str) -> Environment {
    match value.to_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" | "testing" => Environment::Test,
        _ => Environment::Development,
    }
}

pub(crate) fn parse_fallback_mode(value: &str) -> FallbackMode {
    match value.to_lowercase().as_str() {
        "friendly" => FallbackMode::Friendly,
        "debug" => FallbackMode::Debug,
        _ => FallbackMode::Mixed,
    }
}

pub(crate) fn parse_log_level(value: &str) -> LogLevel {
    match value.to_lowercase().as_str() {
        "warn" | "warning" => LogLevel::Warn,
        "error" => LogLevel::Error,
        _ => LogLevel::Info,
    }
}

pub(crate) fn parse_bool(value: &str, default: bool) -> bool {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => true,
        "false" | "no" | "0" | "off" => false,
        _ => default,
    }
}

fn default_fallback_messages() -> HashMap<String, String> {
    [
        ("en", "Message not available"),
        ("es", "Mensaje no disponible"),
        ("fr", "Message non disponible"),
        ("de", "Nachricht nicht verfügbar"),
        ("it", "Messaggio non disponibile"),
        ("pt", "Mensagem não disponível"),
        ("ru", "Сообщение недоступно"),
        ("zh", "消息不可用"),
        ("ja", "メッセージが利用できません"),
        ("hi", "संदेश उपलब्ध नहीं है"),
        ("tr", "Mesaj mevcut değil"),
        ("nl", "Bericht niet beschikbaar"),
        ("pl", "Wiadomość niedostępna"),
        ("sv", "Meddelande inte tillgängligt"),
        ("da", "Besked ikke tilgængelig"),
        ("fi", "Viesti ei saatavilla"),
        ("ro", "Mesaj indisponibil"),
        ("uk", "Повідомлення недоступне"),
        ("el", "Μήνυμα μη διαθέσιμο"),
        ("cs", "Zpráva není k dispozici"),
    ]
    .into_iter()
    .map(|(lang, message)| (lang.to_string(), message.to_string()))
    .collect()
}

static CONFIG: OnceLock<RwLock<I18nConfig>> = OnceLock::new();

fn cell() -> &'static RwLock<I18nConfig> {
    CONFIG.get_or_init(|| RwLock::new(I18nConfig::from_env()))
}

/// Snapshot of the current configuration.
pub fn config() -> I18nConfig {
    cell().read().expect("config lock poisoned").clone()
}

/// Re-read the process environment in place.
pub fn reload_config() {
    *cell().write().expect("config lock poisoned") = I18nConfig::from_env();
}

/// Replace the configuration wholesale. For tests.
pub fn set_config(config: I18nConfig) {
    *cell().write().expect("config lock poisoned") = config;
}

/// Cheap read of the metrics flag, for hot paths.
pub(crate) fn metrics_enabled() -> bool {
    cell().read().expect("config lock poisoned").enable_metrics
}
