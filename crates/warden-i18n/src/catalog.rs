//! Process-wide registry of message descriptors.
//!
//! Command modules register their messages once at startup; translators
//! consult the catalog for default texts and declared parameters.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::I18nError;
use crate::params::{required_params, validate_params, Params};

/// A translatable message with its default-language text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Globally unique dotted key, e.g. `admin.promote.success`.
    pub key: String,
    /// Canonical text in the default language.
    pub default_text: String,
    /// Parameter names the text expects; auto-extracted when empty.
    #[serde(default)]
    pub params: Vec<String>,
    /// Context about when the message is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Message {
    pub fn new(key: &str, default_text: &str) -> Self {
        Self {
            key: key.to_string(),
            default_text: default_text.to_string(),
            ..Self::default()
        }
    }

    pub fn with_params(key: &str, default_text: &str, params: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            default_text: default_text.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            description: None,
        }
    }
}

/// Registration and lookup surface of a message catalog.
///
/// The manager consumes this as a capability; the default realization is
/// the in-memory process-wide registry.
pub trait MessageCatalog: Send + Sync {
    fn register(&self, msg: Message) -> Result<(), I18nError>;
    fn register_many(&self, msgs: Vec<Message>) -> Result<(), Vec<I18nError>>;
    fn get(&self, key: &str) -> Option<Message>;
    /// All keys, lexicographically sorted.
    fn keys(&self) -> Vec<String>;
    fn count(&self) -> usize;
    /// Check `params` against the declared parameters of `key`.
    fn validate(&self, key: &str, params: &Params, strict: bool) -> Result<(), I18nError>;
    /// Remove everything. For tests only; callers must quiesce readers first.
    fn clear(&self);
}

/// In-memory catalog. Readers share the lock; register and clear are
/// exclusive, so a reader never observes a partially inserted descriptor.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    messages: RwLock<HashMap<String, Message>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageCatalog for MemoryCatalog {
    fn register(&self, mut msg: Message) -> Result<(), I18nError> {
        if msg.key.is_empty() {
            return Err(I18nError::EmptyKey);
        }
        if msg.default_text.is_empty() {
            return Err(I18nError::EmptyDefault(msg.key));
        }
        if msg.params.is_empty() {
            msg.params = required_params(&msg.default_text).into_iter().collect();
        }

        let mut messages = self.messages.write().expect("catalog lock poisoned");
        if messages.contains_key(&msg.key) {
            return Err(I18nError::DuplicateKey(msg.key));
        }
        messages.insert(msg.key.clone(), msg);
        Ok(())
    }

    fn register_many(&self, msgs: Vec<Message>) -> Result<(), Vec<I18nError>> {
        let mut errors = Vec::new();
        for msg in msgs {
            if let Err(e) = self.register(msg) {
                errors.push(e);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn get(&self, key: &str) -> Option<Message> {
        self.messages
            .read()
            .expect("catalog lock poisoned")
            .get(key)
            .cloned()
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .messages
            .read()
            .expect("catalog lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn count(&self) -> usize {
        self.messages.read().expect("catalog lock poisoned").len()
    }

    fn validate(&self, key: &str, params: &Params, strict: bool) -> Result<(), I18nError> {
        let msg = self.get(key).ok_or_else(|| I18nError::KeyNotFound {
            key: key.to_string(),
            lang: "catalog".to_string(),
        })?;
        validate_params(&msg.params, params, strict)
    }

    fn clear(&self) {
        self.messages
            .write()
            .expect("catalog lock poisoned")
            .clear();
    }
}

/// Catalog capability backed by the process-wide registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalCatalog;

impl MessageCatalog for GlobalCatalog {
    fn register(&self, msg: Message) -> Result<(), I18nError> {
        global().register(msg)
    }

    fn register_many(&self, msgs: Vec<Message>) -> Result<(), Vec<I18nError>> {
        global().register_many(msgs)
    }

    fn get(&self, key: &str) -> Option<Message> {
        global().get(key)
    }

    fn keys(&self) -> Vec<String> {
        global().keys()
    }

    fn count(&self) -> usize {
        global().count()
    }

    fn validate(&self, key: &str, params: &Params, strict: bool) -> Result<(), I18nError> {
        global().validate(key, params, strict)
    }

    fn clear(&self) {
        global().clear();
    }
}

static GLOBAL: OnceLock<MemoryCatalog> = OnceLock::new();

/// The process-wide catalog instance.
pub fn global() -> &'static MemoryCatalog {
    GLOBAL.get_or_init(MemoryCatalog::new)
}

/// Register `key` with its default text in the process-wide catalog.
pub fn register(key: &str, default_text: &str) -> Result<(), I18nError> {
    global().register(Message::new(key, default_text))
}

/// Register a complete descriptor in the process-wide catalog.
pub fn register_message(msg: Message) -> Result<(), I18nError> {
    global().register(msg)
}

/// Register several descriptors; collects per-message failures.
pub fn register_many(msgs: Vec<Message>) -> Result<(), Vec<I18nError>> {
    global().register_many(msgs)
}

/// Register and panic on failure. For module-init registration blocks,
/// where a broken message table should terminate the process.
pub fn must_register(key: &str, default_text: &str) {
    if let Err(e) = register(key, default_text) {
        panic!("failed to register message '{key}': {e}");
    }
}

pub fn get(key: &str) -> Option<Message> {
    global().get(key)
}

pub fn keys() -> Vec<String> {
    global().keys()
}

pub fn count() -> usize {
    global().count()
}

pub fn validate(key: &str, params: &Params, strict: bool) -> Result<(), I18nError> {
    global().validate(key, params, strict)
}

/// Destructive. For tests only; see [`MessageCatalog::clear`].
pub fn clear() {
    global().clear();
}

pub fn has_message(key: &str) -> bool {
    global().get(key).is_some()
}

/// Default text for `key`, if registered.
pub fn default_text(key: &str) -> Option<String> {
    global().get(key).map(|m| m.default_text)
}

/// Keys containing `needle`, case-insensitive.
pub fn search_keys(needle: &str) -> Vec<String> {
    let needle = needle.to_lowercase();
    global()
        .keys()
        .into_iter()
        .filter(|k| k.to_lowercase().contains(&needle))
        .collect()
}

/// Shape summary of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    /// Message count per top-level key prefix.
    pub by_prefix: HashMap<String, usize>,
    /// Messages declaring at least one parameter.
    pub with_params: usize,
}

/// Summarize the shape of `catalog`.
pub fn stats(catalog: &dyn MessageCatalog) -> CatalogStats {
    let mut out = CatalogStats::default();
    for key in catalog.keys() {
        out.total += 1;
        let prefix = key.split('.').next().unwrap_or(&key).to_string();
        *out.by_prefix.entry(prefix).or_insert(0) += 1;
        if catalog.get(&key).is_some_and(|m| !m.params.is_empty()) {
            out.with_params += 1;
        }
    }
    out
}
