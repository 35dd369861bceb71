//! Per-language translation facade.
//!
//! Translators are cheap, immutable, and hold no lock: a language tag,
//! a handle to the manager internals, and a cache-key prefix. The
//! resolution path always returns some string; errors ride alongside for
//! callers that want them.

use std::collections::HashSet;
use std::sync::Arc;

use warden_core::metrics;

use crate::config;
use crate::error::I18nError;
use crate::manager::ManagerInner;
use crate::params::{interpolate, validate_params, ParamValue, Params};
use crate::plural::select_for_lang;

/// `@@key@@` — unambiguous marker for an unresolved translation;
/// unsuitable for end users.
pub(crate) fn debug_marker(key: &str) -> String {
    format!("@@{key}@@")
}

/// Per-language facade over catalog, fallback chain, and locale store.
#[derive(Clone)]
pub struct Translator {
    lang: String,
    cache_prefix: String,
    inner: Arc<ManagerInner>,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("lang", &self.lang)
            .field("cache_prefix", &self.cache_prefix)
            .finish_non_exhaustive()
    }
}

impl Translator {
    pub(crate) fn new(lang: String, inner: Arc<ManagerInner>) -> Self {
        let cache_prefix = format!("i18n:{lang}:");
        Self {
            lang,
            cache_prefix,
            inner,
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn is_default_lang(&self) -> bool {
        self.lang == self.inner.default_lang
    }

    /// Cache-key prefix for deployments that memoize lookups externally.
    /// The resolution path itself never consults a cache.
    pub fn cache_prefix(&self) -> &str {
        &self.cache_prefix
    }

    /// Localized text for `key`; never fails.
    ///
    /// Walks the fallback chain, then falls back to the catalog default or
    /// the configured unresolved-key text.
    pub fn message(&self, key: &str, params: &Params) -> String {
        self.get_message(key, params).0
    }

    /// Same as [`Translator::message`], surfacing the first error.
    pub fn get_message(&self, key: &str, params: &Params) -> (String, Option<I18nError>) {
        if key.is_empty() {
            return (self.fallback_text(key, params), Some(I18nError::EmptyKey));
        }

        let mut first_err = self.strict_validation_error(key, params);

        let (chain, cycle) = self.inner.resolver.chain(&self.lang);
        if cycle.is_some() {
            self.inner.logger.recursive_fallback(&self.lang);
        }

        for lang in &chain {
            if let Some(text) = self.inner.store.get(lang, key) {
                if lang != &self.lang {
                    self.inner.logger.fallback_used(key, &self.lang, lang);
                    if config::metrics_enabled() {
                        metrics::FALLBACK_HITS.inc();
                    }
                }
                if config::metrics_enabled() {
                    metrics::TRANSLATIONS_SERVED.inc();
                }
                let (out, interp_err) = interpolate(&text, params);
                return (out, first_err.take().or(interp_err));
            }
        }

        self.inner.logger.key_not_found(key, &self.lang);
        if config::metrics_enabled() {
            metrics::MISSING_KEYS.inc();
        }

        let err = first_err.take().unwrap_or(I18nError::KeyNotFound {
            key: key.to_string(),
            lang: self.lang.clone(),
        });
        (self.fallback_text(key, params), Some(err))
    }

    /// Pluralized text for `key` and count `n`; never fails.
    pub fn plural(&self, key: &str, n: i64, params: &Params) -> String {
        self.get_plural(key, n, params).0
    }

    /// Same as [`Translator::plural`], surfacing the first error.
    ///
    /// `count` is injected into the parameters before interpolation unless
    /// the caller already supplied one.
    pub fn get_plural(&self, key: &str, n: i64, params: &Params) -> (String, Option<I18nError>) {
        if key.is_empty() {
            return (self.fallback_text(key, params), Some(I18nError::EmptyKey));
        }

        let mut supplied = params.clone();
        supplied
            .entry("count".to_string())
            .or_insert(ParamValue::Int(n));

        let (chain, cycle) = self.inner.resolver.chain(&self.lang);
        if cycle.is_some() {
            self.inner.logger.recursive_fallback(&self.lang);
        }

        for lang in &chain {
            if let Some(rule) = self.inner.store.plural_rule(lang, key) {
                let Some(form) = select_for_lang(&rule, n, lang) else {
                    // Forms exist but none is usable and `other` is unset.
                    self.inner.logger.missing_key(key, lang, false);
                    return (
                        self.fallback_text(key, &supplied),
                        Some(I18nError::PluralMissing(key.to_string())),
                    );
                };
                if lang != &self.lang {
                    self.inner.logger.fallback_used(key, &self.lang, lang);
                    if config::metrics_enabled() {
                        metrics::FALLBACK_HITS.inc();
                    }
                }
                if config::metrics_enabled() {
                    metrics::TRANSLATIONS_SERVED.inc();
                }
                let (out, interp_err) = interpolate(form, &supplied);
                return (out, interp_err);
            }

            // A plain singular string under the key also satisfies plural.
            if let Some(text) = self.inner.store.get(lang, key) {
                if lang != &self.lang {
                    self.inner.logger.fallback_used(key, &self.lang, lang);
                    if config::metrics_enabled() {
                        metrics::FALLBACK_HITS.inc();
                    }
                }
                if config::metrics_enabled() {
                    metrics::TRANSLATIONS_SERVED.inc();
                }
                let (out, interp_err) = interpolate(&text, &supplied);
                return (out, interp_err);
            }
        }

        self.inner.logger.key_not_found(key, &self.lang);
        if config::metrics_enabled() {
            metrics::MISSING_KEYS.inc();
        }
        (
            self.fallback_text(key, &supplied),
            Some(I18nError::PluralMissing(key.to_string())),
        )
    }

    /// Whether this language itself defines `key`. Fallbacks do not count.
    pub fn has_translation(&self, key: &str) -> bool {
        self.inner.store.get(&self.lang, key).is_some()
    }

    /// Catalog keys this language does not translate, sorted.
    pub fn missing_keys(&self) -> Vec<String> {
        self.inner
            .catalog
            .keys()
            .into_iter()
            .filter(|key| !self.has_translation(key))
            .collect()
    }

    /// Keys this language defines that the catalog does not know, sorted.
    pub fn extra_keys(&self) -> Vec<String> {
        let catalog: HashSet<String> = self.inner.catalog.keys().into_iter().collect();
        let legacy = self.inner.store.legacy_prefix_enabled();
        self.inner
            .store
            .keys_for(&self.lang)
            .into_iter()
            .filter(|key| {
                let canonical = if legacy {
                    key.strip_prefix("strings.").unwrap_or(key)
                } else {
                    key.as_str()
                };
                !catalog.contains(canonical)
            })
            .collect()
    }

    /// Percentage of catalog keys this language translates.
    pub fn coverage(&self) -> f64 {
        let total = self.inner.catalog.count();
        if total == 0 {
            return 100.0;
        }
        let translated = total - self.missing_keys().len();
        (translated as f64 / total as f64) * 100.0
    }

    fn strict_validation_error(&self, key: &str, params: &Params) -> Option<I18nError> {
        if !self.inner.strict_validation {
            return None;
        }
        let msg = self.inner.catalog.get(key)?;
        validate_params(&msg.params, params, true).err()
    }

    /// Text of last resort: the catalog default when registered, otherwise
    /// the friendly per-language message or the `@@key@@` debug marker,
    /// per `I18N_FALLBACK_MODE`.
    fn fallback_text(&self, key: &str, params: &Params) -> String {
        if !key.is_empty() {
            if let Some(msg) = self.inner.catalog.get(key) {
                return interpolate(&msg.default_text, params).0;
            }
        }

        let cfg = config::config();
        if cfg.use_friendly_fallback() {
            cfg.fallback_message(&self.lang).to_string()
        } else if key.is_empty() {
            debug_marker("empty-key")
        } else {
            debug_marker(key)
        }
    }
}
