//! Locale manager — owns the locale store, vends translators, reloads.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

use tracing::{info, warn};
use warden_core::metrics;

use crate::catalog::{GlobalCatalog, MessageCatalog};
use crate::config;
use crate::error::{I18nError, LoadError};
use crate::fallback::FallbackResolver;
use crate::logger::Logger;
use crate::source::LocaleSource;
use crate::store::{LoaderConfig, LocaleStore};
use crate::translator::Translator;

/// Optional external cache hook.
///
/// The resolution path never consults it; deployments may wire it up to
/// share warmed translations with other services.
pub trait TranslationCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&self, key: &str, value: &[u8], ttl: Duration);
}

/// Everything `initialize` needs beyond the source and base path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagerConfig {
    pub loader: LoaderConfig,
    /// Run the parameter validator before interpolation.
    pub strict_validation: bool,
}

/// Lifecycle state of the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerStatus {
    Uninitialized,
    Ready,
    Reloading,
}

const STATUS_UNINITIALIZED: u8 = 0;
const STATUS_READY: u8 = 1;
const STATUS_RELOADING: u8 = 2;

fn status_from(raw: u8) -> ManagerStatus {
    match raw {
        STATUS_READY => ManagerStatus::Ready,
        STATUS_RELOADING => ManagerStatus::Reloading,
        _ => ManagerStatus::Uninitialized,
    }
}

/// Shared internals handed to every translator.
pub(crate) struct ManagerInner {
    pub(crate) store: LocaleStore,
    pub(crate) resolver: FallbackResolver,
    pub(crate) logger: Logger,
    pub(crate) catalog: Arc<dyn MessageCatalog>,
    pub(crate) default_lang: String,
    pub(crate) strict_validation: bool,
}

struct InitState {
    inner: Arc<ManagerInner>,
    source: Arc<dyn LocaleSource>,
    base_path: String,
    config: ManagerConfig,
}

/// Owns locale resources and vends translators.
///
/// `Uninitialized → Ready → Reloading → Ready`: lookups before
/// `initialize` fail with `ManagerNotInit`; lookups during a reload see
/// the previous snapshot.
pub struct LocaleManager {
    state: RwLock<Option<InitState>>,
    catalog: RwLock<Arc<dyn MessageCatalog>>,
    cache: RwLock<Option<Arc<dyn TranslationCache>>>,
    status: AtomicU8,
}

impl Default for LocaleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LocaleManager {
    /// A standalone manager. Most callers want [`manager`] instead; tests
    /// use this to avoid coupling through process-wide state.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
            catalog: RwLock::new(Arc::new(GlobalCatalog)),
            cache: RwLock::new(None),
            status: AtomicU8::new(STATUS_UNINITIALIZED),
        }
    }

    /// Swap the catalog capability. Takes effect for translators created
    /// after the next `initialize`; call before initializing.
    pub fn set_catalog(&self, catalog: Arc<dyn MessageCatalog>) {
        *self.catalog.write().expect("manager catalog lock poisoned") = catalog;
    }

    /// Attach an external cache. The manager works unchanged without one.
    pub fn set_cache(&self, cache: Arc<dyn TranslationCache>) {
        *self.cache.write().expect("manager cache lock poisoned") = Some(cache);
    }

    /// Load locales from `source` under `base_path` and become `Ready`.
    ///
    /// Idempotent when called again with identical arguments; different
    /// arguments are refused with `AlreadyInitialized`. The default
    /// language must load, even in non-strict mode.
    pub fn initialize(
        &self,
        source: Arc<dyn LocaleSource>,
        base_path: &str,
        config: ManagerConfig,
    ) -> Result<Vec<LoadError>, I18nError> {
        if let Some(existing) = self.state.read().expect("manager state lock poisoned").as_ref()
        {
            return if existing.base_path == base_path && existing.config == config {
                Ok(Vec::new())
            } else {
                Err(I18nError::AlreadyInitialized)
            };
        }

        let store = LocaleStore::new(config.loader.legacy_strings_prefix);
        let errors = store.load(source.as_ref(), base_path, config.loader.strict)?;
        for e in &errors {
            warn!("locale load: {e}");
        }

        if !store.has(&config.loader.default_language) {
            return Err(I18nError::LocaleNotFound(
                config.loader.default_language.clone(),
            ));
        }

        let inner = Arc::new(ManagerInner {
            store,
            resolver: FallbackResolver::new(&config.loader.default_language),
            logger: Logger::new(),
            catalog: self
                .catalog
                .read()
                .expect("manager catalog lock poisoned")
                .clone(),
            default_lang: config.loader.default_language.clone(),
            strict_validation: config.strict_validation,
        });

        let mut state = self.state.write().expect("manager state lock poisoned");
        if let Some(existing) = state.as_ref() {
            // Lost a race with another initializer.
            return if existing.base_path == base_path && existing.config == config {
                Ok(Vec::new())
            } else {
                Err(I18nError::AlreadyInitialized)
            };
        }

        info!(
            "i18n initialized: {} languages from '{base_path}'",
            inner.store.len()
        );
        *state = Some(InitState {
            inner,
            source,
            base_path: base_path.to_string(),
            config,
        });
        self.status.store(STATUS_READY, Ordering::Release);
        Ok(errors)
    }

    /// Translator for `lang`. An unknown or empty language binds to the
    /// default language rather than failing — handlers must never error
    /// on a user's language preference.
    pub fn translator(&self, lang: &str) -> Result<Translator, I18nError> {
        let state = self.state.read().expect("manager state lock poisoned");
        let Some(state) = state.as_ref() else {
            return Err(I18nError::ManagerNotInit);
        };
        let inner = Arc::clone(&state.inner);
        let lang = if !lang.is_empty() && inner.store.has(lang) {
            lang.to_string()
        } else {
            inner.default_lang.clone()
        };
        Ok(Translator::new(lang, inner))
    }

    /// Rescan the source and atomically install the new mapping.
    ///
    /// Scanning happens outside any lock held by readers; calls in flight
    /// observe either the old or the new mapping, never a mix.
    pub fn reload_locales(&self) -> Result<Vec<LoadError>, I18nError> {
        let (inner, source, base_path, strict) = {
            let state = self.state.read().expect("manager state lock poisoned");
            let Some(state) = state.as_ref() else {
                return Err(I18nError::ManagerNotInit);
            };
            (
                Arc::clone(&state.inner),
                Arc::clone(&state.source),
                state.base_path.clone(),
                state.config.loader.strict,
            )
        };

        self.status.store(STATUS_RELOADING, Ordering::Release);
        let result = inner.store.load(source.as_ref(), &base_path, strict);
        self.status.store(STATUS_READY, Ordering::Release);

        match &result {
            Ok(errors) => {
                for e in errors {
                    warn!("locale reload: {e}");
                }
                if config::metrics_enabled() {
                    metrics::LOCALE_RELOADS.inc();
                }
                info!("locales reloaded: {} languages", inner.store.len());
            }
            Err(e) => warn!("locale reload failed: {e}"),
        }
        result
    }

    pub fn available_languages(&self) -> Vec<String> {
        self.with_inner(|inner| inner.store.languages())
            .unwrap_or_default()
    }

    pub fn is_language_supported(&self, lang: &str) -> bool {
        self.with_inner(|inner| inner.store.has(lang)).unwrap_or(false)
    }

    pub fn default_language(&self) -> Option<String> {
        self.with_inner(|inner| inner.default_lang.clone())
    }

    pub fn status(&self) -> ManagerStatus {
        status_from(self.status.load(Ordering::Acquire))
    }

    pub fn stats(&self) -> ManagerStats {
        let cache_enabled = self
            .cache
            .read()
            .expect("manager cache lock poisoned")
            .is_some();
        ManagerStats {
            status: self.status(),
            default_language: self.default_language(),
            languages: self.available_languages(),
            catalog_messages: self
                .with_inner(|inner| inner.catalog.count())
                .unwrap_or(0),
            cache_enabled,
        }
    }

    /// Stop the logger's background tasks.
    pub fn shutdown(&self) {
        if let Some(inner) = self.with_inner(Arc::clone) {
            inner.logger.shutdown();
        }
    }

    fn with_inner<T>(&self, f: impl FnOnce(&Arc<ManagerInner>) -> T) -> Option<T> {
        self.state
            .read()
            .expect("manager state lock poisoned")
            .as_ref()
            .map(|state| f(&state.inner))
    }

    #[cfg(test)]
    pub(crate) fn inner_for_tests(&self) -> Option<Arc<ManagerInner>> {
        self.with_inner(Arc::clone)
    }
}

/// Point-in-time view of the manager, for health/status surfaces.
#[derive(Debug, Clone)]
pub struct ManagerStats {
    pub status: ManagerStatus,
    pub default_language: Option<String>,
    pub languages: Vec<String>,
    pub catalog_messages: usize,
    pub cache_enabled: bool,
}

static MANAGER: OnceLock<LocaleManager> = OnceLock::new();

/// The process-wide manager instance.
pub fn manager() -> &'static LocaleManager {
    MANAGER.get_or_init(LocaleManager::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MapSource;

    fn sample_source() -> MapSource {
        MapSource::new()
            .with("en.yml", "greeting:\n  hello: \"Hello, {name}!\"\n")
            .with("es.yml", "greeting:\n  hello: \"\u{00a1}Hola, {name}!\"\n")
    }

    #[test]
    fn test_uninitialized_lookups_fail() {
        let manager = LocaleManager::new();
        assert_eq!(manager.status(), ManagerStatus::Uninitialized);
        assert_eq!(
            manager.translator("en").unwrap_err(),
            I18nError::ManagerNotInit
        );
        assert_eq!(
            manager.reload_locales().unwrap_err(),
            I18nError::ManagerNotInit
        );
        assert!(manager.available_languages().is_empty());
    }

    #[test]
    fn test_initialize_then_ready() {
        let manager = LocaleManager::new();
        let errors = manager
            .initialize(Arc::new(sample_source()), "", ManagerConfig::default())
            .unwrap();
        assert!(errors.is_empty());
        assert_eq!(manager.status(), ManagerStatus::Ready);
        assert_eq!(manager.available_languages(), vec!["en", "es"]);
        assert!(manager.is_language_supported("es"));
        assert!(!manager.is_language_supported("fr"));
        assert_eq!(manager.default_language().unwrap(), "en");
    }

    #[test]
    fn test_initialize_idempotent_when_identical() {
        let manager = LocaleManager::new();
        manager
            .initialize(Arc::new(sample_source()), "", ManagerConfig::default())
            .unwrap();
        assert!(manager
            .initialize(Arc::new(sample_source()), "", ManagerConfig::default())
            .is_ok());

        let mut other = ManagerConfig::default();
        other.loader.strict = true;
        assert_eq!(
            manager
                .initialize(Arc::new(sample_source()), "", other)
                .unwrap_err(),
            I18nError::AlreadyInitialized
        );
        assert_eq!(
            manager
                .initialize(Arc::new(sample_source()), "other/path", ManagerConfig::default())
                .unwrap_err(),
            I18nError::AlreadyInitialized
        );
    }

    #[test]
    fn test_missing_default_language_refused() {
        let source = MapSource::new().with("es.yml", "greeting:\n  hello: Hola\n");
        let manager = LocaleManager::new();
        assert_eq!(
            manager
                .initialize(Arc::new(source), "", ManagerConfig::default())
                .unwrap_err(),
            I18nError::LocaleNotFound("en".to_string())
        );
        assert_eq!(manager.status(), ManagerStatus::Uninitialized);
    }

    #[test]
    fn test_unknown_language_binds_to_default() {
        let manager = LocaleManager::new();
        manager
            .initialize(Arc::new(sample_source()), "", ManagerConfig::default())
            .unwrap();
        let translator = manager.translator("xx").unwrap();
        assert_eq!(translator.lang(), "en");
        assert!(translator.is_default_lang());
        let translator = manager.translator("es").unwrap();
        assert_eq!(translator.lang(), "es");
    }

    #[test]
    fn test_stats_shape() {
        let manager = LocaleManager::new();
        manager
            .initialize(Arc::new(sample_source()), "", ManagerConfig::default())
            .unwrap();
        let stats = manager.stats();
        assert_eq!(stats.status, ManagerStatus::Ready);
        assert_eq!(stats.languages, vec!["en", "es"]);
        assert!(!stats.cache_enabled);
    }
}
