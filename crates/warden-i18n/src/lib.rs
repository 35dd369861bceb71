//! # warden-i18n
//!
//! Internationalization core for the Warden bot: a concurrent message
//! catalog, a YAML locale store with per-language fallback chains,
//! cheap per-language translators, and rate-limited missing-key
//! diagnostics.
//!
//! Command modules register their messages in the [`catalog`] at startup,
//! the [`manager`](manager::manager) loads locale resources once, and
//! request handlers grab a [`Translator`] per incoming update:
//!
//! - `translator.message("bans.ban.success", &params)` resolves through
//!   the requested language, its fallback chain, and finally the catalog
//!   default or the configured unresolved-key text. It never fails.
//! - `translator.plural("items.count", n, &params)` interposes the plural
//!   selector and injects `count` before interpolation.
//!
//! Behavior knobs come from the environment (`I18N_FALLBACK_MODE`,
//! `I18N_LOG_MISSING_KEYS`, …); see [`config`].

pub mod catalog;
pub mod config;
pub mod error;
pub mod fallback;
pub mod logger;
pub mod manager;
pub mod params;
pub mod plural;
pub mod source;
pub mod store;
pub mod translator;

#[cfg(test)]
mod tests;

pub use catalog::{MemoryCatalog, Message, MessageCatalog};
pub use config::{config, reload_config, I18nConfig};
pub use error::{I18nError, LoadError};
pub use manager::{manager, LocaleManager, ManagerConfig, ManagerStatus, TranslationCache};
pub use params::{ParamValue, Params};
pub use plural::PluralRule;
pub use source::{BundledLocales, EmbeddedSource, LocaleSource, MapSource};
pub use store::LoaderConfig;
pub use translator::Translator;

/// Language used when nothing else resolves.
pub const DEFAULT_LANG: &str = "en";
