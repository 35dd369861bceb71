//! Locale resource loading and lookup.
//!
//! One compiled resource per language, flattened to dotted keys, behind a
//! read-write lock. File scanning and parsing happen before the swap, so
//! readers only ever see a complete mapping.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{I18nError, LoadError};
use crate::plural::PluralRule;
use crate::source::LocaleSource;

/// Loader behavior knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Language whose resources define every key's canonical text.
    pub default_language: String,
    /// Abort the whole load when any file fails to parse.
    pub strict: bool,
    /// Retry lookups under the legacy `strings.` namespace. Kept on for
    /// existing resources; new deployments should turn it off once their
    /// keys are migrated.
    pub legacy_strings_prefix: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_language: crate::DEFAULT_LANG.to_string(),
            strict: false,
            legacy_strings_prefix: true,
        }
    }
}

/// Compiled, flattened translations for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleResource {
    translations: HashMap<String, String>,
}

impl LocaleResource {
    /// Parse a YAML mapping and flatten nested maps with `.` separators.
    ///
    /// The root must be a map; every leaf must be a string; keys must not
    /// contain whitespace. Anything else is `InvalidYaml`.
    pub fn from_yaml(file: &str, bytes: &[u8]) -> Result<Self, I18nError> {
        let value: serde_yaml::Value =
            serde_yaml::from_slice(bytes).map_err(|e| I18nError::InvalidYaml {
                file: file.to_string(),
                reason: e.to_string(),
            })?;

        let serde_yaml::Value::Mapping(root) = value else {
            return Err(I18nError::InvalidYaml {
                file: file.to_string(),
                reason: "root element must be a map".to_string(),
            });
        };

        let mut translations = HashMap::new();
        flatten_into(&mut translations, "", &root, file)?;
        Ok(Self { translations })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.translations.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.translations.keys().cloned().collect();
        keys.sort();
        keys
    }
}

fn flatten_into(
    out: &mut HashMap<String, String>,
    prefix: &str,
    map: &serde_yaml::Mapping,
    file: &str,
) -> Result<(), I18nError> {
    for (key, value) in map {
        let serde_yaml::Value::String(name) = key else {
            return Err(I18nError::InvalidYaml {
                file: file.to_string(),
                reason: "mapping keys must be strings".to_string(),
            });
        };
        if name.chars().any(char::is_whitespace) {
            return Err(I18nError::InvalidYaml {
                file: file.to_string(),
                reason: format!("key '{name}' contains whitespace"),
            });
        }

        let flat = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };

        match value {
            serde_yaml::Value::String(text) => {
                out.insert(flat, text.clone());
            }
            serde_yaml::Value::Mapping(nested) => flatten_into(out, &flat, nested, file)?,
            _ => {
                return Err(I18nError::InvalidYaml {
                    file: file.to_string(),
                    reason: format!("value at '{flat}' must be a string or map"),
                });
            }
        }
    }
    Ok(())
}

/// Language code from a `{lang}.yml` / `{lang}.yaml` file name.
pub(crate) fn lang_code(name: &str) -> Option<&str> {
    let stem = name
        .strip_suffix(".yml")
        .or_else(|| name.strip_suffix(".yaml"))?;
    (!stem.is_empty()).then_some(stem)
}

/// Scan `base_path` in `source` and compile a full language mapping.
///
/// Non-YAML entries and `config.yml`/`config.yaml` are ignored. A file
/// that fails to read or parse aborts in strict mode; otherwise it is
/// recorded and skipped.
pub(crate) fn scan_locales(
    source: &dyn LocaleSource,
    base_path: &str,
    strict: bool,
) -> Result<(HashMap<String, LocaleResource>, Vec<LoadError>), I18nError> {
    let mut locales = HashMap::new();
    let mut errors = Vec::new();

    for name in source.list(base_path) {
        if name == "config.yml" || name == "config.yaml" {
            continue;
        }
        let Some(lang) = lang_code(&name) else {
            continue;
        };
        let lang = lang.to_string();

        let parsed = match source.read(base_path, &name) {
            Some(bytes) => LocaleResource::from_yaml(&name, &bytes),
            None => Err(I18nError::FileRead(name.clone())),
        };

        match parsed {
            Ok(resource) => {
                debug!("loaded locale '{lang}' ({} keys) from {name}", resource.len());
                locales.insert(lang, resource);
            }
            Err(error) => {
                if strict {
                    return Err(error);
                }
                errors.push(LoadError { file: name, error });
            }
        }
    }

    Ok((locales, errors))
}

/// Thread-safe set of locale resources.
#[derive(Debug, Default)]
pub struct LocaleStore {
    locales: RwLock<HashMap<String, LocaleResource>>,
    legacy_strings_prefix: bool,
}

impl LocaleStore {
    pub fn new(legacy_strings_prefix: bool) -> Self {
        Self {
            locales: RwLock::new(HashMap::new()),
            legacy_strings_prefix,
        }
    }

    /// Scan and install a complete replacement mapping.
    ///
    /// All reads and parses happen before the swap; readers in flight see
    /// either the previous mapping or the new one, never a mix.
    pub fn load(
        &self,
        source: &dyn LocaleSource,
        base_path: &str,
        strict: bool,
    ) -> Result<Vec<LoadError>, I18nError> {
        let (locales, errors) = scan_locales(source, base_path, strict)?;
        let mut guard = self.locales.write().expect("locale store lock poisoned");
        *guard = locales;
        Ok(errors)
    }

    /// Look up `key` for `lang`.
    ///
    /// `None` when the language is unknown, the key is absent, or the key
    /// resolves to something other than a string (flattening never stores
    /// sub-maps as values). When enabled, a miss is retried under the
    /// legacy `strings.` namespace.
    pub fn get(&self, lang: &str, key: &str) -> Option<String> {
        let locales = self.locales.read().expect("locale store lock poisoned");
        let resource = locales.get(lang)?;
        if let Some(text) = resource.get(key) {
            return Some(text.to_string());
        }
        if self.legacy_strings_prefix && !key.starts_with("strings.") {
            return resource.get(&format!("strings.{key}")).map(str::to_string);
        }
        None
    }

    /// Assemble the plural rule stored under `key.zero` … `key.other`.
    pub fn plural_rule(&self, lang: &str, key: &str) -> Option<PluralRule> {
        let rule = PluralRule {
            zero: self.get(lang, &format!("{key}.zero")),
            one: self.get(lang, &format!("{key}.one")),
            two: self.get(lang, &format!("{key}.two")),
            few: self.get(lang, &format!("{key}.few")),
            many: self.get(lang, &format!("{key}.many")),
            other: self.get(lang, &format!("{key}.other")),
        };
        (!rule.is_empty()).then_some(rule)
    }

    pub fn has(&self, lang: &str) -> bool {
        self.locales
            .read()
            .expect("locale store lock poisoned")
            .contains_key(lang)
    }

    /// Loaded language tags, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self
            .locales
            .read()
            .expect("locale store lock poisoned")
            .keys()
            .cloned()
            .collect();
        langs.sort();
        langs
    }

    /// All flattened keys defined by `lang`.
    pub fn keys_for(&self, lang: &str) -> Vec<String> {
        self.locales
            .read()
            .expect("locale store lock poisoned")
            .get(lang)
            .map(LocaleResource::keys)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.locales.read().expect("locale store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn legacy_prefix_enabled(&self) -> bool {
        self.legacy_strings_prefix
    }

    /// Snapshot of every language's compiled resource.
    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> HashMap<String, LocaleResource> {
        self.locales
            .read()
            .expect("locale store lock poisoned")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MapSource;

    fn sample_source() -> MapSource {
        MapSource::new()
            .with(
                "en.yml",
                "greeting:\n  hello: \"Hello, {name}!\"\nbans:\n  ban:\n    success: \"Banned {user}.\"\nstrings:\n  legacy:\n    farewell: \"Goodbye, {name}!\"\n",
            )
            .with("es.yml", "greeting:\n  hello: \"\u{00a1}Hola, {name}!\"\n")
            .with("config.yml", "modules:\n  bans: true\n")
            .with("notes.txt", "not a locale")
    }

    #[test]
    fn test_load_scans_only_locale_yaml() {
        let store = LocaleStore::new(true);
        let errors = store.load(&sample_source(), "", false).unwrap();
        assert!(errors.is_empty());
        assert_eq!(store.languages(), vec!["en", "es"]);
        assert!(!store.has("config"));
    }

    #[test]
    fn test_get_flattened_keys() {
        let store = LocaleStore::new(true);
        store.load(&sample_source(), "", false).unwrap();
        assert_eq!(
            store.get("en", "greeting.hello").unwrap(),
            "Hello, {name}!"
        );
        assert_eq!(store.get("en", "bans.ban.success").unwrap(), "Banned {user}.");
        // Intermediate nodes are not string values.
        assert!(store.get("en", "bans.ban").is_none());
        assert!(store.get("fr", "greeting.hello").is_none());
    }

    #[test]
    fn test_legacy_strings_prefix_retry() {
        let store = LocaleStore::new(true);
        store.load(&sample_source(), "", false).unwrap();
        assert_eq!(
            store.get("en", "legacy.farewell").unwrap(),
            "Goodbye, {name}!"
        );

        let store = LocaleStore::new(false);
        store.load(&sample_source(), "", false).unwrap();
        assert!(store.get("en", "legacy.farewell").is_none());
        assert!(store.get("en", "strings.legacy.farewell").is_some());
    }

    #[test]
    fn test_invalid_file_skipped_non_strict() {
        let source = sample_source().with("bad.yml", "just a scalar");
        let store = LocaleStore::new(true);
        let errors = store.load(&source, "", false).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].file, "bad.yml");
        assert!(matches!(errors[0].error, I18nError::InvalidYaml { .. }));
        assert!(store.has("en"));
        assert!(!store.has("bad"));
    }

    #[test]
    fn test_invalid_file_aborts_strict() {
        let source = sample_source().with("bad.yml", "- a\n- list");
        let store = LocaleStore::new(true);
        assert!(matches!(
            store.load(&source, "", true),
            Err(I18nError::InvalidYaml { .. })
        ));
    }

    #[test]
    fn test_non_string_leaf_rejected() {
        let source = MapSource::new().with("en.yml", "count: 3\n");
        let err = LocaleResource::from_yaml("en.yml", source.read("", "en.yml").unwrap().as_slice())
            .unwrap_err();
        assert!(matches!(err, I18nError::InvalidYaml { .. }));
    }

    #[test]
    fn test_key_with_whitespace_rejected() {
        let err = LocaleResource::from_yaml("en.yml", b"\"bad key\": value\n").unwrap_err();
        assert!(matches!(err, I18nError::InvalidYaml { .. }));
    }

    #[test]
    fn test_plural_rule_assembly() {
        let source = MapSource::new().with(
            "en.yml",
            "items:\n  count:\n    one: \"{count} item\"\n    other: \"{count} items\"\n",
        );
        let store = LocaleStore::new(true);
        store.load(&source, "", false).unwrap();
        let rule = store.plural_rule("en", "items.count").unwrap();
        assert_eq!(rule.one.as_deref(), Some("{count} item"));
        assert_eq!(rule.other.as_deref(), Some("{count} items"));
        assert!(rule.zero.is_none());
        assert!(store.plural_rule("en", "absent.key").is_none());
    }

    #[test]
    fn test_reload_replaces_mapping_atomically() {
        let store = LocaleStore::new(true);
        store.load(&sample_source(), "", false).unwrap();
        assert!(store.has("es"));

        let replacement = MapSource::new().with("en.yml", "greeting:\n  hello: \"Hey!\"\n");
        store.load(&replacement, "", false).unwrap();
        assert_eq!(store.languages(), vec!["en"]);
        assert_eq!(store.get("en", "greeting.hello").unwrap(), "Hey!");
        assert!(!store.has("es"));
    }

    #[test]
    fn test_lang_code_extraction() {
        assert_eq!(lang_code("en.yml"), Some("en"));
        assert_eq!(lang_code("pt_BR.yaml"), Some("pt_BR"));
        assert_eq!(lang_code(".yml"), None);
        assert_eq!(lang_code("notes.txt"), None);
    }
}
