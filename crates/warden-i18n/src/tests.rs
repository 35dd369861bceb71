//! End-to-end scenarios across catalog, store, fallback, and manager.
//!
//! Every test drives its own standalone `LocaleManager` and catalog so
//! parallel tests never couple through process-wide state.

use std::sync::{Arc, RwLock};
use std::thread;

use crate::catalog::{Message, MemoryCatalog, MessageCatalog};
use crate::error::I18nError;
use crate::manager::{LocaleManager, ManagerConfig};
use crate::params;
use crate::source::{BundledLocales, EmbeddedSource, LocaleSource, MapSource};
use crate::store::LocaleStore;

const EN: &str = "greeting:\n  hello: \"Hello, {name}!\"\nitems:\n  count:\n    one: \"{count} item\"\n    other: \"{count} items\"\n";
const ES: &str = "greeting:\n  hello: \"\u{00a1}Hola, {name}!\"\n";
const PT: &str = "greeting:\n  hello: \"Ol\u{00e1}, {name}!\"\n";
const PT_BR: &str = "language:\n  current: \"Idioma atual: {lang}\"\n";

/// Mutable source shared between a reloading thread and the manager.
struct SharedSource(RwLock<MapSource>);

impl SharedSource {
    fn new(initial: MapSource) -> Self {
        Self(RwLock::new(initial))
    }

    fn insert(&self, name: &str, contents: &str) {
        self.0.write().unwrap().insert(name, contents);
    }
}

impl LocaleSource for SharedSource {
    fn list(&self, base_path: &str) -> Vec<String> {
        self.0.read().unwrap().list(base_path)
    }

    fn read(&self, base_path: &str, name: &str) -> Option<Vec<u8>> {
        self.0.read().unwrap().read(base_path, name)
    }
}

fn scenario_manager() -> (LocaleManager, Arc<MemoryCatalog>) {
    let source = MapSource::new()
        .with("en.yml", EN)
        .with("es.yml", ES)
        .with("pt.yml", PT)
        .with("pt_BR.yml", PT_BR);
    let catalog = Arc::new(MemoryCatalog::new());
    let manager = LocaleManager::new();
    manager.set_catalog(catalog.clone());
    manager
        .initialize(Arc::new(source), "", ManagerConfig::default())
        .unwrap();
    (manager, catalog)
}

#[test]
fn test_scenario_registered_message_resolves_in_english() {
    let (manager, catalog) = scenario_manager();
    catalog
        .register(Message::new("greeting.hello", "Hello, {name}!"))
        .unwrap();

    let tr = manager.translator("en").unwrap();
    let out = tr.message("greeting.hello", &params! { "name" => "Ada" });
    assert_eq!(out, "Hello, Ada!");
}

#[test]
fn test_scenario_spanish_resource_wins() {
    let (manager, _) = scenario_manager();
    let tr = manager.translator("es").unwrap();
    let out = tr.message("greeting.hello", &params! { "name" => "Ada" });
    assert_eq!(out, "\u{00a1}Hola, Ada!");
}

#[test]
fn test_scenario_pt_br_falls_back_to_pt() {
    let (manager, _) = scenario_manager();
    let tr = manager.translator("pt_BR").unwrap();
    assert_eq!(tr.lang(), "pt_BR");
    let out = tr.message("greeting.hello", &params! { "name" => "Ada" });
    assert_eq!(out, "Ol\u{00e1}, Ada!");
}

#[test]
fn test_scenario_unresolved_key_debug_marker() {
    // Default test environment: development + mixed mode = debug marker.
    let (manager, _) = scenario_manager();
    let tr = manager.translator("en").unwrap();
    let (out, err) = tr.get_message("missing.key", &params!());
    assert_eq!(out, "@@missing.key@@");
    assert!(matches!(err, Some(I18nError::KeyNotFound { .. })));
}

#[test]
fn test_scenario_plural_forms() {
    let (manager, _) = scenario_manager();
    let tr = manager.translator("en").unwrap();
    assert_eq!(tr.plural("items.count", 1, &params!()), "1 item");
    assert_eq!(tr.plural("items.count", 5, &params!()), "5 items");
    assert_eq!(tr.plural("items.count", 0, &params!()), "0 items");
}

#[test]
fn test_scenario_catalog_default_backs_unlocalized_key() {
    let (manager, catalog) = scenario_manager();
    catalog
        .register(Message::new(
            "warns.limit.reached",
            "{user} hit the warning limit",
        ))
        .unwrap();

    // No language defines the key; the catalog default carries it.
    let tr = manager.translator("es").unwrap();
    let out = tr.message("warns.limit.reached", &params! { "user" => "Eve" });
    assert_eq!(out, "Eve hit the warning limit");
}

#[test]
fn test_unknown_language_equals_default_language() {
    let (manager, _) = scenario_manager();
    let supplied = params! { "name" => "Ada" };
    let unknown = manager.translator("xx").unwrap();
    let default = manager.translator("en").unwrap();
    assert_eq!(
        unknown.message("greeting.hello", &supplied),
        default.message("greeting.hello", &supplied)
    );
    assert_eq!(
        unknown.message("missing.key", &supplied),
        default.message("missing.key", &supplied)
    );
}

#[test]
fn test_reload_converges() {
    let source = Arc::new(SharedSource::new(
        MapSource::new().with("en.yml", EN).with("es.yml", ES),
    ));
    let manager = LocaleManager::new();
    manager.set_catalog(Arc::new(MemoryCatalog::new()));
    manager
        .initialize(source.clone(), "", ManagerConfig::default())
        .unwrap();

    source.insert("fr.yml", "greeting:\n  hello: \"Salut, {name}!\"\n");
    manager.reload_locales().unwrap();
    let after_first = manager.inner_for_tests().unwrap().store.snapshot();
    manager.reload_locales().unwrap();
    let after_second = manager.inner_for_tests().unwrap().store.snapshot();
    assert_eq!(after_first, after_second);
    assert!(manager.is_language_supported("fr"));
}

#[test]
fn test_scenario_concurrent_lookups_during_reload() {
    let source = Arc::new(SharedSource::new(
        MapSource::new()
            .with("en.yml", EN)
            .with("es.yml", ES)
            .with("pt.yml", PT),
    ));
    let manager = Arc::new(LocaleManager::new());
    manager.set_catalog(Arc::new(MemoryCatalog::new()));
    manager
        .initialize(source.clone(), "", ManagerConfig::default())
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let manager = Arc::clone(&manager);
        handles.push(thread::spawn(move || {
            let tr = manager.translator("es").unwrap();
            let supplied = params! { "name" => "Ada" };
            for _ in 0..1000 {
                let out = tr.message("greeting.hello", &supplied);
                assert!(!out.is_empty());
            }
        }));
    }

    {
        let manager = Arc::clone(&manager);
        let source = Arc::clone(&source);
        handles.push(thread::spawn(move || {
            source.insert("fr.yml", "greeting:\n  hello: \"Salut, {name}!\"\n");
            manager.reload_locales().unwrap();
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // The final snapshot must equal a fresh load of the mutated source.
    let fresh = LocaleStore::new(true);
    fresh.load(source.as_ref(), "", false).unwrap();
    assert_eq!(
        manager.inner_for_tests().unwrap().store.snapshot(),
        fresh.snapshot()
    );
}

#[test]
fn test_bundled_locales_load_and_exclude_config() {
    // Surface load-time warnings from this test when RUST_LOG is set.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let manager = LocaleManager::new();
    manager.set_catalog(Arc::new(MemoryCatalog::new()));
    let errors = manager
        .initialize(
            Arc::new(EmbeddedSource::<BundledLocales>::new()),
            "",
            ManagerConfig::default(),
        )
        .unwrap();
    assert!(errors.is_empty());

    let languages = manager.available_languages();
    assert!(languages.contains(&"en".to_string()));
    assert!(languages.contains(&"pt_BR".to_string()));
    assert!(!languages.contains(&"config".to_string()));

    let tr = manager.translator("pt_BR").unwrap();
    // Defined in pt_BR directly.
    assert_eq!(
        tr.message("bans.ban.success", &params! { "user" => "Eve" }),
        "Eve foi banido."
    );
    // Missing from pt_BR, supplied by pt via the chain.
    assert_eq!(
        tr.message("greeting.hello", &params! { "name" => "Ada" }),
        "Ol\u{00e1}, Ada!"
    );
    // Legacy namespace lookup.
    let en = manager.translator("en").unwrap();
    assert_eq!(
        en.message("notes.saved", &params! { "name" => "rules" }),
        "Saved note 'rules'."
    );
}
