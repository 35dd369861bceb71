//! Read-only locale file sources.
//!
//! Locale resources ship embedded in the binary; tests and tooling use the
//! in-memory variant. The store only ever enumerates and reads bytes.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use rust_embed::RustEmbed;

/// Read-only enumeration and byte access for files under a base path.
pub trait LocaleSource: Send + Sync {
    /// File names (not paths) directly under `base_path`.
    fn list(&self, base_path: &str) -> Vec<String>;
    /// Raw bytes of `name` under `base_path`, if present.
    fn read(&self, base_path: &str, name: &str) -> Option<Vec<u8>>;
}

/// Locale files bundled into the binary from the crate's `locales/` folder.
#[derive(RustEmbed)]
#[folder = "locales/"]
pub struct BundledLocales;

/// Adapter exposing a `rust_embed` archive as a [`LocaleSource`].
pub struct EmbeddedSource<E> {
    _archive: PhantomData<E>,
}

impl<E> EmbeddedSource<E> {
    pub fn new() -> Self {
        Self {
            _archive: PhantomData,
        }
    }
}

impl<E> Default for EmbeddedSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn join(base_path: &str, name: &str) -> String {
    let base = base_path.trim_matches('/');
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

impl<E: RustEmbed + Send + Sync> LocaleSource for EmbeddedSource<E> {
    fn list(&self, base_path: &str) -> Vec<String> {
        let base = base_path.trim_matches('/');
        let prefix = if base.is_empty() {
            String::new()
        } else {
            format!("{base}/")
        };
        let mut names: Vec<String> = E::iter()
            .filter_map(|path| {
                let rest = path.strip_prefix(&prefix)?;
                // Entries in subdirectories are not direct children.
                (!rest.contains('/')).then(|| rest.to_string())
            })
            .collect();
        names.sort();
        names
    }

    fn read(&self, base_path: &str, name: &str) -> Option<Vec<u8>> {
        E::get(&join(base_path, name)).map(|file| file.data.into_owned())
    }
}

/// In-memory source keyed by file name. Used by tests and by deployments
/// that assemble locale data at runtime.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    files: BTreeMap<String, Vec<u8>>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, contents: &str) {
        self.files.insert(name.to_string(), contents.as_bytes().to_vec());
    }

    pub fn with(mut self, name: &str, contents: &str) -> Self {
        self.insert(name, contents);
        self
    }
}

impl LocaleSource for MapSource {
    fn list(&self, _base_path: &str) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    fn read(&self, _base_path: &str, name: &str) -> Option<Vec<u8>> {
        self.files.get(name).cloned()
    }
}
