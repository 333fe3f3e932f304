//! Persistent preferences: favorites, unit and theme.
//!
//! Storage is a flat string-keyed store, one JSON value per key. Each key is
//! loaded and saved on its own; an unreadable value is logged and treated as
//! absent, never as an error.

use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    error::StoreError,
    model::{Favorites, Theme, Unit},
};

pub const FAVORITES_KEY: &str = "favorites";
pub const UNIT_KEY: &str = "unit";
pub const DARK_MODE_KEY: &str = "dark_mode";

pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One file per key under a directory: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.key_path(key);
        fs::write(&path, value).map_err(|source| StoreError::Io { path, source })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Whatever was found in storage. `None` means absent or unreadable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    pub favorites: Option<Favorites>,
    pub unit: Option<Unit>,
    pub dark_mode: Option<bool>,
}

#[derive(Debug)]
pub struct PreferenceStore {
    backend: Box<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self { backend: Box::new(backend) }
    }

    pub fn load(&self) -> Preferences {
        Preferences {
            favorites: self.read(FAVORITES_KEY),
            unit: self.read(UNIT_KEY),
            dark_mode: self.read(DARK_MODE_KEY),
        }
    }

    pub fn save_favorites(&mut self, favorites: &Favorites) -> Result<(), StoreError> {
        self.write(FAVORITES_KEY, favorites)
    }

    pub fn save_unit(&mut self, unit: Unit) -> Result<(), StoreError> {
        self.write(UNIT_KEY, &unit)
    }

    pub fn save_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        self.write(DARK_MODE_KEY, &theme.is_dark())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key, error = %err, "Failed to read stored preference");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "Ignoring corrupt stored preference");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)?;
        tracing::debug!(key, "Saved preference");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_with(entries: &[(&str, &str)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for (k, v) in entries {
            store.set(k, v).unwrap();
        }
        store
    }

    #[test]
    fn empty_store_loads_nothing() {
        let prefs = PreferenceStore::new(MemoryStore::new()).load();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn each_key_defaults_independently() {
        let store = PreferenceStore::new(memory_with(&[
            (FAVORITES_KEY, "{not json"),
            (UNIT_KEY, r#""imperial""#),
            (DARK_MODE_KEY, r#""maybe""#),
        ]));

        let prefs = store.load();
        assert_eq!(prefs.favorites, None);
        assert_eq!(prefs.unit, Some(Unit::Imperial));
        assert_eq!(prefs.dark_mode, None);
    }

    #[test]
    fn saved_values_are_loaded_back() {
        let mut store = PreferenceStore::new(MemoryStore::new());
        let favorites: Favorites = ["Oslo", "Lima"].into_iter().collect();

        store.save_favorites(&favorites).unwrap();
        store.save_unit(Unit::Imperial).unwrap();
        store.save_theme(Theme::Dark).unwrap();

        let prefs = store.load();
        assert_eq!(prefs.favorites, Some(favorites));
        assert_eq!(prefs.unit, Some(Unit::Imperial));
        assert_eq!(prefs.dark_mode, Some(true));
    }

    #[test]
    fn file_store_writes_one_file_per_key() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().join("nested");
        let mut store = FileStore::new(&root);

        assert_eq!(store.get(FAVORITES_KEY).unwrap(), None);
        store.set(FAVORITES_KEY, r#"["Kyiv"]"#).unwrap();

        let on_disk = fs::read_to_string(root.join("favorites.json")).unwrap();
        assert_eq!(on_disk, r#"["Kyiv"]"#);
        assert_eq!(store.get(FAVORITES_KEY).unwrap().as_deref(), Some(r#"["Kyiv"]"#));
    }
}
