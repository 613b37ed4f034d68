//! Key-value persistence for settings and the high score
//!
//! Backends:
//! - `MemoryStorage` for tests and throwaway sessions
//! - `FileStorage` on native: one JSON object on disk, written via tmp → rename
//! - `LocalStorage` on web

use std::collections::BTreeMap;
use std::io;

/// Minimal string store, shaped like the browser's `localStorage`
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::BTreeMap;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    use directories::ProjectDirs;

    use super::Storage;

    const STORE_FILE: &str = "storage.json";

    /// JSON file holding every key
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        path: PathBuf,
        items: BTreeMap<String, String>,
    }

    impl FileStorage {
        /// Platform data directory for the game, e.g. `~/.local/share/wizard-math`
        pub fn default_dir() -> io::Result<PathBuf> {
            ProjectDirs::from("", "", "wizard-math")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "no home directory for save data")
                })
        }

        /// Open the store in `dir`, creating the directory if needed.
        ///
        /// A missing file is an empty store; an unreadable one is an error.
        pub fn open(dir: &Path) -> io::Result<Self> {
            fs::create_dir_all(dir)?;
            let path = dir.join(STORE_FILE);
            let items = if path.exists() {
                let json = fs::read_to_string(&path)?;
                serde_json::from_str(&json)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
            } else {
                BTreeMap::new()
            };
            log::debug!("Opened {} ({} keys)", path.display(), items.len());
            Ok(Self { path, items })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn flush(&self) -> io::Result<()> {
            let json = serde_json::to_string_pretty(&self.items)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let tmp = self.path.with_extension("json.tmp");
            fs::write(&tmp, json)?;
            fs::rename(&tmp, &self.path)
        }
    }

    impl Storage for FileStorage {
        fn get_item(&self, key: &str) -> Option<String> {
            self.items.get(key).cloned()
        }

        fn set_item(&mut self, key: &str, value: &str) -> io::Result<()> {
            self.items.insert(key.to_string(), value.to_string());
            self.flush()
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::io;

    use super::Storage;

    /// Browser `window.localStorage`
    pub struct LocalStorage {
        inner: web_sys::Storage,
    }

    impl LocalStorage {
        /// None when storage is unavailable (private mode, no window)
        pub fn open() -> Option<Self> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .map(|inner| Self { inner })
        }
    }

    impl Storage for LocalStorage {
        fn get_item(&self, key: &str) -> Option<String> {
            self.inner.get_item(key).ok().flatten()
        }

        fn set_item(&mut self, key: &str, value: &str) -> io::Result<()> {
            self.inner
                .set_item(key, value)
                .map_err(|e| io::Error::other(format!("localStorage write failed: {:?}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get_item("a"), None);
        storage.set_item("a", "1").unwrap();
        storage.set_item("a", "2").unwrap();
        assert_eq!(storage.get_item("a").as_deref(), Some("2"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_storage_reopens() {
        let dir = std::env::temp_dir().join(format!("wizard-math-test-{}", std::process::id()));
        {
            let mut storage = FileStorage::open(&dir).unwrap();
            storage.set_item("mathGameHighScore", "120").unwrap();
        }
        let storage = FileStorage::open(&dir).unwrap();
        assert_eq!(storage.get_item("mathGameHighScore").as_deref(), Some("120"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_corrupt_file_is_invalid_data() {
        let dir = std::env::temp_dir().join(format!("wizard-math-corrupt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("storage.json"), "{not json").unwrap();
        let err = FileStorage::open(&dir).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
