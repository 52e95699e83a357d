use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// Origin-scoped string key-value store backing the theme preference.
pub trait Storage {
    /// Read failures are reported as an absent value.
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.to_string());
        Self { entries }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// On-disk layout of the storage file:
/// `{ "version": 1, "origins": { "<origin>": { "<key>": "<value>" } } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFile {
    #[serde(default = "StorageFile::current_version")]
    pub version: u32,
    #[serde(default)]
    pub origins: BTreeMap<String, BTreeMap<String, String>>,
}

impl StorageFile {
    pub const VERSION: u32 = 1;

    fn current_version() -> u32 {
        Self::VERSION
    }
}

impl Default for StorageFile {
    fn default() -> Self {
        Self {
            version: Self::VERSION,
            origins: BTreeMap::new(),
        }
    }
}

/// File-backed storage shared by every origin, see [`StorageFile`].
///
/// Each `set` rewrites the file so the value survives the process, the way
/// browser-local storage survives a page reload.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    origin: String,
    data: StorageFile,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>, origin: &str) -> Self {
        let path = path.into();
        let data = match read_storage_file(&path) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "ignoring unreadable storage file");
                StorageFile::default()
            }
        };
        Self {
            path,
            origin: origin.to_string(),
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_vec_pretty(&self.data).context("serialize storage")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.data.origins.get(&self.origin)?.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.data
            .origins
            .entry(self.origin.clone())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.write()
    }
}

fn read_storage_file(path: &Path) -> anyhow::Result<StorageFile> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(StorageFile::default()),
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    let file: StorageFile =
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))?;
    if file.version != StorageFile::VERSION {
        anyhow::bail!("{}: unsupported storage version {}", path.display(), file.version);
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_storage_is_scoped_by_origin() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("state/storage.json");

        let mut a = FileStorage::open(&path, "http://a.example");
        a.set("as_theme", "light").unwrap();

        let reopened = FileStorage::open(&path, "http://a.example");
        assert_eq!(reopened.get("as_theme").as_deref(), Some("light"));

        let other = FileStorage::open(&path, "http://b.example");
        assert_eq!(other.get("as_theme"), None);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut store = FileStorage::open(&path, "http://a.example");
        assert_eq!(store.get("as_theme"), None);

        store.set("as_theme", "dark").unwrap();
        let reopened = FileStorage::open(&path, "http://a.example");
        assert_eq!(reopened.get("as_theme").as_deref(), Some("dark"));
    }

    #[test]
    fn file_layout_is_versioned_and_grouped_by_origin() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("storage.json");

        let mut store = FileStorage::open(&path, "http://a.example");
        store.set("as_theme", "light").unwrap();

        let raw: StorageFile =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.version, StorageFile::VERSION);
        assert_eq!(
            raw.origins["http://a.example"].get("as_theme").map(String::as_str),
            Some("light")
        );

        // Missing fields take their defaults.
        let bare: StorageFile = serde_json::from_str("{}").unwrap();
        assert_eq!(bare, StorageFile::default());
    }

    #[test]
    fn unknown_version_reads_as_empty() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        std::fs::write(
            &path,
            r#"{"version": 7, "origins": {"http://a.example": {"as_theme": "light"}}}"#,
        )
        .unwrap();

        let store = FileStorage::open(&path, "http://a.example");
        assert_eq!(store.get("as_theme"), None);
    }

    #[test]
    fn memory_storage_overwrites() {
        let mut store = MemoryStorage::with_entry("k", "a");
        store.set("k", "b").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("b"));
    }
}
