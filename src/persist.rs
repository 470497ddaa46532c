use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::history::{History, HistoryRecord};
use crate::state::AppState;

const CACHE_DIR: &str = "simfut_terminal";
const CACHE_FILE: &str = "store.json";
const CACHE_VERSION: u32 = 1;

pub const CONFIG_KEY: &str = "sim-form";
pub const HISTORY_KEY: &str = "sim-results";

pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
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

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreFile {
    version: u32,
    entries: HashMap<String, String>,
}

/// One JSON file holding every key. Writes go through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    file: StoreFile,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = load_store_file(&path).unwrap_or_else(|| StoreFile {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        });
        Self { path, file }
    }

    pub fn open_default() -> Option<Self> {
        default_store_path().map(Self::open)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create store dir {}", dir.display()))?;
        }
        let json = serde_json::to_string(&self.file).context("serialize store")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).context("write store")?;
        fs::rename(&tmp, &self.path).context("swap store")?;
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.file.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.file.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.file.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

fn load_store_file(path: &Path) -> Option<StoreFile> {
    let raw = fs::read_to_string(path).ok()?;
    let file = serde_json::from_str::<StoreFile>(&raw).ok()?;
    if file.version != CACHE_VERSION {
        return None;
    }
    Some(file)
}

pub fn default_store_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("SIMFUT_CACHE_DIR") {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir).join(CACHE_FILE));
        }
    }
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

/// Last used form. Missing fields take the form defaults; garbage gives `None`.
pub fn load_config(store: &impl KvStore) -> Option<MatchConfig> {
    let raw = store.get(CONFIG_KEY)?;
    serde_json::from_str::<MatchConfig>(&raw).ok()
}

pub fn save_config(store: &mut impl KvStore, config: &MatchConfig) -> Result<()> {
    let json = serde_json::to_string(config).context("serialize config")?;
    store.set(CONFIG_KEY, json)
}

pub fn load_history(store: &impl KvStore) -> History {
    let Some(raw) = store.get(HISTORY_KEY) else {
        return History::new();
    };
    serde_json::from_str::<Vec<HistoryRecord>>(&raw)
        .map(History::from_records)
        .unwrap_or_default()
}

pub fn save_history(store: &mut impl KvStore, history: &History) -> Result<()> {
    let json = serde_json::to_string(history).context("serialize history")?;
    store.set(HISTORY_KEY, json)
}

pub fn append_history(store: &mut impl KvStore, record: HistoryRecord) -> Result<History> {
    let mut history = load_history(store);
    history.push(record);
    save_history(store, &history)?;
    Ok(history)
}

pub fn clear_history(store: &mut impl KvStore) -> Result<()> {
    store.remove(HISTORY_KEY)
}

pub fn load_into_state(state: &mut AppState, store: &impl KvStore) {
    if let Some(config) = load_config(store) {
        state.form = config;
    }
    state.history = load_history(store);
    state.clamp_history_selection();
}

pub fn save_from_state(state: &AppState, store: &mut impl KvStore) -> Result<()> {
    save_config(store, &state.form)?;
    save_history(store, &state.history)
}
