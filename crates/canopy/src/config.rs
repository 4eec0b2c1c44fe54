//! Browser configuration and persisted session state.
//!
//! [`BrowserConfig`] holds the tunables of a browsing session. Every field
//! has a default, so a config file only needs the keys it changes:
//!
//! ```toml
//! long_press_ms = 750
//! show_all_entries = false
//! text_extensions = ["txt", "md"]
//! ```
//!
//! [`SessionSnapshot`] is the state worth restoring on the next run: the
//! last directory and the filter toggle. Both types load from and save to
//! TOML or JSON. Saves go through a temporary file in the target directory
//! and are renamed into place, so a crash never leaves a truncated file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use canopy_core::logging::targets;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::gesture::DEFAULT_LONG_PRESS_MS;
use crate::viewer::{DEFAULT_IMAGE_EXTENSIONS, DEFAULT_TEXT_EXTENSIONS, FileClassifier};

/// Default debounce window for filesystem change notifications.
pub const DEFAULT_WATCH_DEBOUNCE_MS: u64 = 100;

/// The on-disk format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML.
    Toml,
    /// JSON.
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension, defaulting to TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

// ============================================================================
// BrowserConfig
// ============================================================================

/// Tunables for a browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// How long a press must be held to start an in-place rename.
    #[serde(rename = "long_press_ms", with = "millis")]
    pub long_press: Duration,

    /// Whether the list shows directories and hidden entries, or visible
    /// files only.
    pub show_all_entries: bool,

    /// Directory shown at startup. `None` means the user's home directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_path: Option<PathBuf>,

    /// Extensions opened in the image viewer.
    pub image_extensions: Vec<String>,

    /// Extensions opened in the text viewer.
    pub text_extensions: Vec<String>,

    /// Debounce window for change notifications.
    #[serde(rename = "watch_debounce_ms", with = "millis")]
    pub watch_debounce: Duration,

    /// Whether to refresh the list when the current directory changes on disk.
    pub watch_changes: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            long_press: Duration::from_millis(DEFAULT_LONG_PRESS_MS),
            show_all_entries: true,
            start_path: None,
            image_extensions: to_strings(DEFAULT_IMAGE_EXTENSIONS),
            text_extensions: to_strings(DEFAULT_TEXT_EXTENSIONS),
            watch_debounce: Duration::from_millis(DEFAULT_WATCH_DEBOUNCE_MS),
            watch_changes: true,
        }
    }
}

impl BrowserConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the long-press duration.
    pub fn long_press(mut self, duration: Duration) -> Self {
        self.long_press = duration;
        self
    }

    /// Sets the initial filter toggle.
    pub fn show_all_entries(mut self, show_all: bool) -> Self {
        self.show_all_entries = show_all;
        self
    }

    /// Sets the startup directory.
    pub fn start_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.start_path = Some(path.into());
        self
    }

    /// Enables or disables change notifications.
    pub fn watch_changes(mut self, enabled: bool) -> Self {
        self.watch_changes = enabled;
        self
    }

    /// The startup directory: the configured one, else the home directory,
    /// else the filesystem root.
    pub fn resolved_start_path(&self) -> PathBuf {
        self.start_path
            .clone()
            .or_else(home_dir)
            .unwrap_or_else(filesystem_root)
    }

    /// Directories to try at startup, in order: the configured one, the home
    /// directory and the filesystem root.
    pub fn start_candidates(&self) -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> = Vec::with_capacity(3);
        for path in [self.start_path.clone(), home_dir(), Some(filesystem_root())]
            .into_iter()
            .flatten()
        {
            if !candidates.contains(&path) {
                candidates.push(path);
            }
        }
        candidates
    }

    /// The viewer classifier for the configured extensions.
    pub fn classifier(&self) -> FileClassifier {
        FileClassifier::new(&self.image_extensions, &self.text_extensions)
    }

    /// Loads a config file, choosing the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        load_file(path, ConfigFormat::from_path(path))
    }

    /// Loads a TOML config file.
    pub fn load_toml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        load_file(path.as_ref(), ConfigFormat::Toml)
    }

    /// Loads a JSON config file.
    pub fn load_json(path: impl AsRef<Path>) -> ConfigResult<Self> {
        load_file(path.as_ref(), ConfigFormat::Json)
    }

    /// Saves as TOML, atomically.
    pub fn save_toml(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        save_file(self, path.as_ref(), ConfigFormat::Toml)
    }

    /// Saves as JSON, atomically.
    pub fn save_json(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        save_file(self, path.as_ref(), ConfigFormat::Json)
    }
}

// ============================================================================
// SessionSnapshot
// ============================================================================

/// Browsing state restored on the next run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The directory on display.
    pub last_path: PathBuf,
    /// The filter toggle.
    #[serde(default = "default_show_all")]
    pub show_all_entries: bool,
}

impl SessionSnapshot {
    /// Loads a snapshot, choosing the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        load_file(path, ConfigFormat::from_path(path))
    }

    /// Saves the snapshot, choosing the format from the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        save_file(self, path, ConfigFormat::from_path(path))
    }
}

fn default_show_all() -> bool {
    true
}

// ============================================================================
// Helpers
// ============================================================================

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn home_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

fn filesystem_root() -> PathBuf {
    PathBuf::from(std::path::MAIN_SEPARATOR_STR)
}

fn load_file<T: DeserializeOwned>(path: &Path, format: ConfigFormat) -> ConfigResult<T> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    match format {
        ConfigFormat::Toml => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
        ConfigFormat::Json => {
            serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))
        }
    }
}

fn save_file<T: Serialize>(value: &T, path: &Path, format: ConfigFormat) -> ConfigResult<()> {
    let content = match format {
        ConfigFormat::Toml => {
            toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))?
        }
        ConfigFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?,
    };
    write_atomic(path, content.as_bytes())
}

fn write_atomic(path: &Path, content: &[u8]) -> ConfigResult<()> {
    let io_error = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_error)?;
    temp.write_all(content).map_err(io_error)?;
    temp.as_file().sync_all().map_err(io_error)?;
    temp.persist(path).map_err(|e| io_error(e.error))?;
    tracing::debug!(target: targets::CONFIG, path = %path.display(), "config saved");
    Ok(())
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
