use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ScopeError;

/// Configuration for the scope service.
///
/// Read from a TOML file. `scopectl` flags override individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Directory holding `hierarchy.json`, `actors.json` and
    /// `permissions.json`.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb directory file.
    /// Defaults to `{data_dir}/scope.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Hierarchy snapshot cache TTL in seconds (default: 120). Zero disables
    /// caching.
    pub hierarchy_cache_ttl: u64,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_path: None,
            hierarchy_cache_ttl: 120, // 2 min
        }
    }
}

impl ScopeConfig {
    /// Load configuration from a TOML file, or defaults if it doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ScopeError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ScopeError::Validation(format!("{}: {}", path.display(), e)))
    }

    /// Resolve the redb path, falling back to `{data_dir}/scope.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            self.data_dir
                .as_ref()
                .map(|d| d.join("scope.redb"))
                .unwrap_or_else(|| PathBuf::from("scope.redb"))
        })
    }
}
