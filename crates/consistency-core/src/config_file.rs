use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConsistencyError;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub backend: Option<BackendConfig>,
    pub ai: Option<AiConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub health_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AiConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub color: Option<bool>,
    /// Default issue filter code (`all`, `term`, `logic`, `citation_figure`).
    pub filter: Option<String>,
}

/// Platform config directory path: `<config_dir>/paper-consistency/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paper-consistency").join("config.toml"))
}

/// Load config by cascading CWD `.paper-consistency.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".paper-consistency.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

fn pick<T, S>(overlay: &Option<S>, base: &Option<S>, field: impl Fn(&S) -> Option<T>) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&field)
        .or_else(|| base.as_ref().and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        backend: Some(BackendConfig {
            url: pick(&overlay.backend, &base.backend, |b| b.url.clone()),
            health_timeout_secs: pick(&overlay.backend, &base.backend, |b| {
                b.health_timeout_secs
            }),
            request_timeout_secs: pick(&overlay.backend, &base.backend, |b| {
                b.request_timeout_secs
            }),
        }),
        ai: Some(AiConfig {
            base_url: pick(&overlay.ai, &base.ai, |a| a.base_url.clone()),
            model: pick(&overlay.ai, &base.ai, |a| a.model.clone()),
            api_key: pick(&overlay.ai, &base.ai, |a| a.api_key.clone()),
        }),
        display: Some(DisplayConfig {
            color: pick(&overlay.display, &base.display, |d| d.color),
            filter: pick(&overlay.display, &base.display, |d| d.filter.clone()),
        }),
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, ConsistencyError> {
    let path = config_path()
        .ok_or_else(|| ConsistencyError::Config("Could not determine config directory".into()))?;
    save_to_path(config, &path)?;
    Ok(path)
}

pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), ConsistencyError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| ConsistencyError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
