use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// Cache generation identifier. Bump this whenever the cached asset set
/// changes incompatibly; activation garbage-collects every other generation.
pub const CACHE_NAME: &str = "iidx-app-shell-v2";

/// Worker version reported over the control channel.
pub const SW_VERSION: &str = "2026-02-18-1";

/// Immutable worker configuration, computed once at startup and shared by
/// reference with every handler.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
  /// Origin the worker serves (e.g. `https://example.com`)
  pub origin: Url,

  /// Effective registration scope. Falls back to the origin root when unset.
  #[serde(default)]
  pub registration_scope: Option<Url>,

  /// Current cache generation name
  #[serde(default = "default_cache_name")]
  pub cache_name: String,

  /// Version string answered to `GET_SW_VERSION`
  #[serde(default = "default_version")]
  pub version: String,

  /// Path to the cache database (default: data dir)
  #[serde(default)]
  pub cache_db: Option<PathBuf>,
}

fn default_cache_name() -> String {
  CACHE_NAME.to_string()
}

fn default_version() -> String {
  SW_VERSION.to_string()
}

impl WorkerConfig {
  /// Create a configuration with the built-in generation and version for
  /// the given origin.
  pub fn for_origin(origin: Url) -> Self {
    Self {
      origin,
      registration_scope: None,
      cache_name: default_cache_name(),
      version: default_version(),
      cache_db: None,
    }
  }

  /// Set the registration scope.
  pub fn with_registration_scope(mut self, scope: Url) -> Self {
    self.registration_scope = Some(scope);
    self
  }

  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./iidx-sw.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/iidx-sw/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/iidx-sw/config.yaml\n\
                 with at least an `origin:` entry."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("iidx-sw.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("iidx-sw").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: WorkerConfig = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}
