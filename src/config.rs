//! Ambient gateway configuration: catalog location, RF mode, and log level.
//!
//! Loaded from an INI file at `~/.config/sdgw/config.ini` (or a path
//! supplied explicitly), the same layout and crate the teacher used for its
//! own settings file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use configparser::ini::Ini;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the protocol catalog JSON/TOML file. `None` means "use the
    /// bundled representative catalog".
    pub catalog_path: Option<PathBuf>,
    /// RF mode string gating `rfmode`-scoped protocol descriptors (§4.4).
    pub rfmode: String,
    /// 1 (errors only) through 5 (trace).
    pub log_level: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            rfmode: "SlowRF".to_string(),
            log_level: 3,
        }
    }
}

impl Config {
    /// Default config file location, `~/.config/sdgw/config.ini`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sdgw").join("config.ini"))
    }

    /// Load from a specific INI file. Missing keys fall back to defaults;
    /// a missing file is not an error (fresh install behaves like `Default`).
    pub fn load_from_ini(path: &Path) -> Result<Self> {
        let mut cfg = Self::default();
        if !path.exists() {
            return Ok(cfg);
        }

        let mut ini = Ini::new();
        ini.load(path)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
            .with_context(|| format!("loading config from {}", path.display()))?;

        if let Some(catalog) = ini.get("gateway", "catalog_path") {
            cfg.catalog_path = Some(PathBuf::from(catalog));
        }
        if let Some(rfmode) = ini.get("gateway", "rfmode") {
            cfg.rfmode = rfmode;
        }
        if let Some(level) = ini.getuint("gateway", "log_level").ok().flatten() {
            cfg.log_level = level.clamp(1, 5) as u8;
        }

        Ok(cfg)
    }

    /// Load from the default config path, falling back to defaults if it
    /// can't be located at all (e.g. no home directory).
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from_ini(&path),
            None => Ok(Self::default()),
        }
    }
}
