//! Build configuration module.
//!
//! Handles loading, validating, and merging `lp.toml`. Campaign parameters
//! (titles, tracking IDs, structured data) are *not* here; they come from the
//! `.env` file, see [`crate::site`]. This file only describes how the build
//! runs: where inputs live, image quality, and which minifiers are on.
//!
//! ## Config File Location
//!
//! Place `lp.toml` in the project root (next to `.env`):
//!
//! ```text
//! project/
//! ├── lp.toml                  # Build config (optional, overrides stock defaults)
//! ├── .env                     # Campaign parameters (optional)
//! └── src/
//!     ├── index.html
//!     ├── style.css
//!     ├── script.js
//!     └── images/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! source = "src"            # Source directory, relative to the project root
//! output = "dist"           # Output directory (cleared on every build)
//! env_file = ".env"         # Campaign parameters
//! html = "index.html"       # Page, relative to source
//! css = "style.css"         # Stylesheet, relative to source
//! js = "script.js"          # Script, relative to source
//! images = "images"         # Image directory, relative to source
//! favicon = "favicon.png"   # Favicon source, relative to the image directory
//!
//! [images]
//! quality = 80              # AVIF encoding quality (1-100)
//!
//! [minify]
//! html = true
//! css = true
//! js = true
//!
//! [processing]
//! max_processes = 4         # Max parallel image workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the build config file in the project root.
pub const CONFIG_FILENAME: &str = "lp.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Build configuration loaded from `lp.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Input and output locations.
    pub paths: PathsConfig,
    /// Image conversion settings.
    pub images: ImagesConfig,
    /// Which minifiers run.
    pub minify: MinifyConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl BuildConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        let named = [
            ("paths.html", &self.paths.html),
            ("paths.css", &self.paths.css),
            ("paths.js", &self.paths.js),
            ("paths.favicon", &self.paths.favicon),
        ];
        for (key, value) in named {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.paths.output.trim().is_empty() {
            return Err(ConfigError::Validation(
                "paths.output must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Source directory, relative to the project root.
    pub source: String,
    /// Output directory, relative to the project root. Cleared on every build.
    pub output: String,
    /// Env file with campaign parameters, relative to the project root.
    pub env_file: String,
    /// HTML page, relative to the source directory.
    pub html: String,
    /// Stylesheet, relative to the source directory.
    pub css: String,
    /// Script, relative to the source directory.
    pub js: String,
    /// Image directory, relative to the source directory.
    pub images: String,
    /// Favicon source image, relative to the image directory.
    pub favicon: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "src".to_string(),
            output: "dist".to_string(),
            env_file: ".env".to_string(),
            html: "index.html".to_string(),
            css: "style.css".to_string(),
            js: "script.js".to_string(),
            images: "images".to_string(),
            favicon: "favicon.png".to_string(),
        }
    }
}

/// Image conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// AVIF encoding quality (1 = worst, 100 = best). WebP output is lossless.
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { quality: 80 }
    }
}

/// Minifier toggles. Disabled minifiers pass content through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinifyConfig {
    pub html: bool,
    pub css: bool,
    pub js: bool,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            html: true,
            css: true,
            js: true,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image conversion workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(BuildConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `lp.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `lp.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `lp.toml` in the given project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<BuildConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `lp.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# lp-build Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Campaign parameters (title, analytics IDs, structured data, BASE_PATH)
# belong in the env file, not here. Run 'lp-build gen-env' for a template.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Paths
# ---------------------------------------------------------------------------
[paths]
# Source directory, relative to the project root.
source = "src"

# Output directory. It is deleted and recreated on every build.
output = "dist"

# Env file with campaign parameters, relative to the project root.
env_file = ".env"

# Inputs, relative to the source directory.
html = "index.html"
css = "style.css"
js = "script.js"
images = "images"

# Favicon source, relative to the image directory. Skipped if missing.
favicon = "favicon.png"

# ---------------------------------------------------------------------------
# Image conversion
# ---------------------------------------------------------------------------
[images]
# AVIF encoding quality (1 = worst, 100 = best). WebP variants are lossless.
quality = 80

# ---------------------------------------------------------------------------
# Minification
# ---------------------------------------------------------------------------
[minify]
html = true
css = true
js = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image conversion workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
