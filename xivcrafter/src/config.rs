//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory. The recipe and
//! action document lives in its own file so it can be shared or edited by hand.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use craft::{LanguageProfile, Region, Tuning};

/// On-disk configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Substring of the game window title (from `xcap::Window::title()`).
    ///
    /// If multiple windows match, the first one is used.
    pub window_title: String,

    /// Part of the window handed to OCR, as fractions of the window size.
    pub region: Region,

    /// Languages probed by the craft window detector, in fallback order.
    pub languages: Vec<LanguageProfile>,

    /// OCR recognition model per language tag. Unlisted languages use `latin`.
    pub ocr_models: BTreeMap<String, String>,

    /// Folder holding the OCR models; overrides the usual search.
    pub assets_dir: Option<PathBuf>,

    /// Recipe and action document.
    pub document: PathBuf,

    pub tuning: Tuning,

    /// Language the craft window was last detected in.
    pub cached_language: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_title: "FINAL FANTASY XIV".to_string(),
            region: Region::FULL,
            languages: LanguageProfile::defaults(),
            ocr_models: [("en", "latin"), ("fr", "latin"), ("de", "latin"), ("ja", "japan")]
                .into_iter()
                .map(|(tag, model)| (tag.to_string(), model.to_string()))
                .collect(),
            assets_dir: None,
            document: PathBuf::from("data.json"),
            tuning: Tuning::default(),
            cached_language: None,
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("xivcrafter.json"))
    }

    /// Load configuration from disk, falling back to defaults on error.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration from disk. A missing file yields the defaults.
    pub fn try_load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
        let cfg = serde_json::from_str(&json).with_context(|| format!("parse {:?}", path))?;
        Ok(cfg)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }

    pub fn ocr_model(&self, language: &str) -> &str {
        self.ocr_models.get(language).map(String::as_str).unwrap_or("latin")
    }
}

/// Read and validate the recipe and action document.
pub fn load_library(path: &Path) -> Result<data::Library> {
    let json = fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    let document = data::Document::from_json(&json).with_context(|| format!("parse {:?}", path))?;
    document
        .into_library()
        .with_context(|| format!("validate {:?}", path))
}
