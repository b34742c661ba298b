//! Configuration: data locations, admission policy selection, genre filters.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::genres::UntrackedGenres;

/// Paths the CLI reads books from and writes frames to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPaths {
    /// Aggregated books file (`data/books.json`).
    pub books_file: PathBuf,
    /// Directory of per-period book files, one batch per file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batches_dir: Option<PathBuf>,
    /// Rendered animation output (`data/network.json`).
    pub output: PathBuf,
}

impl DataPaths {
    /// Create data paths rooted at `root`. Nothing is created on disk.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            books_file: root.join("books.json"),
            batches_dir: None,
            output: root.join("network.json"),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new("data")
    }
}

/// The three edge admission strategies, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Genres rarer than a fraction of all candidate edges; first match per pair.
    RareGenreFirstMatch,
    /// Genres whose frequency falls within one stdev of the median.
    TypicalGenreBand,
    /// Whole-genre-list overlap at or above a required weight.
    OverlapThreshold,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RareGenreFirstMatch => "rare-genre-first-match",
            Self::TypicalGenreBand => "typical-genre-band",
            Self::OverlapThreshold => "overlap-threshold",
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "rare-genre-first-match" | "uncommon-genres" => Ok(Self::RareGenreFirstMatch),
            "typical-genre-band" | "median-with-one-std" => Ok(Self::TypicalGenreBand),
            "overlap-threshold" | "compare_all_genres_between_nodes" => {
                Ok(Self::OverlapThreshold)
            }
            other => Err(Error::InvalidConfiguration(format!(
                "unknown policy '{}' (expected rare-genre-first-match, typical-genre-band or overlap-threshold)",
                other
            ))),
        }
    }
}

/// Loosely-typed policy selection as it appears in a config file.
///
/// Resolved once into a strongly-typed policy by the graph crate; see
/// [`PolicySettings::kind`] and [`PolicySettings::required_weight`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySettings {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
}

impl PolicySettings {
    pub fn named(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            required_weight: None,
            percentile: None,
        }
    }

    pub fn overlap(required_weight: f64) -> Self {
        Self {
            method: PolicyKind::OverlapThreshold.as_str().to_string(),
            required_weight: Some(required_weight),
            percentile: None,
        }
    }

    pub fn kind(&self) -> Result<PolicyKind> {
        self.method.parse()
    }

    /// The overlap threshold. Mandatory for `overlap-threshold`, no default.
    pub fn required_weight(&self) -> Result<f64> {
        let weight = self.required_weight.ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "policy '{}' requires required_weight",
                self.method
            ))
        })?;
        unit_interval("required_weight", weight)
    }

    /// Fraction of all candidate edges below which a genre counts as rare.
    pub fn percentile_or_default(&self) -> Result<f64> {
        unit_interval("percentile", self.percentile.unwrap_or(DEFAULT_PERCENTILE))
    }
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self::named(PolicyKind::RareGenreFirstMatch.as_str())
    }
}

/// Rare-genre cutoff: 10% of all candidate edges.
pub const DEFAULT_PERCENTILE: f64 = 0.10;

fn unit_interval(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidConfiguration(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

fn default_base_year() -> i32 {
    1950
}

/// Top-level shelfnet configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfnetConfig {
    #[serde(default)]
    pub data_paths: DataPaths,
    #[serde(default)]
    pub policy: PolicySettings,
    #[serde(default)]
    pub untracked_genres: UntrackedGenres,
    /// Label of the first period in a sequence. Display only.
    #[serde(default = "default_base_year")]
    pub base_year: i32,
}

impl Default for ShelfnetConfig {
    fn default() -> Self {
        Self {
            data_paths: DataPaths::default(),
            policy: PolicySettings::default(),
            untracked_genres: UntrackedGenres::default(),
            base_year: default_base_year(),
        }
    }
}

impl ShelfnetConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            Error::InvalidConfiguration(format!("{}: {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self {
            data_paths: DataPaths::new(data_dir),
            ..Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `SHELFNET_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SHELFNET_DATA_DIR") {
            let batches_dir = self.data_paths.batches_dir.take();
            self.data_paths = DataPaths::new(dir);
            self.data_paths.batches_dir = batches_dir;
        }
        if let Some(method) = lookup("SHELFNET_POLICY") {
            self.policy.method = method;
        }
        if let Some(weight) = lookup("SHELFNET_REQUIRED_WEIGHT") {
            let weight = weight.trim().parse::<f64>().map_err(|e| {
                Error::InvalidConfiguration(format!("SHELFNET_REQUIRED_WEIGHT: {}", e))
            })?;
            self.policy.required_weight = Some(weight);
        }
        if let Some(year) = lookup("SHELFNET_BASE_YEAR") {
            self.base_year = year.trim().parse().map_err(|e| {
                Error::InvalidConfiguration(format!("SHELFNET_BASE_YEAR: {}", e))
            })?;
        }
        Ok(())
    }
}
