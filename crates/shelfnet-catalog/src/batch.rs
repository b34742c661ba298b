//! Per-period batches: one books file per year or dataset.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::ItemCatalog;
use shelfnet_core::{Error, Result};

/// One independently processed set of books.
#[derive(Debug, Clone)]
pub struct Batch {
    /// File stem of the source, e.g. `1951` for `1951.json`.
    pub name: String,
    pub catalog: ItemCatalog,
}

impl Batch {
    pub fn new(name: impl Into<String>, catalog: ItemCatalog) -> Self {
        Self {
            name: name.into(),
            catalog,
        }
    }

    /// Load a single file as a batch named after its stem.
    pub fn load(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("batch")
            .to_string();
        Ok(Self::new(name, ItemCatalog::load(path)?))
    }
}

/// List `*.json` files in `dir`, sorted by file name.
pub fn batch_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} batch files in {}", files.len(), dir.display());
    Ok(files)
}

/// Load every books file in `dir` as its own batch, in file-name order.
pub fn load_batches(dir: impl AsRef<Path>) -> Result<Vec<Batch>> {
    let dir = dir.as_ref();
    let files = batch_files(dir)?;
    if files.is_empty() {
        return Err(Error::MalformedInput(format!(
            "no .json books files in {}",
            dir.display()
        )));
    }

    let batches = files
        .iter()
        .map(|path| Batch::load(path))
        .collect::<Result<Vec<_>>>()?;
    info!("Loaded {} batches from {}", batches.len(), dir.display());
    Ok(batches)
}
