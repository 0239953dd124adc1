// src/catalog.rs

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data_loader::{load_path, LoadError};
use crate::unified_table::UnifiedTable;

/// One input file; its first row is expected to hold the column headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub path: PathBuf,
}

impl SourceDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SourceDescriptor { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A source that was skipped while building the catalog.
#[derive(Debug)]
pub struct SourceWarning {
    pub source: SourceDescriptor,
    pub error: LoadError,
}

impl SourceWarning {
    pub fn is_not_found(&self) -> bool {
        matches!(self.error, LoadError::NotFound(_))
    }
}

impl fmt::Display for SourceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_not_found() {
            write!(f, "File not found: {}", self.source)
        } else {
            write!(f, "Error loading {}: {}", self.source, self.error)
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no data loaded: none of the {attempted} pricebook sources could be read")]
    NothingLoaded {
        attempted: usize,
        warnings: Vec<SourceWarning>,
    },
}

/// Everything `load` produced: the table, the skipped sources and how many loaded.
#[derive(Debug)]
pub struct LoadReport {
    pub table: UnifiedTable,
    pub warnings: Vec<SourceWarning>,
    pub loaded: usize,
    pub attempted: usize,
}

impl LoadReport {
    pub fn nothing_loaded(&self) -> bool {
        self.loaded == 0
    }

    /// Fails when no source could be read, so an empty catalog never reaches the
    /// search step looking like "no matches".
    pub fn into_table(self) -> Result<(UnifiedTable, Vec<SourceWarning>), CatalogError> {
        if self.nothing_loaded() {
            return Err(CatalogError::NothingLoaded {
                attempted: self.attempted,
                warnings: self.warnings,
            });
        }
        Ok((self.table, self.warnings))
    }
}

/// Loads every source in order and concatenates the ones that parse.
pub fn load(sources: &[SourceDescriptor]) -> LoadReport {
    let mut parts = Vec::new();
    let mut warnings = Vec::new();

    for source in sources {
        match load_path(source.path()) {
            Ok(data) => {
                debug!(
                    source = %source,
                    rows = data.rows.len(),
                    columns = data.headers.len(),
                    "loaded source"
                );
                parts.push(data);
            }
            Err(error) => {
                let warning = SourceWarning {
                    source: source.clone(),
                    error,
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    let loaded = parts.len();
    let table = UnifiedTable::concat(parts);
    info!(
        loaded,
        skipped = warnings.len(),
        rows = table.len(),
        columns = table.headers().len(),
        "catalog built"
    );

    LoadReport {
        table,
        warnings,
        loaded,
        attempted: sources.len(),
    }
}
