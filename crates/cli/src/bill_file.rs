//! Bill files
//!
//! Bills on disk use the shared-state shape (camelCase keys, numbers as
//! numbers) in YAML or JSON, picked by file extension.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use dinner_debt::share::SharedState;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading or writing bill files.
#[derive(Debug, Error)]
pub(crate) enum BillFileError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,

        /// Underlying error
        source: io::Error,
    },

    /// The file is not valid YAML for a bill.
    #[error("invalid YAML bill: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The file is not valid JSON for a bill.
    #[error("invalid JSON bill: {0}")]
    Json(#[from] serde_json::Error),

    /// The extension is neither YAML nor JSON.
    #[error("unsupported bill file extension {0:?}, expected .yml, .yaml or .json")]
    UnsupportedExtension(String),
}

/// On-disk bill format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum BillFormat {
    /// YAML, as hand-written bill files usually are
    Yaml,

    /// JSON, the same document a share link carries
    Json,
}

impl BillFormat {
    pub(crate) fn from_path(path: &Path) -> Result<Self, BillFileError> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "yml" | "yaml" => Ok(BillFormat::Yaml),
            "json" => Ok(BillFormat::Json),
            _ => Err(BillFileError::UnsupportedExtension(extension)),
        }
    }

    pub(crate) fn parse(self, contents: &str) -> Result<SharedState, BillFileError> {
        let state = match self {
            BillFormat::Yaml => serde_norway::from_str(contents)?,
            BillFormat::Json => serde_json::from_str(contents)?,
        };

        Ok(state)
    }

    pub(crate) fn render(self, state: &SharedState) -> Result<String, BillFileError> {
        let rendered = match self {
            BillFormat::Yaml => serde_norway::to_string(state)?,
            BillFormat::Json => serde_json::to_string_pretty(state)?,
        };

        Ok(rendered)
    }
}

/// Reads a bill file. Items without an id are given one.
pub(crate) fn load(path: &Path) -> Result<SharedState, BillFileError> {
    let format = BillFormat::from_path(path)?;

    let contents = fs::read_to_string(path).map_err(|source| BillFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut state = format.parse(&contents)?;
    state.bill.ensure_item_ids();

    debug!(
        path = %path.display(),
        items = state.bill.items().len(),
        "loaded bill file"
    );

    Ok(state)
}
