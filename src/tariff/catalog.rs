//! Tariff catalog loading and export.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Tariff;

/// Errors raised while loading, querying or exporting a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid tariff catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate tariff id \"{0}\"")]
    DuplicateId(String),
    #[error("unknown tariff \"{id}\", available: {available}")]
    UnknownTariff { id: String, available: String },
    /// Export refused; each entry is `"<tariff id>: <field>: <message>"`.
    #[error("catalog has {} validation error(s): {}", .0.len(), .0.join(" | "))]
    Invalid(Vec<String>),
}

/// The set of tariffs offered to the user.
///
/// Serialized as `{ "tariffs": [...] }`; the original `{ "tarifas": [...] }`
/// layout is accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TariffCatalog {
    #[serde(alias = "tarifas")]
    pub tariffs: Vec<Tariff>,
}

/// Display metadata for one tariff, as listed to users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffSummary {
    pub id: String,
    pub name: String,
    pub notes: String,
}

impl From<&Tariff> for TariffSummary {
    fn from(t: &Tariff) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            notes: t.notes.clone(),
        }
    }
}

impl TariffCatalog {
    /// Catalog containing only [`Tariff::residential_simple`].
    pub fn builtin() -> Self {
        Self {
            tariffs: vec![Tariff::residential_simple()],
        }
    }

    /// Parses a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the file cannot be read, the JSON is
    /// invalid, or two tariffs share an id.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parses a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the JSON is invalid or two tariffs share an id.
    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(s)?;
        let mut seen = HashSet::new();
        for t in &catalog.tariffs {
            if !seen.insert(t.id.as_str()) {
                return Err(CatalogError::DuplicateId(t.id.clone()));
            }
        }
        tracing::debug!(tariffs = catalog.tariffs.len(), "tariff catalog loaded");
        Ok(catalog)
    }

    /// Looks up a tariff by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTariff` listing the available ids.
    pub fn get(&self, id: &str) -> Result<&Tariff, CatalogError> {
        self.tariffs
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CatalogError::UnknownTariff {
                id: id.to_string(),
                available: self
                    .tariffs
                    .iter()
                    .map(|t| t.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Lists id, name and notes of every tariff, in catalog order.
    pub fn summaries(&self) -> Vec<TariffSummary> {
        self.tariffs.iter().map(TariffSummary::from).collect()
    }

    /// Validates every tariff; each message is prefixed with the tariff id.
    pub fn validate(&self) -> Vec<String> {
        self.tariffs
            .iter()
            .flat_map(|t| {
                t.validate()
                    .into_iter()
                    .map(move |e| format!("{}: {e}", t.id))
            })
            .collect()
    }

    /// Serializes the catalog as pretty-printed JSON, ready to replace
    /// `tarifas.json`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` if any tariff fails validation; nothing
    /// is exported in that case.
    pub fn to_json_pretty(&self) -> Result<String, CatalogError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(CatalogError::Invalid(errors));
        }
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates and writes the catalog to `path`.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if validation fails or the file cannot be written.
    pub fn export_json_file(&self, path: &Path) -> Result<(), CatalogError> {
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
