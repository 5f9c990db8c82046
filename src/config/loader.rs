//! Rate table loading functionality.
//!
//! This module provides the [`RateTableLoader`] type for loading per-tax-year
//! rate tables from YAML files.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::TaxPeriod;

use super::types::RateTable;

/// Rate file formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RateFileFormat {
    Yaml,
    Json,
}

impl RateFileFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Loads and provides access to rate tables.
///
/// The `RateTableLoader` reads every YAML (`.yaml`, `.yml`) or JSON (`.json`)
/// file in a directory, one rate table per file, and indexes them by tax year.
///
/// # Directory Structure
///
/// ```text
/// config/rates/
/// ├── 2016.yaml
/// ├── 2017.yaml
/// └── 2018.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::RateTableLoader;
///
/// let loader = RateTableLoader::load("./config/rates").unwrap();
/// let table = loader.rate_table(2017).unwrap();
/// println!("Bands: {}", table.income_tax_bands.len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RateTableLoader {
    tables: BTreeMap<i32, RateTable>,
}

impl RateTableLoader {
    /// Loads every rate table in the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the rates directory (e.g., "./config/rates")
    ///
    /// # Returns
    ///
    /// Returns a `RateTableLoader` on success, or an error if:
    /// - The directory is missing or contains no rate files
    /// - Any file contains invalid YAML or fails the structural checks
    /// - Two files define the same tax year
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let dir_str = path.display().to_string();

        if !path.exists() {
            return Err(EngineError::ConfigNotFound { path: dir_str });
        }

        let entries = fs::read_dir(path).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut loader = Self::default();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let file = entry.path();
            let Some(format) = RateFileFormat::from_path(&file) else {
                continue;
            };

            let table = Self::load_file(&file, format)?;
            debug!(tax_year = table.tax_year, path = %file.display(), "loaded rate table");
            loader.insert(table, &file.display().to_string())?;
        }

        if loader.tables.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", dir_str),
            });
        }

        Ok(loader)
    }

    /// Parses a single rate table from YAML text.
    ///
    /// `origin` is used in error messages.
    pub fn parse_str(content: &str, origin: &str) -> EngineResult<RateTable> {
        Self::parse_as(content, origin, RateFileFormat::Yaml)
    }

    /// Parses a single rate table from JSON text.
    pub fn parse_json_str(content: &str, origin: &str) -> EngineResult<RateTable> {
        Self::parse_as(content, origin, RateFileFormat::Json)
    }

    fn parse_as(content: &str, origin: &str, format: RateFileFormat) -> EngineResult<RateTable> {
        let parsed: Result<RateTable, String> = match format {
            RateFileFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            RateFileFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        let table = parsed.map_err(|message| EngineError::ConfigParseError {
            path: origin.to_string(),
            message,
        })?;

        table.check().map_err(|message| EngineError::ConfigParseError {
            path: origin.to_string(),
            message,
        })?;

        Ok(table)
    }

    /// Loads and parses one rate file.
    fn load_file(path: &Path, format: RateFileFormat) -> EngineResult<RateTable> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse_as(&content, &path_str, format)
    }

    fn insert(&mut self, table: RateTable, origin: &str) -> EngineResult<()> {
        if self.tables.contains_key(&table.tax_year) {
            return Err(EngineError::ConfigParseError {
                path: origin.to_string(),
                message: format!("duplicate rate table for tax year {}", table.tax_year),
            });
        }
        self.tables.insert(table.tax_year, table);
        Ok(())
    }

    /// Builds a loader from tables already in memory.
    pub fn from_tables(tables: impl IntoIterator<Item = RateTable>) -> EngineResult<Self> {
        let mut loader = Self::default();
        for table in tables {
            loader.insert(table, "<memory>")?;
        }
        Ok(loader)
    }

    /// Gets the rate table for a tax year.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationMissing`] when no table was loaded
    /// for the year.
    pub fn rate_table(&self, tax_year: i32) -> EngineResult<&RateTable> {
        self.tables
            .get(&tax_year)
            .ok_or_else(|| EngineError::ConfigurationMissing {
                name: "rate_table".to_string(),
                tax_year,
            })
    }

    /// Gets the rate table for the tax year a payment date falls in.
    pub fn rate_table_for_date(&self, date: NaiveDate) -> EngineResult<&RateTable> {
        let period = TaxPeriod::from_date(date)?;
        self.rate_table(period.year)
    }

    /// Returns the loaded tax years in ascending order.
    pub fn tax_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.tables.keys().copied()
    }
}
