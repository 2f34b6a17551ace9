//! Symbol catalog for the fxarchive tick archive.
//!
//! The catalog is embedded at compile time and maps local symbol names to
//! provider names, instrument types, price digits and tick history starts.
//!
//! # Example
//!
//! ```
//! use fxarchive_instruments::SymbolCatalog;
//!
//! let catalog = SymbolCatalog::global();
//!
//! if let Some(symbol) = catalog.get("eurusd") {
//!     println!("{}: {} digits", symbol.name(), symbol.digits());
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fxarchive/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::OnceLock;

use fxarchive_types::{InstrumentType, Result, Symbol};

/// The symbol catalog JSON embedded at compile time.
const SYMBOLS_JSON: &str = include_str!("../data/symbols.json");

/// Global catalog instance.
static CATALOG: OnceLock<SymbolCatalog> = OnceLock::new();

/// Catalog of known symbols, keyed by lowercase local name.
#[derive(Debug)]
pub struct SymbolCatalog {
    symbols: HashMap<String, Symbol>,
}

impl SymbolCatalog {
    /// Returns the global catalog.
    ///
    /// The catalog is initialized lazily on first access.
    #[must_use]
    pub fn global() -> &'static Self {
        CATALOG.get_or_init(|| Self::from_json(SYMBOLS_JSON).expect("Invalid symbols.json"))
    }

    /// Builds a catalog from a JSON array of symbols.
    ///
    /// # Errors
    ///
    /// Returns [`fxarchive_types::ArchiveError::Json`] if the document does
    /// not describe a list of symbols.
    pub fn from_json(json: &str) -> Result<Self> {
        let list: Vec<Symbol> = serde_json::from_str(json)?;
        let symbols = list
            .into_iter()
            .map(|symbol| (symbol.name().to_lowercase(), symbol))
            .collect();
        Ok(Self { symbols })
    }

    /// Looks up a symbol by local name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(&name.to_lowercase())
    }

    /// Returns all symbols sorted by name.
    #[must_use]
    pub fn all(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.symbols.values().collect();
        symbols.sort_by(|a, b| a.name().cmp(b.name()));
        symbols
    }

    /// Returns the symbols of one instrument type, sorted by name.
    #[must_use]
    pub fn by_type(&self, instrument_type: InstrumentType) -> Vec<&Symbol> {
        self.all()
            .into_iter()
            .filter(|s| s.instrument_type() == instrument_type)
            .collect()
    }

    /// Searches symbols by name, provider name or description (case-insensitive).
    #[must_use]
    pub fn search(&self, pattern: &str) -> Vec<&Symbol> {
        let pattern = pattern.to_lowercase();
        self.all()
            .into_iter()
            .filter(|s| {
                s.name().to_lowercase().contains(&pattern)
                    || s.provider_name().to_lowercase().contains(&pattern)
                    || s.description().to_lowercase().contains(&pattern)
            })
            .collect()
    }

    /// Returns the total number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxarchive_types::ArchiveError;

    #[test]
    fn test_catalog_loads() {
        let catalog = SymbolCatalog::global();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_get_eurusd() {
        let catalog = SymbolCatalog::global();
        let eurusd = catalog.get("eurusd").expect("EURUSD should exist");
        assert_eq!(eurusd.name(), "EURUSD");
        assert_eq!(eurusd.digits(), 5);
        assert_eq!(eurusd.instrument_type(), InstrumentType::Forex);
        assert!(eurusd.tick_history_start().is_some());
    }

    #[test]
    fn test_get_case_insensitive() {
        let catalog = SymbolCatalog::global();
        assert!(catalog.get("EURUSD").is_some());
        assert!(catalog.get("EurUsd").is_some());
        assert!(catalog.get("unknown").is_none());
    }

    #[test]
    fn test_provider_name_differs() {
        let catalog = SymbolCatalog::global();
        let index = catalog.get("usa500").unwrap();
        assert_eq!(index.provider_name(), "USA500IDXUSD");
        assert!(index.tick_history_start().is_none());
    }

    #[test]
    fn test_all_sorted() {
        let names: Vec<_> = SymbolCatalog::global()
            .all()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_by_type_and_search() {
        let catalog = SymbolCatalog::global();
        let metals = catalog.by_type(InstrumentType::Metals);
        assert!(metals.iter().all(|s| s.instrument_type() == InstrumentType::Metals));
        assert!(!metals.is_empty());
        assert!(catalog.search("gold").iter().any(|s| s.name() == "XAUUSD"));
    }

    #[test]
    fn test_invalid_json() {
        let result = SymbolCatalog::from_json("{\"name\": 1}");
        assert!(matches!(result, Err(ArchiveError::Json(_))));
    }
}
