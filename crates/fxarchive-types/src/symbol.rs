//! Symbol handle.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Instrument type, used as a path component of the local archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    /// Foreign exchange currency pairs.
    Forex,
    /// Precious metals quoted against a currency.
    Metals,
    /// Stock indices (CFD).
    Index,
    /// Energy and agricultural commodities.
    Commodity,
    /// Cryptocurrencies.
    Crypto,
}

impl InstrumentType {
    /// Returns the type as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forex => "forex",
            Self::Metals => "metals",
            Self::Index => "index",
            Self::Commodity => "commodity",
            Self::Crypto => "crypto",
        }
    }
}

impl std::fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only handle of a symbol as provided by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Local symbol name (e.g., "EURUSD").
    name: String,
    /// Name of the symbol at the provider.
    provider_name: String,
    /// Human-readable description.
    #[serde(default)]
    description: String,
    /// Instrument type.
    #[serde(rename = "type")]
    instrument_type: InstrumentType,
    /// Number of decimal digits of a price.
    digits: u32,
    /// Start of the tick history in FXT, if known.
    #[serde(default)]
    tick_history_start: Option<NaiveDateTime>,
}

impl Symbol {
    /// Creates a new symbol handle.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        provider_name: impl Into<String>,
        instrument_type: InstrumentType,
        digits: u32,
        tick_history_start: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            name: name.into(),
            provider_name: provider_name.into(),
            description: String::new(),
            instrument_type,
            digits,
            tick_history_start,
        }
    }

    /// Returns a copy of this symbol with a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns a copy of this symbol with the given tick history start (FXT).
    #[must_use]
    pub const fn with_tick_history_start(mut self, start: Option<NaiveDateTime>) -> Self {
        self.tick_history_start = start;
        self
    }

    /// Returns the local symbol name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the provider's name of the symbol.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the instrument type.
    #[must_use]
    pub const fn instrument_type(&self) -> InstrumentType {
        self.instrument_type
    }

    /// Returns the number of price digits.
    #[must_use]
    pub const fn digits(&self) -> u32 {
        self.digits
    }

    /// Returns the value of one point (e.g. 0.00001 for 5 digits).
    #[must_use]
    pub fn point(&self) -> f64 {
        point_value(self.digits)
    }

    /// Returns the start of the tick history in FXT, if known.
    #[must_use]
    pub const fn tick_history_start(&self) -> Option<NaiveDateTime> {
        self.tick_history_start
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Returns the value of one point for the given number of digits.
#[must_use]
pub fn point_value(digits: u32) -> f64 {
    10f64.powi(-(digits as i32))
}
