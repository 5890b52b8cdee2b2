//! Symbol definitions and the symbol catalog

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_weight() -> u32 {
    1
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol name (e.g., "SEVEN", "BAR")
    pub name: String,
    /// Glyph shown on the reel
    pub display: String,
    /// Base weight, used on every reel without an override
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Payout multiplier applied to the bet
    pub payout: u32,
}

impl Symbol {
    /// Create a symbol
    pub fn new(name: impl Into<String>, display: impl Into<String>, weight: u32, payout: u32) -> Self {
        Self {
            name: name.into(),
            display: display.into(),
            weight,
            payout,
        }
    }
}

/// Immutable symbol catalog, in configuration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolCatalog {
    symbols: Vec<Symbol>,
}

impl SymbolCatalog {
    /// Build a catalog, rejecting empty sets, duplicate names and zero payouts
    pub fn new(symbols: Vec<Symbol>) -> Result<Self, ConfigError> {
        let catalog = Self { symbols };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The shipped classic symbol set
    pub fn classic() -> Self {
        Self {
            symbols: vec![
                Symbol::new("SEVEN", "7", 1, 10),
                Symbol::new("BAR", "BAR", 2, 4),
                Symbol::new("BELL", "🔔", 3, 2),
                Symbol::new("CHERRY", "🍒", 5, 1),
                Symbol::new("LEMON", "🍋", 6, 1),
                Symbol::new("GRAPE", "🍇", 6, 1),
                Symbol::new("STAR", "⭐", 4, 2),
            ],
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }

        let mut seen = HashSet::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            if !seen.insert(symbol.name.as_str()) {
                return Err(ConfigError::DuplicateSymbol(symbol.name.clone()));
            }
            if symbol.payout == 0 {
                return Err(ConfigError::ZeroPayout {
                    name: symbol.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Get symbol by name
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Check whether a name is in the catalog
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Display glyph for a name, falling back to the name itself
    pub fn display<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).map(|s| s.display.as_str()).unwrap_or(name)
    }

    /// Iterate symbols in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Symbol names in catalog order
    pub fn names(&self) -> Vec<&str> {
        self.symbols.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::classic()
    }
}
