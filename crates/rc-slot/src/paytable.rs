//! Paytable and win calculation
//!
//! Every rule is tested against every payline and every match pays. There is
//! no best-line or best-rule selection: two lines matching, or two rules
//! matching the same line, both add to the total.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::spin::Grid;
use crate::symbols::{Symbol, SymbolCatalog};

/// A payline definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Payline index (0-based, configuration order)
    pub index: u8,
    /// Row per reel (e.g., [0, 1, 2] for a downward diagonal)
    pub rows: Vec<u8>,
}

impl Payline {
    /// Create a straight line (same row across all reels)
    pub fn straight(index: u8, row: u8, reel_count: u8) -> Self {
        Self {
            index,
            rows: vec![row; reel_count as usize],
        }
    }

    /// Render as `[r,r,r]`
    pub fn label(&self) -> String {
        format_rows(&self.rows)
    }
}

fn format_rows(rows: &[u8]) -> String {
    let parts: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
    format!("[{}]", parts.join(","))
}

/// Classic five lines for a 3×3 window
pub fn classic_paylines() -> Vec<Vec<u8>> {
    vec![
        vec![0, 0, 0], // top
        vec![1, 1, 1], // middle
        vec![2, 2, 2], // bottom
        vec![0, 1, 2], // diag down
        vec![2, 1, 0], // diag up
    ]
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAY RULES
// ═══════════════════════════════════════════════════════════════════════════════

/// A pay rule: a predicate over the symbols of one line plus a payout
///
/// `payout` receives the first symbol on the line, whatever the rule matched on.
pub trait PayRule: Send + Sync + fmt::Debug {
    /// Rule identifier recorded on every win
    fn id(&self) -> &str;

    /// Does the line match?
    fn matches(&self, line: &[&str]) -> bool;

    /// Amount paid for a match
    fn payout(&self, symbol: &Symbol, bet: u64) -> u64;
}

/// All positions on the line hold the same symbol; pays multiplier × bet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreeOfAKind {
    id: String,
}

impl ThreeOfAKind {
    pub const ID: &'static str = "THREE_OF_A_KIND";

    pub fn new() -> Self {
        Self::with_id(Self::ID)
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Default for ThreeOfAKind {
    fn default() -> Self {
        Self::new()
    }
}

impl PayRule for ThreeOfAKind {
    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, line: &[&str]) -> bool {
        match line.split_first() {
            Some((first, rest)) => rest.iter().all(|s| s == first),
            None => false,
        }
    }

    fn payout(&self, symbol: &Symbol, bet: u64) -> u64 {
        (symbol.payout as u64).saturating_mul(bet)
    }
}

/// At least `min_count` copies of one symbol anywhere on the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyCount {
    pub id: String,
    pub symbol: String,
    pub min_count: u8,
    pub multiplier: u32,
}

impl PayRule for AnyCount {
    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, line: &[&str]) -> bool {
        line.iter().filter(|&&s| s == self.symbol).count() >= self.min_count as usize
    }

    fn payout(&self, _symbol: &Symbol, bet: u64) -> u64 {
        (self.multiplier as u64).saturating_mul(bet)
    }
}

/// Every position on the line belongs to a symbol set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedSet {
    pub id: String,
    pub symbols: HashSet<String>,
    pub multiplier: u32,
}

impl PayRule for MixedSet {
    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, line: &[&str]) -> bool {
        !line.is_empty() && line.iter().all(|s| self.symbols.contains(*s))
    }

    fn payout(&self, _symbol: &Symbol, bet: u64) -> u64 {
        (self.multiplier as u64).saturating_mul(bet)
    }
}

/// Serializable pay rule description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayRuleSpec {
    /// All positions identical, pays the symbol multiplier × bet
    ThreeOfAKind {
        #[serde(default = "default_three_id")]
        id: String,
    },
    /// `min_count` or more of `symbol` anywhere on the line
    #[serde(rename_all = "camelCase")]
    AnyCount {
        id: String,
        symbol: String,
        min_count: u8,
        multiplier: u32,
    },
    /// Every position drawn from `symbols`
    #[serde(rename_all = "camelCase")]
    MixedSet {
        id: String,
        symbols: Vec<String>,
        multiplier: u32,
    },
}

fn default_three_id() -> String {
    ThreeOfAKind::ID.to_string()
}

impl PayRuleSpec {
    /// The shipped default rule
    pub fn three_of_a_kind() -> Self {
        Self::ThreeOfAKind {
            id: default_three_id(),
        }
    }

    /// Rule id
    pub fn id(&self) -> &str {
        match self {
            Self::ThreeOfAKind { id } | Self::AnyCount { id, .. } | Self::MixedSet { id, .. } => {
                id.as_str()
            }
        }
    }

    /// Check symbol references and multipliers
    pub fn validate(&self, symbols: &SymbolCatalog) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidRule {
            id: self.id().to_string(),
            reason: reason.to_string(),
        };
        let unknown = |name: &str| ConfigError::UnknownSymbol {
            name: name.to_string(),
            context: format!("pay rule {}", self.id()),
        };

        match self {
            Self::ThreeOfAKind { .. } => Ok(()),
            Self::AnyCount {
                symbol,
                min_count,
                multiplier,
                ..
            } => {
                if !symbols.contains(symbol) {
                    return Err(unknown(symbol));
                }
                if *min_count == 0 {
                    return Err(invalid("minCount must be at least 1"));
                }
                if *multiplier == 0 {
                    return Err(invalid("multiplier must be positive"));
                }
                Ok(())
            }
            Self::MixedSet {
                symbols: set,
                multiplier,
                ..
            } => {
                if set.is_empty() {
                    return Err(invalid("symbol set is empty"));
                }
                if let Some(name) = set.iter().find(|n| !symbols.contains(n)) {
                    return Err(unknown(name));
                }
                if *multiplier == 0 {
                    return Err(invalid("multiplier must be positive"));
                }
                Ok(())
            }
        }
    }

    /// Build the runtime rule
    pub fn build(&self) -> Arc<dyn PayRule> {
        match self {
            Self::ThreeOfAKind { id } => Arc::new(ThreeOfAKind::with_id(id.clone())),
            Self::AnyCount {
                id,
                symbol,
                min_count,
                multiplier,
            } => Arc::new(AnyCount {
                id: id.clone(),
                symbol: symbol.clone(),
                min_count: *min_count,
                multiplier: *multiplier,
            }),
            Self::MixedSet {
                id,
                symbols,
                multiplier,
            } => Arc::new(MixedSet {
                id: id.clone(),
                symbols: symbols.iter().cloned().collect(),
                multiplier: *multiplier,
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATION
// ═══════════════════════════════════════════════════════════════════════════════

/// One rule match on one payline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRecord {
    /// Row per reel of the winning line
    pub line: Vec<u8>,
    /// Payline index
    pub line_index: u8,
    /// Matching rule
    pub rule_id: String,
    /// First symbol on the line
    pub symbol: String,
    /// Amount paid
    pub amount: u64,
}

impl fmt::Display for WinRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {} {} {} → +{}",
            format_rows(&self.line),
            self.rule_id,
            self.symbol,
            self.amount
        )
    }
}

/// Result of evaluating a grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Sum of all win amounts
    pub total: u64,
    /// Itemized wins, line order then rule order
    pub wins: Vec<WinRecord>,
}

impl Evaluation {
    /// Check if this is a winning spin
    pub fn is_win(&self) -> bool {
        self.total > 0
    }

    /// Payout text: every record joined by ` | `
    pub fn summary(&self) -> String {
        self.wins
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Complete paytable
#[derive(Debug, Clone)]
pub struct Paytable {
    symbols: SymbolCatalog,
    paylines: Vec<Payline>,
    rules: Vec<Arc<dyn PayRule>>,
}

impl Paytable {
    /// Build from a validated config
    pub fn from_config(config: &GameConfig) -> Self {
        let paylines = config
            .paylines
            .iter()
            .enumerate()
            .map(|(index, rows)| Payline {
                index: index as u8,
                rows: rows.clone(),
            })
            .collect();

        Self {
            symbols: config.symbols.clone(),
            paylines,
            rules: config.pay_rules.iter().map(PayRuleSpec::build).collect(),
        }
    }

    /// Build from parts
    pub fn new(symbols: SymbolCatalog, paylines: Vec<Payline>, rules: Vec<Arc<dyn PayRule>>) -> Self {
        Self {
            symbols,
            paylines,
            rules,
        }
    }

    /// Add a rule (evaluated after the existing ones)
    pub fn with_rule(mut self, rule: Arc<dyn PayRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn paylines(&self) -> &[Payline] {
        &self.paylines
    }

    pub fn rules(&self) -> &[Arc<dyn PayRule>] {
        &self.rules
    }

    pub fn symbols(&self) -> &SymbolCatalog {
        &self.symbols
    }

    /// Evaluate wins on a grid
    ///
    /// Pure: the same grid and bet always give the same evaluation.
    pub fn evaluate(&self, grid: &Grid, bet: u64) -> Evaluation {
        let mut eval = Evaluation::default();

        for payline in &self.paylines {
            let Some(line_symbols) = grid.line_symbols(payline) else {
                continue;
            };
            let Some(&first) = line_symbols.first() else {
                continue;
            };
            // Generated grids only hold catalog names
            let Some(symbol) = self.symbols.get(first) else {
                continue;
            };

            for rule in &self.rules {
                if !rule.matches(&line_symbols) {
                    continue;
                }
                let amount = rule.payout(symbol, bet);
                eval.total = eval.total.saturating_add(amount);
                eval.wins.push(WinRecord {
                    line: payline.rows.clone(),
                    line_index: payline.index,
                    rule_id: rule.id().to_string(),
                    symbol: first.to_string(),
                    amount,
                });
            }
        }

        eval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Symbol;

    fn two_symbol_table(paylines: Vec<Vec<u8>>) -> Paytable {
        let mut config = GameConfig::with_symbols(vec![
            Symbol::new("SEVEN", "7", 1, 10),
            Symbol::new("BAR", "BAR", 1, 4),
        ])
        .unwrap();
        config.paylines = paylines;
        Paytable::from_config(&config)
    }

    #[test]
    fn test_payline_straight() {
        let line = Payline::straight(0, 1, 3);
        assert_eq!(line.rows, vec![1, 1, 1]);
        assert_eq!(line.label(), "[1,1,1]");
    }

    #[test]
    fn test_middle_line_three_sevens() {
        let table = two_symbol_table(vec![vec![1, 1, 1]]);
        let grid = Grid::from_rows(&[
            &["X", "X", "X"],
            &["SEVEN", "SEVEN", "SEVEN"],
            &["X", "X", "X"],
        ]);

        let eval = table.evaluate(&grid, 2);
        assert_eq!(eval.total, 20);
        assert_eq!(eval.wins.len(), 1);
        assert_eq!(eval.wins[0].rule_id, "THREE_OF_A_KIND");
        assert_eq!(eval.wins[0].symbol, "SEVEN");
        assert_eq!(eval.wins[0].to_string(), "Line [1,1,1] THREE_OF_A_KIND SEVEN → +20");
    }

    #[test]
    fn test_mismatched_line_pays_nothing() {
        let table = two_symbol_table(vec![vec![1, 1, 1]]);
        let grid = Grid::from_rows(&[
            &["_", "_", "_"],
            &["SEVEN", "BAR", "SEVEN"],
            &["_", "_", "_"],
        ]);

        let eval = table.evaluate(&grid, 5);
        assert_eq!(eval.total, 0);
        assert!(eval.wins.is_empty());
        assert!(!eval.is_win());
    }

    #[test]
    fn test_lines_are_additive() {
        let table = two_symbol_table(classic_paylines());
        let grid = Grid::from_rows(&[
            &["BAR", "BAR", "BAR"],
            &["SEVEN", "SEVEN", "SEVEN"],
            &["BAR", "SEVEN", "SEVEN"],
        ]);

        let eval = table.evaluate(&grid, 1);
        // top BAR (4) + middle SEVEN (10)
        assert_eq!(eval.total, 14);
        assert_eq!(eval.wins.len(), 2);
        assert_eq!(eval.summary(), "Line [0,0,0] THREE_OF_A_KIND BAR → +4 | Line [1,1,1] THREE_OF_A_KIND SEVEN → +10");
    }

    #[test]
    fn test_rules_are_additive_on_one_line() {
        let table = two_symbol_table(vec![vec![1, 1, 1]]).with_rule(Arc::new(AnyCount {
            id: "TWO_SEVENS".into(),
            symbol: "SEVEN".into(),
            min_count: 2,
            multiplier: 3,
        }));
        let grid = Grid::from_rows(&[
            &["BAR", "BAR", "BAR"],
            &["SEVEN", "SEVEN", "SEVEN"],
            &["BAR", "BAR", "BAR"],
        ]);

        let eval = table.evaluate(&grid, 2);
        assert_eq!(eval.total, 20 + 6);
        let ids: Vec<&str> = eval.wins.iter().map(|w| w.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["THREE_OF_A_KIND", "TWO_SEVENS"]);
    }

    #[test]
    fn test_mixed_set_rule() {
        let rule = MixedSet {
            id: "ANY_BAR_MIX".into(),
            symbols: ["BAR".to_string(), "SEVEN".to_string()].into_iter().collect(),
            multiplier: 2,
        };
        assert!(rule.matches(&["BAR", "SEVEN", "BAR"]));
        assert!(!rule.matches(&["BAR", "CHERRY", "BAR"]));
        assert!(!rule.matches(&[]));
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let table = Paytable::from_config(&GameConfig::classic());
        let grid = Grid::from_rows(&[
            &["BELL", "BELL", "LEMON"],
            &["STAR", "BELL", "STAR"],
            &["LEMON", "GRAPE", "BELL"],
        ]);
        assert_eq!(table.evaluate(&grid, 3), table.evaluate(&grid, 3));
        // diagonal down: BELL, BELL, BELL
        assert_eq!(table.evaluate(&grid, 3).total, 6);
    }

    #[test]
    fn test_rule_spec_validation() {
        let catalog = SymbolCatalog::classic();
        let spec = PayRuleSpec::AnyCount {
            id: "TWO_PLUMS".into(),
            symbol: "PLUM".into(),
            min_count: 2,
            multiplier: 1,
        };
        assert!(matches!(spec.validate(&catalog), Err(ConfigError::UnknownSymbol { .. })));

        let spec = PayRuleSpec::MixedSet {
            id: "EMPTY".into(),
            symbols: vec![],
            multiplier: 1,
        };
        assert!(matches!(spec.validate(&catalog), Err(ConfigError::InvalidRule { .. })));
        assert!(PayRuleSpec::three_of_a_kind().validate(&catalog).is_ok());
    }
}
