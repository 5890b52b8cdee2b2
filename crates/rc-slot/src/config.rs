//! Slot configuration
//!
//! One immutable [`GameConfig`] is built at startup (defaults, JSON or YAML)
//! and validated before anything samples from it. Components receive it by
//! reference; nothing reads configuration from globals.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::paytable::{PayRuleSpec, classic_paylines};
use crate::reels::MAX_REEL_WEIGHT;
use crate::session::BetLimits;
use crate::symbols::{Symbol, SymbolCatalog};

/// Visible rows per reel: above, center, below
pub const WINDOW_ROWS: u8 = 3;

/// Session limits and gating switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRules {
    /// Only one spin until the claim is submitted (or the session reset)
    pub one_spin_per_turn: bool,
    /// A submitted claim locks spinning and is persisted across restarts
    pub persist_after_claim: bool,
    /// Credit balance at startup
    pub starting_credits: u64,
    /// Smallest accepted bet
    pub min_bet: u64,
    /// Largest accepted bet
    pub max_bet: u64,
}

impl SessionRules {
    /// Bet clamp derived from these rules
    pub fn bet_limits(&self) -> BetLimits {
        BetLimits::new(self.min_bet, self.max_bet)
    }
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            one_spin_per_turn: true,
            persist_after_claim: true,
            starting_credits: 10,
            min_bet: 1,
            max_bet: 10,
        }
    }
}

/// Claim/audit endpoint targets handed to collaborators
///
/// The core never dials these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    pub submit_claim: String,
    pub audit_spin: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            submit_claim: "/api/claim".into(),
            audit_spin: "/api/audit".into(),
        }
    }
}

fn default_reels() -> u8 {
    3
}

fn default_rows() -> u8 {
    WINDOW_ROWS
}

fn default_pay_rules() -> Vec<PayRuleSpec> {
    vec![PayRuleSpec::three_of_a_kind()]
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Session limits (flattened: `oneSpinPerTurn`, `minBet`, ...)
    #[serde(flatten)]
    pub session: SessionRules,

    /// Symbol catalog
    pub symbols: SymbolCatalog,

    /// Optional per-reel weight overrides, indexed by reel
    #[serde(default)]
    pub reel_weights: Vec<HashMap<String, u32>>,

    /// Number of reels (columns)
    #[serde(default = "default_reels")]
    pub reels_count: u8,

    /// Visible rows per reel
    #[serde(default = "default_rows")]
    pub rows_visible: u8,

    /// Row index per reel for every payline
    pub paylines: Vec<Vec<u8>>,

    /// Pay rules, all evaluated on every line
    #[serde(default = "default_pay_rules")]
    pub pay_rules: Vec<PayRuleSpec>,

    /// Collaborator endpoints
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl GameConfig {
    /// The shipped 3×3 machine with five lines
    pub fn classic() -> Self {
        let overrides: [&[(&str, u32)]; 3] = [
            &[("SEVEN", 1), ("BAR", 2), ("BELL", 3), ("CHERRY", 6), ("LEMON", 7), ("GRAPE", 7), ("STAR", 5)],
            &[("SEVEN", 1), ("BAR", 3), ("BELL", 3), ("CHERRY", 5), ("LEMON", 6), ("GRAPE", 6), ("STAR", 5)],
            &[("SEVEN", 1), ("BAR", 2), ("BELL", 4), ("CHERRY", 5), ("LEMON", 6), ("GRAPE", 6), ("STAR", 5)],
        ];

        Self {
            session: SessionRules::default(),
            symbols: SymbolCatalog::classic(),
            reel_weights: overrides
                .iter()
                .map(|table| table.iter().map(|&(n, w)| (n.to_string(), w)).collect())
                .collect(),
            reels_count: 3,
            rows_visible: WINDOW_ROWS,
            paylines: classic_paylines(),
            pay_rules: default_pay_rules(),
            endpoints: EndpointConfig::default(),
        }
    }

    /// Minimal config for a custom symbol set: middle line, three-of-a-kind
    pub fn with_symbols(symbols: Vec<Symbol>) -> ConfigResult<Self> {
        let config = Self {
            session: SessionRules::default(),
            symbols: SymbolCatalog::new(symbols)?,
            reel_weights: Vec::new(),
            reels_count: 3,
            rows_visible: WINDOW_ROWS,
            paylines: vec![vec![1, 1, 1]],
            pay_rules: default_pay_rules(),
            endpoints: EndpointConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LOADING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, choosing the parser by extension
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let config = match ext.as_str() {
            "json" => Self::from_json(&text)?,
            "yaml" | "yml" => Self::from_yaml(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        log::info!(
            "Loaded slot config {:?}: {} symbols, {} reels, {} paylines, {} rules",
            path,
            config.symbols.len(),
            config.reels_count,
            config.paylines.len(),
            config.pay_rules.len()
        );
        Ok(config)
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RESOLUTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Effective weight of a symbol on a reel: override, else base weight
    pub fn resolved_weight(&self, reel: usize, symbol: &Symbol) -> u32 {
        self.reel_weights
            .get(reel)
            .and_then(|table| table.get(&symbol.name))
            .copied()
            .unwrap_or(symbol.weight)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Run every construction-time check
    pub fn validate(&self) -> ConfigResult<()> {
        self.symbols.validate()?;

        if self.reels_count == 0 {
            return Err(ConfigError::NoReels);
        }
        if self.rows_visible != WINDOW_ROWS {
            return Err(ConfigError::UnsupportedRows(self.rows_visible));
        }

        let reels = self.reels_count as usize;
        if self.reel_weights.len() > reels {
            return Err(ConfigError::TooManyReelWeights {
                count: self.reel_weights.len(),
                reels,
            });
        }

        for (reel, table) in self.reel_weights.iter().enumerate() {
            for name in table.keys() {
                if !self.symbols.contains(name) {
                    return Err(ConfigError::UnknownSymbol {
                        name: name.clone(),
                        context: format!("reel {} weights", reel),
                    });
                }
            }
        }

        for reel in 0..reels {
            let total: u64 = self
                .symbols
                .iter()
                .map(|s| self.resolved_weight(reel, s) as u64)
                .sum();
            if total == 0 {
                return Err(ConfigError::ZeroWeightReel { reel });
            }
            if total > MAX_REEL_WEIGHT {
                return Err(ConfigError::ReelWeightTooLarge {
                    reel,
                    total,
                    max: MAX_REEL_WEIGHT,
                });
            }
        }

        // Win records carry the line index as u8
        if self.paylines.len() > u8::MAX as usize + 1 {
            return Err(ConfigError::TooManyPaylines {
                count: self.paylines.len(),
                max: u8::MAX as usize + 1,
            });
        }

        for (index, line) in self.paylines.iter().enumerate() {
            if line.len() != reels {
                return Err(ConfigError::PaylineLength {
                    index,
                    len: line.len(),
                    reels,
                });
            }
            if let Some(&row) = line.iter().find(|&&row| row >= self.rows_visible) {
                return Err(ConfigError::PaylineRow {
                    index,
                    row,
                    rows: self.rows_visible,
                });
            }
        }

        if self.session.min_bet > self.session.max_bet {
            return Err(ConfigError::BetRange {
                min: self.session.min_bet,
                max: self.session.max_bet,
            });
        }

        let mut ids = HashSet::with_capacity(self.pay_rules.len());
        for rule in &self.pay_rules {
            if !ids.insert(rule.id()) {
                return Err(ConfigError::DuplicateRule(rule.id().to_string()));
            }
            rule.validate(&self.symbols)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_is_valid() {
        let config = GameConfig::classic();
        assert!(config.validate().is_ok());
        assert_eq!(config.paylines.len(), 5);
        assert_eq!(config.session.bet_limits(), BetLimits::new(1, 10));
    }

    #[test]
    fn test_resolved_weight_prefers_override() {
        let config = GameConfig::classic();
        let cherry = config.symbols.get("CHERRY").unwrap().clone();
        assert_eq!(config.resolved_weight(0, &cherry), 6);
        assert_eq!(config.resolved_weight(1, &cherry), 5);

        // No table for reel 3 (out of range) falls back to base weight
        assert_eq!(config.resolved_weight(3, &cherry), 5);
    }

    #[test]
    fn test_zero_weight_reel_rejected() {
        let mut config = GameConfig::with_symbols(vec![
            Symbol::new("SEVEN", "7", 1, 10),
            Symbol::new("BAR", "BAR", 1, 4),
        ])
        .unwrap();
        config.reel_weights = vec![
            HashMap::new(),
            [("SEVEN".to_string(), 0), ("BAR".to_string(), 0)].into_iter().collect(),
        ];

        assert!(matches!(config.validate(), Err(ConfigError::ZeroWeightReel { reel: 1 })));
    }

    #[test]
    fn test_huge_reel_weights_rejected() {
        let result = GameConfig::with_symbols(vec![
            Symbol::new("SEVEN", "7", 3_000_000_000, 10),
            Symbol::new("BAR", "BAR", 3_000_000_000, 4),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::ReelWeightTooLarge {
                reel: 0,
                total: 6_000_000_000,
                max: MAX_REEL_WEIGHT,
            })
        ));

        let mut config = GameConfig::classic();
        config.reel_weights[2].insert("SEVEN".to_string(), MAX_REEL_WEIGHT as u32);
        assert!(matches!(config.validate(), Err(ConfigError::ReelWeightTooLarge { reel: 2, .. })));
    }

    #[test]
    fn test_payline_count_capped() {
        let mut config = GameConfig::classic();
        config.paylines = vec![vec![1, 1, 1]; 256];
        assert!(config.validate().is_ok());

        config.paylines.push(vec![0, 0, 0]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyPaylines { count: 257, max: 256 })
        ));
    }

    #[test]
    fn test_payline_checks() {
        let mut config = GameConfig::classic();
        config.paylines.push(vec![0, 3, 0]);
        assert!(matches!(config.validate(), Err(ConfigError::PaylineRow { index: 5, row: 3, .. })));

        let mut config = GameConfig::classic();
        config.paylines.push(vec![0, 1]);
        assert!(matches!(config.validate(), Err(ConfigError::PaylineLength { index: 5, len: 2, .. })));
    }

    #[test]
    fn test_unknown_override_rejected() {
        let mut config = GameConfig::classic();
        config.reel_weights[2].insert("PLUM".into(), 3);
        assert!(matches!(config.validate(), Err(ConfigError::UnknownSymbol { .. })));
    }

    #[test]
    fn test_fixed_window() {
        let mut config = GameConfig::classic();
        config.rows_visible = 4;
        assert!(matches!(config.validate(), Err(ConfigError::UnsupportedRows(4))));
    }

    #[test]
    fn test_bet_range() {
        let mut config = GameConfig::classic();
        config.session.min_bet = 5;
        config.session.max_bet = 2;
        assert!(matches!(config.validate(), Err(ConfigError::BetRange { min: 5, max: 2 })));
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "oneSpinPerTurn": false,
            "persistAfterClaim": false,
            "startingCredits": 50,
            "minBet": 1,
            "maxBet": 5,
            "symbols": [
                { "name": "SEVEN", "display": "7", "weight": 1, "payout": 10 },
                { "name": "BAR", "display": "BAR", "payout": 4 }
            ],
            "reelWeights": [ { "SEVEN": 2 } ],
            "paylines": [[1, 1, 1]]
        }"#;

        let config = GameConfig::from_json(json).unwrap();
        assert!(!config.session.one_spin_per_turn);
        assert_eq!(config.session.starting_credits, 50);
        assert_eq!(config.reels_count, 3);
        assert_eq!(config.pay_rules.len(), 1);
        assert_eq!(config.pay_rules[0].id(), "THREE_OF_A_KIND");
        assert_eq!(config.symbols.get("BAR").unwrap().weight, 1);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
oneSpinPerTurn: true
persistAfterClaim: true
startingCredits: 10
minBet: 1
maxBet: 10
symbols:
  - { name: SEVEN, display: "7", weight: 1, payout: 10 }
  - { name: CHERRY, display: "C", weight: 5, payout: 1 }
paylines:
  - [0, 0, 0]
  - [1, 1, 1]
payRules:
  - kind: three_of_a_kind
  - kind: any_count
    id: TWO_CHERRIES
    symbol: CHERRY
    minCount: 2
    multiplier: 1
"#;

        let config = GameConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.paylines.len(), 2);
        assert_eq!(config.pay_rules.len(), 2);
        assert_eq!(config.pay_rules[1].id(), "TWO_CHERRIES");
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("machine.toml");
        std::fs::write(&path, "x = 1").unwrap();
        assert!(matches!(GameConfig::load(&path), Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_json_export_reloads() {
        let config = GameConfig::classic();
        let json = config.to_json().unwrap();
        assert_eq!(GameConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_shipped_yaml_matches_classic() {
        let shipped = GameConfig::from_yaml(include_str!("../../../configs/classic.yaml")).unwrap();
        assert_eq!(shipped, GameConfig::classic());
    }
}
