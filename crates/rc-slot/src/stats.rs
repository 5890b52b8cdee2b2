//! Session statistics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::paytable::Evaluation;

/// Running totals over resolved spins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_bet: u64,
    pub total_win: u64,
    pub wins: u64,
    pub losses: u64,
    pub max_win_ratio: f64,
    /// Matches per rule id
    pub rule_hits: BTreeMap<String, u64>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one evaluated spin into the totals
    pub fn record(&mut self, bet: u64, evaluation: &Evaluation) {
        self.total_spins += 1;
        self.total_bet = self.total_bet.saturating_add(bet);
        self.total_win = self.total_win.saturating_add(evaluation.total);

        if evaluation.is_win() {
            self.wins += 1;
            if bet > 0 {
                let ratio = evaluation.total as f64 / bet as f64;
                if ratio > self.max_win_ratio {
                    self.max_win_ratio = ratio;
                }
            }
        } else {
            self.losses += 1;
        }

        for win in &evaluation.wins {
            *self.rule_hits.entry(win.rule_id.clone()).or_default() += 1;
        }
    }

    /// Calculate RTP
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0 {
            (self.total_win as f64 / self.total_bet as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Combine totals from another run
    pub fn merge(&mut self, other: &SessionStats) {
        self.total_spins += other.total_spins;
        self.total_bet = self.total_bet.saturating_add(other.total_bet);
        self.total_win = self.total_win.saturating_add(other.total_win);
        self.wins += other.wins;
        self.losses += other.losses;
        self.max_win_ratio = self.max_win_ratio.max(other.max_win_ratio);
        for (rule, hits) in &other.rule_hits {
            *self.rule_hits.entry(rule.clone()).or_default() += hits;
        }
    }
}
