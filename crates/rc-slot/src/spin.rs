//! Spin results and stage event generation

use serde::{Deserialize, Serialize};

use rc_stage::{Stage, StageEvent, Tone};

use crate::paytable::{Evaluation, Payline};
use crate::symbols::SymbolCatalog;

/// Visible symbols of one spin, `rows × reels`
///
/// Produced fresh by every spin and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// Create from row-major names
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Create from string slices (tests, fixtures)
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    /// Build from per-reel columns (top to bottom)
    pub fn from_columns(columns: Vec<[String; 3]>) -> Self {
        let mut rows = vec![Vec::with_capacity(columns.len()); 3];
        for column in columns {
            for (row, name) in column.into_iter().enumerate() {
                rows[row].push(name);
            }
        }
        Self { rows }
    }

    /// Symbol at (row, reel)
    pub fn get(&self, row: usize, reel: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(reel)).map(String::as_str)
    }

    /// Symbols along a payline, `None` if the line leaves the grid
    pub fn line_symbols(&self, payline: &Payline) -> Option<Vec<&str>> {
        payline
            .rows
            .iter()
            .enumerate()
            .map(|(reel, &row)| self.get(row as usize, reel))
            .collect()
    }

    /// One reel, top to bottom
    pub fn reel(&self, reel: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.get(reel).map(String::as_str))
            .collect()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn reel_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Render with display glyphs, one row per line
    pub fn render(&self, symbols: &SymbolCatalog) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|name| format!("{:^5}", symbols.display(name)))
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A spin in flight: the outcome is already fixed, only its presentation waits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinTicket {
    /// Spin ID
    pub spin_id: String,
    /// Final grid
    pub grid: Grid,
    /// Bet debited at spin start
    pub bet: u64,
    /// Balance right after the debit
    pub credits_after_debit: u64,
}

impl SpinTicket {
    /// Stages for the start of the spin: SPIN_START then one REEL_STOP per reel
    pub fn generate_stages(&self) -> Vec<StageEvent> {
        let mut events = Vec::with_capacity(self.grid.reel_count() + 2);

        events.push(
            StageEvent::new(Stage::SpinStart { bet: self.bet })
                .with_message("Spinning...", Tone::Muted)
                .with_payout_text(""),
        );
        events.push(StageEvent::new(Stage::CreditsChanged {
            credits: self.credits_after_debit,
        }));

        for reel in 0..self.grid.reel_count() {
            events.push(StageEvent::new(Stage::ReelStop {
                reel_index: reel as u8,
                symbols: self.grid.reel(reel).into_iter().map(str::to_string).collect(),
            }));
        }

        events
    }
}

/// Completed spin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinReport {
    /// Spin ID
    pub spin_id: String,
    /// Final grid
    pub grid: Grid,
    /// Bet amount
    pub bet: u64,
    /// Evaluation of the grid
    pub evaluation: Evaluation,
    /// Balance after the payout
    pub credits: u64,
    /// Claim form should open
    pub claim_open: bool,
}

impl SpinReport {
    /// Total win
    pub fn total_win(&self) -> u64 {
        self.evaluation.total
    }

    /// Check if this is a win
    pub fn is_win(&self) -> bool {
        self.evaluation.is_win()
    }

    /// Win-to-bet ratio
    pub fn win_ratio(&self) -> f64 {
        if self.bet > 0 {
            self.evaluation.total as f64 / self.bet as f64
        } else {
            0.0
        }
    }

    /// Stages for the end of the spin
    pub fn generate_stages(&self) -> Vec<StageEvent> {
        let mut events = Vec::new();

        // 1. Evaluate Wins
        events.push(StageEvent::new(Stage::EvaluateWins));

        // 2. Win lines + presentation
        if self.is_win() {
            for win in &self.evaluation.wins {
                events.push(StageEvent::new(Stage::WinLineShow {
                    line: win.line.clone(),
                    rule_id: win.rule_id.clone(),
                    symbol: win.symbol.clone(),
                    amount: win.amount,
                }));
            }
            events.push(
                StageEvent::new(Stage::WinPresent {
                    win_amount: self.evaluation.total,
                    line_count: self.evaluation.wins.len().min(u8::MAX as usize) as u8,
                })
                .with_message(format!("You win {}!", self.evaluation.total), Tone::Win)
                .with_payout_text(self.evaluation.summary()),
            );
            events.push(StageEvent::new(Stage::CreditsChanged {
                credits: self.credits,
            }));
        } else {
            events.push(
                StageEvent::new(Stage::NoWin)
                    .with_message("No win. Better luck next time!", Tone::Lose)
                    .with_payout_text(""),
            );
        }

        // 3. Claim
        if self.claim_open {
            events.push(StageEvent::new(Stage::ClaimOpen));
        }

        // 4. Spin End
        events.push(StageEvent::new(Stage::SpinEnd));

        events
    }
}
