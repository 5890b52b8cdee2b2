//! Stage — The core enum defining every phase of a turn
//!
//! A Stage is NOT an animation, NOT a DOM update.
//! A Stage is the SEMANTIC MEANING of a moment in the session flow.

use serde::{Deserialize, Serialize};

/// Canonical session stage
///
/// The slot core emits these on every gate transition. Renderers respond to
/// stages, never to raw engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Spin accepted, bet debited
    SpinStart {
        /// Bet taken for this spin
        bet: u64,
    },

    /// Reel has stopped, showing final symbols
    ReelStop {
        /// Which reel stopped (0-indexed)
        reel_index: u8,
        /// Symbols on this reel (top to bottom)
        #[serde(default)]
        symbols: Vec<String>,
    },

    /// All reels stopped, wins being evaluated
    EvaluateWins,

    /// Spin complete
    SpinEnd,

    /// Spin request rejected by the session gate
    SpinDenied {
        /// Human readable reason
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // WIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Individual win line being highlighted
    WinLineShow {
        /// Row index per reel
        line: Vec<u8>,
        /// Rule that matched
        rule_id: String,
        /// Symbol the rule paid on
        symbol: String,
        /// Amount paid by this match
        amount: u64,
    },

    /// Win celebration starting
    WinPresent {
        /// Total win amount
        win_amount: u64,
        /// Number of win records
        #[serde(default)]
        line_count: u8,
    },

    /// Spin resolved without a win
    NoWin,

    /// Credit display must be refreshed
    CreditsChanged {
        /// Balance after the change
        credits: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // CLAIM LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Contact form should be shown
    ClaimOpen,

    /// Contact details accepted, reward claimed
    ClaimSubmitted,

    /// Contact details could not be delivered, retry allowed
    ClaimFailed,

    /// Session is locked by an earlier claim
    SessionLocked,

    /// Session cleared by the player
    SessionReset,
}

impl Stage {
    /// Get stage type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Stage::SpinStart { .. } => "spin_start",
            Stage::ReelStop { .. } => "reel_stop",
            Stage::EvaluateWins => "evaluate_wins",
            Stage::SpinEnd => "spin_end",
            Stage::SpinDenied { .. } => "spin_denied",
            Stage::WinLineShow { .. } => "win_line_show",
            Stage::WinPresent { .. } => "win_present",
            Stage::NoWin => "no_win",
            Stage::CreditsChanged { .. } => "credits_changed",
            Stage::ClaimOpen => "claim_open",
            Stage::ClaimSubmitted => "claim_submitted",
            Stage::ClaimFailed => "claim_failed",
            Stage::SessionLocked => "session_locked",
            Stage::SessionReset => "session_reset",
        }
    }

    /// Check if this stage closes a spin
    pub fn is_spin_terminal(&self) -> bool {
        matches!(self, Stage::SpinEnd | Stage::SpinDenied { .. })
    }

    /// Check if this stage belongs to the claim flow
    pub fn is_claim_stage(&self) -> bool {
        matches!(
            self,
            Stage::ClaimOpen | Stage::ClaimSubmitted | Stage::ClaimFailed | Stage::SessionLocked
        )
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}
