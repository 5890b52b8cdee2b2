//! Session gate
//!
//! Tracks spin/claim/credit state and decides whether a spin is permitted.
//! Phases are derived from the spin flags and the claim on the current turn:
//!
//! ```text
//!            spin request              spin completes           claim ok
//!   Idle ───────────────▶ Spinning ───────────────▶ AwaitingClaim ────────▶ Claimed
//!    ▲                                                    │                    │
//!    └────────────────────────── reset ◀──────────────────┴────────────────────┘
//! ```
//!
//! Everything here is pure state manipulation; persistence and rendering are
//! handled by [`crate::machine::SlotMachine`].

use serde::{Deserialize, Serialize};

use crate::config::SessionRules;
use crate::error::{GateError, SpinDenied};
use crate::spin::Grid;

/// Inclusive bet range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetLimits {
    pub min: u64,
    pub max: u64,
}

impl BetLimits {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Clamp a numeric bet into `[min, max]`
    pub fn clamp(&self, value: i64) -> u64 {
        if value <= self.min as i64 {
            self.min
        } else {
            (value as u64).min(self.max)
        }
    }

    /// Validate raw bet input
    ///
    /// Reads an integer prefix (leading whitespace, optional sign, digits) and
    /// clamps it; input without leading digits becomes `min`.
    pub fn validate(&self, raw: &str) -> u64 {
        match parse_int_prefix(raw) {
            Some(value) => self.clamp(value),
            None => self.min,
        }
    }
}

/// `parseInt`-style integer prefix
fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    // Too many digits: saturate, the clamp takes over
    let magnitude = rest[..digits_end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Clamp raw bet input to the session's bet range
pub fn validate_bet(raw: &str, rules: &SessionRules) -> u64 {
    rules.bet_limits().validate(raw)
}

/// Derived gate phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatePhase {
    /// No spin yet this turn
    Idle,
    /// A spin is in flight
    Spinning,
    /// Spin complete, claim not yet submitted
    AwaitingClaim,
    /// Current result claimed; left by reset, or by a new spin when the
    /// rules still allow one
    Claimed,
}

/// Mutable session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub spinning: bool,
    pub has_spun: bool,
    /// A claim was accepted; locks the session when claims persist
    pub claimed: bool,
    /// The current result has been claimed; cleared by reset and by a new spin
    #[serde(default)]
    pub turn_claimed: bool,
    pub credits: u64,
    pub last_win: u64,
    pub last_grid: Option<Grid>,
}

impl SessionState {
    /// Fresh state with the starting credits
    pub fn new(rules: &SessionRules) -> Self {
        Self {
            spinning: false,
            has_spun: false,
            claimed: false,
            turn_claimed: false,
            credits: rules.starting_credits,
            last_win: 0,
            last_grid: None,
        }
    }

    /// Restore a persisted claim at startup
    ///
    /// A restored claim also counts as having spun.
    pub fn restore_claimed(&mut self) {
        self.claimed = true;
        self.turn_claimed = true;
        self.has_spun = true;
    }

    /// Current phase
    pub fn phase(&self) -> GatePhase {
        if self.spinning {
            GatePhase::Spinning
        } else if !self.has_spun {
            GatePhase::Idle
        } else if self.turn_claimed {
            GatePhase::Claimed
        } else {
            GatePhase::AwaitingClaim
        }
    }

    /// Guard for a spin request
    pub fn check_spin(&self, rules: &SessionRules, bet: u64) -> Result<(), SpinDenied> {
        if self.spinning {
            return Err(SpinDenied::InProgress);
        }
        if rules.persist_after_claim && self.claimed {
            return Err(SpinDenied::Claimed);
        }
        if rules.one_spin_per_turn && self.has_spun {
            return Err(SpinDenied::AlreadySpun);
        }
        if self.credits < bet {
            return Err(SpinDenied::InsufficientCredits {
                credits: self.credits,
                bet,
            });
        }
        Ok(())
    }

    /// Boolean form of [`check_spin`](Self::check_spin)
    pub fn can_spin(&self, rules: &SessionRules, bet: u64) -> bool {
        self.check_spin(rules, bet).is_ok()
    }

    /// Idle → Spinning: debit the bet and record the grid
    pub fn begin_spin(&mut self, rules: &SessionRules, bet: u64, grid: Grid) -> Result<(), SpinDenied> {
        self.check_spin(rules, bet)?;

        self.credits = self.credits.saturating_sub(bet);
        self.spinning = true;
        self.has_spun = true;
        self.turn_claimed = false;
        self.last_win = 0;
        self.last_grid = Some(grid);
        Ok(())
    }

    /// Spinning → AwaitingClaim: credit the payout
    pub fn finish_spin(&mut self, payout: u64) -> Result<(), GateError> {
        if !self.spinning {
            return Err(GateError::NoSpinInFlight);
        }

        self.credits = self.credits.saturating_add(payout);
        self.last_win = payout;
        self.spinning = false;
        Ok(())
    }

    /// AwaitingClaim → Claimed
    ///
    /// Applying an already applied claim changes nothing.
    pub fn apply_claim(&mut self) -> Result<(), GateError> {
        match self.phase() {
            GatePhase::AwaitingClaim | GatePhase::Claimed => {
                self.claimed = true;
                self.turn_claimed = true;
                Ok(())
            }
            GatePhase::Spinning => Err(GateError::SpinInFlight),
            GatePhase::Idle => Err(GateError::NotAwaitingClaim),
        }
    }

    /// Back to Idle
    ///
    /// Credits are kept as they are. The claim is only cleared when claims
    /// persist, matching the rule that locks the session.
    pub fn reset(&mut self, rules: &SessionRules) -> Result<(), GateError> {
        if self.spinning {
            return Err(GateError::SpinInFlight);
        }

        self.last_grid = None;
        self.last_win = 0;
        self.has_spun = false;
        self.turn_claimed = false;
        if rules.persist_after_claim {
            self.claimed = false;
        }
        Ok(())
    }
}
