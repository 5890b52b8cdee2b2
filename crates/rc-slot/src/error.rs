//! Error types for the slot core

use thiserror::Error;

/// Configuration rejected at construction time
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Symbol catalog is empty")]
    NoSymbols,

    #[error("Duplicate symbol name: {0}")]
    DuplicateSymbol(String),

    #[error("Symbol {name} has a zero payout multiplier")]
    ZeroPayout { name: String },

    #[error("Unknown symbol {name} referenced by {context}")]
    UnknownSymbol { name: String, context: String },

    #[error("Reel {reel} has zero total weight")]
    ZeroWeightReel { reel: usize },

    #[error("Reel {reel} total weight {total} exceeds {max}")]
    ReelWeightTooLarge { reel: usize, total: u64, max: u64 },

    #[error("{count} paylines configured, at most {max} supported")]
    TooManyPaylines { count: usize, max: usize },

    #[error("Reel count must be at least 1")]
    NoReels,

    #[error("{count} reel weight tables supplied for {reels} reels")]
    TooManyReelWeights { count: usize, reels: usize },

    #[error("Unsupported visible row count {0} (window is fixed at 3)")]
    UnsupportedRows(u8),

    #[error("Payline {index} has {len} entries, expected {reels}")]
    PaylineLength { index: usize, len: usize, reels: usize },

    #[error("Payline {index} references row {row} outside 0..{rows}")]
    PaylineRow { index: usize, row: u8, rows: u8 },

    #[error("Invalid bet range: min {min} > max {max}")]
    BetRange { min: u64, max: u64 },

    #[error("Duplicate pay rule id: {0}")]
    DuplicateRule(String),

    #[error("Pay rule {id} is invalid: {reason}")]
    InvalidRule { id: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Spin request rejected by the session gate
///
/// Never fatal: the presentation shows [`SpinDenied::message`] and the
/// session is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpinDenied {
    #[error("a spin is already in progress")]
    InProgress,

    #[error("reward already claimed")]
    Claimed,

    #[error("already spun this turn")]
    AlreadySpun,

    #[error("insufficient credits: {credits} < bet {bet}")]
    InsufficientCredits { credits: u64, bet: u64 },
}

impl SpinDenied {
    /// User-facing message for the rejection
    pub fn message(&self) -> &'static str {
        match self {
            SpinDenied::Claimed => "Already claimed. Spins disabled.",
            _ => "Not allowed to spin now.",
        }
    }
}

/// Illegal transition request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("no spin in flight")]
    NoSpinInFlight,

    #[error("a spin is still in flight")]
    SpinInFlight,

    #[error("no completed spin awaiting a claim")]
    NotAwaitingClaim,

    #[error("reward already claimed")]
    AlreadyClaimed,
}

/// Claimed-flag persistence failure
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Claim submission failure
#[derive(Error, Debug)]
pub enum ClaimError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Could not persist claim: {0}")]
    Store(#[from] StoreError),
}

impl ClaimError {
    /// User-facing message for the failure
    pub fn message(&self) -> &'static str {
        match self {
            ClaimError::Gate(_) => "Nothing to claim.",
            _ => "Submission failed. Try again.",
        }
    }
}

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
