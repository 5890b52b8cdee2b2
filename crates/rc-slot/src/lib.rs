//! # rc-slot — Slot core for ReelClaim
//!
//! A small 3×3 slot machine whose single spin unlocks a reward claim.
//! The core owns every decision: which symbols land, what they pay, and
//! whether the player may spin or claim. Rendering, transport and form
//! validation belong to collaborators.
//!
//! ## Features
//!
//! - **Weighted reels**: per-reel weight overrides, strip resample + uniform stop
//! - **Paytable**: pluggable pay rules evaluated additively on every payline
//! - **Session gate**: one spin per turn, claim lock persisted across restarts
//! - **Stage generation**: presentation events for every transition
//!
//! ## Architecture
//!
//! ```text
//! SlotMachine
//!     │
//!     ├── GameConfig (symbols, reel weights, paylines, rules, session rules)
//!     ├── ReelModel  (WeightedIndex per reel → Grid)
//!     ├── Paytable   (paylines × PayRule → Evaluation)
//!     ├── SessionState (Idle → Spinning → AwaitingClaim → Claimed)
//!     └── ClaimStore / ClaimSubmitter / AuditSink
//!           │
//!           v
//!     SpinTicket / SpinReport → Vec<StageEvent>
//! ```

pub mod audit;
pub mod claim;
pub mod config;
pub mod error;
pub mod machine;
pub mod paytable;
pub mod reels;
pub mod session;
pub mod spin;
pub mod stats;
pub mod store;
pub mod symbols;

pub use audit::*;
pub use claim::*;
pub use config::*;
pub use error::*;
pub use machine::*;
pub use paytable::*;
pub use reels::*;
pub use session::*;
pub use spin::*;
pub use stats::*;
pub use store::*;
pub use symbols::*;
