//! # rc-stage — ReelClaim Stage System
//!
//! Defines the stages the slot core reports to whatever renders it.
//! The core never touches a screen. It only emits STAGES.
//!
//! ## Philosophy
//!
//! Every turn passes through the same semantic phases:
//! - Spin starts → Reels stop → Wins evaluated → Claim opens → Claim submitted
//!
//! A presentation layer maps these to animation, message text and credit
//! display. Nothing in this crate knows about weights or paylines.

pub mod event;
pub mod stage;

pub use event::*;
pub use stage::*;
