//! Slot machine facade
//!
//! Wires the reel model, paytable and session gate together with the
//! collaborators (claimed-flag store, audit sink) and turns every transition
//! into stage events for the presentation layer.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rc_stage::{Stage, StageEvent, Tone};

use crate::audit::{AuditSink, SpinAudit};
use crate::claim::{ClaimPayload, ClaimSubmitter, ContactDetails};
use crate::config::GameConfig;
use crate::error::{ClaimError, ConfigResult, GateError, SpinDenied};
use crate::paytable::{Evaluation, Paytable};
use crate::reels::ReelModel;
use crate::session::{GatePhase, SessionState};
use crate::spin::{Grid, SpinReport, SpinTicket};
use crate::stats::SessionStats;
use crate::store::ClaimStore;

/// Outcome fixed at spin time, revealed by `finish_spin`
#[derive(Debug, Clone)]
struct PendingSpin {
    spin_id: String,
    grid: Grid,
    bet: u64,
    evaluation: Evaluation,
}

/// One player's slot session
pub struct SlotMachine<R: Rng = StdRng> {
    config: Arc<GameConfig>,
    reel_model: ReelModel,
    paytable: Paytable,
    state: SessionState,
    rng: R,
    store: Box<dyn ClaimStore>,
    audit: Option<Box<dyn AuditSink>>,
    stats: SessionStats,
    spin_count: u64,
    pending: Option<PendingSpin>,
}

impl SlotMachine<StdRng> {
    /// Machine with an OS-seeded RNG
    pub fn new(config: impl Into<Arc<GameConfig>>, store: impl ClaimStore + 'static) -> ConfigResult<Self> {
        Self::with_rng(config, store, StdRng::from_os_rng())
    }

    /// Machine with a fixed seed (tests, replays)
    pub fn seeded(
        config: impl Into<Arc<GameConfig>>,
        store: impl ClaimStore + 'static,
        seed: u64,
    ) -> ConfigResult<Self> {
        Self::with_rng(config, store, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SlotMachine<R> {
    /// Validate the config, build the model and restore the claimed flag
    pub fn with_rng(
        config: impl Into<Arc<GameConfig>>,
        store: impl ClaimStore + 'static,
        rng: R,
    ) -> ConfigResult<Self> {
        let config = config.into();
        config.validate()?;

        let reel_model = ReelModel::new(&config)?;
        let paytable = Paytable::from_config(&config);
        let mut state = SessionState::new(&config.session);

        if config.session.persist_after_claim {
            match store.is_claimed() {
                Ok(true) => {
                    log::info!("Restored claimed flag, session locked");
                    state.restore_claimed();
                }
                Ok(false) => {}
                Err(e) => log::warn!("Could not read claimed flag, assuming unclaimed: {}", e),
            }
        }

        Ok(Self {
            config,
            reel_model,
            paytable,
            state,
            rng,
            store: Box::new(store),
            audit: None,
            stats: SessionStats::new(),
            spin_count: 0,
            pending: None,
        })
    }

    /// Attach an audit sink
    pub fn with_audit(mut self, sink: impl AuditSink + 'static) -> Self {
        self.audit = Some(Box::new(sink));
        self
    }

    /// Events to show before the first interaction
    pub fn startup_events(&self) -> Vec<StageEvent> {
        if self.is_locked() {
            vec![StageEvent::new(Stage::SessionLocked).with_message("Reward already claimed.", Tone::Win)]
        } else {
            vec![StageEvent::new(Stage::CreditsChanged {
                credits: self.state.credits,
            })]
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // GATE QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Clamp raw bet input to the configured range
    pub fn validate_bet(&self, raw: &str) -> u64 {
        self.config.session.bet_limits().validate(raw)
    }

    pub fn can_spin(&self, bet: u64) -> bool {
        self.state.can_spin(&self.config.session, bet)
    }

    pub fn phase(&self) -> GatePhase {
        self.state.phase()
    }

    /// A persisted claim blocks spinning until reset
    pub fn is_locked(&self) -> bool {
        self.config.session.persist_after_claim && self.state.claimed
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN
    // ═══════════════════════════════════════════════════════════════════════════

    /// Idle → Spinning
    ///
    /// The outcome is generated and evaluated here; the ticket only carries
    /// what the presentation needs to animate towards it.
    pub fn spin(&mut self, raw_bet: &str) -> Result<SpinTicket, SpinDenied> {
        let rules = self.config.session;
        let bet = self.validate_bet(raw_bet);

        if let Err(denied) = self.state.check_spin(&rules, bet) {
            log::info!("Spin denied (bet {}): {}", bet, denied);
            return Err(denied);
        }

        let grid = self.reel_model.generate(&mut self.rng);
        let evaluation = self.paytable.evaluate(&grid, bet);
        self.state.begin_spin(&rules, bet, grid.clone())?;

        self.spin_count += 1;
        let spin_id = format!("spin-{:06}", self.spin_count);
        log::debug!("{} bet {} grid {:?} pays {}", spin_id, bet, grid.rows(), evaluation.total);

        self.pending = Some(PendingSpin {
            spin_id: spin_id.clone(),
            grid: grid.clone(),
            bet,
            evaluation,
        });

        Ok(SpinTicket {
            spin_id,
            grid,
            bet,
            credits_after_debit: self.state.credits,
        })
    }

    /// Spinning → AwaitingClaim: credit the payout and report the spin
    pub fn finish_spin(&mut self) -> Result<SpinReport, GateError> {
        let pending = self.pending.take().ok_or(GateError::NoSpinInFlight)?;

        if let Err(e) = self.state.finish_spin(pending.evaluation.total) {
            self.pending = Some(pending);
            return Err(e);
        }

        self.stats.record(pending.bet, &pending.evaluation);
        self.send_audit(&pending);

        log::info!(
            "{} finished: win {} credits {}",
            pending.spin_id,
            pending.evaluation.total,
            self.state.credits
        );

        Ok(SpinReport {
            spin_id: pending.spin_id,
            grid: pending.grid,
            bet: pending.bet,
            evaluation: pending.evaluation,
            credits: self.state.credits,
            claim_open: self.config.session.one_spin_per_turn,
        })
    }

    /// Spin and finish in one step
    pub fn play(&mut self, raw_bet: &str) -> Result<SpinReport, SpinDenied> {
        self.spin(raw_bet)?;
        // A spin was just accepted, so one is in flight
        self.finish_spin().map_err(|_| SpinDenied::InProgress)
    }

    fn send_audit(&self, pending: &PendingSpin) {
        let Some(sink) = &self.audit else {
            return;
        };

        let audit = SpinAudit {
            spin_id: pending.spin_id.clone(),
            grid: pending.grid.clone(),
            bet: pending.bet,
            total: pending.evaluation.total,
            timestamp: chrono::Utc::now(),
        };
        if let Err(e) = sink.record(&audit) {
            log::warn!("Audit of {} failed: {}", pending.spin_id, e);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CLAIM
    // ═══════════════════════════════════════════════════════════════════════════

    /// Submit contact details for the current result
    ///
    /// On failure the session stays in `AwaitingClaim` so the player can retry.
    pub fn submit_claim(
        &mut self,
        details: &ContactDetails,
        submitter: &dyn ClaimSubmitter,
    ) -> Result<Vec<StageEvent>, ClaimError> {
        let persist = self.config.session.persist_after_claim;

        match self.state.phase() {
            GatePhase::AwaitingClaim => {}
            // Without persistence an earlier claim never locks
            GatePhase::Claimed if !persist => {}
            GatePhase::Claimed => return Err(GateError::AlreadyClaimed.into()),
            GatePhase::Spinning => return Err(GateError::SpinInFlight.into()),
            GatePhase::Idle => return Err(GateError::NotAwaitingClaim.into()),
        }

        let payload = ClaimPayload::new(
            details,
            self.state.last_grid.clone(),
            self.state.last_win,
            self.state.credits,
        );

        if let Err(e) = submitter.submit(&payload) {
            log::warn!("Claim submission failed: {}", e);
            return Err(e);
        }

        if persist {
            if let Err(e) = self.store.mark_claimed() {
                log::warn!("Could not persist claimed flag: {}", e);
                return Err(e.into());
            }
        }
        self.state.apply_claim()?;
        log::info!("Reward claimed (win {})", self.state.last_win);

        let mut events =
            vec![StageEvent::new(Stage::ClaimSubmitted).with_message("Details submitted. Reward claimed.", Tone::Win)];
        if persist {
            events.push(StageEvent::new(Stage::SessionLocked));
        }
        Ok(events)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RESET
    // ═══════════════════════════════════════════════════════════════════════════

    /// Back to Idle; credits are not restored
    pub fn reset(&mut self) -> Result<Vec<StageEvent>, GateError> {
        let rules = self.config.session;
        self.state.reset(&rules)?;

        if rules.persist_after_claim {
            if let Err(e) = self.store.clear_claimed() {
                log::warn!("Could not clear claimed flag: {}", e);
            }
        }
        log::info!("Session reset, credits {}", self.state.credits);

        Ok(vec![
            StageEvent::new(Stage::SessionReset)
                .with_message("Press SPIN", Tone::Muted)
                .with_payout_text(""),
            StageEvent::new(Stage::CreditsChanged {
                credits: self.state.credits,
            }),
        ])
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn paytable(&self) -> &Paytable {
        &self.paytable
    }

    pub fn reel_model(&self) -> &ReelModel {
        &self.reel_model
    }

    pub fn credits(&self) -> u64 {
        self.state.credits
    }

    pub fn spin_count(&self) -> u64 {
        self.spin_count
    }
}

/// Event for a rejected spin
pub fn denied_event(denied: &SpinDenied) -> StageEvent {
    StageEvent::new(Stage::SpinDenied {
        reason: denied.to_string(),
    })
    .with_message(denied.message(), Tone::Lose)
}

/// Event for a failed claim; the form stays open
pub fn claim_failed_event(err: &ClaimError) -> StageEvent {
    StageEvent::new(Stage::ClaimFailed).with_message(err.message(), Tone::Lose)
}
