//! End-to-End Slot Session Integration Tests
//!
//! Tests the complete turn:
//! - Outcome generation and evaluation
//! - Session gating and the claim lock
//! - Claimed-flag persistence across restarts

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rc_slot::{
    ClaimError, ClaimStore, ContactDetails, FileClaimStore, FnClaimSubmitter, GameConfig, GatePhase, Grid,
    MemoryClaimStore, Paytable, ReelModel, SessionRules, SessionState, SlotMachine, SpinDenied,
    StubClaimSubmitter, Symbol, validate_bet,
};
use rc_stage::Stage;

fn seven_bar() -> GameConfig {
    GameConfig::with_symbols(vec![Symbol::new("SEVEN", "7", 1, 10), Symbol::new("BAR", "BAR", 1, 4)]).unwrap()
}

fn details() -> ContactDetails {
    ContactDetails::new("player@example.com", "+15550100", true)
}

fn stub() -> StubClaimSubmitter {
    StubClaimSubmitter::new("/api/claim")
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAYTABLE SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_middle_line_sevens_pay_twenty() {
    let paytable = Paytable::from_config(&seven_bar());
    let grid = Grid::from_rows(&[&["X", "X", "X"], &["SEVEN", "SEVEN", "SEVEN"], &["X", "X", "X"]]);

    let eval = paytable.evaluate(&grid, 2);
    assert_eq!(eval.total, 20);
    assert_eq!(eval.wins.len(), 1);
    assert_eq!(eval.wins[0].rule_id, "THREE_OF_A_KIND");
    assert_eq!(eval.summary(), "Line [1,1,1] THREE_OF_A_KIND SEVEN → +20");
}

#[test]
fn test_mismatched_middle_line_pays_nothing() {
    let paytable = Paytable::from_config(&seven_bar());
    let grid = Grid::from_rows(&[&["BAR", "BAR", "BAR"], &["SEVEN", "BAR", "SEVEN"], &["BAR", "BAR", "BAR"]]);

    let eval = paytable.evaluate(&grid, 5);
    assert_eq!(eval.total, 0);
    assert!(eval.wins.is_empty());
}

#[test]
fn test_evaluation_is_pure_over_generated_grids() {
    let config = GameConfig::classic();
    let model = ReelModel::new(&config).unwrap();
    let paytable = Paytable::from_config(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for _ in 0..500 {
        let grid = model.generate(&mut rng);
        let first = paytable.evaluate(&grid, 3);
        assert_eq!(first, paytable.evaluate(&grid, 3));
        assert_eq!(first.total, first.wins.iter().map(|w| w.amount).sum::<u64>());
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION GATE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_one_spin_per_turn() {
    let mut machine = SlotMachine::seeded(GameConfig::classic(), MemoryClaimStore::new(), 11).unwrap();
    assert!(machine.can_spin(1));

    machine.play("1").unwrap();
    assert!(machine.credits() >= 1);
    assert!(!machine.can_spin(1));
    assert_eq!(machine.spin("1").unwrap_err(), SpinDenied::AlreadySpun);
}

#[test]
fn test_claim_locks_until_reset() {
    let mut machine = SlotMachine::seeded(GameConfig::classic(), MemoryClaimStore::new(), 12).unwrap();
    machine.play("1").unwrap();
    machine.submit_claim(&details(), &stub()).unwrap();

    assert!(!machine.can_spin(1));
    machine.reset().unwrap();
    assert!(machine.can_spin(1));
}

#[test]
fn test_claim_lock_ignores_credits_and_bet() {
    let rules = SessionRules {
        one_spin_per_turn: false,
        starting_credits: 1_000,
        ..SessionRules::default()
    };
    let mut state = SessionState::new(&rules);
    let grid = Grid::from_rows(&[&["A", "A", "A"], &["A", "A", "A"], &["A", "A", "A"]]);
    state.begin_spin(&rules, 1, grid).unwrap();
    state.finish_spin(0).unwrap();
    state.apply_claim().unwrap();

    for bet in rules.min_bet..=rules.max_bet {
        assert!(!state.can_spin(&rules, bet));
    }
}

#[test]
fn test_validate_bet_stays_in_range() {
    let rules = SessionRules::default();
    for raw in ["", "0", "1", "7", "10", "11", "-3", "4.5", "nope", "  9x", "340282366920938463463374607431768211456"] {
        let bet = validate_bet(raw, &rules);
        assert!((rules.min_bet..=rules.max_bet).contains(&bet), "{raw:?} -> {bet}");
        assert_eq!(validate_bet(&bet.to_string(), &rules), bet);
    }
}

#[test]
fn test_credits_never_negative() {
    let rules = SessionRules {
        one_spin_per_turn: false,
        starting_credits: 5,
        ..SessionRules::default()
    };
    let mut config = GameConfig::classic();
    config.session = rules;
    let mut machine = SlotMachine::seeded(config, MemoryClaimStore::new(), 13).unwrap();

    // Spin until the balance no longer covers the bet
    for _ in 0..200 {
        match machine.play("3") {
            Ok(_) => {}
            Err(SpinDenied::InsufficientCredits { credits, bet }) => {
                assert!(credits < bet);
                break;
            }
            Err(other) => panic!("unexpected denial: {other}"),
        }
    }
    let stats = machine.stats();
    assert_eq!(machine.credits(), 5 + stats.total_win - stats.total_bet);
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLAIM FLOW
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_full_turn_events() {
    let mut machine = SlotMachine::seeded(seven_bar(), MemoryClaimStore::new(), 14).unwrap();

    let ticket = machine.spin("2").unwrap();
    let start = ticket.generate_stages();
    assert!(matches!(start[0].stage, Stage::SpinStart { bet: 2 }));
    assert_eq!(start.iter().filter(|e| matches!(e.stage, Stage::ReelStop { .. })).count(), 3);

    let report = machine.finish_spin().unwrap();
    let end = report.generate_stages();
    assert_eq!(end[0].stage, Stage::EvaluateWins);
    assert!(end.iter().any(|e| e.stage == Stage::ClaimOpen));
    assert_eq!(end.last().unwrap().stage, Stage::SpinEnd);
    if report.is_win() {
        assert!(end.iter().any(|e| matches!(e.stage, Stage::WinPresent { .. })));
    } else {
        assert!(end.iter().any(|e| e.stage == Stage::NoWin));
    }

    let claim = machine.submit_claim(&details(), &stub()).unwrap();
    assert_eq!(claim[0].stage, Stage::ClaimSubmitted);
    assert_eq!(machine.phase(), GatePhase::Claimed);
}

#[test]
fn test_failed_claim_can_be_retried() {
    let mut machine = SlotMachine::seeded(GameConfig::classic(), MemoryClaimStore::new(), 15).unwrap();
    machine.play("1").unwrap();

    let offline = FnClaimSubmitter::new(|_| Err("connection refused".to_string()));
    let err = machine.submit_claim(&details(), &offline).unwrap_err();
    assert!(matches!(err, ClaimError::Submission(_)));
    assert_eq!(machine.phase(), GatePhase::AwaitingClaim);
    assert!(!machine.is_locked());

    machine.submit_claim(&details(), &stub()).unwrap();
    assert!(machine.is_locked());
}

// ═══════════════════════════════════════════════════════════════════════════════
// PERSISTENCE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_claim_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("claim.json");

    {
        let mut machine = SlotMachine::seeded(GameConfig::classic(), FileClaimStore::new(&path), 16).unwrap();
        machine.play("1").unwrap();
        machine.submit_claim(&details(), &stub()).unwrap();
    }

    let mut machine = SlotMachine::seeded(GameConfig::classic(), FileClaimStore::new(&path), 17).unwrap();
    assert!(machine.is_locked());
    assert_eq!(machine.startup_events()[0].stage, Stage::SessionLocked);
    assert_eq!(machine.spin("1").unwrap_err(), SpinDenied::Claimed);

    machine.reset().unwrap();
    assert!(!FileClaimStore::new(&path).is_claimed().unwrap());
    assert!(machine.can_spin(1));
}

#[test]
fn test_shared_memory_store_between_sessions() {
    let store = Arc::new(MemoryClaimStore::new());

    let mut first = SlotMachine::seeded(GameConfig::classic(), Arc::clone(&store), 18).unwrap();
    first.play("1").unwrap();
    first.submit_claim(&details(), &stub()).unwrap();

    let second = SlotMachine::seeded(GameConfig::classic(), Arc::clone(&store), 19).unwrap();
    assert!(!second.can_spin(1));
}
