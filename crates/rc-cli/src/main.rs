//! ReelClaim terminal front end
//!
//! Usage:
//!   reelclaim play              - Spin once, optionally claim the reward
//!   reelclaim reset             - Clear the persisted claim
//!   reelclaim simulate          - Batch spins, report RTP and hit rate
//!   reelclaim check-config PATH - Validate a config and print reel odds

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use regex::Regex;
use serde::Serialize;

use rc_slot::{
    ContactDetails, FileClaimStore, GameConfig, LogAuditSink, Paytable, ReelModel, SessionStats, SlotMachine,
    StubClaimSubmitter, claim_failed_event, denied_event,
};
use rc_stage::{StageEvent, Tone};

const DEFAULT_STATE_FILE: &str = "reelclaim-state.json";

#[derive(Parser)]
#[command(name = "reelclaim", about = "ReelClaim slot session tools")]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one turn
    Play {
        /// Config file (JSON or YAML), classic machine if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Bet, clamped to the configured range
        #[arg(short, long, default_value = "1")]
        bet: String,
        /// Fixed RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Where the claimed flag is kept
        #[arg(long, default_value = DEFAULT_STATE_FILE)]
        state_file: PathBuf,
        /// Claim with this email
        #[arg(long)]
        email: Option<String>,
        /// Claim with this phone number
        #[arg(long)]
        phone: Option<String>,
        /// Consent to be contacted
        #[arg(long)]
        consent: bool,
    },
    /// Clear the persisted claim
    Reset {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_STATE_FILE)]
        state_file: PathBuf,
    },
    /// Run a batch of spins without the session gate
    Simulate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of spins
        #[arg(short = 'n', long, default_value_t = 100_000)]
        spins: u64,
        #[arg(short, long, default_value = "1")]
        bet: String,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a config file and print reel odds
    CheckConfig {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Play {
            config,
            bet,
            seed,
            state_file,
            email,
            phone,
            consent,
        } => {
            let claim = match (email, phone) {
                (Some(email), Some(phone)) => Some(contact_details(email, phone, consent)?),
                (None, None) => None,
                _ => bail!("--email and --phone must be given together"),
            };
            play(config.as_deref(), &bet, seed, &state_file, claim)
        }
        Commands::Reset { config, state_file } => reset(config.as_deref(), &state_file),
        Commands::Simulate {
            config,
            spins,
            bet,
            seed,
            json,
        } => simulate(config.as_deref(), spins, &bet, seed, json),
        Commands::CheckConfig { path } => check_config(&path),
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path).with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(GameConfig::classic()),
    }
}

fn print_events(events: &[StageEvent]) {
    for event in events {
        if let Some(message) = &event.message {
            let marker = match event.tone {
                Tone::Win => "★",
                Tone::Lose => "✗",
                Tone::Muted => "·",
            };
            println!("{} {}", marker, message);
        }
        if let Some(payout) = event.payout_text.as_deref().filter(|p| !p.is_empty()) {
            println!("  {}", payout);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLAIM FORM
// ═══════════════════════════════════════════════════════════════════════════════

fn contact_details(email: String, phone: String, consent: bool) -> Result<ContactDetails> {
    let email_re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")?;
    let phone_re = Regex::new(r"^\+?\d[\d\s-]{7,15}$")?;

    if !email_re.is_match(email.trim()) {
        bail!("Enter a valid email.");
    }
    if !phone_re.is_match(phone.trim()) {
        bail!("Enter a valid phone.");
    }
    if !consent {
        bail!("Consent is required.");
    }
    Ok(ContactDetails::new(email, phone, consent))
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════════════════════

fn play(
    config: Option<&Path>,
    bet: &str,
    seed: Option<u64>,
    state_file: &Path,
    claim: Option<ContactDetails>,
) -> Result<()> {
    let config = load_config(config)?;
    let endpoints = config.endpoints.clone();
    let store = FileClaimStore::new(state_file);

    let machine = match seed {
        Some(seed) => SlotMachine::seeded(config, store, seed),
        None => SlotMachine::new(config, store),
    };
    let mut machine = machine
        .context("Invalid configuration")?
        .with_audit(LogAuditSink::new(endpoints.audit_spin.clone()));

    print_events(&machine.startup_events());

    let ticket = match machine.spin(bet) {
        Ok(ticket) => ticket,
        Err(denied) => {
            print_events(&[denied_event(&denied)]);
            return Ok(());
        }
    };
    print_events(&ticket.generate_stages());

    let report = machine.finish_spin()?;
    println!();
    println!("{}", report.grid.render(&machine.config().symbols));
    println!();
    print_events(&report.generate_stages());
    println!("Credits: {}", report.credits);

    if !report.claim_open {
        return Ok(());
    }
    let Some(details) = claim else {
        println!("Claim your reward with --email, --phone and --consent.");
        return Ok(());
    };

    let submitter = StubClaimSubmitter::new(endpoints.submit_claim);
    match machine.submit_claim(&details, &submitter) {
        Ok(events) => print_events(&events),
        Err(e) => print_events(&[claim_failed_event(&e)]),
    }
    Ok(())
}

fn reset(config: Option<&Path>, state_file: &Path) -> Result<()> {
    let config = load_config(config)?;
    let mut machine =
        SlotMachine::new(config, FileClaimStore::new(state_file)).context("Invalid configuration")?;

    let events = machine.reset()?;
    print_events(&events);
    Ok(())
}

#[derive(Serialize)]
struct SimulationReport {
    spins: u64,
    bet: u64,
    seed: u64,
    rtp: f64,
    hit_rate: f64,
    stats: SessionStats,
}

fn simulate(config: Option<&Path>, spins: u64, bet: &str, seed: u64, json: bool) -> Result<()> {
    let config = load_config(config)?;
    config.validate()?;
    let bet = config.session.bet_limits().validate(bet);

    let model = ReelModel::new(&config)?;
    let paytable = Paytable::from_config(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut stats = SessionStats::new();

    log::info!("Simulating {} spins at bet {} (seed {})", spins, bet, seed);
    for _ in 0..spins {
        let grid = model.generate(&mut rng);
        stats.record(bet, &paytable.evaluate(&grid, bet));
    }

    let report = SimulationReport {
        spins,
        bet,
        seed,
        rtp: stats.rtp(),
        hit_rate: stats.hit_rate(),
        stats,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Spins:         {}", report.spins);
    println!("Bet:           {}", report.bet);
    println!("Total bet:     {}", report.stats.total_bet);
    println!("Total win:     {}", report.stats.total_win);
    println!("RTP:           {:.2}%", report.rtp);
    println!("Hit rate:      {:.2}%", report.hit_rate);
    println!("Max win ratio: {:.1}x", report.stats.max_win_ratio);
    for (rule, hits) in &report.stats.rule_hits {
        println!("  {:<20} {}", rule, hits);
    }
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    let model = ReelModel::new(&config)?;

    println!(
        "✓ {}: {} symbols, {} reels, {} paylines",
        path.display(),
        config.symbols.len(),
        config.reels_count,
        config.paylines.len()
    );

    for reel in model.reels() {
        println!(
            "\nReel {} (weight {}, strip {})",
            reel.reel_index(),
            reel.total_weight(),
            reel.strip_len()
        );
        for (name, weight) in reel.entries() {
            println!(
                "  {:<4} {:<10} w{:<3} {:>6.2}%",
                config.symbols.display(name),
                name,
                weight,
                reel.probability(name) * 100.0
            );
        }
    }

    let rules: Vec<&str> = config.pay_rules.iter().map(|r| r.id()).collect();
    println!("\nRules: {}", rules.join(", "));
    println!("Bet range: {}..={}", config.session.min_bet, config.session.max_bet);
    Ok(())
}
