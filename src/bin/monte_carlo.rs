use std::time::Instant;

use anyhow::Context;
use rayon::prelude::*;

use simfut_terminal::config::{EngineVariant, MatchConfig};
use simfut_terminal::engine::{self, EngineOptions, MatchOutcome};
use simfut_terminal::error::EngineError;
use simfut_terminal::goal_rate;
use simfut_terminal::poisson;
use simfut_terminal::ratings::{self, ClimateId};
use simfut_terminal::rng::RngSource;

const DEFAULT_RUNS: u64 = 10_000;

#[derive(Debug, Clone, Copy, Default)]
struct RunStats {
    home_wins: u64,
    draws: u64,
    away_wins: u64,
    goals_home: u64,
    goals_away: u64,
    cards: u64,
    shootouts: u64,
    runs: u64,
}

impl RunStats {
    fn merge(mut self, other: RunStats) -> RunStats {
        self.home_wins += other.home_wins;
        self.draws += other.draws;
        self.away_wins += other.away_wins;
        self.goals_home += other.goals_home;
        self.goals_away += other.goals_away;
        self.cards += other.cards;
        self.shootouts += other.shootouts;
        self.runs += other.runs;
        self
    }

    fn pct(&self, n: u64) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            100.0 * n as f64 / self.runs as f64
        }
    }

    fn mean(&self, n: u64) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            n as f64 / self.runs as f64
        }
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = build_config();
    let variant = if has_flag("--quick") {
        EngineVariant::Quick
    } else {
        EngineVariant::Full
    };
    let options = EngineOptions {
        card_intensity: std::env::var("SIM_CARD_INTENSITY")
            .ok()
            .and_then(|val| val.parse::<f64>().ok())
            .unwrap_or(1.0)
            .clamp(0.0, 3.0),
    };
    let runs = parse_u64_arg("--runs").unwrap_or(DEFAULT_RUNS).max(1);
    let seed = parse_u64_arg("--seed").unwrap_or_else(rand::random::<u64>);

    config
        .validate(variant)
        .map_err(EngineError::from)
        .context("invalid match config")?;

    let started = Instant::now();
    let stats = (0..runs)
        .into_par_iter()
        .map(|i| -> Result<RunStats, EngineError> {
            let mut rng = RngSource::seeded(seed.wrapping_add(i));
            let result = match variant {
                EngineVariant::Full => engine::simulate_match_with(&config, &options, &mut rng),
                EngineVariant::Quick => engine::simulate_quick(&config, &mut rng),
            }?;
            let mut stats = RunStats {
                runs: 1,
                goals_home: result.goals_home as u64,
                goals_away: result.goals_away as u64,
                cards: result.events.iter().filter(|e| e.category.is_card()).count() as u64,
                shootouts: result.shootout.is_some() as u64,
                ..RunStats::default()
            };
            match result.outcome() {
                MatchOutcome::HomeWin => stats.home_wins = 1,
                MatchOutcome::Draw => stats.draws = 1,
                MatchOutcome::AwayWin => stats.away_wins = 1,
            }
            Ok(stats)
        })
        .try_reduce(RunStats::default, |a, b| Ok(a.merge(b)))
        .context("simulation failed")?;
    let elapsed = started.elapsed();

    let (lambda_home, lambda_away) = goal_rate::match_rates(
        config.home_attack,
        config.home_defense,
        config.away_attack,
        config.away_defense,
        config.duration_minutes,
        config.climate_factor(),
    )?;
    let (p_home, p_draw, p_away) = poisson::outcome_probs(lambda_home, lambda_away, 12);

    println!(
        "{} vs {} | {}' | {} | seed {seed}",
        config.home_team,
        config.away_team,
        config.duration_minutes,
        config.climate_label()
    );
    println!(
        "Runs: {} in {:.2}s",
        stats.runs,
        elapsed.as_secs_f64()
    );
    println!(
        "Home win: {:.1}% | Draw: {:.1}% | Away win: {:.1}%",
        stats.pct(stats.home_wins),
        stats.pct(stats.draws),
        stats.pct(stats.away_wins)
    );
    println!(
        "Regulation model: H {:.1}% D {:.1}% A {:.1}% (λ {:.2} / {:.2})",
        p_home * 100.0,
        p_draw * 100.0,
        p_away * 100.0,
        lambda_home,
        lambda_away
    );
    println!(
        "Mean goals: {:.2} - {:.2}",
        stats.mean(stats.goals_home),
        stats.mean(stats.goals_away)
    );
    println!("Mean cards: {:.2}", stats.mean(stats.cards));
    println!("Shootouts: {:.1}%", stats.pct(stats.shootouts));

    Ok(())
}

fn build_config() -> MatchConfig {
    let home = parse_str_arg("--home").unwrap_or_else(|| "Colo-Colo".to_string());
    let away = parse_str_arg("--away").unwrap_or_else(|| "Universidad de Chile".to_string());
    let mut config = MatchConfig::for_teams(&home, &away);
    if let Some(minutes) = parse_u64_arg("--minutes") {
        config.duration_minutes = minutes.min(u16::MAX as u64) as u16;
    }
    if let Some(climate) = parse_str_arg("--climate") {
        config.climate = ClimateId::parse(&climate);
    }
    config.extra_time = has_flag("--extra-time") || has_flag("--penalties");
    config.penalties = has_flag("--penalties");
    if !ratings::is_known_team(&home) || !ratings::is_known_team(&away) {
        eprintln!("note: unknown team uses neutral ratings");
    }
    config
}

fn parse_str_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && !raw.trim().is_empty()
        {
            return Some(raw.trim().to_string());
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    parse_str_arg(name).and_then(|raw| raw.parse::<u64>().ok())
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|a| a == name)
}
