use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;

use simfut_terminal::config::{EngineVariant, MatchConfig};
use simfut_terminal::engine::{self, EngineOptions, MatchResult};
use simfut_terminal::history::HistoryRecord;
use simfut_terminal::persist::{self, FileStore};
use simfut_terminal::ratings::{self, ClimateId};
use simfut_terminal::rng::{RandomSource, RngSource};

const VALUE_FLAGS: [&str; 10] = [
    "--home",
    "--away",
    "--minutes",
    "--climate",
    "--seed",
    "--home-attack",
    "--home-defense",
    "--away-attack",
    "--away-defense",
    "--card-intensity",
];

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = build_config()?;
    let variant = if has_flag("--quick") {
        EngineVariant::Quick
    } else {
        EngineVariant::Full
    };
    let options = EngineOptions {
        card_intensity: parse_f64_arg("--card-intensity")
            .or_else(|| {
                std::env::var("SIM_CARD_INTENSITY")
                    .ok()
                    .and_then(|val| val.parse::<f64>().ok())
            })
            .unwrap_or(1.0)
            .clamp(0.0, 3.0),
    };

    let result = match parse_u64_arg("--seed") {
        Some(seed) => run(&config, variant, &options, &mut RngSource::seeded(seed))?,
        None => run(&config, variant, &options, &mut RngSource::thread())?,
    };

    if has_flag("--json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    if has_flag("--save") {
        let mut store = FileStore::open_default().context("no cache dir for --save")?;
        let record = HistoryRecord::from_result(&result, Utc::now());
        let history = persist::append_history(&mut store, record)?;
        eprintln!(
            "saved to {} ({} matches)",
            store.path().display(),
            history.len()
        );
    }

    Ok(())
}

fn run(
    config: &MatchConfig,
    variant: EngineVariant,
    options: &EngineOptions,
    rng: &mut impl RandomSource,
) -> anyhow::Result<MatchResult> {
    let result = match variant {
        EngineVariant::Full => engine::simulate_match_with(config, options, rng),
        EngineVariant::Quick => engine::simulate_quick(config, rng),
    };
    result.context("simulation failed")
}

/// Starts from the JSON file given as the first positional argument (if any), then applies
/// flag overrides. Picking a catalog team also loads its table ratings.
fn build_config() -> anyhow::Result<MatchConfig> {
    let mut config = match positional_path() {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_json::from_str::<MatchConfig>(&raw)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => MatchConfig::default(),
    };

    if let Some(home) = parse_str_arg("--home") {
        let r = ratings::team_ratings(&home);
        config.home_team = home;
        config.home_attack = r.attack;
        config.home_defense = r.defense;
    }
    if let Some(away) = parse_str_arg("--away") {
        let r = ratings::team_ratings(&away);
        config.away_team = away;
        config.away_attack = r.attack;
        config.away_defense = r.defense;
    }
    if let Some(minutes) = parse_u64_arg("--minutes") {
        config.duration_minutes = minutes.min(u16::MAX as u64) as u16;
    }
    if let Some(climate) = parse_str_arg("--climate") {
        config.climate = ClimateId::parse(&climate);
    }
    if has_flag("--extra-time") {
        config.extra_time = true;
    }
    if has_flag("--penalties") {
        config.extra_time = true;
        config.penalties = true;
    }
    if let Some(v) = parse_f64_arg("--home-attack") {
        config.home_attack = v;
    }
    if let Some(v) = parse_f64_arg("--home-defense") {
        config.home_defense = v;
    }
    if let Some(v) = parse_f64_arg("--away-attack") {
        config.away_attack = v;
    }
    if let Some(v) = parse_f64_arg("--away-defense") {
        config.away_defense = v;
    }
    Ok(config)
}

fn print_result(result: &MatchResult) {
    println!("{}", result.score_label());
    println!(
        "Climate: {} | Minutes: {} | λ {:.2} / {:.2}",
        ratings::climate(result.climate).label,
        result.minutes,
        result.lambda_home,
        result.lambda_away
    );
    if let Some(shootout) = &result.shootout {
        println!("Penalties: {} ({:?})", shootout.score_label(), shootout.winner);
    }
    println!();
    for event in &result.events {
        println!("{:>3}' {}", event.minute, event.text);
    }
}

fn positional_path() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut idx = 0;
    while idx < args.len() {
        let arg = &args[idx];
        if VALUE_FLAGS.contains(&arg.as_str()) {
            idx += 2;
            continue;
        }
        if !arg.starts_with("--") && !arg.trim().is_empty() {
            return Some(PathBuf::from(arg));
        }
        idx += 1;
    }
    None
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

fn parse_f64_arg(name: &str) -> Option<f64> {
    parse_str_arg(name).and_then(|raw| raw.parse::<f64>().ok())
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    parse_str_arg(name).and_then(|raw| raw.parse::<u64>().ok())
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|a| a == name)
}
