use crate::error::EngineError;

pub const BASE_RATE: f64 = 1.3;
const BASELINE_MINUTES: f64 = 90.0;
const MIN_MINUTES: f64 = 30.0;
const MAX_MINUTES: f64 = 120.0;

/// Expected goals (Poisson lambda) for one side over `minutes`.
///
/// `defense` is the opposing side's defense rating. Minutes are clamped into `30..=120`
/// before being normalized against 90. Non-positive or non-finite inputs are rejected
/// instead of producing an infinite or NaN rate.
pub fn expected_goal_rate(
    attack: f64,
    defense: f64,
    minutes: u16,
    climate_factor: f64,
) -> Result<f64, EngineError> {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(attack) || !usable(defense) || !usable(climate_factor) {
        return Err(EngineError::DegenerateRate {
            attack,
            defense,
            climate_factor,
        });
    }

    let minutes_factor = (minutes as f64).clamp(MIN_MINUTES, MAX_MINUTES) / BASELINE_MINUTES;
    Ok(BASE_RATE * (attack / defense) * minutes_factor * climate_factor)
}

pub fn match_rates(
    home_attack: f64,
    home_defense: f64,
    away_attack: f64,
    away_defense: f64,
    minutes: u16,
    climate_factor: f64,
) -> Result<(f64, f64), EngineError> {
    let home = expected_goal_rate(home_attack, away_defense, minutes, climate_factor)?;
    let away = expected_goal_rate(away_attack, home_defense, minutes, climate_factor)?;
    Ok((home, away))
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
