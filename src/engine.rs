use serde::{Deserialize, Serialize};

use crate::cards;
use crate::config::{EXTRA_TIME_MINUTES, EngineVariant, MAX_MINUTES, MIN_MINUTES, MatchConfig};
use crate::error::EngineError;
use crate::event::{Event, count_goals, merge_events, sort_events};
use crate::goal_rate::{self, round2};
use crate::penalties::{self, ShootoutOutcome, ShootoutWinner};
use crate::poisson;
use crate::ratings::ClimateId;
use crate::rng::RandomSource;
use crate::synth::{self, PENALTIES_BEGIN, Phase, PhaseKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    pub card_intensity: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            card_intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    HomeWin,
    Draw,
    AwayWin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_team: String,
    pub away_team: String,
    pub goals_home: u32,
    pub goals_away: u32,
    pub events: Vec<Event>,
    pub climate: ClimateId,
    pub lambda_home: f64,
    pub lambda_away: f64,
    /// Elapsed clock including extra time.
    pub minutes: u16,
    /// Regulation length the clock was built from.
    pub regulation_minutes: u16,
    pub phase_reached: PhaseKind,
    pub shootout: Option<ShootoutOutcome>,
}

impl MatchResult {
    pub fn score(&self) -> String {
        format!("{} - {}", self.goals_home, self.goals_away)
    }

    pub fn score_label(&self) -> String {
        format!(
            "{} {} - {} {}",
            self.home_team, self.goals_home, self.goals_away, self.away_team
        )
    }

    pub fn extra_time_played(&self) -> bool {
        matches!(
            self.phase_reached,
            PhaseKind::ExtraTime | PhaseKind::Penalties
        )
    }

    /// Final outcome, with a decided shootout breaking a level score.
    pub fn outcome(&self) -> MatchOutcome {
        if self.goals_home > self.goals_away {
            return MatchOutcome::HomeWin;
        }
        if self.goals_away > self.goals_home {
            return MatchOutcome::AwayWin;
        }
        match self.shootout.as_ref().map(|s| s.winner) {
            Some(ShootoutWinner::Home) => MatchOutcome::HomeWin,
            Some(ShootoutWinner::Away) => MatchOutcome::AwayWin,
            _ => MatchOutcome::Draw,
        }
    }
}

pub fn simulate_quick(
    config: &MatchConfig,
    rng: &mut impl RandomSource,
) -> Result<MatchResult, EngineError> {
    config.validate(EngineVariant::Quick)?;

    let total = config.duration_minutes.clamp(MIN_MINUTES, MAX_MINUTES);
    let (lambda_home, lambda_away) = goal_rate::match_rates(
        config.home_attack,
        config.home_defense,
        config.away_attack,
        config.away_defense,
        total,
        config.climate_factor(),
    )?;

    let goals_home = poisson::sample_goal_count(lambda_home, rng)?;
    let goals_away = poisson::sample_goal_count(lambda_away, rng)?;
    let mut events = synth::place_goals(
        &config.home_team,
        &config.away_team,
        goals_home,
        goals_away,
        total,
        rng,
    );
    sort_events(&mut events);

    Ok(MatchResult {
        home_team: config.home_team.clone(),
        away_team: config.away_team.clone(),
        goals_home,
        goals_away,
        events,
        climate: config.climate,
        lambda_home: round2(lambda_home),
        lambda_away: round2(lambda_away),
        minutes: total,
        regulation_minutes: total,
        phase_reached: PhaseKind::Regulation,
        shootout: None,
    })
}

pub fn simulate_match(
    config: &MatchConfig,
    rng: &mut impl RandomSource,
) -> Result<MatchResult, EngineError> {
    simulate_match_with(config, &EngineOptions::default(), rng)
}

/// Regulation, then extra time and penalties while the score stays level and the
/// config allows them. Milestones and cards are laid over the final clock.
pub fn simulate_match_with(
    config: &MatchConfig,
    options: &EngineOptions,
    rng: &mut impl RandomSource,
) -> Result<MatchResult, EngineError> {
    config.validate(EngineVariant::Full)?;

    let regulation = config.duration_minutes;
    let mut phase_reached = PhaseKind::Regulation;
    let mut minutes = regulation;

    let mut goals = synth::simulate_phase(config, Phase::regulation(regulation), rng)?.events;
    let (mut goals_home, mut goals_away) = count_goals(&goals);

    if goals_home == goals_away && config.extra_time {
        let phase = Phase::extra_time(regulation, EXTRA_TIME_MINUTES);
        let extra = synth::simulate_phase(config, phase, rng)?;
        goals = merge_events(goals, extra.events);
        (goals_home, goals_away) = count_goals(&goals);
        minutes = phase.end();
        phase_reached = PhaseKind::ExtraTime;
    }

    let shootout = if goals_home == goals_away && config.extra_time && config.penalties {
        phase_reached = PhaseKind::Penalties;
        Some(penalties::run_shootout(rng))
    } else {
        None
    };

    let extra_time_played = phase_reached != PhaseKind::Regulation;
    let marks = synth::milestones(regulation, minutes, extra_time_played, shootout.is_some());
    let card_events = cards::generate_cards(
        &config.home_team,
        &config.away_team,
        minutes,
        options.card_intensity,
        rng,
    );

    let mut events = merge_events(merge_events(goals, card_events), marks);
    if let Some(outcome) = shootout.as_ref() {
        let kicks =
            penalties::shootout_events(outcome, &config.home_team, &config.away_team, minutes);
        let at = events
            .iter()
            .position(|e| e.text == PENALTIES_BEGIN)
            .map(|idx| idx + 1)
            .unwrap_or(events.len());
        events.splice(at..at, kicks);
    }

    Ok(MatchResult {
        home_team: config.home_team.clone(),
        away_team: config.away_team.clone(),
        goals_home,
        goals_away,
        events,
        climate: config.climate,
        lambda_home: 0.0,
        lambda_away: 0.0,
        minutes,
        regulation_minutes: regulation,
        phase_reached,
        shootout,
    })
}
