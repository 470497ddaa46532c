use std::collections::HashSet;

use crate::config::MatchConfig;
use crate::error::EngineError;
use crate::event::{Event, EventCategory, Side, sort_events};
use crate::goal_rate;
use crate::poisson;
use crate::rng::RandomSource;

pub const KICK_OFF: &str = "Kick-off";
pub const END_FIRST_HALF: &str = "End of first half";
pub const HALF_TIME: &str = "Half-time";
pub const SECOND_HALF: &str = "Second half underway";
pub const END_REGULATION: &str = "End of regulation time";
pub const ET1_START: &str = "ET1 underway";
pub const ET1_END: &str = "End of ET1";
pub const ET2_START: &str = "ET2 underway";
pub const PENALTIES_BEGIN: &str = "Penalties begin";
pub const FULL_TIME: &str = "Full time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Regulation,
    ExtraTime,
    Penalties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub kind: PhaseKind,
    pub start: u16,
    pub minutes: u16,
}

impl Phase {
    pub fn regulation(minutes: u16) -> Self {
        Self {
            kind: PhaseKind::Regulation,
            start: 0,
            minutes,
        }
    }

    pub fn extra_time(start: u16, minutes: u16) -> Self {
        Self {
            kind: PhaseKind::ExtraTime,
            start,
            minutes,
        }
    }

    pub fn end(&self) -> u16 {
        self.start + self.minutes
    }
}

#[derive(Debug, Clone)]
pub struct PhaseOutcome {
    pub lambda_home: f64,
    pub lambda_away: f64,
    pub goals_home: u32,
    pub goals_away: u32,
    pub events: Vec<Event>,
}

pub fn goal_text(team: &str) -> String {
    format!("Goal for {team}")
}

/// One goal event per sampled goal (home first, then away) at uniform minutes in
/// `1..=total_minutes`. Minutes may collide; the result is not sorted.
pub fn place_goals(
    home_team: &str,
    away_team: &str,
    goals_home: u32,
    goals_away: u32,
    total_minutes: u16,
    rng: &mut impl RandomSource,
) -> Vec<Event> {
    let total = total_minutes.max(1) as u32;
    let mut events = Vec::with_capacity((goals_home + goals_away) as usize);
    for _ in 0..goals_home {
        let minute = rng.int_inclusive(1, total) as u16;
        events.push(Event::new(minute, goal_text(home_team), EventCategory::Goal, Side::Home));
    }
    for _ in 0..goals_away {
        let minute = rng.int_inclusive(1, total) as u16;
        events.push(Event::new(minute, goal_text(away_team), EventCategory::Goal, Side::Away));
    }
    events
}

pub fn offset_events(events: &mut [Event], offset: u16) {
    for e in events {
        e.minute = e.minute.saturating_add(offset);
    }
}

pub fn simulate_phase(
    config: &MatchConfig,
    phase: Phase,
    rng: &mut impl RandomSource,
) -> Result<PhaseOutcome, EngineError> {
    let (lambda_home, lambda_away) = goal_rate::match_rates(
        config.home_attack,
        config.home_defense,
        config.away_attack,
        config.away_defense,
        phase.minutes,
        config.climate_factor(),
    )?;

    let goals_home = poisson::sample_goal_count(lambda_home, rng)?;
    let goals_away = poisson::sample_goal_count(lambda_away, rng)?;

    let mut events = place_goals(
        &config.home_team,
        &config.away_team,
        goals_home,
        goals_away,
        phase.minutes,
        rng,
    );
    offset_events(&mut events, phase.start);
    sort_events(&mut events);

    Ok(PhaseOutcome {
        lambda_home,
        lambda_away,
        goals_home,
        goals_away,
        events,
    })
}

pub fn milestones(
    regulation: u16,
    final_minute: u16,
    extra_time_played: bool,
    penalties_played: bool,
) -> Vec<Event> {
    let half = regulation / 2;
    let mut events = vec![
        Event::neutral(0, KICK_OFF, EventCategory::Start),
        Event::neutral(half, END_FIRST_HALF, EventCategory::Break),
        Event::neutral(half, HALF_TIME, EventCategory::Break),
        Event::neutral(half, SECOND_HALF, EventCategory::SecondStart),
    ];
    if extra_time_played {
        events.push(Event::neutral(regulation, END_REGULATION, EventCategory::Break));
        events.push(Event::neutral(regulation, ET1_START, EventCategory::SecondStart));
        events.push(Event::neutral(regulation + 15, ET1_END, EventCategory::Break));
        events.push(Event::neutral(regulation + 15, ET2_START, EventCategory::SecondStart));
    }
    if penalties_played {
        events.push(Event::neutral(final_minute, PENALTIES_BEGIN, EventCategory::Penalty));
    }
    events.push(Event::neutral(final_minute, FULL_TIME, EventCategory::End));

    dedupe_events(events)
}

/// Drops repeats of the same `(minute, text)` pair, keeping the first, then sorts.
pub fn dedupe_events(events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::new();
    let mut out: Vec<Event> = events
        .into_iter()
        .filter(|e| seen.insert((e.minute, e.text.clone())))
        .collect();
    sort_events(&mut out);
    out
}
