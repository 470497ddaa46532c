use serde::{Deserialize, Serialize};

use crate::event::{Event, EventCategory, Side};
use crate::rng::RandomSource;

pub const CONVERSION_RATE: f64 = 0.75;
pub const REGULAR_ROUNDS: u32 = 5;
pub const MAX_SUDDEN_DEATH_ROUNDS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShootoutWinner {
    Home,
    Away,
    /// Sudden death ran out of rounds with the totals still level.
    Undecided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyKick {
    pub round: u32,
    pub side: Side,
    pub scored: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShootoutOutcome {
    pub kicks: Vec<PenaltyKick>,
    pub home_scored: u32,
    pub away_scored: u32,
    pub winner: ShootoutWinner,
}

impl ShootoutOutcome {
    pub fn score_label(&self) -> String {
        format!("{}-{}", self.home_scored, self.away_scored)
    }
}

/// Alternating kicks (home first), five rounds then sudden death.
pub fn run_shootout(rng: &mut impl RandomSource) -> ShootoutOutcome {
    let mut kicks = Vec::new();
    let mut home = 0u32;
    let mut away = 0u32;

    let mut take_round = |round: u32, home: &mut u32, away: &mut u32| {
        for side in [Side::Home, Side::Away] {
            let scored = rng.chance(CONVERSION_RATE);
            if scored {
                match side {
                    Side::Home => *home += 1,
                    _ => *away += 1,
                }
            }
            kicks.push(PenaltyKick {
                round,
                side,
                scored,
            });
        }
    };

    for round in 1..=REGULAR_ROUNDS {
        take_round(round, &mut home, &mut away);
    }
    let mut extra = 0;
    while home == away && extra < MAX_SUDDEN_DEATH_ROUNDS {
        extra += 1;
        take_round(REGULAR_ROUNDS + extra, &mut home, &mut away);
    }

    let winner = if home > away {
        ShootoutWinner::Home
    } else if away > home {
        ShootoutWinner::Away
    } else {
        ShootoutWinner::Undecided
    };

    ShootoutOutcome {
        kicks,
        home_scored: home,
        away_scored: away,
        winner,
    }
}

pub fn shootout_events(
    outcome: &ShootoutOutcome,
    home_team: &str,
    away_team: &str,
    minute: u16,
) -> Vec<Event> {
    let mut events = Vec::with_capacity(outcome.kicks.len() + 1);
    for kick in &outcome.kicks {
        let team = if kick.side == Side::Home {
            home_team
        } else {
            away_team
        };
        let verdict = if kick.scored { "scored" } else { "missed" };
        events.push(Event::new(
            minute,
            format!("Penalty {verdict}: {team} (round {})", kick.round),
            EventCategory::Penalty,
            kick.side,
        ));
    }

    let score = outcome.score_label();
    let (text, side) = match outcome.winner {
        ShootoutWinner::Home => (format!("{home_team} win {score} on penalties"), Side::Home),
        ShootoutWinner::Away => (format!("{away_team} win {score} on penalties"), Side::Away),
        ShootoutWinner::Undecided => (
            format!("Shootout undecided at {score}"),
            Side::Neutral,
        ),
    };
    events.push(Event::new(minute, text, EventCategory::Penalty, side));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngSource, ScriptedSource};

    #[test]
    fn winner_matches_tally() {
        let mut rng = RngSource::seeded(21);
        for _ in 0..500 {
            let out = run_shootout(&mut rng);
            let home = out
                .kicks
                .iter()
                .filter(|k| k.side == Side::Home && k.scored)
                .count() as u32;
            let away = out
                .kicks
                .iter()
                .filter(|k| k.side == Side::Away && k.scored)
                .count() as u32;
            assert_eq!((home, away), (out.home_scored, out.away_scored));
            match out.winner {
                ShootoutWinner::Home => assert!(home > away),
                ShootoutWinner::Away => assert!(away > home),
                ShootoutWinner::Undecided => assert_eq!(home, away),
            }
            assert!(out.kicks.len() >= 10);
            assert_eq!(out.kicks.len() % 2, 0);
        }
    }

    #[test]
    fn everyone_scores_hits_the_cap() {
        let mut rng = ScriptedSource::constant(0.1);
        let out = run_shootout(&mut rng);
        assert_eq!(out.winner, ShootoutWinner::Undecided);
        let rounds = REGULAR_ROUNDS + MAX_SUDDEN_DEATH_ROUNDS;
        assert_eq!(out.kicks.len() as u32, rounds * 2);
    }

    #[test]
    fn immediate_sudden_death() {
        // Five rounds all scored, then home scores and away misses.
        let mut values = vec![0.1; 10];
        values.extend([0.1, 0.9]);
        let mut rng = ScriptedSource::new(values);
        let out = run_shootout(&mut rng);
        assert_eq!(out.winner, ShootoutWinner::Home);
        assert_eq!(out.score_label(), "6-5");
        assert_eq!(out.kicks.len(), 12);
    }

    #[test]
    fn events_share_one_minute() {
        let mut rng = RngSource::seeded(4);
        let out = run_shootout(&mut rng);
        let events = shootout_events(&out, "H", "A", 120);
        assert_eq!(events.len(), out.kicks.len() + 1);
        assert!(events.iter().all(|e| e.minute == 120));
        assert!(events.iter().all(|e| e.category == EventCategory::Penalty));
    }
}
