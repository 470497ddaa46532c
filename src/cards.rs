use crate::event::{Event, EventCategory, Side, sort_events};
use crate::rng::RandomSource;

pub const YELLOWS_PER_90: f64 = 4.8;
pub const EXTRA_TIME_CARD_FACTOR: f64 = 0.4;
pub const RED_BASE_RATE: f64 = 0.14;
pub const SECOND_YELLOW_RATE: f64 = 0.6 * RED_BASE_RATE;
pub const DIRECT_RED_RATE: f64 = 0.4 * RED_BASE_RATE;

const REGULATION_MINUTES: f64 = 90.0;
const MIN_SHIRT: u32 = 2;
const MAX_SHIRT: u32 = 11;

pub fn expected_yellow_cards(total_minutes: u16, intensity: f64) -> f64 {
    let total = total_minutes as f64;
    let intensity = intensity.max(0.0);
    let regular = total.min(REGULATION_MINUTES);
    let extra = (total - REGULATION_MINUTES).max(0.0);
    YELLOWS_PER_90 * (regular / REGULATION_MINUTES) * intensity
        + YELLOWS_PER_90 * EXTRA_TIME_CARD_FACTOR * (extra / REGULATION_MINUTES) * intensity
}

/// Rounds to one of the two neighbouring integers so that the mean stays exact.
fn round_unbiased(expected: f64, rng: &mut impl RandomSource) -> u32 {
    let base = expected.floor();
    let frac = expected - base;
    let bump = if rng.chance(frac) { 1.0 } else { 0.0 };
    (base + bump).max(0.0) as u32
}

fn team_for<'a>(side: Side, home: &'a str, away: &'a str) -> &'a str {
    match side {
        Side::Away => away,
        _ => home,
    }
}

pub fn yellow_text(team: &str, shirt: u32) -> String {
    format!("Yellow card: {team} #{shirt}")
}

pub fn second_yellow_text(team: &str, shirt: u32) -> String {
    format!("Second yellow, sent off: {team} #{shirt}")
}

pub fn red_text(team: &str, shirt: u32) -> String {
    format!("Red card: {team} #{shirt}")
}

pub fn generate_cards(
    home_team: &str,
    away_team: &str,
    total_minutes: u16,
    intensity: f64,
    rng: &mut impl RandomSource,
) -> Vec<Event> {
    let last = total_minutes.saturating_sub(1).max(1) as u32;
    let target = round_unbiased(expected_yellow_cards(total_minutes, intensity), rng);

    let mut cards = Vec::new();
    let mut yellows = [0u32; 2];

    for _ in 0..target {
        let side = if rng.chance(0.5) { Side::Home } else { Side::Away };
        let minute = rng.int_inclusive(1, last);
        let shirt = rng.int_inclusive(MIN_SHIRT, MAX_SHIRT);
        let team = team_for(side, home_team, away_team);
        yellows[side_index(side)] += 1;
        cards.push(Event::new(
            minute as u16,
            yellow_text(team, shirt),
            EventCategory::Yellow,
            side,
        ));

        if rng.chance(SECOND_YELLOW_RATE) && minute < last {
            let later = rng.int_inclusive(minute + 1, last);
            cards.push(Event::new(
                later as u16,
                second_yellow_text(team, shirt),
                EventCategory::Red,
                side,
            ));
        }
    }

    for side in [Side::Home, Side::Away] {
        let team = team_for(side, home_team, away_team);
        for _ in 0..yellows[side_index(side)] {
            if !rng.chance(DIRECT_RED_RATE) {
                continue;
            }
            let minute = rng.int_inclusive(1, last);
            let shirt = rng.int_inclusive(MIN_SHIRT, MAX_SHIRT);
            cards.push(Event::new(
                minute as u16,
                red_text(team, shirt),
                EventCategory::Red,
                side,
            ));
        }
    }

    shuffle(&mut cards, rng);
    sort_events(&mut cards);
    cards
}

fn side_index(side: Side) -> usize {
    match side {
        Side::Away => 1,
        _ => 0,
    }
}

fn shuffle<T>(items: &mut [T], rng: &mut impl RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.int_inclusive(0, i as u32) as usize;
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::is_sorted_by_minute;
    use crate::rng::{RngSource, ScriptedSource};

    #[test]
    fn expectation_for_ninety_minutes() {
        assert!((expected_yellow_cards(90, 1.0) - 4.8).abs() < 1e-12);
        assert!((expected_yellow_cards(45, 1.0) - 2.4).abs() < 1e-12);
        // 30 minutes of extra time at 0.4x.
        assert!((expected_yellow_cards(120, 1.0) - (4.8 + 4.8 * 0.4 / 3.0)).abs() < 1e-12);
        assert_eq!(expected_yellow_cards(90, 0.0), 0.0);
    }

    #[test]
    fn cards_are_sorted_and_inside_the_clock() {
        let mut rng = RngSource::seeded(5);
        for _ in 0..200 {
            let cards = generate_cards("H", "A", 90, 1.5, &mut rng);
            assert!(is_sorted_by_minute(&cards));
            assert!(cards.iter().all(|c| (1..=89).contains(&c.minute)));
            assert!(cards.iter().all(|c| c.category.is_card()));
        }
    }

    #[test]
    fn second_yellow_comes_after_the_first() {
        let mut rng = RngSource::seeded(17);
        let mut seen = 0;
        for _ in 0..500 {
            let cards = generate_cards("H", "A", 90, 1.0, &mut rng);
            for red in cards.iter().filter(|c| c.text.starts_with("Second yellow")) {
                let shirt = red.text.rsplit('#').next().unwrap();
                let first = cards
                    .iter()
                    .filter(|c| c.category == EventCategory::Yellow && c.side == red.side)
                    .filter(|c| c.text.ends_with(&format!("#{shirt}")))
                    .map(|c| c.minute)
                    .min()
                    .unwrap();
                assert!(first < red.minute);
                seen += 1;
            }
        }
        assert!(seen > 0);
    }

    #[test]
    fn realized_yellow_mean_matches_expectation() {
        let mut rng = RngSource::seeded(99);
        let runs = 20_000;
        let total: usize = (0..runs)
            .map(|_| {
                generate_cards("H", "A", 90, 1.0, &mut rng)
                    .iter()
                    .filter(|c| c.category == EventCategory::Yellow)
                    .count()
            })
            .sum();
        let mean = total as f64 / runs as f64;
        assert!((mean - 4.8).abs() < 0.05, "mean {mean}");
    }

    #[test]
    fn red_card_rates_follow_yellows() {
        let mut rng = RngSource::seeded(314);
        let (mut yellows, mut second, mut direct) = (0usize, 0usize, 0usize);
        for _ in 0..50_000 {
            for c in generate_cards("H", "A", 90, 1.0, &mut rng) {
                match c.category {
                    EventCategory::Yellow => yellows += 1,
                    EventCategory::Red if c.text.starts_with("Second yellow") => second += 1,
                    EventCategory::Red => direct += 1,
                    _ => {}
                }
            }
        }
        // A yellow in the last playable minute has no room for a second one.
        let second_rate = second as f64 / yellows as f64;
        let expected_second = SECOND_YELLOW_RATE * 88.0 / 89.0;
        assert!((second_rate - expected_second).abs() < 0.005, "second {second_rate}");
        let direct_rate = direct as f64 / yellows as f64;
        assert!((direct_rate - DIRECT_RED_RATE).abs() < 0.005, "direct {direct_rate}");
    }

    #[test]
    fn shirt_numbers_stay_in_range() {
        let mut rng = ScriptedSource::new(vec![0.999_999, 0.0, 0.5, 0.3, 0.7]);
        let cards = generate_cards("H", "A", 90, 1.0, &mut rng);
        for c in &cards {
            let shirt: u32 = c.text.rsplit('#').next().unwrap().parse().unwrap();
            assert!((2..=11).contains(&shirt));
        }
    }
}
