use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Goal,
    Yellow,
    Red,
    Injury,
    Start,
    Break,
    SecondStart,
    End,
    Penalty,
    Other,
}

impl EventCategory {
    pub fn is_milestone(self) -> bool {
        matches!(
            self,
            EventCategory::Start
                | EventCategory::Break
                | EventCategory::SecondStart
                | EventCategory::End
        )
    }

    pub fn is_card(self) -> bool {
        matches!(self, EventCategory::Yellow | EventCategory::Red)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
    Neutral,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
            Side::Neutral => Side::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub minute: u16,
    pub text: String,
    pub category: EventCategory,
    pub side: Side,
}

impl Event {
    pub fn new(minute: u16, text: impl Into<String>, category: EventCategory, side: Side) -> Self {
        Self {
            minute,
            text: text.into(),
            category,
            side,
        }
    }

    pub fn neutral(minute: u16, text: impl Into<String>, category: EventCategory) -> Self {
        Self::new(minute, text, category, Side::Neutral)
    }

    pub fn is_goal_for(&self, side: Side) -> bool {
        self.category == EventCategory::Goal && self.side == side
    }
}

pub fn sort_events(events: &mut [Event]) {
    events.sort_by_key(|e| e.minute);
}

pub fn merge_events(mut base: Vec<Event>, extra: Vec<Event>) -> Vec<Event> {
    base.extend(extra);
    sort_events(&mut base);
    base
}

pub fn is_sorted_by_minute(events: &[Event]) -> bool {
    events.windows(2).all(|w| w[0].minute <= w[1].minute)
}

pub fn count_goals(events: &[Event]) -> (u32, u32) {
    events.iter().fold((0, 0), |(h, a), e| {
        if e.is_goal_for(Side::Home) {
            (h + 1, a)
        } else if e.is_goal_for(Side::Away) {
            (h, a + 1)
        } else {
            (h, a)
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    FirstHalf,
    SecondHalf,
    ExtraTimeFirst,
    ExtraTimeSecond,
    FullTime,
}

impl Period {
    pub fn label(self) -> &'static str {
        match self {
            Period::FirstHalf => "1T",
            Period::SecondHalf => "2T",
            Period::ExtraTimeFirst => "ET1",
            Period::ExtraTimeSecond => "ET2",
            Period::FullTime => "FT",
        }
    }
}

/// Period a clock minute falls in for a match of `duration` regulation minutes.
pub fn period_at(minute: u16, duration: u16, extra_time: bool) -> Period {
    let mid = duration / 2;
    if minute < mid {
        Period::FirstHalf
    } else if minute < duration {
        Period::SecondHalf
    } else if !extra_time {
        Period::FullTime
    } else if minute < duration + 15 {
        Period::ExtraTimeFirst
    } else if minute < duration + 30 {
        Period::ExtraTimeSecond
    } else {
        Period::FullTime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_labels_follow_clock() {
        assert_eq!(period_at(10, 90, false).label(), "1T");
        assert_eq!(period_at(60, 90, false).label(), "2T");
        assert_eq!(period_at(95, 90, true).label(), "ET1");
        assert_eq!(period_at(110, 90, true).label(), "ET2");
        assert_eq!(period_at(120, 90, true).label(), "FT");
        assert_eq!(period_at(90, 90, false).label(), "FT");
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut events = vec![
            Event::neutral(45, "b", EventCategory::Break),
            Event::neutral(10, "a", EventCategory::Other),
            Event::neutral(45, "c", EventCategory::SecondStart),
        ];
        sort_events(&mut events);
        let texts: Vec<_> = events.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert!(is_sorted_by_minute(&events));
    }

    #[test]
    fn goals_are_counted_by_side() {
        let events = vec![
            Event::new(3, "g", EventCategory::Goal, Side::Home),
            Event::new(9, "y", EventCategory::Yellow, Side::Home),
            Event::new(20, "g", EventCategory::Goal, Side::Away),
            Event::new(80, "g", EventCategory::Goal, Side::Home),
        ];
        assert_eq!(count_goals(&events), (2, 1));
    }
}
