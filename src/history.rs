use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{MatchOutcome, MatchResult};
use crate::event::Event;
use crate::ratings::ClimateId;

pub const MAX_HISTORY: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    pub score_label: String,
    pub events: Vec<Event>,
    pub lambda_home: f64,
    pub lambda_away: f64,
    pub climate: ClimateId,
    pub minutes: u16,
    #[serde(default)]
    pub outcome: Option<MatchOutcome>,
}

impl HistoryRecord {
    pub fn from_result(result: &MatchResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            home_team: result.home_team.clone(),
            away_team: result.away_team.clone(),
            score_label: result.score_label(),
            events: result.events.clone(),
            lambda_home: result.lambda_home,
            lambda_away: result.lambda_away,
            climate: result.climate,
            minutes: result.minutes,
            outcome: Some(result.outcome()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: VecDeque<HistoryRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        let mut records: VecDeque<_> = records.into();
        records.truncate(MAX_HISTORY);
        Self { records }
    }

    pub fn push(&mut self, record: HistoryRecord) {
        self.records.push_front(record);
        self.records.truncate(MAX_HISTORY);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&HistoryRecord> {
        self.records.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn summary(&self) -> HistorySummary {
        let mut s = HistorySummary {
            matches: self.records.len(),
            ..HistorySummary::default()
        };
        for r in &self.records {
            match r.outcome {
                Some(MatchOutcome::HomeWin) => s.home_wins += 1,
                Some(MatchOutcome::AwayWin) => s.away_wins += 1,
                Some(MatchOutcome::Draw) => s.draws += 1,
                None => {}
            }
            s.goals += r
                .events
                .iter()
                .filter(|e| e.category == crate::event::EventCategory::Goal)
                .count();
        }
        s
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub matches: usize,
    pub home_wins: usize,
    pub draws: usize,
    pub away_wins: usize,
    pub goals: usize,
}

impl HistorySummary {
    pub fn goals_per_match(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.goals as f64 / self.matches as f64
        }
    }
}
