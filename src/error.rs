use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid match config: {0}")]
    Validation(#[from] ValidationError),

    #[error("degenerate goal rate inputs: attack {attack}, defense {defense}, climate {climate_factor}")]
    DegenerateRate {
        attack: f64,
        defense: f64,
        climate_factor: f64,
    },

    #[error("goal rate {lambda} is outside the supported range")]
    UnsupportedRate { lambda: f64 },

    #[error("poisson sampler gave up after {draws} draws (lambda {lambda})")]
    SamplerNonTermination { lambda: f64, draws: u32 },
}

impl EngineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConfigField {
    HomeTeam,
    AwayTeam,
    Duration,
    Penalties,
    HomeAttack,
    HomeDefense,
    AwayAttack,
    AwayDefense,
}

impl ConfigField {
    pub fn label(self) -> &'static str {
        match self {
            ConfigField::HomeTeam => "home_team",
            ConfigField::AwayTeam => "away_team",
            ConfigField::Duration => "duration_minutes",
            ConfigField::Penalties => "penalties",
            ConfigField::HomeAttack => "home_attack",
            ConfigField::HomeDefense => "home_defense",
            ConfigField::AwayAttack => "away_attack",
            ConfigField::AwayDefense => "away_defense",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Problem {
    Missing,
    SameAsHome,
    DurationNotAllowed,
    DurationOutOfRange,
    PenaltiesWithoutExtraTime,
    RatingOutOfRange,
}

impl Problem {
    pub fn message(self) -> &'static str {
        match self {
            Problem::Missing => "a team must be selected",
            Problem::SameAsHome => "teams must be different",
            Problem::DurationNotAllowed => "duration must be 30, 60 or 90 minutes",
            Problem::DurationOutOfRange => "duration must be between 30 and 120 minutes",
            Problem::PenaltiesWithoutExtraTime => "penalties require extra time",
            Problem::RatingOutOfRange => "rating must be between 0.5 and 2.5",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: ConfigField,
    pub problem: Problem,
}

/// Every offending field of one config, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn push(&mut self, field: ConfigField, problem: Problem) {
        self.issues.push(FieldIssue { field, problem });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has(&self, field: ConfigField) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }

    pub fn fields(&self) -> Vec<ConfigField> {
        self.issues.iter().map(|i| i.field).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .issues
            .iter()
            .map(|i| format!("{}: {}", i.field.label(), i.problem.message()))
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}
