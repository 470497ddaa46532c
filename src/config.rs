use serde::{Deserialize, Serialize};

use crate::error::{ConfigField, Problem, ValidationError};
use crate::ratings::{self, ClimateId};

pub const ALLOWED_DURATIONS: [u16; 3] = [30, 60, 90];
pub const MIN_MINUTES: u16 = 30;
pub const MAX_MINUTES: u16 = 120;
pub const MIN_RATING: f64 = 0.5;
pub const MAX_RATING: f64 = 2.5;
pub const EXTRA_TIME_MINUTES: u16 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineVariant {
    /// Single phase, goals only, any duration in 30..=120.
    Quick,
    /// Regulation plus optional extra time and penalties, duration 30/60/90.
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub home_team: String,
    pub away_team: String,
    pub duration_minutes: u16,
    pub extra_time: bool,
    pub penalties: bool,
    pub climate: ClimateId,
    pub home_attack: f64,
    pub home_defense: f64,
    pub away_attack: f64,
    pub away_defense: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            home_team: String::new(),
            away_team: String::new(),
            duration_minutes: 90,
            extra_time: false,
            penalties: false,
            climate: ClimateId::Normal,
            home_attack: 1.1,
            home_defense: 1.0,
            away_attack: 1.0,
            away_defense: 1.05,
        }
    }
}

impl MatchConfig {
    pub fn for_teams(home: &str, away: &str) -> Self {
        let h = ratings::team_ratings(home);
        let a = ratings::team_ratings(away);
        Self {
            home_team: home.trim().to_string(),
            away_team: away.trim().to_string(),
            home_attack: h.attack,
            home_defense: h.defense,
            away_attack: a.attack,
            away_defense: a.defense,
            ..Self::default()
        }
    }

    pub fn validate(&self, variant: EngineVariant) -> Result<(), ValidationError> {
        let mut err = ValidationError::default();

        let home = self.home_team.trim();
        let away = self.away_team.trim();
        if home.is_empty() {
            err.push(ConfigField::HomeTeam, Problem::Missing);
        }
        if away.is_empty() {
            err.push(ConfigField::AwayTeam, Problem::Missing);
        } else if !home.is_empty() && home.to_lowercase() == away.to_lowercase() {
            err.push(ConfigField::AwayTeam, Problem::SameAsHome);
        }

        match variant {
            EngineVariant::Full => {
                if !ALLOWED_DURATIONS.contains(&self.duration_minutes) {
                    err.push(ConfigField::Duration, Problem::DurationNotAllowed);
                }
            }
            EngineVariant::Quick => {
                if !(MIN_MINUTES..=MAX_MINUTES).contains(&self.duration_minutes) {
                    err.push(ConfigField::Duration, Problem::DurationOutOfRange);
                }
            }
        }

        if self.penalties && !self.extra_time {
            err.push(ConfigField::Penalties, Problem::PenaltiesWithoutExtraTime);
        }

        let ratings = [
            (ConfigField::HomeAttack, self.home_attack),
            (ConfigField::HomeDefense, self.home_defense),
            (ConfigField::AwayAttack, self.away_attack),
            (ConfigField::AwayDefense, self.away_defense),
        ];
        for (field, value) in ratings {
            if !rating_in_range(value) {
                err.push(field, Problem::RatingOutOfRange);
            }
        }

        if err.is_empty() { Ok(()) } else { Err(err) }
    }

    pub fn climate_factor(&self) -> f64 {
        ratings::climate(self.climate).factor
    }

    pub fn climate_label(&self) -> &'static str {
        ratings::climate(self.climate).label
    }
}

fn rating_in_range(value: f64) -> bool {
    value.is_finite() && (MIN_RATING..=MAX_RATING).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> MatchConfig {
        MatchConfig {
            home_team: "A".to_string(),
            away_team: "B".to_string(),
            ..MatchConfig::default()
        }
    }

    #[test]
    fn default_form_matches_simulator_defaults() {
        let cfg = MatchConfig::default();
        assert_eq!(cfg.duration_minutes, 90);
        assert_eq!(cfg.home_attack, 1.1);
        assert_eq!(cfg.away_defense, 1.05);
        assert_eq!(cfg.climate, ClimateId::Normal);
    }

    #[test]
    fn valid_config_passes_both_variants() {
        assert!(valid().validate(EngineVariant::Full).is_ok());
        assert!(valid().validate(EngineVariant::Quick).is_ok());
    }

    #[test]
    fn missing_and_identical_teams_are_reported() {
        let cfg = MatchConfig::default();
        let err = cfg.validate(EngineVariant::Full).unwrap_err();
        assert_eq!(err.fields(), vec![ConfigField::HomeTeam, ConfigField::AwayTeam]);

        let mut same = valid();
        same.away_team = "a".to_string();
        let err = same.validate(EngineVariant::Full).unwrap_err();
        assert_eq!(err.issues[0].problem, Problem::SameAsHome);
    }

    #[test]
    fn duration_rules_differ_per_variant() {
        let mut cfg = valid();
        cfg.duration_minutes = 75;
        assert!(cfg.validate(EngineVariant::Quick).is_ok());
        let err = cfg.validate(EngineVariant::Full).unwrap_err();
        assert!(err.has(ConfigField::Duration));

        cfg.duration_minutes = 125;
        assert!(cfg.validate(EngineVariant::Quick).is_err());
    }

    #[test]
    fn penalties_need_extra_time() {
        let mut cfg = valid();
        cfg.penalties = true;
        for variant in [EngineVariant::Full, EngineVariant::Quick] {
            let err = cfg.validate(variant).unwrap_err();
            assert_eq!(err.fields(), vec![ConfigField::Penalties]);
        }
        cfg.extra_time = true;
        assert!(cfg.validate(EngineVariant::Full).is_ok());
        assert!(cfg.validate(EngineVariant::Quick).is_ok());
    }

    #[test]
    fn same_team_check_folds_accents() {
        let mut cfg = valid();
        cfg.home_team = "Unión Española".to_string();
        cfg.away_team = "UNIÓN ESPAÑOLA".to_string();
        let err = cfg.validate(EngineVariant::Full).unwrap_err();
        assert_eq!(err.fields(), vec![ConfigField::AwayTeam]);
        assert_eq!(err.issues[0].problem, Problem::SameAsHome);
    }

    #[test]
    fn non_positive_ratings_are_rejected() {
        let mut cfg = valid();
        cfg.home_defense = 0.0;
        cfg.away_attack = f64::NAN;
        let err = cfg.validate(EngineVariant::Full).unwrap_err();
        assert_eq!(
            err.fields(),
            vec![ConfigField::HomeDefense, ConfigField::AwayAttack]
        );
    }

    #[test]
    fn partial_saved_form_fills_defaults() {
        let cfg: MatchConfig =
            serde_json::from_str(r#"{"home_team":"Cobresal","climate":"calor"}"#).unwrap();
        assert_eq!(cfg.home_team, "Cobresal");
        assert_eq!(cfg.climate, ClimateId::Calor);
        assert_eq!(cfg.duration_minutes, 90);
    }

    #[test]
    fn for_teams_uses_table_ratings() {
        let cfg = MatchConfig::for_teams("Colo-Colo", "Palestino");
        assert_eq!(cfg.home_attack, 1.25);
        assert_eq!(cfg.away_defense, 1.00);
        assert!(cfg.validate(EngineVariant::Full).is_ok());
    }
}
