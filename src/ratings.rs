use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClimateId {
    #[default]
    Normal,
    Lluvia,
    Viento,
    Calor,
}

impl ClimateId {
    pub const ALL: [ClimateId; 4] = [
        ClimateId::Normal,
        ClimateId::Lluvia,
        ClimateId::Viento,
        ClimateId::Calor,
    ];

    /// Unknown or blank ids fall back to `Normal`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "lluvia" | "rain" => ClimateId::Lluvia,
            "viento" | "wind" => ClimateId::Viento,
            "calor" | "heat" => ClimateId::Calor,
            _ => ClimateId::Normal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClimateId::Normal => "normal",
            ClimateId::Lluvia => "lluvia",
            ClimateId::Viento => "viento",
            ClimateId::Calor => "calor",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Climate {
    pub id: ClimateId,
    pub label: &'static str,
    pub factor: f64,
}

pub const CLIMATES: [Climate; 4] = [
    Climate {
        id: ClimateId::Normal,
        label: "Normal",
        factor: 1.0,
    },
    Climate {
        id: ClimateId::Lluvia,
        label: "Lluvia",
        factor: 0.9,
    },
    Climate {
        id: ClimateId::Viento,
        label: "Viento",
        factor: 0.95,
    },
    Climate {
        id: ClimateId::Calor,
        label: "Calor",
        factor: 0.92,
    },
];

pub fn climate(id: ClimateId) -> &'static Climate {
    CLIMATES
        .iter()
        .find(|c| c.id == id)
        .unwrap_or(&CLIMATES[0])
}

pub fn climate_by_name(raw: Option<&str>) -> &'static Climate {
    climate(raw.map(ClimateId::parse).unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamRatings {
    pub attack: f64,
    pub defense: f64,
}

impl TeamRatings {
    pub const NEUTRAL: TeamRatings = TeamRatings {
        attack: 1.0,
        defense: 1.0,
    };
}

impl Default for TeamRatings {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

// Display order matches the team picker.
const TEAM_TABLE: &[(&str, f64, f64)] = &[
    ("Colo-Colo", 1.25, 1.15),
    ("Universidad de Chile", 1.15, 1.10),
    ("Universidad Católica", 1.20, 1.05),
    ("Cobresal", 1.00, 1.00),
    ("Huachipato", 1.05, 0.95),
    ("Coquimbo Unido", 1.00, 1.05),
    ("Unión Española", 0.95, 0.95),
    ("Audax Italiano", 0.95, 0.90),
    ("O'Higgins", 0.95, 1.00),
    ("Palestino", 1.05, 1.00),
];

pub static TEAMS: Lazy<Vec<&'static str>> =
    Lazy::new(|| TEAM_TABLE.iter().map(|(name, _, _)| *name).collect());

static TEAM_INDEX: Lazy<HashMap<String, TeamRatings>> = Lazy::new(|| {
    TEAM_TABLE
        .iter()
        .map(|(name, attack, defense)| {
            (
                team_key(name),
                TeamRatings {
                    attack: *attack,
                    defense: *defense,
                },
            )
        })
        .collect()
});

/// Unknown teams get neutral `{1.0, 1.0}` ratings.
pub fn team_ratings(name: &str) -> TeamRatings {
    TEAM_INDEX
        .get(&team_key(name))
        .copied()
        .unwrap_or(TeamRatings::NEUTRAL)
}

pub fn is_known_team(name: &str) -> bool {
    TEAM_INDEX.contains_key(&team_key(name))
}

fn team_key(name: &str) -> String {
    name.trim().to_lowercase()
}
