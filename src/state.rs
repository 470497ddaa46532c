use std::collections::VecDeque;
use std::env;

use chrono::Utc;

use crate::config::{
    ALLOWED_DURATIONS, EngineVariant, MAX_MINUTES, MAX_RATING, MIN_MINUTES, MIN_RATING,
    MatchConfig,
};
use crate::engine::{self, EngineOptions, MatchResult};
use crate::error::{ConfigField, EngineError, ValidationError};
use crate::history::{History, HistoryRecord};
use crate::playback::Playback;
use crate::ratings::{self, TEAMS};
use crate::rng::RandomSource;

const MAX_LOGS: usize = 200;
const RATING_STEP: f64 = 0.05;
const QUICK_MINUTES_STEP: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Simulator,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    HomeTeam,
    AwayTeam,
    Duration,
    Climate,
    ExtraTime,
    Penalties,
    HomeAttack,
    HomeDefense,
    AwayAttack,
    AwayDefense,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        FormField::HomeTeam,
        FormField::AwayTeam,
        FormField::Duration,
        FormField::Climate,
        FormField::ExtraTime,
        FormField::Penalties,
        FormField::HomeAttack,
        FormField::HomeDefense,
        FormField::AwayAttack,
        FormField::AwayDefense,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::HomeTeam => "Home",
            FormField::AwayTeam => "Away",
            FormField::Duration => "Minutes",
            FormField::Climate => "Climate",
            FormField::ExtraTime => "Extra time",
            FormField::Penalties => "Penalties",
            FormField::HomeAttack => "Atk H",
            FormField::HomeDefense => "Def H",
            FormField::AwayAttack => "Atk A",
            FormField::AwayDefense => "Def A",
        }
    }

    pub fn config_field(self) -> Option<ConfigField> {
        match self {
            FormField::HomeTeam => Some(ConfigField::HomeTeam),
            FormField::AwayTeam => Some(ConfigField::AwayTeam),
            FormField::Duration => Some(ConfigField::Duration),
            FormField::Penalties => Some(ConfigField::Penalties),
            FormField::HomeAttack => Some(ConfigField::HomeAttack),
            FormField::HomeDefense => Some(ConfigField::HomeDefense),
            FormField::AwayAttack => Some(ConfigField::AwayAttack),
            FormField::AwayDefense => Some(ConfigField::AwayDefense),
            FormField::Climate | FormField::ExtraTime => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub form: MatchConfig,
    pub form_field: FormField,
    pub variant: EngineVariant,
    pub options: EngineOptions,
    pub errors: Option<ValidationError>,
    pub playback: Option<Playback>,
    pub history: History,
    pub history_selected: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub form_dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let card_intensity = env::var("SIM_CARD_INTENSITY")
            .ok()
            .and_then(|val| val.parse::<f64>().ok())
            .unwrap_or(1.0)
            .clamp(0.0, 3.0);
        Self {
            screen: Screen::Simulator,
            form: MatchConfig::default(),
            form_field: FormField::HomeTeam,
            variant: EngineVariant::Full,
            options: EngineOptions { card_intensity },
            errors: None,
            playback: None,
            history: History::new(),
            history_selected: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            form_dirty: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn toggle_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Simulator => Screen::History,
            Screen::History => Screen::Simulator,
        };
        self.clamp_history_selection();
    }

    pub fn toggle_variant(&mut self) {
        self.variant = match self.variant {
            EngineVariant::Full => EngineVariant::Quick,
            EngineVariant::Quick => EngineVariant::Full,
        };
        if self.variant == EngineVariant::Full
            && !ALLOWED_DURATIONS.contains(&self.form.duration_minutes)
        {
            self.form.duration_minutes = nearest_allowed_duration(self.form.duration_minutes);
            self.form_dirty = true;
        }
        self.errors = None;
    }

    pub fn select_next_field(&mut self) {
        let idx = field_index(self.form_field);
        self.form_field = FormField::ALL[(idx + 1) % FormField::ALL.len()];
    }

    pub fn select_prev_field(&mut self) {
        let idx = field_index(self.form_field);
        let len = FormField::ALL.len();
        self.form_field = FormField::ALL[(idx + len - 1) % len];
    }

    pub fn adjust_field(&mut self, dir: i32) {
        let form = &mut self.form;
        match self.form_field {
            FormField::HomeTeam => {
                form.home_team = cycle_team(&form.home_team, dir);
                let r = ratings::team_ratings(&form.home_team);
                form.home_attack = r.attack;
                form.home_defense = r.defense;
            }
            FormField::AwayTeam => {
                form.away_team = cycle_team(&form.away_team, dir);
                let r = ratings::team_ratings(&form.away_team);
                form.away_attack = r.attack;
                form.away_defense = r.defense;
            }
            FormField::Duration => {
                form.duration_minutes = match self.variant {
                    EngineVariant::Full => cycle_allowed_duration(form.duration_minutes, dir),
                    EngineVariant::Quick => {
                        let next = form.duration_minutes as i32 + dir.signum() * QUICK_MINUTES_STEP;
                        next.clamp(MIN_MINUTES as i32, MAX_MINUTES as i32) as u16
                    }
                };
            }
            FormField::Climate => {
                form.climate = if dir >= 0 {
                    form.climate.next()
                } else {
                    form.climate.prev()
                };
            }
            FormField::ExtraTime => {
                form.extra_time = !form.extra_time;
                if !form.extra_time {
                    form.penalties = false;
                }
            }
            FormField::Penalties => {
                form.penalties = !form.penalties;
                if form.penalties {
                    form.extra_time = true;
                }
            }
            FormField::HomeAttack => step_rating(&mut form.home_attack, dir),
            FormField::HomeDefense => step_rating(&mut form.home_defense, dir),
            FormField::AwayAttack => step_rating(&mut form.away_attack, dir),
            FormField::AwayDefense => step_rating(&mut form.away_defense, dir),
        }
        self.form_dirty = true;
    }

    pub fn field_error(&self, field: FormField) -> Option<&'static str> {
        let target = field.config_field()?;
        self.errors
            .as_ref()?
            .issues
            .iter()
            .find(|i| i.field == target)
            .map(|i| i.problem.message())
    }

    /// Runs the selected engine on the current form. On success the result is loaded into
    /// playback and recorded in history; the new record is returned for persistence.
    pub fn run_simulation(&mut self, rng: &mut impl RandomSource) -> Option<HistoryRecord> {
        let outcome = match self.variant {
            EngineVariant::Full => engine::simulate_match_with(&self.form, &self.options, rng),
            EngineVariant::Quick => engine::simulate_quick(&self.form, rng),
        };

        match outcome {
            Ok(result) => {
                self.errors = None;
                self.push_log(format!(
                    "[INFO] Simulated {} ({}', {} events)",
                    result.score_label(),
                    result.minutes,
                    result.events.len()
                ));
                if let Some(shootout) = &result.shootout {
                    self.push_log(format!(
                        "[ALERT] Penalties {} ({:?})",
                        shootout.score_label(),
                        shootout.winner
                    ));
                }
                let record = HistoryRecord::from_result(&result, Utc::now());
                self.history.push(record.clone());
                self.history_selected = 0;
                self.load_playback(result);
                Some(record)
            }
            Err(EngineError::Validation(err)) => {
                self.push_log(format!("[WARN] Invalid config: {err}"));
                self.errors = Some(err);
                None
            }
            Err(err) => {
                self.push_log(format!("[WARN] Simulation failed: {err}"));
                None
            }
        }
    }

    fn load_playback(&mut self, result: MatchResult) {
        let mut playback = Playback::new(result);
        playback.start();
        self.playback = Some(playback);
    }

    pub fn clear_result(&mut self) {
        self.playback = None;
        self.errors = None;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history_selected = 0;
        self.push_log("[INFO] History cleared");
    }

    pub fn select_history_next(&mut self) {
        let total = self.history.len();
        if total == 0 {
            self.history_selected = 0;
            return;
        }
        self.history_selected = (self.history_selected + 1) % total;
    }

    pub fn select_history_prev(&mut self) {
        let total = self.history.len();
        if total == 0 {
            self.history_selected = 0;
            return;
        }
        if self.history_selected == 0 {
            self.history_selected = total - 1;
        } else {
            self.history_selected -= 1;
        }
    }

    pub fn clamp_history_selection(&mut self) {
        let total = self.history.len();
        if total == 0 {
            self.history_selected = 0;
        } else if self.history_selected >= total {
            self.history_selected = total - 1;
        }
    }

    pub fn selected_history(&self) -> Option<&HistoryRecord> {
        self.history.get(self.history_selected)
    }
}

fn field_index(field: FormField) -> usize {
    FormField::ALL
        .iter()
        .position(|f| *f == field)
        .unwrap_or(0)
}

/// Cycles through "no team" and the catalog. Unknown names restart from the catalog ends.
fn cycle_team(current: &str, dir: i32) -> String {
    let teams: &[&str] = &TEAMS;
    // Slot 0 is the empty placeholder, 1..=len are catalog teams.
    let slots = teams.len() + 1;
    let pos = teams
        .iter()
        .position(|t| t.eq_ignore_ascii_case(current.trim()))
        .map(|idx| idx + 1)
        .unwrap_or(0);
    let next = if dir >= 0 {
        (pos + 1) % slots
    } else {
        (pos + slots - 1) % slots
    };
    if next == 0 {
        String::new()
    } else {
        teams[next - 1].to_string()
    }
}

fn cycle_allowed_duration(current: u16, dir: i32) -> u16 {
    let pos = ALLOWED_DURATIONS
        .iter()
        .position(|d| *d == current)
        .unwrap_or(ALLOWED_DURATIONS.len() - 1);
    let len = ALLOWED_DURATIONS.len();
    let next = if dir >= 0 {
        (pos + 1) % len
    } else {
        (pos + len - 1) % len
    };
    ALLOWED_DURATIONS[next]
}

fn nearest_allowed_duration(minutes: u16) -> u16 {
    ALLOWED_DURATIONS
        .iter()
        .copied()
        .min_by_key(|d| d.abs_diff(minutes))
        .unwrap_or(90)
}

fn step_rating(value: &mut f64, dir: i32) {
    let next = *value + dir.signum() as f64 * RATING_STEP;
    *value = ((next * 100.0).round() / 100.0).clamp(MIN_RATING, MAX_RATING);
}
