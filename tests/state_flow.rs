use simfut_terminal::config::{EngineVariant, MatchConfig};
use simfut_terminal::playback::PlaybackStatus;
use simfut_terminal::ratings::{self, ClimateId, TEAMS};
use simfut_terminal::rng::RngSource;
use simfut_terminal::state::{AppState, FormField, Screen};

fn ready_state() -> AppState {
    let mut state = AppState::new();
    state.form = MatchConfig::for_teams("Colo-Colo", "Palestino");
    state
}

#[test]
fn picking_a_team_loads_its_ratings() {
    let mut state = AppState::new();
    state.form_field = FormField::HomeTeam;
    state.adjust_field(1);
    assert_eq!(state.form.home_team, TEAMS[0]);
    let r = ratings::team_ratings(TEAMS[0]);
    assert_eq!(state.form.home_attack, r.attack);
    assert_eq!(state.form.home_defense, r.defense);
    assert!(state.form_dirty);

    state.adjust_field(-1);
    assert!(state.form.home_team.is_empty());
}

#[test]
fn penalties_and_extra_time_stay_consistent() {
    let mut state = ready_state();
    state.form_field = FormField::Penalties;
    state.adjust_field(1);
    assert!(state.form.penalties && state.form.extra_time);

    state.form_field = FormField::ExtraTime;
    state.adjust_field(1);
    assert!(!state.form.extra_time && !state.form.penalties);
}

#[test]
fn duration_steps_depend_on_engine() {
    let mut state = ready_state();
    state.form_field = FormField::Duration;
    state.adjust_field(1);
    assert_eq!(state.form.duration_minutes, 30);

    state.toggle_variant();
    assert_eq!(state.variant, EngineVariant::Quick);
    state.adjust_field(1);
    assert_eq!(state.form.duration_minutes, 35);

    state.toggle_variant();
    assert_eq!(state.form.duration_minutes, 30);
}

#[test]
fn ratings_are_clamped_while_stepping() {
    let mut state = ready_state();
    state.form_field = FormField::AwayDefense;
    for _ in 0..100 {
        state.adjust_field(1);
    }
    assert_eq!(state.form.away_defense, 2.5);
    for _ in 0..100 {
        state.adjust_field(-1);
    }
    assert_eq!(state.form.away_defense, 0.5);
}

#[test]
fn climate_cycles_through_catalog() {
    let mut state = ready_state();
    state.form_field = FormField::Climate;
    let mut seen = vec![state.form.climate];
    for _ in 0..3 {
        state.adjust_field(1);
        seen.push(state.form.climate);
    }
    assert_eq!(seen.len(), ClimateId::ALL.len());
    assert!(ClimateId::ALL.iter().all(|c| seen.contains(c)));
    state.adjust_field(1);
    assert_eq!(state.form.climate, ClimateId::Normal);
}

#[test]
fn invalid_form_reports_field_errors() {
    let mut state = AppState::new();
    state.form.home_team = "Cobresal".to_string();
    state.form.away_team = "Cobresal".to_string();
    let record = state.run_simulation(&mut RngSource::seeded(1));
    assert!(record.is_none());
    assert!(state.playback.is_none());
    assert!(state.history.is_empty());
    assert!(state.field_error(FormField::AwayTeam).is_some());
    assert!(state.field_error(FormField::HomeTeam).is_none());
    assert!(state.logs.back().unwrap().starts_with("[WARN]"));
}

#[test]
fn successful_run_starts_playback_and_records_history() {
    let mut state = ready_state();
    let record = state.run_simulation(&mut RngSource::seeded(4)).unwrap();
    assert!(state.errors.is_none());
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.selected_history(), Some(&record));

    let playback = state.playback.as_mut().unwrap();
    assert_eq!(playback.status(), PlaybackStatus::Running);
    while playback.status() != PlaybackStatus::Finished {
        playback.tick();
    }
    let res = playback.result();
    assert_eq!(playback.score(), (res.goals_home, res.goals_away));
    assert_eq!(record.score_label, res.score_label());

    state.clear_result();
    assert!(state.playback.is_none());
    assert_eq!(state.history.len(), 1);
}

#[test]
fn history_selection_wraps_and_clears() {
    let mut state = ready_state();
    let mut rng = RngSource::seeded(10);
    for _ in 0..3 {
        state.run_simulation(&mut rng).unwrap();
    }
    state.toggle_screen();
    assert_eq!(state.screen, Screen::History);
    state.select_history_prev();
    assert_eq!(state.history_selected, 2);
    state.select_history_next();
    assert_eq!(state.history_selected, 0);

    state.clear_history();
    assert!(state.history.is_empty());
    assert!(state.selected_history().is_none());
}

#[test]
fn log_console_is_bounded() {
    let mut state = AppState::new();
    for n in 0..500 {
        state.push_log(format!("[INFO] line {n}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().unwrap(), "[INFO] line 300");
}
