use crate::engine::MatchResult;
use crate::event::{Event, Period, Side, period_at};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Replays a finished result against a match clock.
///
/// The event list is already sorted, so "revealed" is always a prefix of it. `tick` only
/// moves the clock and the cursor forward; pausing and resuming never recompute anything,
/// and `reset` rewinds both to the start.
#[derive(Debug, Clone)]
pub struct Playback {
    result: MatchResult,
    clock: u16,
    cursor: usize,
    status: PlaybackStatus,
}

impl Playback {
    pub fn new(result: MatchResult) -> Self {
        Self {
            result,
            clock: 0,
            cursor: 0,
            status: PlaybackStatus::Idle,
        }
    }

    pub fn result(&self) -> &MatchResult {
        &self.result
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn clock(&self) -> u16 {
        self.clock
    }

    pub fn start(&mut self) {
        if matches!(self.status, PlaybackStatus::Idle | PlaybackStatus::Paused) {
            self.status = PlaybackStatus::Running;
            self.reveal_due();
        }
    }

    pub fn pause(&mut self) {
        if self.status == PlaybackStatus::Running {
            self.status = PlaybackStatus::Paused;
        }
    }

    pub fn toggle(&mut self) {
        match self.status {
            PlaybackStatus::Running => self.pause(),
            PlaybackStatus::Idle | PlaybackStatus::Paused => self.start(),
            PlaybackStatus::Finished => {}
        }
    }

    pub fn reset(&mut self) {
        self.clock = 0;
        self.cursor = 0;
        self.status = PlaybackStatus::Idle;
    }

    pub fn skip_to_end(&mut self) {
        self.clock = self.result.minutes;
        self.cursor = self.result.events.len();
        self.status = PlaybackStatus::Finished;
    }

    pub fn tick(&mut self) -> &[Event] {
        if self.status != PlaybackStatus::Running {
            return &[];
        }
        let before = self.cursor;
        if self.clock < self.result.minutes {
            self.clock += 1;
        }
        self.reveal_due();
        if self.clock >= self.result.minutes && self.cursor >= self.result.events.len() {
            self.status = PlaybackStatus::Finished;
        }
        &self.result.events[before..self.cursor]
    }

    fn reveal_due(&mut self) {
        let events = &self.result.events;
        while self.cursor < events.len() && events[self.cursor].minute <= self.clock {
            self.cursor += 1;
        }
    }

    pub fn revealed(&self) -> &[Event] {
        &self.result.events[..self.cursor]
    }

    pub fn score(&self) -> (u32, u32) {
        self.revealed().iter().fold((0, 0), |(h, a), e| {
            if e.is_goal_for(Side::Home) {
                (h + 1, a)
            } else if e.is_goal_for(Side::Away) {
                (h, a + 1)
            } else {
                (h, a)
            }
        })
    }

    pub fn period(&self) -> Period {
        if self.status == PlaybackStatus::Finished {
            return Period::FullTime;
        }
        period_at(
            self.clock,
            self.result.regulation_minutes,
            self.result.extra_time_played(),
        )
    }

    pub fn progress(&self) -> f64 {
        if self.result.minutes == 0 {
            return 1.0;
        }
        self.clock as f64 / self.result.minutes as f64
    }
}
