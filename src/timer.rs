use std::time::{Duration, Instant};

use chrono::Duration as ChronoDuration;
use serde::Serialize;

pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);
pub const BLINK_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    Running,
    Paused,
}

/// A cancellable repeating deadline. Only one deadline is held, so arming an
/// armed task cannot stack a second loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    period: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTask {
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Arm the task one period from `now`. Keeps the current deadline if it is
    /// already armed.
    pub fn arm(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.period);
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Number of periods that elapsed by `now`; the deadline moves past them.
    pub fn fire_due(&mut self, now: Instant) -> u32 {
        let Some(due) = self.next_due else {
            return 0;
        };
        if now < due {
            return 0;
        }
        let behind = now.duration_since(due).as_nanos() / self.period.as_nanos().max(1);
        let fired = u32::try_from(behind).unwrap_or(u32::MAX - 1) + 1;
        self.next_due = Some(due + self.period * fired);
        fired
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerTicks {
    pub countdown: u32,
    pub blink: u32,
}

impl TimerTicks {
    pub fn any(&self) -> bool {
        self.countdown > 0 || self.blink > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerView {
    pub text: String,
    pub clock: String,
    pub state: TimerState,
    pub blink_phase: bool,
}

/// Match clock. Counts down once per second while running and keeps going
/// past zero; flashes while paused.
#[derive(Debug, Clone)]
pub struct Timer {
    remaining: ChronoDuration,
    state: TimerState,
    blink_phase: bool,
    countdown: PeriodicTask,
    blink: PeriodicTask,
}

impl Timer {
    pub fn new(seed_secs: i64, now: Instant) -> Self {
        let mut blink = PeriodicTask::new(BLINK_PERIOD);
        blink.arm(now);
        Self {
            remaining: ChronoDuration::try_seconds(seed_secs)
                .unwrap_or_else(ChronoDuration::zero),
            state: TimerState::Paused,
            blink_phase: false,
            countdown: PeriodicTask::new(COUNTDOWN_PERIOD),
            blink,
        }
    }

    pub fn remaining(&self) -> ChronoDuration {
        self.remaining
    }

    pub fn remaining_secs(&self) -> i64 {
        self.remaining.num_seconds()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    pub fn blink_phase(&self) -> bool {
        self.blink_phase
    }

    pub fn countdown_pending(&self) -> bool {
        self.countdown.is_armed()
    }

    pub fn blink_pending(&self) -> bool {
        self.blink.is_armed()
    }

    pub fn toggle(&mut self, now: Instant) -> TimerState {
        match self.state {
            TimerState::Paused => {
                self.blink.cancel();
                self.blink_phase = false;
                self.countdown.arm(now);
                self.state = TimerState::Running;
            }
            TimerState::Running => {
                self.countdown.cancel();
                self.blink.arm(now);
                self.state = TimerState::Paused;
            }
        }
        self.state
    }

    /// Shift the clock by `delta_secs` in either state.
    /// Out-of-range adjustments are ignored.
    pub fn adjust(&mut self, delta_secs: i64) {
        if let Some(next) = ChronoDuration::try_seconds(delta_secs)
            .and_then(|delta| self.remaining.checked_add(&delta))
        {
            self.remaining = next;
        }
    }

    /// Apply every tick that came due by `now`.
    pub fn poll(&mut self, now: Instant) -> TimerTicks {
        let countdown = self.countdown.fire_due(now);
        if countdown > 0 {
            self.adjust(-i64::from(countdown));
        }
        let blink = self.blink.fire_due(now);
        if blink % 2 == 1 {
            self.blink_phase = !self.blink_phase;
        }
        TimerTicks { countdown, blink }
    }

    /// Clock text, blanked to the same width on the "off" half of a blink.
    pub fn display(&self) -> String {
        let clock = self.clock_text();
        if self.is_paused() && self.blink_phase {
            " ".repeat(clock.chars().count())
        } else {
            clock
        }
    }

    pub fn clock_text(&self) -> String {
        format_clock(self.remaining_secs())
    }

    pub fn view(&self) -> TimerView {
        TimerView {
            text: self.display(),
            clock: self.clock_text(),
            state: self.state,
            blink_phase: self.blink_phase,
        }
    }
}

pub fn format_clock(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let abs = secs.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}
