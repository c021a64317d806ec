use std::collections::VecDeque;
use std::time::Instant;

use serde::Serialize;

use crate::audit::AuditLog;
use crate::config::Config;
use crate::contestant::{Contestant, seed_contestants};
use crate::error::{Outcome, Result};
use crate::queue::{ContestantQueue, FIRST_WAITING_SLOT, RoleEvent};
use crate::ranking::{RankingEntry, rank};
use crate::timer::{Timer, TimerState, TimerView};

const MAX_LOGS: usize = 200;
pub const DEFAULT_TIMER_STEP_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitingRow {
    pub slot: usize,
    pub contestant: Contestant,
    pub selected: bool,
}

/// Fully consistent view of the board after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub king: Option<Contestant>,
    pub challenger: Option<Contestant>,
    pub ranking: Vec<RankingEntry>,
    pub waiting: Vec<WaitingRow>,
    pub timer: TimerView,
}

/// Receives read-only notifications. Observers never get a mutable handle on
/// the board.
pub trait ScoreboardObserver {
    fn state_changed(&mut self, _snapshot: &Snapshot) {}

    fn role_event(&mut self, _event: &RoleEvent) {}
}

pub struct Scoreboard {
    queue: ContestantQueue,
    timer: Timer,
    timer_step_secs: i64,
    logs: VecDeque<String>,
    observers: Vec<Box<dyn ScoreboardObserver>>,
}

impl Scoreboard {
    pub fn new(contestants: Vec<Contestant>, clock_secs: i64, now: Instant) -> Self {
        Self {
            queue: ContestantQueue::new(contestants),
            timer: Timer::new(clock_secs, now),
            timer_step_secs: DEFAULT_TIMER_STEP_SECS,
            logs: VecDeque::with_capacity(MAX_LOGS),
            observers: Vec::new(),
        }
    }

    pub fn from_names<I, S>(names: I, clock_secs: i64, now: Instant) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(seed_contestants(names), clock_secs, now)
    }

    /// Board for a loaded config. Config warnings land in the log first; an
    /// audit log that cannot be opened is reported and skipped.
    pub fn from_config(cfg: &Config, now: Instant) -> Self {
        let mut board = Self::from_names(cfg.seed_order(), cfg.clock_secs, now)
            .with_timer_step(cfg.timer_step_secs);
        for warning in &cfg.warnings {
            board.push_log(warning.clone());
        }
        if let Some(path) = &cfg.audit_log {
            match AuditLog::open(path) {
                Ok(log) => {
                    board.push_log(format!("[INFO] Audit log: {}", log.path().display()));
                    board.add_observer(Box::new(log));
                }
                Err(err) => board.push_log(format!("[WARN] Audit log disabled: {err:#}")),
            }
        }
        board.push_log(format!(
            "[INFO] {} contestants, clock {}",
            board.queue().len(),
            board.timer().clock_text()
        ));
        board
    }

    pub fn with_timer_step(mut self, step_secs: i64) -> Self {
        self.timer_step_secs = step_secs;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn ScoreboardObserver>) {
        self.observers.push(observer);
    }

    pub fn queue(&self) -> &ContestantQueue {
        &self.queue
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn timer_step_secs(&self) -> i64 {
        self.timer_step_secs
    }

    pub fn logs(&self) -> &VecDeque<String> {
        &self.logs
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let contestants = self.queue.contestants();
        let selected = self.queue.selected_index();
        let waiting = contestants
            .iter()
            .enumerate()
            .skip(FIRST_WAITING_SLOT)
            .map(|(slot, c)| WaitingRow {
                slot,
                contestant: c.clone(),
                selected: selected == Some(slot),
            })
            .collect();
        Snapshot {
            king: self.queue.king().cloned(),
            challenger: self.queue.challenger().cloned(),
            ranking: rank(contestants),
            waiting,
            timer: self.timer.view(),
        }
    }

    pub fn adjust_king_score(&mut self, delta: i64) -> Result<RoleEvent> {
        self.apply_role(|q| q.adjust_king_score(delta))
    }

    pub fn adjust_challenger_score(&mut self, delta: i64) -> Result<RoleEvent> {
        self.apply_role(|q| q.adjust_challenger_score(delta))
    }

    pub fn rotate_king_to_queue(&mut self) -> Result<RoleEvent> {
        self.apply_role(ContestantQueue::rotate_king_to_queue)
    }

    pub fn promote_challenger_to_king(&mut self) -> Result<RoleEvent> {
        self.apply_role(ContestantQueue::promote_challenger_to_king)
    }

    pub fn return_challenger_to_queue(&mut self) -> Result<RoleEvent> {
        self.apply_role(ContestantQueue::return_challenger_to_queue)
    }

    pub fn select(&mut self, index: usize) -> Result<Outcome> {
        self.apply_selection(|q| q.select(index))
    }

    pub fn clear_selection(&mut self) -> Outcome {
        let outcome = self.queue.clear_selection();
        if outcome.changed() {
            self.notify();
        }
        outcome
    }

    pub fn move_selection_up(&mut self) -> Result<Outcome> {
        self.apply_reorder(ContestantQueue::move_selection_up)
    }

    pub fn move_selection_down(&mut self) -> Result<Outcome> {
        self.apply_reorder(ContestantQueue::move_selection_down)
    }

    pub fn toggle_timer(&mut self, now: Instant) -> TimerState {
        let state = self.timer.toggle(now);
        match state {
            TimerState::Running => self.push_log("[INFO] Clock running"),
            TimerState::Paused => self.push_log(format!(
                "[INFO] Clock paused at {}",
                self.timer.clock_text()
            )),
        }
        self.notify();
        state
    }

    pub fn adjust_timer(&mut self, delta_secs: i64) {
        self.timer.adjust(delta_secs);
        self.notify();
    }

    /// Adjust the clock by one configured step, forward or back.
    pub fn nudge_timer(&mut self, forward: bool) {
        let step = if forward {
            self.timer_step_secs
        } else {
            self.timer_step_secs.saturating_neg()
        };
        self.adjust_timer(step);
    }

    /// Drive the countdown and blink tasks. Call once per event-loop pass.
    pub fn poll_timer(&mut self, now: Instant) -> bool {
        let before = self.timer.remaining_secs();
        let ticks = self.timer.poll(now);
        if !ticks.any() {
            return false;
        }
        if before > 0 && self.timer.remaining_secs() <= 0 {
            self.push_log("[INFO] Time is up");
        }
        self.notify();
        true
    }

    fn apply_role(
        &mut self,
        op: impl FnOnce(&mut ContestantQueue) -> Result<RoleEvent>,
    ) -> Result<RoleEvent> {
        match op(&mut self.queue) {
            Ok(event) => {
                self.publish(&event);
                Ok(event)
            }
            Err(err) => {
                self.push_log(format!("[WARN] Rejected: {err}"));
                Err(err)
            }
        }
    }

    /// Waiting-queue moves: a swap goes out like any role change, a boundary
    /// or empty selection is a silent `NoOp`.
    fn apply_reorder(
        &mut self,
        op: impl FnOnce(&mut ContestantQueue) -> Result<Option<RoleEvent>>,
    ) -> Result<Outcome> {
        match op(&mut self.queue) {
            Ok(Some(event)) => {
                self.publish(&event);
                Ok(Outcome::Changed)
            }
            Ok(None) => Ok(Outcome::NoOp),
            Err(err) => {
                self.push_log(format!("[WARN] Rejected: {err}"));
                Err(err)
            }
        }
    }

    fn publish(&mut self, event: &RoleEvent) {
        self.push_log(format!("[INFO] {}", event.describe()));
        for observer in self.observers.iter_mut() {
            observer.role_event(event);
        }
        self.notify();
    }

    fn apply_selection(
        &mut self,
        op: impl FnOnce(&mut ContestantQueue) -> Result<Outcome>,
    ) -> Result<Outcome> {
        match op(&mut self.queue) {
            Ok(outcome) => {
                if outcome.changed() {
                    self.notify();
                }
                Ok(outcome)
            }
            Err(err) => {
                self.push_log(format!("[WARN] Rejected: {err}"));
                Err(err)
            }
        }
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in self.observers.iter_mut() {
            observer.state_changed(&snapshot);
        }
    }
}
