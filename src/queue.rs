use serde::Serialize;

use crate::contestant::{Contestant, ContestantId};
use crate::error::{Outcome, Result, ScoreboardError};
use crate::selection::{SelectionTracker, is_waiting_index};

pub const KING_SLOT: usize = 0;
pub const CHALLENGER_SLOT: usize = 1;
/// Slots from here to the end are the waiting queue, soonest-facing first.
pub const FIRST_WAITING_SLOT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    King,
    Challenger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// What an accepted role operation did, for observers and the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleEvent {
    ScoreAdjusted {
        role: Role,
        contestant: ContestantId,
        name: String,
        delta: i64,
        score: i64,
    },
    KingToQueue {
        departed: String,
        king: String,
        challenger: String,
    },
    ChallengerPromoted {
        dethroned: String,
        king: String,
        challenger: String,
    },
    ChallengerToQueue {
        departed: String,
        challenger: String,
    },
    Reordered {
        name: String,
        from: usize,
        to: usize,
    },
}

impl RoleEvent {
    pub fn describe(&self) -> String {
        match self {
            RoleEvent::ScoreAdjusted {
                role, name, delta, score, ..
            } => {
                let role = match role {
                    Role::King => "king",
                    Role::Challenger => "challenger",
                };
                format!("{name} ({role}) {delta:+} -> {score}")
            }
            RoleEvent::KingToQueue {
                departed,
                king,
                challenger,
            } => format!("{departed} back to queue, {king} is king, {challenger} challenges"),
            RoleEvent::ChallengerPromoted {
                dethroned,
                king,
                challenger,
            } => format!("{king} dethrones {dethroned}, {challenger} challenges"),
            RoleEvent::ChallengerToQueue {
                departed,
                challenger,
            } => format!("{departed} back to queue, {challenger} challenges"),
            RoleEvent::Reordered { name, from, to } => {
                format!("{name} moved from slot {from} to {to}")
            }
        }
    }
}

/// Single owner of the contestant order.
///
/// Slot 0 is the king, slot 1 the challenger, the rest wait in line. The
/// length never changes after construction.
#[derive(Debug, Clone)]
pub struct ContestantQueue {
    entries: Vec<Contestant>,
    selection: SelectionTracker,
}

impl ContestantQueue {
    pub fn new(contestants: Vec<Contestant>) -> Self {
        Self {
            entries: contestants,
            selection: SelectionTracker::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contestants(&self) -> &[Contestant] {
        &self.entries
    }

    pub fn king(&self) -> Option<&Contestant> {
        self.entries.get(KING_SLOT)
    }

    pub fn challenger(&self) -> Option<&Contestant> {
        self.entries.get(CHALLENGER_SLOT)
    }

    pub fn waiting(&self) -> &[Contestant] {
        self.entries.get(FIRST_WAITING_SLOT..).unwrap_or(&[])
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.index_in(&self.entries)
    }

    pub fn adjust_king_score(&mut self, delta: i64) -> Result<RoleEvent> {
        self.adjust_score(Role::King, delta)
    }

    pub fn adjust_challenger_score(&mut self, delta: i64) -> Result<RoleEvent> {
        self.adjust_score(Role::Challenger, delta)
    }

    fn adjust_score(&mut self, role: Role, delta: i64) -> Result<RoleEvent> {
        self.ensure_pair()?;
        let slot = match role {
            Role::King => KING_SLOT,
            Role::Challenger => CHALLENGER_SLOT,
        };
        let c = &mut self.entries[slot];
        c.add_points(delta);
        Ok(RoleEvent::ScoreAdjusted {
            role,
            contestant: c.id,
            name: c.name.clone(),
            delta,
            score: c.score,
        })
    }

    /// King goes to the back of the line; everyone else moves up one slot.
    pub fn rotate_king_to_queue(&mut self) -> Result<RoleEvent> {
        self.ensure_pair()?;
        self.entries.rotate_left(1);
        self.selection.revalidate(&self.entries);
        Ok(RoleEvent::KingToQueue {
            departed: self.last_name(),
            king: self.entries[KING_SLOT].name.clone(),
            challenger: self.entries[CHALLENGER_SLOT].name.clone(),
        })
    }

    /// The challenger takes the crown. Same movement as
    /// [`rotate_king_to_queue`](Self::rotate_king_to_queue): the old king
    /// queues at the back and the challenger shifts into slot 0.
    pub fn promote_challenger_to_king(&mut self) -> Result<RoleEvent> {
        match self.rotate_king_to_queue()? {
            RoleEvent::KingToQueue {
                departed,
                king,
                challenger,
            } => Ok(RoleEvent::ChallengerPromoted {
                dethroned: departed,
                king,
                challenger,
            }),
            other => Ok(other),
        }
    }

    /// Challenger goes to the back of the line; the king keeps slot 0.
    pub fn return_challenger_to_queue(&mut self) -> Result<RoleEvent> {
        self.ensure_pair()?;
        self.entries[CHALLENGER_SLOT..].rotate_left(1);
        self.selection.revalidate(&self.entries);
        Ok(RoleEvent::ChallengerToQueue {
            departed: self.last_name(),
            challenger: self.entries[CHALLENGER_SLOT].name.clone(),
        })
    }

    /// Swap a waiting contestant with its neighbour. Never moves anyone into
    /// the king or challenger slot; boundaries return `None`.
    pub fn reorder_waiting(
        &mut self,
        index: usize,
        direction: MoveDirection,
    ) -> Result<Option<RoleEvent>> {
        self.ensure_pair()?;
        if !is_waiting_index(&self.entries, index) {
            return Err(ScoreboardError::InvalidSelection {
                index,
                len: self.entries.len(),
            });
        }
        let target = match direction {
            MoveDirection::Up if index > FIRST_WAITING_SLOT => index - 1,
            MoveDirection::Down if index + 1 < self.entries.len() => index + 1,
            _ => return Ok(None),
        };
        self.entries.swap(index, target);
        Ok(Some(RoleEvent::Reordered {
            name: self.entries[target].name.clone(),
            from: index,
            to: target,
        }))
    }

    pub fn select(&mut self, index: usize) -> Result<Outcome> {
        self.ensure_pair()?;
        self.selection.select(&self.entries, index)
    }

    pub fn clear_selection(&mut self) -> Outcome {
        self.selection.clear()
    }

    /// `None` when nothing is selected or the selection is already first.
    pub fn move_selection_up(&mut self) -> Result<Option<RoleEvent>> {
        self.move_selection(MoveDirection::Up)
    }

    pub fn move_selection_down(&mut self) -> Result<Option<RoleEvent>> {
        self.move_selection(MoveDirection::Down)
    }

    fn move_selection(&mut self, direction: MoveDirection) -> Result<Option<RoleEvent>> {
        self.ensure_pair()?;
        let Some(index) = self.selected_index() else {
            return Ok(None);
        };
        self.reorder_waiting(index, direction)
    }

    fn ensure_pair(&self) -> Result<()> {
        if self.entries.len() < 2 {
            return Err(ScoreboardError::InsufficientContestants {
                count: self.entries.len(),
            });
        }
        Ok(())
    }

    fn last_name(&self) -> String {
        self.entries
            .last()
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }
}
