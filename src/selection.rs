use crate::contestant::{Contestant, ContestantId};
use crate::error::{Outcome, Result, ScoreboardError};
use crate::queue::FIRST_WAITING_SLOT;

/// Highlighted waiting contestant.
///
/// The selection is kept by contestant id and resolved to a slot on demand,
/// so it follows the person through reorders and rotations rather than
/// pointing at a fixed row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: Option<ContestantId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_id(&self) -> Option<ContestantId> {
        self.selected
    }

    /// Select the waiting contestant at `index`; selecting the same one again
    /// clears the selection.
    pub fn select(&mut self, queue: &[Contestant], index: usize) -> Result<Outcome> {
        if !is_waiting_index(queue, index) {
            return Err(ScoreboardError::InvalidSelection {
                index,
                len: queue.len(),
            });
        }
        let id = queue[index].id;
        if self.selected == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id);
        }
        Ok(Outcome::Changed)
    }

    /// Returns `NoOp` when nothing was selected.
    pub fn clear(&mut self) -> Outcome {
        match self.selected.take() {
            Some(_) => Outcome::Changed,
            None => Outcome::NoOp,
        }
    }

    pub fn index_in(&self, queue: &[Contestant]) -> Option<usize> {
        let id = self.selected?;
        queue
            .iter()
            .position(|c| c.id == id)
            .filter(|idx| *idx >= FIRST_WAITING_SLOT)
    }

    /// Drop the selection if its contestant is no longer waiting.
    pub fn revalidate(&mut self, queue: &[Contestant]) {
        if self.selected.is_some() && self.index_in(queue).is_none() {
            self.selected = None;
        }
    }
}

pub(crate) fn is_waiting_index(queue: &[Contestant], index: usize) -> bool {
    index >= FIRST_WAITING_SLOT && index < queue.len()
}
