use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoreboardError>;

/// Rejections from queue and selection operations. State is never mutated
/// when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreboardError {
    #[error("[KOTH-1001] need at least 2 contestants, have {count}")]
    InsufficientContestants { count: usize },

    #[error("[KOTH-1002] index {index} is not a waiting slot (queue length {len})")]
    InvalidSelection { index: usize, len: usize },
}

impl ScoreboardError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InsufficientContestants { .. } => "KOTH-1001",
            Self::InvalidSelection { .. } => "KOTH-1002",
        }
    }
}

/// Result of an accepted operation. `NoOp` covers boundary navigation and
/// moves with nothing selected; it is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    NoOp,
}

impl Outcome {
    pub fn changed(self) -> bool {
        matches!(self, Outcome::Changed)
    }
}
