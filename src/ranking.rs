use serde::Serialize;

use crate::contestant::Contestant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub position: usize,
    pub contestant: Contestant,
}

/// Order contestants by score, highest first.
///
/// Ties keep their input (queue) order. Tied scores share a position and the
/// position only advances by one when the score drops, so `[10, 8, 8, 3]`
/// ranks as `1, 2, 2, 3`.
pub fn rank(contestants: &[Contestant]) -> Vec<RankingEntry> {
    let mut ordered: Vec<&Contestant> = contestants.iter().collect();
    // `sort_by` is stable, which is what keeps ties in queue order.
    ordered.sort_by(|a, b| b.score.cmp(&a.score));

    let mut out = Vec::with_capacity(ordered.len());
    let mut position = 0usize;
    let mut prev_score: Option<i64> = None;
    for c in ordered {
        match prev_score {
            Some(prev) if c.score >= prev => {}
            _ => position += 1,
        }
        prev_score = Some(c.score);
        out.push(RankingEntry {
            position,
            contestant: c.clone(),
        });
    }
    out
}

pub fn leader(contestants: &[Contestant]) -> Option<RankingEntry> {
    rank(contestants).into_iter().next()
}
