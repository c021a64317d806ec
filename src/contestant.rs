use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContestantId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestant {
    pub id: ContestantId,
    pub name: String,
    pub score: i64,
}

impl Contestant {
    pub fn new(id: ContestantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
        }
    }

    pub fn add_points(&mut self, delta: i64) {
        self.score = self.score.saturating_add(delta);
    }
}

/// Build contestants from an ordered seed list. Ids follow seed order so two
/// entries with the same name stay distinguishable.
pub fn seed_contestants<I, S>(names: I) -> Vec<Contestant>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| Contestant::new(ContestantId(idx as u32), name))
        .collect()
}
