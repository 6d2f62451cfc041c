/// A pokemon can only remember this many moves at once
pub const MAX_MOVES: usize = 4;

/// Used when nothing in the learnset is available yet
pub const DEFAULT_MOVE: &str = "tackle";

/// A move a species learns by leveling up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnsetEntry {
    pub level: u8,
    pub name: String,
}

impl LearnsetEntry {
    pub fn new(level: u8, name: impl Into<String>) -> Self {
        Self {
            level,
            name: name.into(),
        }
    }
}

/// Pick the moves a pokemon at `level` would know.
///
/// The most recently learned moves come first, moves learned on the same
/// level keep the learnset order. The result never contains the same move
/// twice, holds at most [`MAX_MOVES`] moves and falls back to
/// [`DEFAULT_MOVE`] when the pokemon cannot know anything yet.
pub fn select_moves(learnset: &[LearnsetEntry], level: u8) -> Vec<String> {
    let mut learned: Vec<&LearnsetEntry> = learnset.iter().filter(|v| v.level <= level).collect();

    // `sort_by` is stable
    learned.sort_by(|a, b| b.level.cmp(&a.level));

    let mut moves: Vec<String> = Vec::with_capacity(MAX_MOVES);

    for entry in learned {
        if moves.len() == MAX_MOVES {
            break;
        }

        if !moves.iter().any(|v| v == &entry.name) {
            moves.push(entry.name.to_owned());
        }
    }

    if moves.is_empty() {
        moves.push(DEFAULT_MOVE.to_owned());
    }

    moves
}
