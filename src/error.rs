use crate::types::CreatureRecord;
use thiserror::Error;

/// Everything that can go wrong while playing.
/// None of them is fatal, the message is shown to the user who caused it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("You've already made your choice, trainer! {} is waiting for you.", .0.display_name())]
    AlreadyChosen(CreatureRecord),

    #[error("You don't have a partner yet! Say `choose` to pick your first pokemon.")]
    NoStarterChosen,

    #[error("You are already in a battle! Finish it or run away first.")]
    SessionAlreadyActive,

    #[error("There is no battle going on for you right now.")]
    InvalidSessionState,

    #[error("Your pokemon doesn't know the move #{}.", .0.saturating_add(1))]
    InvalidMove(usize),

    #[error("The pokemon data is unavailable right now, please try again later.")]
    SpeciesUnavailable(String),
}
