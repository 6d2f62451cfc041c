use crate::error::BattleError;
use crate::types::{CreatureRecord, UserId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// The pokemon of every user, one per user.
/// All of its method only use a `&self`,
/// so it can be wrapped into an Arc and shared between the event handlers.
#[derive(Default)]
pub struct PokedexStore {
    records: DashMap<UserId, CreatureRecord>,
}

impl PokedexStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Give the user their first pokemon.
    /// The check and the insertion happen under the same lock,
    /// so only one of many concurrent calls for the same user can succeed.
    pub fn choose_starter(
        &self,
        user: &UserId,
        species: &str,
    ) -> Result<CreatureRecord, BattleError> {
        match self.records.entry(user.clone()) {
            Entry::Occupied(entry) => Err(BattleError::AlreadyChosen(entry.get().clone())),
            Entry::Vacant(entry) => {
                let record = CreatureRecord::starter(species);
                entry.insert(record.clone());
                info!("{} has chosen {} as their partner", user, record.display_name());
                Ok(record)
            }
        }
    }

    pub fn get(&self, user: &UserId) -> Option<CreatureRecord> {
        self.records.get(user).map(|v| v.value().clone())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
