use crate::error::BattleError;
use crate::types::UserId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pokemon_core::{
    derive_stats, select_moves, BattleStats, Damage, DamageStats, BASE_POWER, DEFAULT_MOVE,
};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use requester::SpeciesBaseData;

/// A pokemon ready for a battle
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub name: String,
    pub display_name: String,
    pub sprite: Option<String>,
    pub level: u8,
    pub stats: BattleStats,
    pub attack: u16,
    pub defense: u16,
    pub moves: Vec<String>,
}

impl Combatant {
    pub fn new(species: &SpeciesBaseData, level: u8) -> Self {
        Self {
            name: species.name.to_owned(),
            display_name: species.display_name.to_owned(),
            sprite: species.sprite.to_owned(),
            level,
            stats: derive_stats(species.base_hp, level),
            attack: species.base_attack,
            defense: species.base_defense,
            moves: select_moves(&species.learnset, level),
        }
    }

    fn hit(&self, target: &Combatant, rng: &mut SmallRng) -> Damage {
        DamageStats::new(BASE_POWER, self.attack, target.defense, self.level).roll(rng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Player,
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleState {
    InProgress,
    Resolved(Winner),
    Fled,
}

impl BattleState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != Self::InProgress
    }
}

/// A single attack within a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub attacker: String,
    pub target: String,
    pub move_name: String,
    pub damage: Damage,
    pub remaining_hp: u16,
    pub max_hp: u16,
}

/// What happened after the player picked a move.
/// The opponent doesn't get to hit back once it has fainted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub turn: u32,
    pub player_hit: Hit,
    pub opponent_hit: Option<Hit>,
    pub state: BattleState,
    /// The moves the player can pick next turn
    pub moves: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BattleSession {
    player: Combatant,
    player_hp: u16,
    opponent: Combatant,
    opponent_hp: u16,
    state: BattleState,
    turn: u32,
    rng: SmallRng,
}

impl BattleSession {
    pub fn new(player: Combatant, opponent: Combatant, rng: SmallRng) -> Self {
        Self {
            player_hp: player.stats.max_hp,
            opponent_hp: opponent.stats.max_hp,
            player,
            opponent,
            state: BattleState::InProgress,
            turn: 0,
            rng,
        }
    }

    #[inline]
    pub fn player(&self) -> &Combatant {
        &self.player
    }

    #[inline]
    pub fn opponent(&self) -> &Combatant {
        &self.opponent
    }

    #[inline]
    pub fn player_hp(&self) -> u16 {
        self.player_hp
    }

    #[inline]
    pub fn opponent_hp(&self) -> u16 {
        self.opponent_hp
    }

    #[inline]
    pub fn state(&self) -> BattleState {
        self.state
    }

    #[inline]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// The player attacks with the move at `index`, then the opponent strikes back
    /// with a random move of its own if it is still standing.
    pub fn select_move(&mut self, index: usize) -> Result<TurnReport, BattleError> {
        if self.state != BattleState::InProgress {
            return Err(BattleError::InvalidSessionState);
        }

        let move_name = self
            .player
            .moves
            .get(index)
            .cloned()
            .ok_or(BattleError::InvalidMove(index))?;

        self.turn += 1;

        let damage = self.player.hit(&self.opponent, &mut self.rng);
        self.opponent_hp = self.opponent_hp.saturating_sub(damage);

        let player_hit = Hit {
            attacker: self.player.display_name.to_owned(),
            target: self.opponent.display_name.to_owned(),
            move_name,
            damage,
            remaining_hp: self.opponent_hp,
            max_hp: self.opponent.stats.max_hp,
        };

        if self.opponent_hp == 0 {
            self.state = BattleState::Resolved(Winner::Player);

            return Ok(TurnReport {
                turn: self.turn,
                player_hit,
                opponent_hit: None,
                state: self.state,
                moves: self.player.moves.clone(),
            });
        }

        let opponent_move = self
            .opponent
            .moves
            .choose(&mut self.rng)
            .map(String::as_str)
            .unwrap_or(DEFAULT_MOVE)
            .to_owned();

        let damage = self.opponent.hit(&self.player, &mut self.rng);
        self.player_hp = self.player_hp.saturating_sub(damage);

        if self.player_hp == 0 {
            self.state = BattleState::Resolved(Winner::Opponent);
        }

        let opponent_hit = Hit {
            attacker: self.opponent.display_name.to_owned(),
            target: self.player.display_name.to_owned(),
            move_name: opponent_move,
            damage,
            remaining_hp: self.player_hp,
            max_hp: self.player.stats.max_hp,
        };

        Ok(TurnReport {
            turn: self.turn,
            player_hit,
            opponent_hit: Some(opponent_hit),
            state: self.state,
            moves: self.player.moves.clone(),
        })
    }

    /// Running away always works
    pub fn run(&mut self) -> Result<BattleState, BattleError> {
        if self.state != BattleState::InProgress {
            return Err(BattleError::InvalidSessionState);
        }

        self.state = BattleState::Fled;
        Ok(self.state)
    }
}

pub enum BattleSlot {
    /// Waiting for the species data
    Pending,
    Active(BattleSession),
}

/// The battles in progress, at most one per user.
/// A finished battle is removed in the same step that finishes it.
#[derive(Default)]
pub struct BattleRegistry {
    slots: DashMap<UserId, BattleSlot>,
}

impl BattleRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Claim the slot of `user` for a new battle.
    /// The slot is released again when the reservation is dropped without being activated.
    pub fn reserve<'a>(&'a self, user: &'a UserId) -> Result<Reservation<'a>, BattleError> {
        match self.slots.entry(user.clone()) {
            Entry::Occupied(_) => Err(BattleError::SessionAlreadyActive),
            Entry::Vacant(entry) => {
                entry.insert(BattleSlot::Pending);

                Ok(Reservation {
                    registry: self,
                    user,
                    activated: false,
                })
            }
        }
    }

    pub fn select_move(&self, user: &UserId, index: usize) -> Result<TurnReport, BattleError> {
        self.with_session(user, |session| session.select_move(index))
    }

    pub fn run(&self, user: &UserId) -> Result<BattleState, BattleError> {
        self.with_session(user, BattleSession::run)
    }

    /// A copy of the battle of `user`, if it has started
    pub fn session(&self, user: &UserId) -> Option<BattleSession> {
        match self.slots.get(user)?.value() {
            BattleSlot::Active(session) => Some(session.clone()),
            BattleSlot::Pending => None,
        }
    }

    #[inline]
    pub fn contains(&self, user: &UserId) -> bool {
        self.slots.contains_key(user)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn with_session<T, F>(&self, user: &UserId, f: F) -> Result<T, BattleError>
    where
        F: FnOnce(&mut BattleSession) -> Result<T, BattleError>,
    {
        let mut entry = match self.slots.entry(user.clone()) {
            Entry::Occupied(entry) => entry,
            Entry::Vacant(_) => return Err(BattleError::InvalidSessionState),
        };

        let session = match entry.get_mut() {
            BattleSlot::Active(session) => session,
            BattleSlot::Pending => return Err(BattleError::InvalidSessionState),
        };

        let result = f(session);

        if session.state().is_terminal() {
            debug!("The battle of {} is over after {} turns", user, session.turn());
            entry.remove();
        }

        result
    }
}

/// A claimed battle slot, see [`BattleRegistry::reserve`]
pub struct Reservation<'a> {
    registry: &'a BattleRegistry,
    user: &'a UserId,
    activated: bool,
}

impl Reservation<'_> {
    pub fn activate(mut self, session: BattleSession) {
        self.registry
            .slots
            .insert(self.user.clone(), BattleSlot::Active(session));
        self.activated = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.activated {
            self.registry
                .slots
                .remove_if(self.user, |_, v| matches!(v, BattleSlot::Pending));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pokemon_core::LearnsetEntry;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;

    pub fn species(name: &str, base_hp: u16, attack: u16, defense: u16) -> SpeciesBaseData {
        SpeciesBaseData {
            name: name.to_owned(),
            display_name: crate::utils::title_case(name),
            sprite: None,
            base_hp,
            base_attack: attack,
            base_defense: defense,
            learnset: vec![
                LearnsetEntry::new(1, "tackle"),
                LearnsetEntry::new(1, "growl"),
                LearnsetEntry::new(7, "leech-seed"),
            ],
        }
    }

    fn session(seed: u64) -> BattleSession {
        BattleSession::new(
            Combatant::new(&species("bulbasaur", 45, 49, 49), 5),
            Combatant::new(&species("rattata", 30, 56, 35), 3),
            SmallRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn combatant_from_species() {
        let bulbasaur = Combatant::new(&species("bulbasaur", 45, 49, 49), 5);

        assert_eq!(bulbasaur.stats.max_hp, 70);
        assert_eq!(bulbasaur.moves, vec!["tackle", "growl"]);
        assert_eq!(bulbasaur.display_name, "Bulbasaur");
    }

    #[test]
    fn new_session_is_in_progress() {
        let battle = session(1);

        assert_eq!(battle.state(), BattleState::InProgress);
        assert_eq!(battle.player_hp(), 70);
        assert_eq!(battle.opponent_hp(), 45);
        assert_eq!(battle.turn(), 0);
    }

    #[test]
    fn hp_only_goes_down() {
        for seed in 0..50 {
            let mut battle = session(seed);
            let mut last = (battle.player_hp(), battle.opponent_hp());

            while battle.state() == BattleState::InProgress {
                let report = battle.select_move(seed as usize % 2).unwrap();
                let now = (battle.player_hp(), battle.opponent_hp());

                assert!(now.0 <= last.0 && now.1 < last.1);
                assert_eq!(report.player_hit.remaining_hp, now.1);
                assert_eq!(report.state, battle.state());
                assert_eq!(report.moves, battle.player().moves);
                last = now;
            }

            match battle.state() {
                BattleState::Resolved(Winner::Player) => assert_eq!(battle.opponent_hp(), 0),
                BattleState::Resolved(Winner::Opponent) => assert_eq!(battle.player_hp(), 0),
                state => panic!("Unexpected state {:?}", state),
            }
        }
    }

    fn hopeless_session() -> BattleSession {
        BattleSession::new(
            Combatant::new(&species("caterpie", 1, 1, 1), 2),
            Combatant::new(&species("mewtwo", 106, 250, 90), 70),
            SmallRng::seed_from_u64(11),
        )
    }

    #[test]
    fn weak_player_loses() {
        let mut battle = hopeless_session();
        let report = battle.select_move(0).unwrap();

        assert_eq!(report.state, BattleState::Resolved(Winner::Opponent));
        assert_eq!(battle.state(), BattleState::Resolved(Winner::Opponent));
        assert_eq!(battle.player_hp(), 0);
        assert!(battle.opponent_hp() > 0);

        let hit = report.opponent_hit.unwrap();
        assert_eq!(hit.target, "Caterpie");
        assert_eq!(hit.remaining_hp, 0);

        assert_eq!(battle.select_move(0), Err(BattleError::InvalidSessionState));
        assert_eq!(battle.run(), Err(BattleError::InvalidSessionState));
    }

    #[test]
    fn no_retaliation_after_fainting() {
        let mut battle = BattleSession::new(
            Combatant::new(&species("mewtwo", 106, 250, 90), 70),
            Combatant::new(&species("caterpie", 1, 30, 1), 2),
            SmallRng::seed_from_u64(3),
        );

        let report = battle.select_move(0).unwrap();

        assert_eq!(report.state, BattleState::Resolved(Winner::Player));
        assert_eq!(report.opponent_hit, None);
        assert_eq!(battle.player_hp(), battle.player().stats.max_hp);
    }

    #[test]
    fn same_seed_same_battle() {
        let mut a = session(9);
        let mut b = session(9);

        while a.state() == BattleState::InProgress {
            assert_eq!(a.select_move(0), b.select_move(0));
        }

        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn invalid_move_changes_nothing() {
        let mut battle = session(4);

        assert_eq!(battle.select_move(2), Err(BattleError::InvalidMove(2)));
        assert_eq!(battle.turn(), 0);
        assert_eq!(battle.player_hp(), 70);
        assert_eq!(battle.opponent_hp(), 45);
    }

    #[test]
    fn run_always_flees() {
        let mut battle = session(5);
        battle.select_move(0).unwrap();

        assert_eq!(battle.run(), Ok(BattleState::Fled));
        assert_eq!(battle.run(), Err(BattleError::InvalidSessionState));
        assert_eq!(battle.select_move(0), Err(BattleError::InvalidSessionState));
    }

    #[test]
    fn only_one_slot_per_user() {
        let registry = BattleRegistry::new();
        let user = UserId::from("ash");

        let reservation = registry.reserve(&user).unwrap();
        assert!(matches!(
            registry.reserve(&user),
            Err(BattleError::SessionAlreadyActive)
        ));
        assert_eq!(registry.run(&user), Err(BattleError::InvalidSessionState));

        reservation.activate(session(1));
        assert!(matches!(
            registry.reserve(&user),
            Err(BattleError::SessionAlreadyActive)
        ));
        assert!(registry.session(&user).is_some());
    }

    #[test]
    fn dropped_reservation_frees_the_slot() {
        let registry = BattleRegistry::new();
        let user = UserId::from("brock");

        drop(registry.reserve(&user).unwrap());

        assert!(!registry.contains(&user));
        assert!(registry.reserve(&user).is_ok());
    }

    #[test]
    fn finished_battles_are_removed() {
        let registry = BattleRegistry::new();
        let user = UserId::from("ash");

        registry.reserve(&user).unwrap().activate(session(2));

        loop {
            let report = registry.select_move(&user, 0).unwrap();
            if report.state.is_terminal() {
                break;
            }
        }

        assert!(registry.is_empty());
        assert_eq!(
            registry.select_move(&user, 0),
            Err(BattleError::InvalidSessionState)
        );
        assert_eq!(registry.run(&user), Err(BattleError::InvalidSessionState));
    }

    #[test]
    fn lost_battles_are_removed() {
        let registry = BattleRegistry::new();
        let user = UserId::from("gary");

        registry.reserve(&user).unwrap().activate(hopeless_session());

        let report = registry.select_move(&user, 0).unwrap();
        assert_eq!(report.state, BattleState::Resolved(Winner::Opponent));
        assert_eq!(report.opponent_hit.map(|v| v.remaining_hp), Some(0));

        assert!(!registry.contains(&user));
        assert_eq!(
            registry.select_move(&user, 0),
            Err(BattleError::InvalidSessionState)
        );
        assert_eq!(registry.run(&user), Err(BattleError::InvalidSessionState));
        assert!(registry.reserve(&user).is_ok());
    }

    #[test]
    fn fled_battles_are_removed() {
        let registry = BattleRegistry::new();
        let user = UserId::from("ash");

        registry.reserve(&user).unwrap().activate(session(2));

        assert_eq!(registry.run(&user), Ok(BattleState::Fled));
        assert!(registry.session(&user).is_none());
        assert!(registry.reserve(&user).is_ok());
    }
}
