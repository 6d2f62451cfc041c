use crate::battle::{
    BattleRegistry, BattleSession, BattleState, Combatant, Hit, TurnReport, Winner,
};
use crate::constants::*;
use crate::error::BattleError;
use crate::pokedex::PokedexStore;
use crate::types::{Action, CreatureRecord, Incoming, Presentation, Trigger, UserId};
use crate::utils::title_case;
use core::time::Duration;
use futures::future;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use requester::{SpeciesId, SpeciesProvider};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::time::timeout;

/// Owns the pokedex and the battles, and turns incoming events into something to show
pub struct Coordinator {
    pokedex: PokedexStore,
    battles: BattleRegistry,
    provider: Arc<dyn SpeciesProvider>,
    fetch_timeout: Duration,
}

impl Coordinator {
    pub fn new(provider: Arc<dyn SpeciesProvider>) -> Self {
        Self {
            pokedex: PokedexStore::new(),
            battles: BattleRegistry::new(),
            provider,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    #[inline]
    pub fn pokedex(&self) -> &PokedexStore {
        &self.pokedex
    }

    #[inline]
    pub fn battles(&self) -> &BattleRegistry {
        &self.battles
    }

    /// Handle an event from the messaging platform.
    /// Errors are turned into a notice for the user, `None` means the event isn't for us.
    pub async fn handle(&self, incoming: Incoming) -> Option<Presentation> {
        let result = match &incoming {
            Incoming::Text { user, text } => match Trigger::parse(text)? {
                Trigger::Choose => Ok(self.starter_menu(user)),
                Trigger::Challenge => self.challenge(user).await,
            },

            Incoming::Action {
                user,
                action_id,
                value,
            } => match Action::parse(action_id, value) {
                Some(Action::ChooseStarter(species)) => self.choose_starter(user, &species),
                Some(Action::SelectMove(index)) => self.select_move(user, index),
                Some(Action::Run) => self.run(user),
                None => {
                    debug!("Unknown action `{}` from {}", action_id, user);
                    return Some(Presentation::new(format!("Unknown action `{}`", action_id)));
                }
            },
        };

        Some(result.unwrap_or_else(|why| {
            match &why {
                BattleError::SpeciesUnavailable(reason) => {
                    warn!("Cannot start a battle for {}: {}", incoming.user(), reason)
                }
                _ => debug!("{} > {:?}", incoming.user(), why),
            }

            Presentation::new(why.to_string())
        }))
    }

    pub fn starter_menu(&self, user: &UserId) -> Presentation {
        if let Some(record) = self.pokedex.get(user) {
            return Presentation::new(format!(
                "You have already chosen your partner, {}! Your journey has already begun.",
                record.display_name()
            ));
        }

        STARTERS.iter().fold(
            Presentation::new(
                "Welcome to the world of Pokémon! It's time to choose your first partner.",
            ),
            |menu, (species, emoji)| {
                let label = format!("{} {}", title_case(species), emoji);
                menu.with_choice(label, &Action::ChooseStarter((*species).to_owned()))
            },
        )
    }

    pub fn choose_starter(
        &self,
        user: &UserId,
        species: &str,
    ) -> Result<Presentation, BattleError> {
        let record = self.pokedex.choose_starter(user, species)?;

        Ok(Presentation::new(format!(
            "{} has chosen {}! Their adventure begins now!",
            user,
            record.display_name()
        )))
    }

    /// Start a battle against a wild pokemon.
    /// The battle slot is claimed before the species data is fetched,
    /// a failed fetch gives it back without leaving anything behind.
    pub async fn challenge(&self, user: &UserId) -> Result<Presentation, BattleError> {
        let record = self.pokedex.get(user).ok_or(BattleError::NoStarterChosen)?;
        let reservation = self.battles.reserve(user)?;
        let session = self.prepare_battle(&record).await?;

        info!(
            "{} is battling a wild {} (Lv. {}) with {} (Lv. {})",
            user,
            session.opponent().display_name,
            session.opponent().level,
            session.player().display_name,
            session.player().level,
        );

        let presentation = battle_start(&session);
        reservation.activate(session);

        Ok(presentation)
    }

    pub fn select_move(&self, user: &UserId, index: usize) -> Result<Presentation, BattleError> {
        let report = self.battles.select_move(user, index)?;
        debug!("{} turn {}: {:?}", user, report.turn, report.state);

        if let BattleState::Resolved(winner) = report.state {
            info!("The battle of {} is over, winner: {:?}", user, winner);
        }

        Ok(turn_presentation(&report))
    }

    pub fn run(&self, user: &UserId) -> Result<Presentation, BattleError> {
        self.battles.run(user)?;
        info!("{} ran away from a battle", user);

        Ok(Presentation::new("You got away safely!"))
    }

    async fn prepare_battle(&self, record: &CreatureRecord) -> Result<BattleSession, BattleError> {
        let (dex, level) = roll_opponent();
        let player_id = SpeciesId::Name(record.species.to_owned());
        let opponent_id = SpeciesId::Dex(dex);

        let fetch = future::try_join(
            self.provider.fetch_species(&player_id),
            self.provider.fetch_species(&opponent_id),
        );

        let (player, opponent) = match timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(data)) => data,
            Ok(Err(why)) => return Err(BattleError::SpeciesUnavailable(why.to_string())),
            Err(_) => {
                return Err(BattleError::SpeciesUnavailable(format!(
                    "timed out after {:?}",
                    self.fetch_timeout
                )))
            }
        };

        Ok(BattleSession::new(
            Combatant::new(&player, record.level),
            Combatant::new(&opponent, level),
            SmallRng::from_entropy(),
        ))
    }
}

fn roll_opponent() -> (u16, u8) {
    let mut rng = rand::thread_rng();
    let (min_dex, max_dex) = OPPONENT_DEX_RANGE;
    let (min_level, max_level) = OPPONENT_LEVEL_RANGE;

    (
        rng.gen_range(min_dex..=max_dex),
        rng.gen_range(min_level..=max_level),
    )
}

fn battle_start(session: &BattleSession) -> Presentation {
    let player = session.player();
    let opponent = session.opponent();

    let text = format!(
        "A wild {} (Lv. {}) appeared!\nGo, {}! (HP {}/{})",
        opponent.display_name,
        opponent.level,
        player.display_name,
        session.player_hp(),
        player.stats.max_hp,
    );

    let presentation = Presentation::new(text).with_image(opponent.sprite.to_owned());
    with_battle_choices(presentation, &player.moves)
}

fn with_battle_choices(presentation: Presentation, moves: &[String]) -> Presentation {
    moves
        .iter()
        .enumerate()
        .fold(presentation, |p, (index, name)| {
            p.with_choice(title_case(name), &Action::SelectMove(index))
        })
        .with_choice("Run", &Action::Run)
}

fn write_hit(text: &mut String, hit: &Hit) {
    writeln!(
        text,
        "{} used {}! It dealt {} damage.\n{} HP: {}/{}",
        hit.attacker,
        title_case(&hit.move_name),
        hit.damage,
        hit.target,
        hit.remaining_hp,
        hit.max_hp,
    )
    .ok();
}

fn turn_presentation(report: &TurnReport) -> Presentation {
    let mut text = String::new();

    write_hit(&mut text, &report.player_hit);
    if let Some(hit) = &report.opponent_hit {
        write_hit(&mut text, hit);
    }

    match report.state {
        BattleState::Resolved(Winner::Player) => {
            write!(text, "{} fainted! You won the battle!", report.player_hit.target).ok();
        }
        BattleState::Resolved(Winner::Opponent) => {
            write!(text, "{} fainted! You lost the battle...", report.player_hit.attacker).ok();
        }
        BattleState::InProgress => {
            return with_battle_choices(Presentation::new(text.trim_end()), &report.moves);
        }
        BattleState::Fled => {}
    }

    Presentation::new(text.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::species;
    use pretty_assertions::assert_eq;
    use requester::{FetchError, SpeciesBaseData};

    struct StaticDex;

    #[async_trait::async_trait]
    impl SpeciesProvider for StaticDex {
        async fn fetch_species(&self, id: &SpeciesId) -> Result<SpeciesBaseData, FetchError> {
            match id {
                SpeciesId::Name(name) => Ok(species(name, 45, 49, 49)),
                SpeciesId::Dex(_) => Ok(species("rattata", 30, 56, 35)),
            }
        }
    }

    fn coordinator() -> Coordinator {
        Coordinator::new(Arc::new(StaticDex))
    }

    #[test]
    fn starter_menu_lists_the_starters() {
        let coordinator = coordinator();
        let user = UserId::from("ash");
        let menu = coordinator.starter_menu(&user);

        let ids: Vec<_> = menu.choices.iter().map(|v| v.action_id.as_str()).collect();
        assert_eq!(ids, vec!["choose_bulbasaur", "choose_charmander", "choose_squirtle"]);
        assert_eq!(menu.choices[0].label, "Bulbasaur 🌱");

        coordinator.choose_starter(&user, "squirtle").unwrap();
        let menu = coordinator.starter_menu(&user);

        assert!(menu.choices.is_empty());
        assert!(menu.text.contains("Squirtle"));
    }

    #[test]
    fn opponents_are_in_range() {
        for _ in 0..200 {
            let (dex, level) = roll_opponent();
            assert!(dex >= 1 && dex <= 151);
            assert!(level >= 2 && level <= 6);
        }
    }

    #[tokio::test]
    async fn battle_choices_follow_the_moves() {
        let coordinator = coordinator();
        let user = UserId::from("ash");

        coordinator.choose_starter(&user, "bulbasaur").unwrap();
        let start = coordinator.challenge(&user).await.unwrap();

        let ids: Vec<_> = start.choices.iter().map(|v| v.action_id.as_str()).collect();
        assert_eq!(ids, vec!["move_0", "move_1", "run"]);
        assert_eq!(start.choices[0].label, "Tackle");
        assert!(start.text.starts_with("A wild Rattata"));
    }

    #[test]
    fn turn_text() {
        let hit = |attacker: &str, target: &str, remaining_hp| Hit {
            attacker: attacker.into(),
            target: target.into(),
            move_name: "vine-whip".into(),
            damage: 5,
            remaining_hp,
            max_hp: 40,
        };

        let report = TurnReport {
            turn: 3,
            player_hit: hit("Bulbasaur", "Rattata", 0),
            opponent_hit: None,
            state: BattleState::Resolved(Winner::Player),
            moves: vec!["vine-whip".into()],
        };

        assert_eq!(
            turn_presentation(&report).text,
            "Bulbasaur used Vine Whip! It dealt 5 damage.\nRattata HP: 0/40\n\
             Rattata fainted! You won the battle!"
        );
        assert!(turn_presentation(&report).choices.is_empty());
    }

    #[test]
    fn turn_choices_come_with_the_report() {
        let hit = |attacker: &str, target: &str| Hit {
            attacker: attacker.into(),
            target: target.into(),
            move_name: "tackle".into(),
            damage: 4,
            remaining_hp: 30,
            max_hp: 40,
        };

        let report = TurnReport {
            turn: 1,
            player_hit: hit("Bulbasaur", "Rattata"),
            opponent_hit: Some(hit("Rattata", "Bulbasaur")),
            state: BattleState::InProgress,
            moves: vec!["growl".into(), "tackle".into()],
        };

        let turn = turn_presentation(&report);
        let ids: Vec<_> = turn.choices.iter().map(|v| v.action_id.as_str()).collect();

        assert_eq!(ids, vec!["move_0", "move_1", "run"]);
        assert_eq!(turn.choices[0].label, "Growl");
        assert!(turn.text.ends_with("Bulbasaur HP: 30/40"));
    }
}
