use crate::Reqwest;
use pokemon_core::LearnsetEntry;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;

pub const API_ENDPOINT: &str = "https://pokeapi.co/api/v2/";

/// The learnset of a species differs between games, only one version group is read
pub const DEFAULT_VERSION_GROUP: &str = "red-blue";

const LEVEL_UP_METHOD: &str = "level-up";

/// How a species is looked up, by its name or its national dex number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeciesId {
    Name(String),
    Dex(u16),
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{}", name.trim().to_lowercase()),
            Self::Dex(id) => write!(f, "{}", id),
        }
    }
}

/// The base data of a species, only what a battle needs
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesBaseData {
    pub name: String,
    pub display_name: String,
    pub sprite: Option<String>,
    pub base_hp: u16,
    pub base_attack: u16,
    pub base_defense: u16,
    pub learnset: Vec<LearnsetEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Cannot find the pokemon `{0}`")]
    NotFound(SpeciesId),
    #[error("The pokemon data is unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(why: reqwest::Error) -> Self {
        Self::Unavailable(why.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct PokeApiData {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PokemonData {
    pub name: String,
    pub moves: Vec<Move>,
    pub sprites: Sprites,
    pub stats: Vec<Stat>,
}

#[derive(Debug, Deserialize)]
pub struct Move {
    #[serde(rename = "move")]
    pub move_field: PokeApiData,
    pub version_group_details: Vec<VersionGroupDetail>,
}

#[derive(Debug, Deserialize)]
pub struct VersionGroupDetail {
    pub level_learned_at: i64,
    pub move_learn_method: PokeApiData,
    pub version_group: PokeApiData,
}

#[derive(Debug, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Stat {
    pub base_stat: i64,
    pub stat: PokeApiData,
}

impl PokemonData {
    fn base_stat(&self, name: &str) -> Option<u16> {
        self.stats
            .iter()
            .find(|v| v.stat.name == name)
            .map(|v| v.base_stat.max(0).min(u16::MAX as i64) as u16)
    }

    /// Validate the raw api data into the battle data.
    /// Only the level-up moves of `version_group` are kept, in the api order.
    pub fn into_species(self, version_group: &str) -> Result<SpeciesBaseData, FetchError> {
        let missing =
            |stat: &str| FetchError::Unavailable(format!("{} has no base {}", self.name, stat));

        let base_hp = self.base_stat("hp").ok_or_else(|| missing("hp"))?;
        let base_attack = self.base_stat("attack").ok_or_else(|| missing("attack"))?;
        let base_defense = self.base_stat("defense").ok_or_else(|| missing("defense"))?;

        let learnset = self
            .moves
            .iter()
            .flat_map(|m| {
                m.version_group_details
                    .iter()
                    .filter(|d| {
                        d.version_group.name == version_group
                            && d.move_learn_method.name == LEVEL_UP_METHOD
                    })
                    .map(move |d| {
                        let level = d.level_learned_at.max(0).min(u8::MAX as i64) as u8;
                        LearnsetEntry::new(level, m.move_field.name.as_str())
                    })
            })
            .collect();

        Ok(SpeciesBaseData {
            display_name: capitalize(&self.name),
            sprite: self.sprites.front_default,
            name: self.name,
            base_hp,
            base_attack,
            base_defense,
            learnset,
        })
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Somewhere to get the species data from
#[async_trait]
pub trait SpeciesProvider: Send + Sync {
    async fn fetch_species(&self, id: &SpeciesId) -> Result<SpeciesBaseData, FetchError>;
}

pub struct PokeApi {
    client: Reqwest,
    endpoint: String,
    version_group: String,
}

impl PokeApi {
    pub fn new(client: Reqwest) -> Self {
        Self {
            client,
            endpoint: API_ENDPOINT.to_owned(),
            version_group: DEFAULT_VERSION_GROUP.to_owned(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let mut endpoint = endpoint.into();

        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }

        self.endpoint = endpoint;
        self
    }

    pub fn with_version_group(mut self, version_group: impl Into<String>) -> Self {
        self.version_group = version_group.into();
        self
    }
}

#[async_trait]
impl SpeciesProvider for PokeApi {
    async fn fetch_species(&self, id: &SpeciesId) -> Result<SpeciesBaseData, FetchError> {
        let url = format!("{}pokemon/{}", self.endpoint, id);
        log::debug!("Fetching {}", url);

        let res = self.client.get(&url).send().await?;

        if res.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(id.clone()));
        }

        let data: PokemonData = res.error_for_status()?.json().await?;
        data.into_species(&self.version_group)
    }
}
