#[macro_use]
extern crate async_trait;

pub mod pokeapi;

pub use pokeapi::{FetchError, PokeApi, SpeciesBaseData, SpeciesId, SpeciesProvider};

pub use reqwest::Client as Reqwest;
pub use reqwest::Error as ReqwestError;
