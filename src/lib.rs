#[macro_use]
extern crate log;

extern crate config as lib_config;

pub mod battle;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod logger;
pub mod pokedex;
pub mod storages;
pub mod traits;
pub mod types;
pub mod utils;

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

pub use requester::*;

use std::error::Error;
use std::sync::Arc;

use crate::config::Config;
use coordinator::Coordinator;
use events::Handler;
use storages::CoordinatorKey;

use serenity::client::bridge::gateway::{GatewayIntents, ShardManager};
use serenity::Client;
use tokio::task::JoinHandle;

pub type Shard = Arc<serenity::prelude::Mutex<ShardManager>>;

pub struct Instance {
    coordinator: Arc<Coordinator>,
    task: Option<JoinHandle<Result<()>>>,
    shard: Option<Shard>,
}

impl Instance {
    /// Connect to discord, or read from the terminal when `console` is set
    pub async fn start(config: &Config) -> Result<Self> {
        let coordinator = Arc::new(coordinator_from(config));

        if config.console {
            let task = tokio::spawn(console(Arc::clone(&coordinator)));

            return Ok(Self {
                coordinator,
                task: Some(task),
                shard: None,
            });
        }

        let token = config
            .token()
            .ok_or("Set the DISCORD_TOKEN or run it with SLACKEMON_CONSOLE=true")?;

        let mut client = Client::builder(&token)
            .event_handler(Handler::new(config.prefix.as_str()))
            .intents(intents())
            .await?;

        {
            let mut data = client.data.write().await;
            data.insert::<CoordinatorKey>(Arc::clone(&coordinator));
        }

        let shard_manager = Arc::clone(&client.shard_manager);
        let task = tokio::spawn(connect(client));

        Ok(Self {
            coordinator,
            shard: Some(shard_manager),
            task: Some(task),
        })
    }

    /// Take out the shard
    #[inline]
    pub fn shard(&mut self) -> Option<Shard> {
        self.shard.take()
    }

    #[inline]
    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    pub async fn wait(mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.await??;
        }

        info!(
            "Shutting down with {} trainers and {} battles in progress",
            self.coordinator.pokedex().len(),
            self.coordinator.battles().len()
        );

        Ok(())
    }
}

async fn console(coordinator: Arc<Coordinator>) -> Result<()> {
    events::read_input(coordinator).await;
    Ok(())
}

async fn connect(mut client: Client) -> Result<()> {
    client.start().await?;
    Ok(())
}

fn coordinator_from(config: &Config) -> Coordinator {
    let provider = PokeApi::new(Reqwest::new())
        .with_endpoint(config.api_endpoint.as_str())
        .with_version_group(config.version_group.as_str());

    Coordinator::new(Arc::new(provider)).with_fetch_timeout(config.fetch_timeout())
}

#[inline]
fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::DIRECT_MESSAGES
}
