use async_trait::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::{channel::Message, gateway::Ready};

use crate::{
    coordinator::Coordinator, storages::CoordinatorKey, traits::Embedable, types::Incoming,
    types::UserId, utils::get_data,
};

use colorful::{Color, Colorful};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub struct Handler {
    prefix: String,
    handled: AtomicUsize,
}

impl Handler {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            handled: AtomicUsize::new(0),
        }
    }

    /// `pkm> challenge` and `pkm> !run` are for us, so is a bare `!run`
    fn command<'a>(&self, content: &'a str) -> Option<&'a str> {
        let content = content.trim();

        match content.strip_prefix(self.prefix.as_str()) {
            Some(command) => Some(command.trim()),
            None if content.starts_with('!') => Some(content),
            None => None,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let command = match self.command(&msg.content) {
            Some(c) if !c.is_empty() => c,
            _ => return,
        };

        let coordinator = match get_data::<CoordinatorKey>(&ctx).await {
            Some(c) => c,
            None => {
                error!("The coordinator is missing from the client data");
                return;
            }
        };

        trace!(
            "{}> {}",
            msg.author.name.to_owned().underlined(),
            command.gradient(Color::LightGreen)
        );

        let incoming = Incoming::from_command(UserId::from(msg.author.id), command);
        let presentation = match coordinator.handle(incoming).await {
            Some(p) => p,
            None => return,
        };

        self.handled.fetch_add(1, Ordering::SeqCst);

        let sent = msg
            .channel_id
            .send_message(&ctx, |m| m.embed(|embed| presentation.append_to(embed)))
            .await;

        if let Err(why) = sent {
            error!("Cannot send the battle message\n{:#?}", why);
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "{} is now available on {} servers, {} events handled so far",
            ready.user.name,
            ready.guilds.len(),
            self.handled.load(Ordering::SeqCst),
        );
    }
}

/// Play in the terminal, every line is `<user> <command>`
pub async fn read_input(coordinator: Arc<Coordinator>) {
    let mut lines = BufReader::new(io::stdin()).lines();

    println!("Type `<user> choose` to begin, `<user> !run` to flee from a battle");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(why) => {
                error!("Cannot read the input\n{:#?}", why);
                break;
            }
        };

        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let (user, command) = match (parts.next(), parts.next()) {
            (Some(user), Some(command)) if !user.is_empty() => (user, command),
            _ => continue,
        };

        let incoming = Incoming::from_command(UserId::from(user), command);

        if let Some(presentation) = coordinator.handle(incoming).await {
            println!("{}\n", presentation);
        }
    }

    info!("No more input, leaving the console");
}

#[cfg(test)]
mod tests {
    use super::Handler;

    #[test]
    fn commands_need_the_prefix() {
        let handler = Handler::new("pkm>");

        assert_eq!(handler.command("pkm> challenge"), Some("challenge"));
        assert_eq!(handler.command("  pkm>!move_1"), Some("!move_1"));
        assert_eq!(handler.command("!run"), Some("!run"));
        assert_eq!(handler.command("challenge"), None);
        assert_eq!(handler.command("hello pkm> choose"), None);
    }
}
