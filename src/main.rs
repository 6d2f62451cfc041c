use colorful::Colorful;
use dotenv::dotenv;
use slackemon::config::Config;
use slackemon::{logger, Result};
use tokio::runtime::Runtime;
use tokio::signal::{self, unix};

fn main() -> Result<()> {
    dotenv().ok();
    logger::init()?;

    let config = Config::from_env()?;

    Runtime::new()?.block_on(async move {
        let mut bot = slackemon::Instance::start(&config).await?;

        if let Some(shard) = bot.shard() {
            tokio::spawn(ctrl_c_handle(shard));
        }

        bot.wait().await
    })?;

    log::info!("Bye! for real");
    Ok(())
}

// To handle SIGINT and SIGTERM
async fn ctrl_c_handle(shard_manager: slackemon::Shard) {
    let mut term_sig = match unix::signal(unix::SignalKind::terminate()) {
        Ok(sig) => sig,
        Err(why) => {
            log::error!("Cannot listen to SIGTERM\n{:#?}", why);
            return;
        }
    };

    let sig = Box::pin(term_sig.recv());
    let ctrl_c = Box::pin(signal::ctrl_c());
    futures::future::select(sig, ctrl_c).await;

    log::info!("{}", "RECEIVED THE EXIT SIGNAL".red().bold().underlined());
    shard_manager.lock().await.shutdown_all().await;
}
