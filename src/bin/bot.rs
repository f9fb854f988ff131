use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};

use courier::{BotController, BotSettings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let settings = match BotSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            // Logger is configured from settings, so this one goes straight to stderr
            eprintln!("Configuration error: {e}");
            return Err(e.into());
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&settings.log_level))
        .init();

    info!("Starting bot...");
    info!("Settings: {settings:?}");

    let controller = BotController::from_settings(settings)?;

    if let Err(e) = controller.run().await {
        error!("Bot stopped: {e}");
        return Err(e);
    }

    Ok(())
}
