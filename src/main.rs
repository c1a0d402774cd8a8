use imagegate::{
    logger::{self, LoggerConfig},
    server::{self, AppState},
    Config, GeminiClient, ImageGateway,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before reading any configuration
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env()?;
    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.bind_address(),
    );
    logger::log_config_info(&config);

    log::info!("🔄 Creating Gemini client...");
    let client = match GeminiClient::new(&config.gemini) {
        Ok(client) => {
            log::info!("✅ Gemini client initialized successfully");
            client
        }
        Err(e) => {
            log::error!("❌ Failed to initialize Gemini client: {}", e);
            return Err(e.into());
        }
    };

    let gateway = ImageGateway::new(Arc::new(client), &config.gemini, config.gateway.clone());
    server::run(&config, AppState::new(gateway)).await?;

    Ok(())
}
