use std::sync::Arc;

use tracing::{error, info};

use mailroom::{Config, Database, HttpDelivery, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = mailroom::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        mailroom::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("Mailroom stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> mailroom::Result<()> {
    config.validate()?;

    info!("Mailroom - mail web service");
    info!("Public URL: {}", config.root_url());

    let db = Database::open(&config.database.path).await?;
    let transport = HttpDelivery::new(&config.delivery)?;
    let server = WebServer::new(&config, db, Arc::new(transport))?;

    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );
    server.run().await
}
