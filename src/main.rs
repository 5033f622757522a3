use std::error::Error;

use rjournal::build_rocket;
use rjournal::config::Config;
use rjournal::data::open_database;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[rocket::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config_path = Config::path_from_env();
    let config = Config::load_or_default(&config_path)?;
    let zone = config.zone()?;
    tracing::info!(config = %config_path.display(), ?zone, "starting rjournal");

    let connection = open_database(&config.database)?;

    build_rocket(connection, zone).launch().await?;

    Ok(())
}
