use profile_net::build_server;
use profile_service::Config;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(
        database = %config.app.database_path,
        bucket = %config.storage.bucket_name,
        region = %config.storage.bucket_region,
        "Starting profile service"
    );

    if let Err(err) = build_server(config).await {
        error!(error = %err, "Profile service stopped");
        std::process::exit(1);
    }
}
