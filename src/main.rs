//! Server binary: load `.env`, initialize logging, run the backend.

use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use folio::http;
use folio::Config;

#[tokio::main]
async fn main() {
    // Environment first: .env feeds Config::from_env and RUST_LOG.
    dotenvy::dotenv().ok();

    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Invalid configuration");
            std::process::exit(1);
        }
    };

    if let Err(err) = http::serve(config).await {
        error!(error = %err, "Server error");
        std::process::exit(1);
    }
}
