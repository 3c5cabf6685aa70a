//! # Relay Service
//!
//! Entry point: reads `.env`, then hands off to lib-web. All other settings are
//! read from the environment by `lib_core::Config`.

use lib_web::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Comma-separated; unset means any origin.
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    start_server(ServerConfig { allowed_origins }).await
}
