use dotenv::dotenv;
use tracing::{info, warn};

use projecthub_backend::app::app::App;
use projecthub_backend::util::logger::Logger;

#[tokio::main]
async fn main() {
    let _logger = Logger::new().expect("Failed to initialize logging");

    info!("🚀 Starting ProjectHub Backend");

    match dotenv() {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = App::new().await;
    app.start().await;
}
