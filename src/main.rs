use eventparser::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting event parser");

    // Load configuration
    let config = startup::load_config()?;

    // Serve the API and static files
    startup::start_server(config).await
}
