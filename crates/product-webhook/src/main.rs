use anyhow::Result;
use tracing::debug;

use product_webhook::{cli, config::Config, tracing::setup_tracing, ProductWebhook};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let config = Config::from_args(&matches)?;

    // Setup the tracing system. This MUST be done inside of a tokio Runtime
    // because some collectors rely on it and would panic otherwise.
    setup_tracing(&config.log_level, &config.log_fmt, config.log_no_color)?;
    debug!("tracing system ready");

    let server = ProductWebhook::new_from_config(config).await?;
    server.run().await
}
