use anyhow::Result;
use colored::Colorize;
use precificador::{config, server};
use std::path::Path;
use tracing::info;

/// Execute the serve command
///
/// Loads configuration and blocks until SIGINT/SIGTERM.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting Precificador...".green());

    let cfg = config::load_config(config_path)?;
    info!(
        "Configuration loaded from {} (file is optional)",
        config_path.display()
    );

    server::start_server(cfg, config_path.to_path_buf()).await?;

    Ok(())
}
