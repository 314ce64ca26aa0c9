use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use precificador::{config::load_config, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.get_command();

    // One-shot commands stay quiet unless RUST_LOG asks otherwise; a broken
    // config file is reported by the command itself.
    let server = load_config(&args.config)
        .map(|cfg| cfg.server)
        .unwrap_or_default();
    let level = if matches!(command, cli::Commands::Serve) {
        server.log_level.as_str()
    } else {
        "warn"
    };
    init_tracing(level, &server.log_format);

    match command {
        cli::Commands::Serve => {
            commands::serve::execute(&args.config).await?;
        }
        cli::Commands::Catalog { action } => match action {
            cli::CatalogCommands::List => commands::catalog::list(&args.config).await?,
        },
        cli::Commands::Price(price_args) => {
            commands::price::execute(&args.config, price_args).await?;
        }
        cli::Commands::Recipe { action } => match action {
            cli::RecipeCommands::List => commands::recipe::list(&args.config).await?,
            cli::RecipeCommands::Show { name } => {
                commands::recipe::show(&args.config, &name).await?
            }
            cli::RecipeCommands::Save { name, file } => {
                commands::recipe::save(&args.config, &name, &file).await?
            }
            cli::RecipeCommands::Delete { name } => {
                commands::recipe::delete(&args.config, &name).await?
            }
        },
        cli::Commands::Quote(quote_args) => {
            commands::quote::execute(&args.config, quote_args).await?;
        }
        cli::Commands::History { limit } => {
            commands::history::execute(&args.config, limit).await?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Version => {
            println!("Precificador v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
