use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use precificador::money::parse_amount;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "precificador",
    version,
    about = "Pricing for artisanal food products: recipe costing, quotes and exports"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "precificador.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Ingredient catalog commands
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },

    /// Price a form file or a saved recipe
    Price(PriceArgs),

    /// Saved recipe management
    Recipe {
        #[command(subcommand)]
        action: RecipeCommands,
    },

    /// Build, export and save a quote kept in a JSON draft file
    Quote(QuoteArgs),

    /// List saved quotes, newest first
    History {
        /// Show at most this many quotes
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CatalogCommands {
    /// List catalog ingredients
    List,
}

/// Session overrides shared by `price` and `quote add --recipe`
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Profit margin on production cost, in percent
    #[arg(long, value_parser = parse_decimal)]
    pub margin: Option<Decimal>,

    /// Waste ("quebra") on ingredients, in percent
    #[arg(long, value_parser = parse_decimal)]
    pub waste: Option<Decimal>,

    /// Overhead on ingredients, in percent
    #[arg(long, value_parser = parse_decimal)]
    pub overhead: Option<Decimal>,

    /// Flat packaging cost
    #[arg(long, value_parser = parse_decimal)]
    pub packaging: Option<Decimal>,

    /// Delivery distance in km
    #[arg(long, value_parser = parse_decimal)]
    pub distance: Option<Decimal>,

    /// Payment method name (see `config show`)
    #[arg(long)]
    pub payment: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct PriceArgs {
    /// JSON pricing form
    #[arg(short, long, conflicts_with = "recipe", required_unless_present = "recipe")]
    pub file: Option<PathBuf>,

    /// Saved recipe name
    #[arg(short, long)]
    pub recipe: Option<String>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Print the breakdown as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecipeCommands {
    /// List saved recipe names
    List,

    /// Show the lines of a saved recipe
    Show { name: String },

    /// Save (or overwrite) a recipe from a JSON list of lines
    Save {
        name: String,

        /// JSON file with `[{"ingredient", "quantity", "unit"}, ...]`
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Delete a saved recipe
    Delete { name: String },
}

#[derive(Args, Debug, Clone)]
pub struct QuoteArgs {
    /// Draft file the quote is kept in between commands
    #[arg(short, long, default_value = "quote.json", global = true)]
    pub draft: PathBuf,

    #[command(subcommand)]
    pub action: QuoteCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum QuoteCommands {
    /// Start a new draft
    New {
        /// Client name
        #[arg(long)]
        client: String,

        #[arg(long, default_value = "")]
        phone: String,

        /// Quote date (YYYY-MM-DD), today if omitted
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Delivery distance in km
        #[arg(long, value_parser = parse_decimal)]
        distance: Option<Decimal>,

        /// Payment method name
        #[arg(long)]
        payment: Option<String>,

        /// Flat packaging surcharge for the whole order
        #[arg(long, value_parser = parse_decimal)]
        packaging: Option<Decimal>,

        /// Replace an existing draft
        #[arg(long)]
        force: bool,
    },

    /// Add an item priced by hand or from a saved recipe
    Add {
        /// Saved recipe to price the item from
        #[arg(long, conflicts_with = "price", required_unless_present = "price")]
        recipe: Option<String>,

        /// Product name (defaults to the recipe name)
        #[arg(long, required_unless_present = "recipe")]
        product: Option<String>,

        /// Unit price
        #[arg(long, value_parser = parse_decimal)]
        price: Option<Decimal>,

        #[arg(short, long, value_parser = parse_decimal, default_value = "1")]
        quantity: Decimal,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Remove the item with the number shown by `quote show`
    Remove { number: usize },

    /// Show items and totals
    Show,

    /// Export as WhatsApp text or PDF
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Text)]
        format: ExportFormat,

        /// Output file (text goes to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Append the quote to history
    Save,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Pdf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

/// Decimal argument, accepting a decimal comma and an `R$` prefix
fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    match parse_amount(raw) {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(format!("'{}' is not a number: {}", raw, e)),
        None => Err("value cannot be empty".to_string()),
    }
}
