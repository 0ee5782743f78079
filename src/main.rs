use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use grocery_aggregator::{load_rules, GroceryAggregator, MealShoppingListGenerator};

/// Build a grocery list from a meal-plan JSON document
#[derive(Debug, Parser)]
#[command(name = "grocery-aggregator", version, about)]
struct Cli {
    /// Path to the menu JSON document
    menu: PathBuf,

    /// Print one shopping list per meal instead of the aggregated list
    #[arg(long)]
    per_meal: bool,

    /// Normalization configuration (overrides GROCERY_CONFIG_PATH)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.json_logs);

    info!("Starting grocery aggregator");

    let rules = load_rules(cli.config.as_deref()).context("Failed to load ingredient configuration")?;

    let menu = fs::read_to_string(&cli.menu)
        .with_context(|| format!("Failed to read menu document {}", cli.menu.display()))?;

    let output = if cli.per_meal {
        let lists = MealShoppingListGenerator::with_rules(rules).generate_for_menu(menu);
        serde_json::to_string_pretty(&lists)?
    } else {
        let items = GroceryAggregator::with_rules(rules).aggregate(menu);
        serde_json::to_string_pretty(&items)?
    };

    println!("{output}");
    Ok(())
}
