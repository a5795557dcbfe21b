#![forbid(unsafe_code)]
//! Star notary - issue ownership challenges and walk through a registration

use clap::{Parser, Subcommand};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color as TableColor, ContentArrangement, Table};
use serde_json::json;
use std::path::PathBuf;
use starledger::config::load_config_from;
use starledger::crypto::KeyPair;
use starledger::{Block, StarRegistry};

#[derive(Parser)]
#[command(name = "star-notary", version, about = "Register stars on a private, hash-linked ledger")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = starledger::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the message an address has to sign before submitting a star
    Challenge { address: String },
    /// Register stars under throwaway keys in an in-memory ledger and print the chain
    Demo {
        #[arg(long, value_delimiter = ',', default_value = "Vega,Sirius")]
        stars: Vec<String>,
    },
}

fn shorten(hex: &str) -> String {
    if hex.len() > 20 {
        format!("{}...{}", &hex[..10], &hex[hex.len() - 6..])
    } else {
        hex.to_string()
    }
}

fn chain_table(blocks: &[Block]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Height").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Timestamp").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Hash").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Previous").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Owner").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Star").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
        ]);

    for block in blocks {
        let previous = block
            .previous_hash
            .map(|h| shorten(&hex::encode(h)))
            .unwrap_or_else(|| "-".to_string());
        let (owner, star) = match block.claim() {
            Some(claim) => (shorten(&claim.owner), claim.star.to_string()),
            None => ("-".to_string(), "genesis".to_string()),
        };

        table.add_row(vec![
            Cell::new(block.height),
            Cell::new(block.timestamp),
            Cell::new(shorten(&block.hash_hex())),
            Cell::new(previous),
            Cell::new(owner),
            Cell::new(star),
        ]);
    }
    table
}

fn run_demo(registry: &StarRegistry, stars: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    for name in stars {
        let keys = KeyPair::generate();
        let address = keys.address();

        let message = registry.request_challenge(&address);
        let signature = keys.sign_message(&message)?;
        let block = registry.submit_star(&address, &message, &signature, json!({ "name": name }))?;

        println!(
            "{} {} {} {}",
            "⭐".yellow(),
            name.bright_white().bold(),
            "registered at height".dimmed(),
            block.height.to_string().bright_green()
        );
    }

    println!();
    println!("{}", chain_table(&registry.store().blocks()));

    let errors = registry.validate_chain();
    if errors.is_empty() {
        println!("{}", "✅ Chain is valid".green().bold());
    } else {
        for error in &errors {
            eprintln!("{} {}", "❌".red(), error.to_string().red());
        }
        return Err(format!("{} validation error(s)", errors.len()).into());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config_from(&cli.config)?;
    config.logging.init_subscriber()?;

    let registry = StarRegistry::with_defaults(&config.ledger)?;

    match cli.command {
        Command::Challenge { address } => {
            println!("{}", registry.request_challenge(&address));
            println!(
                "{}",
                format!(
                    "💡 Sign this message and submit within {} seconds",
                    registry.policy().freshness_window_secs
                )
                .yellow()
            );
        }
        Command::Demo { stars } => run_demo(&registry, &stars)?,
    }

    Ok(())
}
