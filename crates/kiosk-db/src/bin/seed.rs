//! # Seed Data Generator
//!
//! Populates the database with test products for development.
//!
//! ## Usage
//! ```bash
//! # Generate the default catalog
//! cargo run -p kiosk-db --bin seed
//!
//! # Generate a custom amount
//! cargo run -p kiosk-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p kiosk-db --bin seed -- --db ./data/kiosk.db
//! ```

use std::env;

use kiosk_db::{Database, DbConfig, NewProduct};
use tracing_subscriber::EnvFilter;

/// Product categories for realistic test data.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "beverage",
        &[
            "Kopi Susu",
            "Kopi Hitam",
            "Teh Manis",
            "Teh Tawar",
            "Es Jeruk",
            "Air Mineral",
            "Soda Gembira",
            "Jus Alpukat",
            "Jus Mangga",
            "Cappuccino",
        ],
    ),
    (
        "snack",
        &[
            "Pisang Goreng",
            "Tahu Isi",
            "Bakwan",
            "Risoles",
            "Kerupuk",
            "Roti Bakar",
            "Martabak Mini",
            "Singkong Goreng",
            "Cireng",
            "Donat",
        ],
    ),
    (
        "meal",
        &[
            "Nasi Goreng",
            "Mie Goreng",
            "Nasi Uduk",
            "Soto Ayam",
            "Gado-Gado",
            "Ayam Geprek",
            "Nasi Campur",
            "Bakso",
            "Mie Ayam",
            "Pecel Lele",
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 30;
    let mut db_path = String::from("./kiosk_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kiosk POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 30)");
                println!("  -d, --db <PATH>    Database file path (default: ./kiosk_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Kiosk POS Seed Data Generator");
    println!("=============================");
    println!("Database: {db_path}");
    println!("Products: {count}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {existing} products");
        println!("Skipping seed to avoid duplicates.");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    for (category, names) in CATEGORIES {
        for (idx, name) in names.iter().enumerate() {
            if generated >= count {
                break;
            }

            let product = generate_product(category, name, idx);
            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {e}", product.name);
                continue;
            }
            generated += 1;
        }
    }

    println!();
    println!("Seeded {generated} products");

    Ok(())
}

/// Generates a single product with plausible price and stock.
fn generate_product(category: &str, name: &str, seed: usize) -> NewProduct {
    // Price between 5.00 and 25.00, stepped by position in the category
    let price_cents = 500 + ((seed * 37) % 2000) as i64;
    // Stock between 5 and 54
    let stock = (5 + (seed * 7) % 50) as i64;

    NewProduct {
        name: name.to_string(),
        description: None,
        category: Some(category.to_string()),
        price_cents,
        stock,
    }
}
