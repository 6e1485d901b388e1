//! # Seed Data Generator
//!
//! Populates the database with a demo catalog and optional sales history.
//!
//! ## Usage
//! ```bash
//! # Catalog only
//! cargo run -p brandpos-db --bin seed
//!
//! # Catalog plus 200 sales spread over the last 60 days
//! cargo run -p brandpos-db --bin seed -- --sales 200
//!
//! # Specify database path
//! cargo run -p brandpos-db --bin seed -- --db ./data/brandpos.db
//! ```
//!
//! Sales go through the Sale Recorder, so stock is decremented exactly as
//! it would be at the counter. A sale that would oversell is skipped.

use chrono::{Duration, Utc};
use std::env;

use brandpos_core::validation::{NewBrand, SaleRequest};
use brandpos_core::Money;
use brandpos_db::{Database, DbConfig};

/// Demo catalog: (name, price in cents, opening stock)
const BRANDS: &[(&str, i64, i64)] = &[
    ("Marlboro Red", 1250, 400),
    ("Marlboro Gold", 1250, 350),
    ("Dunhill Blue", 1400, 200),
    ("Pall Mall", 950, 500),
    ("Camel Filters", 1175, 250),
    ("Lucky Strike", 1100, 300),
    ("Benson & Hedges", 1325, 150),
    ("Winston", 1000, 450),
    ("Rothmans", 1050, 220),
    ("Kent", 1150, 180),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut sales: usize = 0;
    let mut days: i64 = 60;
    let mut db_path = String::from("./brandpos.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--days" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(60).max(1);
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
                println!("Brand POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>    Number of sales to record (default: 0)");
                println!("      --days <N>     Spread sales over the last N days (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./brandpos.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Brand POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Sales:    {}", sales);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.brands().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} brands", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating catalog...");

    let mut catalog = Vec::with_capacity(BRANDS.len());
    for (name, price_cents, stock) in BRANDS {
        let brand = db
            .brands()
            .insert(&NewBrand {
                name: name.to_string(),
                price: Money::from_cents(*price_cents),
                stock: *stock,
            })
            .await?;
        println!("  {} @ {} ({} in stock)", brand.name, brand.price(), brand.stock);
        catalog.push(brand);
    }

    if sales > 0 {
        println!();
        println!("Recording sales...");

        let recorder = db.recorder();
        let now = Utc::now();
        let start = std::time::Instant::now();
        let mut recorded = 0;
        let mut skipped = 0;

        for seed in 0..sales {
            let brand = &catalog[(seed * 7) % catalog.len()];
            // Mostly single packs, every fourth sale a carton-style multi.
            let quantity = if seed % 4 == 0 { 2 + (seed % 3) as i64 } else { 1 };
            let total = brand.price().multiply_quantity(quantity);
            // Round the tendered amount up to the next whole dollar.
            let received = Money::from_cents((total.cents() + 99) / 100 * 100);

            let minutes_ago = ((seed as i64 * 7919) % (days * 24 * 60)).max(1);
            let date = now - Duration::minutes(minutes_ago);

            let request = SaleRequest::new(brand.id.clone(), quantity, total, received);
            match recorder.record_at(request, date).await {
                Ok(_) => recorded += 1,
                Err(e) => {
                    eprintln!("  Skipped sale {}: {}", seed, e);
                    skipped += 1;
                }
            }
        }

        println!();
        println!(
            "✓ Recorded {} sales in {:?} ({} skipped)",
            recorded,
            start.elapsed(),
            skipped
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
