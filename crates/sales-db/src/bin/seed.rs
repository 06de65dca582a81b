//! # Seed Data Generator
//!
//! Populates the database with catalog products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p sales-db --bin seed
//!
//! # Specify database path
//! cargo run -p sales-db --bin seed -- --db ./data/sales.db
//! ```

use std::env;

use sales_core::repository::ProductRepository;
use sales_core::types::Product;
use sales_db::{Database, DbConfig};

/// Catalog entries: (name, manufacturer, price in cents, starting stock).
const CATALOG: &[(&str, &str, i64, i64)] = &[
    ("Wireless Mouse", "Logitech", 2499, 30),
    ("Mechanical Keyboard", "Keychron", 3999, 20),
    ("USB-C Hub", "Anker", 1299, 45),
    ("Webcam 1080p", "Logitech", 4999, 12),
    ("Laptop Stand", "Rain Design", 3499, 18),
    ("Noise Cancelling Headphones", "Sony", 14999, 8),
    ("Portable SSD 1TB", "Samsung", 8999, 25),
    ("Monitor 27-inch", "Dell", 21999, 6),
    ("HDMI Cable 2m", "AmazonBasics", 799, 120),
    ("Desk Microphone", "Blue", 9999, 10),
    ("Gaming Mouse Pad", "SteelSeries", 1499, 60),
    ("Bluetooth Speaker", "JBL", 5999, 15),
    ("Power Bank 20000mAh", "Anker", 4599, 35),
    ("Wireless Charger", "Belkin", 2999, 28),
    ("Ergonomic Chair Cushion", "Everlasting Comfort", 3299, 14),
    ("USB Flash Drive 128GB", "SanDisk", 1899, 80),
    ("Smart Plug", "TP-Link", 1599, 50),
    ("Label Printer", "Dymo", 7499, 5),
    ("Document Scanner", "Epson", 12999, 4),
    ("Surge Protector", "APC", 2599, 40),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./smart_sales_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Smart Sales Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./smart_sales_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Smart Sales Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("Connected, migrations applied");

    // Avoid duplicating the catalog on repeat runs.
    let existing = db.products().find_all().await?;
    if !existing.is_empty() {
        println!("Database already has {} products", existing.len());
        println!("Skipping seed to avoid duplicates.");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    println!("Seeding catalog...");

    let mut seeded = 0;
    for (name, manufacturer, price_cents, stock) in CATALOG {
        let product = Product::new(*name, *manufacturer, *price_cents, *stock);
        match db.products().insert(&product).await {
            Ok(saved) => {
                seeded += 1;
                println!("  [{}] {} ({}) - {}", saved.id, saved.name, saved.manufacturer, saved.price());
            }
            Err(e) => eprintln!("Failed to insert {}: {}", name, e),
        }
    }

    println!();
    println!("Seeded {} products", seeded);

    Ok(())
}
