//! # Seed Data
//!
//! Populates an empty database with the sample car catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./wheels.db (default)
//! cargo run -p wheels-db --bin seed
//!
//! # Specify database path
//! cargo run -p wheels-db --bin seed -- --db ./data/wheels.db
//! ```
//!
//! Does nothing when the catalog already has cars.

use std::env;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wheels_core::{CarInput, Money};
use wheels_db::{Database, DbConfig};

/// (name, category, dollars per day, image, description, seats)
const SAMPLE_CARS: &[(&str, &str, i64, &str, &str, i64)] = &[
    (
        "Toyota RAV4",
        "suv",
        75,
        "/assets/toyota-rav4.jpg",
        "Spacious and reliable SUV perfect for family trips",
        5,
    ),
    (
        "Honda Pilot",
        "suv",
        85,
        "/assets/honda-pilot.jpg",
        "Premium 8-seater SUV with advanced safety features",
        8,
    ),
    (
        "Ford Transit",
        "van",
        95,
        "/assets/ford-transit.jpg",
        "Spacious van ideal for group travel or cargo",
        12,
    ),
    (
        "Chevrolet Express",
        "van",
        90,
        "/assets/chevy-express.jpg",
        "Reliable passenger van with comfortable seating",
        15,
    ),
    (
        "Toyota Camry",
        "sedan",
        55,
        "/assets/toyota-camry.jpg",
        "Elegant sedan with excellent fuel efficiency",
        5,
    ),
    (
        "Honda Accord",
        "sedan",
        60,
        "/assets/honda-accord.jpg",
        "Luxury sedan with smooth ride and modern features",
        5,
    ),
    (
        "Nissan Altima",
        "sedan",
        58,
        "/assets/nissan-altima.jpg",
        "Comfortable sedan with spacious interior",
        5,
    ),
    (
        "Mazda CX-5",
        "suv",
        70,
        "/assets/mazda-cx5.jpg",
        "Stylish compact SUV with great handling",
        5,
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./wheels.db");

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
                println!("Wheels Rental Seed Data");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./wheels.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;
    info!(path = %db_path, "Connected, migrations applied");

    let existing = db.cars().count().await?;
    if existing > 0 {
        info!(existing, "Catalog already has cars, skipping seed");
        return Ok(());
    }

    let cars = db.cars();
    for &(name, category, dollars, image, description, seats) in SAMPLE_CARS {
        let car = cars
            .insert(&CarInput {
                name: name.to_string(),
                category: category.to_string(),
                price_per_day: Money::from_dollars(dollars),
                image: Some(image.to_string()),
                description: Some(description.to_string()),
                seats,
                is_available: true,
            })
            .await
            .with_context(|| format!("inserting {name}"))?;
        info!(id = car.id, name, price = %car.price_per_day, "Inserted car");
    }

    info!(count = SAMPLE_CARS.len(), "Seed complete");
    db.close().await;
    Ok(())
}
