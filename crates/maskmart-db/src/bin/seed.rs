//! # Seed Data Generator
//!
//! Populates the database with development fixtures.
//!
//! ## Usage
//! ```bash
//! # Seed the default database with built-in fixtures
//! cargo run -p maskmart-db --bin seed
//!
//! # Specify database path
//! cargo run -p maskmart-db --bin seed -- --db ./data/maskmart.db
//!
//! # Load fixtures from a JSON file instead of the built-ins
//! cargo run -p maskmart-db --bin seed -- --file ./fixtures.json
//! ```
//!
//! ## Fixture File Format
//! ```json
//! {
//!   "pharmacies": [
//!     {
//!       "name": "Carepoint",
//!       "cash_balance": 593.35,
//!       "opening_hours": [
//!         { "day": "Mon", "open": "08:00", "close": "17:00" }
//!       ],
//!       "masks": [
//!         { "name": "True Barrier (green) (3 per pack)", "price": 13.5 }
//!       ]
//!     }
//!   ],
//!   "users": [
//!     { "name": "Yvonne Guerrero", "cash_balance": 191.83 }
//!   ]
//! }
//! ```
//!
//! Finishes with a smoke check: an opening-hours query, a sorted mask
//! listing, and one real purchase through the transaction engine.

use chrono::Utc;
use maskmart_core::{DayOfWeek, MaskSortBy, PurchaseLineItem, SortOrder};
use maskmart_db::{Database, DbConfig};
use serde::Deserialize;
use std::env;

// =============================================================================
// Fixture Shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct Fixtures {
    pharmacies: Vec<PharmacyFixture>,
    users: Vec<UserFixture>,
}

#[derive(Debug, Deserialize)]
struct PharmacyFixture {
    name: String,
    cash_balance: f64,
    #[serde(default)]
    opening_hours: Vec<HoursFixture>,
    #[serde(default)]
    masks: Vec<MaskFixture>,
}

#[derive(Debug, Deserialize)]
struct HoursFixture {
    /// Day token: one of `Mon,Tue,Wed,Thur,Fri,Sat,Sun`.
    day: String,
    open: String,
    close: String,
}

#[derive(Debug, Deserialize)]
struct MaskFixture {
    name: String,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct UserFixture {
    name: String,
    cash_balance: f64,
}

// =============================================================================
// Built-in Fixtures
// =============================================================================

/// Pharmacy fixtures: name, starting balance, schedule pattern.
const PHARMACIES: &[(&str, f64, Schedule)] = &[
    ("DFW Wellness", 328.41, Schedule::Weekday),
    ("Carepoint", 593.35, Schedule::RoundTheClock),
    ("First Care Rx", 222.52, Schedule::SplitShift),
    ("Health Element", 434.78, Schedule::Weekday),
    ("Welltrack", 507.29, Schedule::Weekend),
    ("Thrifty Way Pharmacy", 184.04, Schedule::SplitShift),
];

/// Mask models and colors combine into the catalog entries.
const MASK_MODELS: &[&str] = &[
    "True Barrier",
    "Masquerade",
    "Cotton Kiss",
    "Second Smile",
    "MaskT",
];

const MASK_COLORS: &[&str] = &["green", "blue", "black", "white"];

const PACK_SIZES: &[i64] = &[3, 10, 30, 50];

/// User fixtures: name, starting balance.
const USERS: &[(&str, f64)] = &[
    ("Yvonne Guerrero", 191.83),
    ("Timothy Schultz", 882.45),
    ("Sara Barrett", 315.26),
    ("Derek Scott", 439.32),
    ("Crystal Diaz", 627.58),
];

/// Weekly schedule patterns assigned to the built-in pharmacies.
#[derive(Clone, Copy)]
enum Schedule {
    /// Mon-Fri 08:00-17:00
    Weekday,
    /// Every day 00:00-23:59
    RoundTheClock,
    /// Mon/Wed/Fri morning and afternoon shifts
    SplitShift,
    /// Sat-Sun 10:00-18:00
    Weekend,
}

impl Schedule {
    fn intervals(self) -> Vec<(DayOfWeek, &'static str, &'static str)> {
        match self {
            Schedule::Weekday => [
                DayOfWeek::Mon,
                DayOfWeek::Tue,
                DayOfWeek::Wed,
                DayOfWeek::Thur,
                DayOfWeek::Fri,
            ]
            .into_iter()
            .map(|day| (day, "08:00", "17:00"))
            .collect(),
            Schedule::RoundTheClock => DayOfWeek::ALL
                .into_iter()
                .map(|day| (day, "00:00", "23:59"))
                .collect(),
            Schedule::SplitShift => [DayOfWeek::Mon, DayOfWeek::Wed, DayOfWeek::Fri]
                .into_iter()
                .flat_map(|day| [(day, "08:00", "12:00"), (day, "14:00", "18:00")])
                .collect(),
            Schedule::Weekend => vec![
                (DayOfWeek::Sat, "10:00", "18:00"),
                (DayOfWeek::Sun, "10:00", "18:00"),
            ],
        }
    }
}

/// Assembles the built-in fixture set (used when no `--file` is given).
fn builtin_fixtures() -> Fixtures {
    let pharmacies = PHARMACIES
        .iter()
        .enumerate()
        .map(|(idx, &(name, cash_balance, schedule))| {
            let opening_hours = schedule
                .intervals()
                .into_iter()
                .map(|(day, open, close)| HoursFixture {
                    day: day.as_str().to_string(),
                    open: open.to_string(),
                    close: close.to_string(),
                })
                .collect();

            // Each pharmacy stocks a deterministic slice of the catalog
            let masks = MASK_MODELS
                .iter()
                .enumerate()
                .map(|(offset, model)| MaskFixture {
                    name: format!(
                        "{} ({}) ({} per pack)",
                        model,
                        MASK_COLORS[(idx + offset) % MASK_COLORS.len()],
                        PACK_SIZES[(idx + offset) % PACK_SIZES.len()],
                    ),
                    price: 3.0 + ((idx * 7 + offset * 13) % 45) as f64 * 0.5,
                })
                .collect();

            PharmacyFixture {
                name: name.to_string(),
                cash_balance,
                opening_hours,
                masks,
            }
        })
        .collect();

    let users = USERS
        .iter()
        .map(|&(name, cash_balance)| UserFixture {
            name: name.to_string(),
            cash_balance,
        })
        .collect();

    Fixtures { pharmacies, users }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./maskmart_dev.db");
    let mut fixture_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--file" | "-f" => {
                if i + 1 < args.len() {
                    fixture_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("MaskMart Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./maskmart_dev.db)");
                println!("  -f, --file <PATH>    Load fixtures from a JSON file");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 MaskMart Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let fixtures = match &fixture_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let fixtures: Fixtures = serde_json::from_str(&raw)?;
            println!("✓ Loaded fixtures from {}", path);
            fixtures
        }
        None => builtin_fixtures(),
    };

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing data
    let existing = db.pharmacies().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} pharmacies", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    println!();
    println!("Seeding pharmacies...");

    let start = std::time::Instant::now();
    let mut mask_count = 0;

    for pharmacy in &fixtures.pharmacies {
        let pharmacy_id =
            sqlx::query("INSERT INTO pharmacies (name, cash_balance) VALUES (?1, ?2)")
                .bind(&pharmacy.name)
                .bind(pharmacy.cash_balance)
                .execute(db.pool())
                .await?
                .last_insert_rowid();

        for hours in &pharmacy.opening_hours {
            // Parse up front so a bad fixture day token fails loudly
            let day: DayOfWeek = hours.day.parse()?;
            sqlx::query(
                "INSERT INTO pharmacy_opening_hours (pharmacy_id, day_of_week, open_time, close_time) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(pharmacy_id)
            .bind(day.as_str())
            .bind(&hours.open)
            .bind(&hours.close)
            .execute(db.pool())
            .await?;
        }

        for mask in &pharmacy.masks {
            sqlx::query("INSERT INTO masks (pharmacy_id, name, price) VALUES (?1, ?2, ?3)")
                .bind(pharmacy_id)
                .bind(&mask.name)
                .bind(mask.price)
                .execute(db.pool())
                .await?;
            mask_count += 1;
        }
    }

    println!(
        "  {} pharmacies, {} masks",
        fixtures.pharmacies.len(),
        mask_count
    );

    println!("Seeding users...");
    for user in &fixtures.users {
        sqlx::query("INSERT INTO users (name, cash_balance) VALUES (?1, ?2)")
            .bind(&user.name)
            .bind(user.cash_balance)
            .execute(db.pool())
            .await?;
    }
    println!("  {} users", fixtures.users.len());

    let elapsed = start.elapsed();
    println!();
    println!("✓ Seeded in {:?}", elapsed);

    // Smoke checks
    println!();
    println!("Verifying queries...");

    let open = db
        .pharmacies()
        .list_open(
            Some(DayOfWeek::Thur),
            Some(maskmart_core::schedule::parse_clock_time("10:30")?),
        )
        .await?;
    println!("  Open Thur 10:30: {} pharmacies", open.len());

    let masks = db
        .pharmacies()
        .list_masks(1, MaskSortBy::Price, SortOrder::Asc)
        .await?;
    println!("  Pharmacy 1 masks (cheapest first): {} listed", masks.len());

    let users = db.users().list_all().await?;
    if let (Some(mask), Some(user)) = (masks.first(), users.first()) {
        let outcome = db
            .purchases()
            .execute_purchase_one(
                user.id,
                &PurchaseLineItem {
                    pharmacy_id: mask.pharmacy_id,
                    mask_id: Some(mask.id),
                    mask_name: Some(mask.name.clone()),
                    quantity: 1,
                    transaction_amount: mask.price,
                    transaction_date: Utc::now(),
                },
            )
            .await?;
        println!(
            "  Sample purchase: '{}' for {:.2}, user balance now {:.2}",
            mask.name, mask.price, outcome.user_balance
        );
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
