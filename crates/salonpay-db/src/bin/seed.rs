//! # Seed Tool
//!
//! Creates (or migrates) a SalonPay database, seeds the settings row from
//! the environment and optionally adds a sample catalog.
//!
//! ## Usage
//! ```bash
//! # Settings only, from SALONPAY_* variables
//! cargo run -p salonpay-db --bin seed
//!
//! # Sample services and commission rules, then a split of R$ 250,00
//! cargo run -p salonpay-db --bin seed -- --samples --gross 25000
//!
//! # Specify database path
//! cargo run -p salonpay-db --bin seed -- --db ./data/salon.db
//! ```

use std::env;
use std::path::PathBuf;

use salonpay_core::{CommissionRule, Rate, RuleType, Service, SplitRequest};
use salonpay_db::{BootstrapConfig, Database};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sample catalog: (name, price in cents, commission override in ppm)
const SAMPLE_SERVICES: &[(&str, i64, Option<u32>)] = &[
    ("Corte feminino", 9_000, None),
    ("Escova progressiva", 35_000, Some(400_000)),
    ("Manicure", 4_500, None),
    ("Coloração", 18_000, None),
];

/// Professional ids used by the sample rules.
const SAMPLE_PROFESSIONALS: &[&str] = &["pro-ana", "pro-bruno"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let mut config = BootstrapConfig::load()?;
    let mut samples = false;
    let mut gross_cents: i64 = 10_000;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--gross" | "-g" => {
                if i + 1 < args.len() {
                    gross_cents = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--samples" | "-s" => samples = true,
            "--help" | "-h" => {
                println!("SalonPay Seed Tool");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: $SALONPAY_DATABASE_PATH or ./salonpay.db)");
                println!("  -s, --samples         Insert sample services and commission rules");
                println!("  -g, --gross <CENTS>   Gross amount of the sample split (default: 10000)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {other}"),
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), "Seeding database");

    let db = Database::new(config.db_config()).await?;
    let settings = db.settings().get_or_create_default().await?;

    println!("Database: {}", config.database_path.display());
    println!("Tax regime: {}", settings.tax_regime);
    println!("Partner salon: {}", settings.is_partner_salon);
    println!("Tax rate: {}", settings.tax_rate);
    println!("Gateway fee: {}", settings.payment_gateway_fee);
    println!("Default commission: {}", settings.default_commission_rate);

    let mut sample_service = None;
    if samples {
        sample_service = seed_samples(&db).await?;
    }

    let mut request = SplitRequest::new(gross_cents);
    if let Some(service_id) = sample_service {
        request = request
            .with_service(service_id)
            .with_professional(SAMPLE_PROFESSIONALS[0]);
    }

    let result = db.split_engine().calculate_service_split(&request).await?;

    println!();
    println!("Sample split:");
    println!("{}", serde_json::to_string_pretty(&result)?);

    db.close().await;
    Ok(())
}

/// Inserts the sample catalog unless rules already exist. Returns the id of
/// a service to split against.
async fn seed_samples(db: &Database) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if !db.commission_rules().list_all().await?.is_empty() {
        println!("Database already has commission rules; skipping samples.");
        return Ok(None);
    }

    let mut service_ids = Vec::with_capacity(SAMPLE_SERVICES.len());
    for (name, price_cents, override_ppm) in SAMPLE_SERVICES {
        let mut service = Service::new(*name, *price_cents);
        if let Some(ppm) = override_ppm {
            service = service.with_commission_rate(Rate::from_ppm(*ppm));
        }
        db.services().insert(&service).await?;
        service_ids.push(service.id);
    }

    let rules = [
        CommissionRule::new(RuleType::General, None, None, Rate::from_ppm(450_000)),
        CommissionRule::new(
            RuleType::Service,
            Some(service_ids[0].clone()),
            None,
            Rate::from_ppm(500_000),
        ),
        CommissionRule::new(
            RuleType::Professional,
            None,
            Some(SAMPLE_PROFESSIONALS[1].to_string()),
            Rate::from_ppm(550_000),
        ),
        CommissionRule::new(
            RuleType::Service,
            Some(service_ids[0].clone()),
            Some(SAMPLE_PROFESSIONALS[0].to_string()),
            Rate::from_ppm(600_000),
        ),
    ];
    for rule in &rules {
        db.commission_rules().insert(rule).await?;
    }

    println!(
        "Inserted {} services and {} commission rules.",
        service_ids.len(),
        rules.len()
    );

    Ok(service_ids.into_iter().next())
}
