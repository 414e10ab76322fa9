use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, Month};

use ride_ledger::{
    SQLiteLedgerStore, init_logging, initialize_db,
    partner::{NewPartner, PartnerName, add_partner},
    payment::{NewPayment, PaymentAmount, add_payment},
    pricing::RideLegs,
    ride::{add_month_weekday_rides, add_ride},
};

/// A utility for creating a test database for ride_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let store = SQLiteLedgerStore::new(Arc::new(Mutex::new(conn)));

    println!("Creating test partners...");

    let alex = add_partner(
        &store,
        NewPartner::build(PartnerName::new("Alex")?)
            .price_out("15.00")?
            .price_back("12.00")?
            .notes(Some("Weekday school run")),
    )?;
    let sam = add_partner(
        &store,
        NewPartner::build(PartnerName::new("Sam")?)
            .price_out("10.00")?
            .price_back("10.00")?,
    )?;

    println!("Creating test rides and payments...");

    let january = Date::from_calendar_date(2024, Month::January, 1)?;
    let february = Date::from_calendar_date(2024, Month::February, 1)?;

    add_month_weekday_rides(&store, alex.id, january, RideLegs::BOTH)?;
    add_month_weekday_rides(&store, alex.id, february, RideLegs::OUTBOUND)?;

    for week in 0..4 {
        let date = february + Duration::weeks(week) + Duration::days(2);
        add_ride(&store, sam.id, date, RideLegs::RETURN)?;
    }

    for (partner_id, amount, date, description) in [
        (alex.id, "500.00", january + Duration::days(30), Some("January")),
        (alex.id, "250.00", february + Duration::days(14), None),
        (sam.id, "20.00", february + Duration::days(20), Some("Cash")),
    ] {
        add_payment(
            &store,
            NewPayment::new(partner_id, PaymentAmount::new(amount)?, date, description),
        )?;
    }

    println!("Success!");

    Ok(())
}
