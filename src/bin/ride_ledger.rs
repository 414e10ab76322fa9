use std::{
    collections::HashMap,
    error::Error,
    path::Path,
    process::ExitCode,
    sync::{Arc, Mutex},
};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;
use time::Date;

use ride_ledger::{
    Error as LedgerError, LedgerStore, PartnerId, PaymentId, RideId, SQLiteLedgerStore,
    balance::{load_dashboard, load_monthly_summary, whatsapp_share_url},
    init_logging, initialize_db,
    money::{format_amount, format_signed_amount},
    month::{parse_date, parse_month_key},
    partner::{NewPartner, Partner, PartnerName, add_partner, remove_partner},
    payment::{NewPayment, PaymentAmount, add_payment, remove_payment},
    pricing::RideLegs,
    ride::{Ride, add_month_weekday_rides, add_ride, edit_ride, remove_ride},
    today,
};

/// Keeps track of rides given to partners, what they cost and what has been paid.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The canonical timezone used to work out today's date, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add, list and delete ride partners.
    #[command(subcommand)]
    Partner(PartnerCommand),

    /// Add, edit, list and delete rides.
    #[command(subcommand)]
    Ride(RideCommand),

    /// Add, list and delete payments.
    #[command(subcommand)]
    Payment(PaymentCommand),

    /// Show the all-time balance of every partner.
    Dashboard,

    /// Summarise the rides and payments of a month.
    Summary {
        /// The month to summarise as yyyy-MM. Defaults to the current month.
        #[arg(long)]
        month: Option<String>,

        /// Print the summary as a message with a WhatsApp share link.
        #[arg(long)]
        share: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PartnerCommand {
    /// Add a partner.
    Add {
        #[arg(long)]
        name: String,

        /// The price of an outbound leg.
        #[arg(long)]
        price_out: Option<String>,

        /// The price of a return leg.
        #[arg(long)]
        price_back: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List all partners.
    List,

    /// Delete a partner with all of their rides and payments.
    Delete { id: PartnerId },
}

#[derive(Subcommand, Debug)]
enum RideCommand {
    /// Record a ride.
    Add {
        #[arg(long)]
        partner: PartnerId,

        /// The day of the ride as yyyy-MM-dd. Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// The ride includes the outbound leg.
        #[arg(long)]
        outbound: bool,

        /// The ride includes the return leg.
        #[arg(long = "return")]
        return_ride: bool,
    },

    /// Change the date or legs of a ride. The charge is recalculated.
    Edit {
        id: RideId,

        /// The new day of the ride as yyyy-MM-dd.
        #[arg(long)]
        date: Option<String>,

        /// Whether the ride includes the outbound leg.
        #[arg(long)]
        outbound: Option<bool>,

        /// Whether the ride includes the return leg.
        #[arg(long = "return")]
        return_ride: Option<bool>,
    },

    /// Delete a ride.
    Delete { id: RideId },

    /// List the most recent rides.
    List {
        #[arg(long, default_value_t = 50)]
        limit: u64,
    },

    /// Record a ride on every weekday of a month that does not have one yet.
    Month {
        #[arg(long)]
        partner: PartnerId,

        /// The month as yyyy-MM. Defaults to the current month.
        #[arg(long)]
        month: Option<String>,

        /// The rides include the outbound leg.
        #[arg(long)]
        outbound: bool,

        /// The rides include the return leg.
        #[arg(long = "return")]
        return_ride: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PaymentCommand {
    /// Record a payment from a partner.
    Add {
        #[arg(long)]
        partner: PartnerId,

        #[arg(long)]
        amount: String,

        /// The day of the payment as yyyy-MM-dd. Defaults to today.
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// List the most recent payments.
    List {
        #[arg(long, default_value_t = 50)]
        limit: u64,
    },

    /// Delete a payment.
    Delete { id: PaymentId },
}

fn main() -> ExitCode {
    init_logging();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let db_path = Path::new(&args.db_path);

    match db_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => return Err("Database path must include a file extension (e.g., 'ledger.db').".into()),
    }

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;
    let store = SQLiteLedgerStore::new(Arc::new(Mutex::new(connection)));

    let cli = Cli {
        store,
        timezone: args.timezone,
        json: args.json,
    };

    match args.command {
        Command::Partner(command) => cli.partner(command),
        Command::Ride(command) => cli.ride(command),
        Command::Payment(command) => cli.payment(command),
        Command::Dashboard => cli.dashboard(),
        Command::Summary { month, share } => cli.summary(month.as_deref(), share),
    }
}

struct Cli {
    store: SQLiteLedgerStore,
    timezone: String,
    json: bool,
}

impl Cli {
    fn partner(&self, command: PartnerCommand) -> Result<(), Box<dyn Error>> {
        match command {
            PartnerCommand::Add {
                name,
                price_out,
                price_back,
                notes,
            } => {
                let mut new_partner = NewPartner::build(PartnerName::new(&name)?);
                if let Some(price) = price_out {
                    new_partner = new_partner.price_out(&price)?;
                }
                if let Some(price) = price_back {
                    new_partner = new_partner.price_back(&price)?;
                }
                let new_partner = new_partner.notes(notes.as_deref());

                let partner = add_partner(&self.store, new_partner)?;
                self.output(&partner, || format_partner(&partner))
            }
            PartnerCommand::List => {
                let partners = self.store.get_partners()?;
                self.output(&partners, || {
                    partners.iter().map(format_partner).collect::<Vec<_>>().join("\n")
                })
            }
            PartnerCommand::Delete { id } => {
                let removal = remove_partner(&self.store, id)?;
                self.output(&removal, || removal.to_string())
            }
        }
    }

    fn ride(&self, command: RideCommand) -> Result<(), Box<dyn Error>> {
        match command {
            RideCommand::Add {
                partner,
                date,
                outbound,
                return_ride,
            } => {
                let legs = RideLegs::new(outbound, return_ride)?;
                let date = self.date_or_today(date.as_deref())?;

                let ride = add_ride(&self.store, partner, date, legs)?;
                self.output(&ride, || {
                    format!(
                        "Added ride {} on {} ({}), charged {}",
                        ride.id,
                        ride.date,
                        ride.legs.label(),
                        ride.amount
                    )
                })
            }
            RideCommand::Edit {
                id,
                date,
                outbound,
                return_ride,
            } => {
                let ride = ride_to_edit(&self.store, id)?;
                let legs = RideLegs::new(
                    outbound.unwrap_or(ride.legs.outbound()),
                    return_ride.unwrap_or(ride.legs.return_ride()),
                )?;
                let date = match date {
                    Some(date) => parse_date(&date)?,
                    None => ride.date,
                };

                let ride = edit_ride(&self.store, id, date, legs)?;
                self.output(&ride, || {
                    format!(
                        "Updated ride {} to {} ({}), charged {}",
                        ride.id,
                        ride.date,
                        ride.legs.label(),
                        ride.amount
                    )
                })
            }
            RideCommand::Delete { id } => {
                let ride = remove_ride(&self.store, id)?;
                self.output(&ride, || format!("Deleted ride {} on {}", ride.id, ride.date))
            }
            RideCommand::List { limit } => {
                let rides = self.store.get_recent_rides(limit)?;
                let names = self.partner_names()?;
                self.output(&rides, || {
                    rides
                        .iter()
                        .map(|ride| {
                            format!(
                                "{}\t{}\t{}\t{}\t{}",
                                ride.id,
                                ride.date,
                                partner_name(&names, ride.partner_id),
                                ride.legs.label(),
                                ride.amount
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })
            }
            RideCommand::Month {
                partner,
                month,
                outbound,
                return_ride,
            } => {
                let legs = RideLegs::new(outbound, return_ride)?;
                let month = self.month_or_current(month.as_deref())?;

                let report = add_month_weekday_rides(&self.store, partner, month, legs)?;
                self.output(&report, || report.to_string())
            }
        }
    }

    fn payment(&self, command: PaymentCommand) -> Result<(), Box<dyn Error>> {
        match command {
            PaymentCommand::Add {
                partner,
                amount,
                date,
                description,
            } => {
                let amount = PaymentAmount::new(&amount)?;
                let date = self.date_or_today(date.as_deref())?;

                let payment = add_payment(
                    &self.store,
                    NewPayment::new(partner, amount, date, description.as_deref()),
                )?;
                self.output(&payment, || {
                    format!(
                        "Recorded payment {} of {} on {}",
                        payment.id, payment.amount, payment.date
                    )
                })
            }
            PaymentCommand::List { limit } => {
                let payments = self.store.get_recent_payments(limit)?;
                let names = self.partner_names()?;
                self.output(&payments, || {
                    payments
                        .iter()
                        .map(|payment| {
                            format!(
                                "{}\t{}\t{}\t{}\t{}",
                                payment.id,
                                payment.date,
                                partner_name(&names, payment.partner_id),
                                payment.amount,
                                payment.description.as_deref().unwrap_or("")
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })
            }
            PaymentCommand::Delete { id } => {
                remove_payment(&self.store, id)?;
                self.output(&json!({ "deleted": id }), || format!("Deleted payment {id}"))
            }
        }
    }

    fn dashboard(&self) -> Result<(), Box<dyn Error>> {
        let balances = load_dashboard(&self.store)?;

        self.output(&balances, || {
            balances
                .iter()
                .map(|row| {
                    format!(
                        "{}\tpaid {}\tcharged {}\tbalance {}",
                        row.partner.name,
                        format_amount(row.total_paid),
                        format_amount(row.total_charged),
                        format_signed_amount(row.balance)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    fn summary(&self, month: Option<&str>, share: bool) -> Result<(), Box<dyn Error>> {
        let month = self.month_or_current(month)?;
        let summary = load_monthly_summary(&self.store, month)?;

        if share {
            let text = summary.share_text();
            let url = whatsapp_share_url(&text)?;
            return self.output(&json!({ "text": &text, "url": &url }), || {
                format!("{text}\n\n{url}")
            });
        }

        self.output(&summary, || {
            summary
                .rows
                .iter()
                .map(|row| {
                    format!(
                        "{}\trides {}\tpaid {}\tnet {}\tbalance {} ({})",
                        row.partner.name,
                        format_amount(row.rides_total),
                        format_amount(row.payments_total),
                        format_signed_amount(row.net),
                        format_signed_amount(row.balance_to_date),
                        row.status()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    /// Print `value` as JSON, or the text from `render` otherwise.
    fn output<T: Serialize>(
        &self,
        value: &T,
        render: impl FnOnce() -> String,
    ) -> Result<(), Box<dyn Error>> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            let text = render();
            if !text.is_empty() {
                println!("{text}");
            }
        }

        Ok(())
    }

    fn date_or_today(&self, date: Option<&str>) -> Result<Date, Box<dyn Error>> {
        match date {
            Some(date) => Ok(parse_date(date)?),
            None => Ok(today(&self.timezone)?),
        }
    }

    fn month_or_current(&self, month: Option<&str>) -> Result<Date, Box<dyn Error>> {
        match month {
            Some(month) => Ok(parse_month_key(month)?),
            None => Ok(today(&self.timezone)?),
        }
    }

    fn partner_names(&self) -> Result<HashMap<PartnerId, String>, Box<dyn Error>> {
        Ok(self
            .store
            .get_partners()?
            .into_iter()
            .map(|partner| (partner.id, partner.name))
            .collect())
    }
}

/// The ride an edit starts from, reported the same way [edit_ride] reports a missing ride.
fn ride_to_edit(store: &impl LedgerStore, id: RideId) -> Result<Ride, LedgerError> {
    store.get_ride(id).map_err(|error| match error {
        LedgerError::NotFound => LedgerError::UpdateMissingRide,
        error => error,
    })
}

fn format_partner(partner: &Partner) -> String {
    format!(
        "{}\t{}\tout {}\tback {}\t{}",
        partner.id,
        partner.name,
        partner.price_out,
        partner.price_back,
        partner.notes.as_deref().unwrap_or("")
    )
}

fn partner_name(names: &HashMap<PartnerId, String>, partner_id: PartnerId) -> &str {
    names.get(&partner_id).map_or("?", String::as_str)
}
