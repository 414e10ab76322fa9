//! Defines the ride partner model and its database queries.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, PartnerId, money::format_amount};

// ============================================================================
// MODELS
// ============================================================================

/// The price stored for a leg when none is given.
pub const DEFAULT_PRICE: &str = "0.00";

/// A person who is charged for rides and credited for payments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partner {
    /// The ID of the partner.
    pub id: PartnerId,
    /// The partner's display name.
    pub name: String,
    /// The price of an outbound leg as two-decimal text.
    pub price_out: String,
    /// The price of a return leg as two-decimal text.
    pub price_back: String,
    /// Free-text notes about the partner.
    pub notes: Option<String>,
    /// When the partner was added.
    pub created_at: OffsetDateTime,
}

/// A validated, non-empty partner name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartnerName(String);

impl PartnerName {
    /// Create a partner name from trimmed `name`.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyPartnerName] if `name` is empty or whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyPartnerName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }
}

impl AsRef<str> for PartnerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PartnerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A partner that has not been saved yet.
///
/// Both prices default to [DEFAULT_PRICE].
#[derive(Debug, Clone, PartialEq)]
pub struct NewPartner {
    name: PartnerName,
    price_out: String,
    price_back: String,
    notes: Option<String>,
}

impl NewPartner {
    /// Start building a partner called `name`.
    pub fn build(name: PartnerName) -> Self {
        Self {
            name,
            price_out: DEFAULT_PRICE.to_owned(),
            price_back: DEFAULT_PRICE.to_owned(),
            notes: None,
        }
    }

    /// Set the outbound price from user input.
    ///
    /// # Errors
    /// Returns [Error::InvalidPrice] if `price` is not a non-negative number.
    pub fn price_out(mut self, price: &str) -> Result<Self, Error> {
        self.price_out = parse_price(price)?;
        Ok(self)
    }

    /// Set the return price from user input.
    ///
    /// # Errors
    /// Returns [Error::InvalidPrice] if `price` is not a non-negative number.
    pub fn price_back(mut self, price: &str) -> Result<Self, Error> {
        self.price_back = parse_price(price)?;
        Ok(self)
    }

    /// Set the notes. Blank notes are stored as no notes.
    pub fn notes(mut self, notes: Option<&str>) -> Self {
        self.notes = notes
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_owned);
        self
    }
}

/// Parse a user-entered price into the two-decimal text that is stored.
fn parse_price(raw: &str) -> Result<String, Error> {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(format_amount(price)),
        _ => Err(Error::InvalidPrice(raw.to_owned())),
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the partner table.
pub fn create_partner_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS partner (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            price_out TEXT NOT NULL DEFAULT '0.00',
            price_back TEXT NOT NULL DEFAULT '0.00',
            notes TEXT,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Insert a partner and return it with its generated ID.
pub fn create_partner(partner: NewPartner, connection: &Connection) -> Result<Partner, Error> {
    connection
        .prepare(
            "INSERT INTO partner (name, price_out, price_back, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, name, price_out, price_back, notes, created_at",
        )?
        .query_row(
            (
                partner.name.as_ref(),
                partner.price_out,
                partner.price_back,
                partner.notes,
                OffsetDateTime::now_utc(),
            ),
            map_partner_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a single partner by ID.
///
/// # Errors
/// Returns [Error::NotFound] if there is no partner with `id`.
pub fn get_partner(id: PartnerId, connection: &Connection) -> Result<Partner, Error> {
    connection
        .prepare(
            "SELECT id, name, price_out, price_back, notes, created_at
             FROM partner WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_partner_row)
        .map_err(|error| error.into())
}

/// Retrieve all partners, oldest first.
pub fn get_all_partners(connection: &Connection) -> Result<Vec<Partner>, Error> {
    connection
        .prepare(
            "SELECT id, name, price_out, price_back, notes, created_at
             FROM partner ORDER BY created_at ASC, id ASC",
        )?
        .query_map([], map_partner_row)?
        .map(|maybe_partner| maybe_partner.map_err(|error| error.into()))
        .collect()
}

/// Delete a partner along with its rides and payments.
///
/// # Errors
/// Returns [Error::DeleteMissingPartner] if the partner doesn't exist.
pub fn delete_partner(id: PartnerId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM partner WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingPartner);
    }

    Ok(())
}

fn map_partner_row(row: &Row) -> Result<Partner, rusqlite::Error> {
    Ok(Partner {
        id: row.get(0)?,
        name: row.get(1)?,
        price_out: row.get(2)?,
        price_back: row.get(3)?,
        notes: row.get(4)?,
        created_at: row.get(5)?,
    })
}
