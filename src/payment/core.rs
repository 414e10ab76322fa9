//! Defines the payment model and its database queries.

use rusqlite::{Connection, Row, params_from_iter};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error, PartnerId, PaymentId,
    money::{format_amount, normalize_amount},
};

// ============================================================================
// MODELS
// ============================================================================

/// Money received from a partner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    /// The ID of the payment.
    pub id: PaymentId,
    /// The partner who paid.
    pub partner_id: PartnerId,
    /// The amount paid as two-decimal text.
    pub amount: String,
    /// The day the payment was received.
    pub date: Date,
    /// What the payment was for.
    pub description: Option<String>,
    /// When the payment was recorded.
    pub created_at: OffsetDateTime,
}

/// A payment amount entered by the user, validated to be greater than zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAmount(String);

impl PaymentAmount {
    /// Parse a user-entered amount.
    ///
    /// The amount is stored as two-decimal text.
    ///
    /// # Errors
    /// Returns [Error::InvalidPaymentAmount] unless `raw` is a finite number
    /// that is still greater than zero once rounded to cents.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let amount = match raw.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() => format_amount(amount),
            _ => return Err(Error::InvalidPaymentAmount(raw.to_owned())),
        };

        if normalize_amount(&amount) > 0.0 {
            Ok(Self(amount))
        } else {
            Err(Error::InvalidPaymentAmount(raw.to_owned()))
        }
    }
}

impl AsRef<str> for PaymentAmount {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A payment that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    /// The partner who paid.
    pub partner_id: PartnerId,
    /// The amount paid.
    pub amount: PaymentAmount,
    /// The day the payment was received.
    pub date: Date,
    /// What the payment was for. Blank descriptions are stored as none.
    pub description: Option<String>,
}

impl NewPayment {
    /// Create a payment with a trimmed, optional description.
    pub fn new(
        partner_id: PartnerId,
        amount: PaymentAmount,
        date: Date,
        description: Option<&str>,
    ) -> Self {
        Self {
            partner_id,
            amount,
            date,
            description: description
                .map(str::trim)
                .filter(|description| !description.is_empty())
                .map(str::to_owned),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const PAYMENT_COLUMNS: &str = "id, partner_id, amount, date, description, created_at";

/// Create the payment table and its indexes.
pub fn create_payment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS payment (
            id INTEGER PRIMARY KEY,
            partner_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            date TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(partner_id) REFERENCES partner(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_payment_partner_date ON payment(partner_id, date);",
    )?;

    Ok(())
}

/// Insert a payment and return it with its generated ID.
///
/// # Errors
/// Returns [Error::InvalidForeignKey] if the partner does not exist.
pub fn create_payment(payment: NewPayment, connection: &Connection) -> Result<Payment, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO payment (partner_id, amount, date, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {PAYMENT_COLUMNS}"
        ))?
        .query_row(
            (
                payment.partner_id,
                payment.amount.as_ref(),
                payment.date,
                payment.description,
                OffsetDateTime::now_utc(),
            ),
            map_payment_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve every payment from one of `partner_ids`, newest first.
pub fn get_payments_for_partners(
    partner_ids: &[PartnerId],
    connection: &Connection,
) -> Result<Vec<Payment>, Error> {
    if partner_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; partner_ids.len()].join(", ");

    connection
        .prepare(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment
             WHERE partner_id IN ({placeholders})
             ORDER BY date DESC, id DESC"
        ))?
        .query_map(params_from_iter(partner_ids), map_payment_row)?
        .map(|maybe_payment| maybe_payment.map_err(|error| error.into()))
        .collect()
}

/// Retrieve up to `limit` payments across all partners, newest first.
pub fn get_recent_payments(limit: u64, connection: &Connection) -> Result<Vec<Payment>, Error> {
    connection
        .prepare(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment ORDER BY date DESC, id DESC LIMIT ?1"
        ))?
        .query_map([i64::try_from(limit).unwrap_or(i64::MAX)], map_payment_row)?
        .map(|maybe_payment| maybe_payment.map_err(|error| error.into()))
        .collect()
}

/// Delete a payment by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingPayment] if the payment doesn't exist.
pub fn delete_payment(id: PaymentId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM payment WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingPayment);
    }

    Ok(())
}

fn map_payment_row(row: &Row) -> Result<Payment, rusqlite::Error> {
    Ok(Payment {
        id: row.get(0)?,
        partner_id: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
    })
}
