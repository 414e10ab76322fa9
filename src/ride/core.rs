//! Defines the ride model and its database queries.

use rusqlite::{Connection, Row, params_from_iter};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error, PartnerId, RideId,
    money::format_amount,
    partner::Partner,
    pricing::RideLegs,
};

// ============================================================================
// MODELS
// ============================================================================

/// A ride given to a partner on a date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ride {
    /// The ID of the ride.
    pub id: RideId,
    /// The partner the ride is charged to.
    pub partner_id: PartnerId,
    /// The day of the ride.
    pub date: Date,
    /// Which legs of the trip were taken.
    #[serde(flatten)]
    pub legs: RideLegs,
    /// The charge for the ride as two-decimal text.
    ///
    /// Computed from the partner's prices when the ride was recorded or last
    /// edited.
    pub amount: String,
    /// When the ride was recorded.
    pub created_at: OffsetDateTime,
}

/// A ride that has not been saved yet.
///
/// Use [NewRide::priced] so the charge matches the partner's current prices.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRide {
    /// The partner the ride is charged to.
    pub partner_id: PartnerId,
    /// The day of the ride.
    pub date: Date,
    /// Which legs of the trip were taken.
    pub legs: RideLegs,
    /// The charge for the ride as two-decimal text.
    pub amount: String,
}

impl NewRide {
    /// A ride for `partner` charged at the partner's current prices.
    pub fn priced(partner: &Partner, date: Date, legs: RideLegs) -> Self {
        Self {
            partner_id: partner.id,
            date,
            legs,
            amount: format_amount(legs.charge(partner)),
        }
    }
}

/// New values for an existing ride. The partner of a ride cannot change.
#[derive(Debug, Clone, PartialEq)]
pub struct RideUpdate {
    /// The new day of the ride.
    pub date: Date,
    /// The new legs of the ride.
    pub legs: RideLegs,
    /// The recomputed charge as two-decimal text.
    pub amount: String,
}

impl RideUpdate {
    /// An update that re-prices the ride at `partner`'s current prices.
    pub fn priced(partner: &Partner, date: Date, legs: RideLegs) -> Self {
        Self {
            date,
            legs,
            amount: format_amount(legs.charge(partner)),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const RIDE_COLUMNS: &str = "id, partner_id, date, outbound, return_ride, amount, created_at";

/// Create the ride table and its indexes.
pub fn create_ride_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS ride (
            id INTEGER PRIMARY KEY,
            partner_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            outbound INTEGER NOT NULL,
            return_ride INTEGER NOT NULL,
            amount TEXT NOT NULL,
            created_at TEXT NOT NULL,
            CHECK (outbound OR return_ride),
            FOREIGN KEY(partner_id) REFERENCES partner(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_ride_partner_date ON ride(partner_id, date);",
    )?;

    Ok(())
}

/// Insert `rides` in a single database transaction.
///
/// Either every ride is inserted or none are.
///
/// # Errors
/// Returns [Error::InvalidForeignKey] if a ride refers to a missing partner, or
/// [Error::SqlError] for other SQL errors.
pub fn create_rides(rides: &[NewRide], connection: &Connection) -> Result<Vec<Ride>, Error> {
    let transaction = connection.unchecked_transaction()?;
    let created_at = OffsetDateTime::now_utc();

    let created = {
        let mut statement = transaction.prepare(&format!(
            "INSERT INTO ride (partner_id, date, outbound, return_ride, amount, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {RIDE_COLUMNS}"
        ))?;

        rides
            .iter()
            .map(|ride| {
                statement.query_row(
                    (
                        ride.partner_id,
                        ride.date,
                        ride.legs.outbound(),
                        ride.legs.return_ride(),
                        &ride.amount,
                        created_at,
                    ),
                    map_ride_row,
                )
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    transaction.commit()?;

    Ok(created)
}

/// Retrieve a single ride by ID.
///
/// # Errors
/// Returns [Error::NotFound] if there is no ride with `id`.
pub fn get_ride(id: RideId, connection: &Connection) -> Result<Ride, Error> {
    connection
        .prepare(&format!("SELECT {RIDE_COLUMNS} FROM ride WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_ride_row)
        .map_err(|error| error.into())
}

/// Retrieve every ride belonging to one of `partner_ids`, newest first.
pub fn get_rides_for_partners(
    partner_ids: &[PartnerId],
    connection: &Connection,
) -> Result<Vec<Ride>, Error> {
    if partner_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; partner_ids.len()].join(", ");

    connection
        .prepare(&format!(
            "SELECT {RIDE_COLUMNS} FROM ride
             WHERE partner_id IN ({placeholders})
             ORDER BY date DESC, id DESC"
        ))?
        .query_map(params_from_iter(partner_ids), map_ride_row)?
        .map(|maybe_ride| maybe_ride.map_err(|error| error.into()))
        .collect()
}

/// Retrieve up to `limit` rides across all partners, newest first.
pub fn get_recent_rides(limit: u64, connection: &Connection) -> Result<Vec<Ride>, Error> {
    connection
        .prepare(&format!(
            "SELECT {RIDE_COLUMNS} FROM ride ORDER BY date DESC, id DESC LIMIT ?1"
        ))?
        .query_map([i64::try_from(limit).unwrap_or(i64::MAX)], map_ride_row)?
        .map(|maybe_ride| maybe_ride.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the date, legs and charge of a ride.
///
/// # Errors
/// Returns [Error::UpdateMissingRide] if the ride doesn't exist.
pub fn update_ride(id: RideId, update: RideUpdate, connection: &Connection) -> Result<Ride, Error> {
    connection
        .prepare(&format!(
            "UPDATE ride SET date = ?1, outbound = ?2, return_ride = ?3, amount = ?4
             WHERE id = ?5
             RETURNING {RIDE_COLUMNS}"
        ))?
        .query_row(
            (
                update.date,
                update.legs.outbound(),
                update.legs.return_ride(),
                update.amount,
                id,
            ),
            map_ride_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingRide,
            error => error.into(),
        })
}

/// Delete a ride by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingRide] if the ride doesn't exist.
pub fn delete_ride(id: RideId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM ride WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRide);
    }

    Ok(())
}

fn map_ride_row(row: &Row) -> Result<Ride, rusqlite::Error> {
    Ok(Ride {
        id: row.get(0)?,
        partner_id: row.get(1)?,
        date: row.get(2)?,
        legs: RideLegs::new_unchecked(row.get(3)?, row.get(4)?),
        amount: row.get(5)?,
        created_at: row.get(6)?,
    })
}
