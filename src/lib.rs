//! Ride Ledger tracks informal ride-sharing arrangements with a set of ride
//! partners.
//!
//! Rides are charged per leg (outbound and/or return) at the partner's prices
//! when the ride is recorded, payments from partners are credited, and the
//! balance for a partner is the total paid minus the total charged. A positive
//! balance is a credit held for the partner; a negative balance is money the
//! partner owes.
//!
//! Persistence goes through the [LedgerStore] trait. [SQLiteLedgerStore] is the
//! bundled implementation.

#![warn(missing_docs)]

pub mod balance;
mod database_id;
mod db;
mod logging;
pub mod money;
pub mod month;
pub mod partner;
pub mod payment;
pub mod pricing;
pub mod ride;
pub mod stores;
#[cfg(test)]
mod test_utils;
mod timezone;

pub use database_id::{DatabaseId, PartnerId, PaymentId, RideId};
pub use db::initialize as initialize_db;
pub use logging::init_logging;
pub use stores::{LedgerStore, SQLiteLedgerStore};
pub use timezone::{get_local_offset, today};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A ride was submitted with neither the outbound nor the return leg.
    #[error("Select outbound and/or return.")]
    NoLegSelected,

    /// An empty string was used as a partner name.
    #[error("Partner name cannot be empty")]
    EmptyPartnerName,

    /// A partner price was not a non-negative decimal.
    #[error("\"{0}\" is not a valid price, prices must be a number no less than zero")]
    InvalidPrice(String),

    /// A payment amount was not a positive decimal.
    #[error("\"{0}\" is not a valid payment amount, amounts must be a number greater than zero")]
    InvalidPaymentAmount(String),

    /// A month key was not in the `yyyy-MM` format.
    #[error("\"{0}\" is not a valid month, expected the format yyyy-MM")]
    InvalidMonth(String),

    /// A date was not in the `yyyy-MM-dd` format.
    #[error("\"{0}\" is not a valid date, expected the format yyyy-MM-dd")]
    InvalidDate(String),

    /// The partner a ride or payment refers to does not exist.
    #[error("Partner not found.")]
    PartnerNotFound,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A record referred to a partner that is not in the database.
    #[error("the record refers to a partner that does not exist")]
    InvalidForeignKey,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A store other than SQLite failed.
    ///
    /// The string is the store's description of the failure and is shown to
    /// the user as is.
    #[error("{0}")]
    Backend(String),

    /// Tried to update a ride that does not exist.
    #[error("tried to update a ride that is not in the database")]
    UpdateMissingRide,

    /// Tried to delete a partner that does not exist.
    #[error("tried to delete a partner that is not in the database")]
    DeleteMissingPartner,

    /// Tried to delete a ride that does not exist.
    #[error("tried to delete a ride that is not in the database")]
    DeleteMissingRide,

    /// Tried to delete a payment that does not exist.
    #[error("tried to delete a payment that is not in the database")]
    DeleteMissingPayment,

    /// A batch of a bulk ride insert failed.
    ///
    /// Batches before the failing one were committed and are not rolled back;
    /// `inserted` counts the rides in those batches. No later batch was sent.
    #[error("inserted {inserted} rides before a batch failed: {source}")]
    BatchInsertFailed {
        /// The number of rides committed before the failure.
        inserted: usize,
        /// Why the batch failed.
        source: Box<Error>,
    },

    /// A share link could not be built from the summary text.
    #[error("could not encode the share link: {0}")]
    UrlEncodingError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Error::InvalidForeignKey
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use rusqlite::Connection;

    use crate::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        let connection = Connection::open_in_memory().unwrap();

        let error: Error = connection
            .query_row("SELECT 1 WHERE 0", [], |row| row.get::<_, i64>(0))
            .unwrap_err()
            .into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn batch_failure_message_includes_count_and_cause() {
        let error = Error::BatchInsertFailed {
            inserted: 200,
            source: Box::new(Error::Backend("payload too large".to_owned())),
        };

        assert_eq!(
            error.to_string(),
            "inserted 200 rides before a batch failed: payload too large"
        );
    }
}
