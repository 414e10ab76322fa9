//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, partner::create_partner_table, payment::create_payment_table,
    ride::create_ride_table,
};

/// Turn on foreign key enforcement and create any missing tables.
///
/// Foreign key enforcement is a per-connection setting in SQLite, so this must
/// be called on every new connection before it is used. Deleting a partner
/// relies on it to cascade to the partner's rides and payments.
///
/// # Errors
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_partner_table(&transaction)?;
    create_ride_table(&transaction)?;
    create_payment_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
