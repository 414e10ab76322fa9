use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    SQLiteLedgerStore,
    db::initialize,
    partner::{NewPartner, Partner, PartnerName},
    stores::LedgerStore,
};

/// A store backed by a fresh in-memory database.
pub(crate) fn get_test_store() -> SQLiteLedgerStore {
    let connection =
        Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
    initialize(&connection).expect("Could not create the database tables");

    SQLiteLedgerStore::new(Arc::new(Mutex::new(connection)))
}

/// Add a partner with the given leg prices to `store`.
#[track_caller]
pub(crate) fn create_test_partner(
    store: &impl LedgerStore,
    name: &str,
    price_out: &str,
    price_back: &str,
) -> Partner {
    let new_partner = NewPartner::build(PartnerName::new(name).unwrap())
        .price_out(price_out)
        .unwrap()
        .price_back(price_back)
        .unwrap();

    store.create_partner(new_partner).unwrap()
}
