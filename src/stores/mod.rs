//! The data backend for partners, rides and payments.
//!
//! [LedgerStore] is the contract the ledger needs from a backend: listing
//! records, inserting one or many, updating rides and deleting by ID, with
//! partner deletion cascading to the partner's rides and payments.

mod ledger;
mod sqlite;

pub use ledger::LedgerStore;
pub use sqlite::SQLiteLedgerStore;
