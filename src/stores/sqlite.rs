//! Implements a SQLite backed ledger store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    Error, PartnerId, PaymentId, RideId, partner,
    partner::{NewPartner, Partner},
    payment,
    payment::{NewPayment, Payment},
    ride,
    ride::{NewRide, Ride, RideUpdate},
    stores::LedgerStore,
};

/// Stores partners, rides and payments in a SQLite database.
///
/// The database must have been set up with [crate::initialize_db], which also
/// turns on the foreign key enforcement that cascades partner deletion.
#[derive(Debug, Clone)]
pub struct SQLiteLedgerStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteLedgerStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire the database lock: {error}");
            Error::DatabaseLockError
        })
    }

    #[cfg(test)]
    pub(crate) fn connection_for_tests(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap()
    }
}

impl LedgerStore for SQLiteLedgerStore {
    fn get_partners(&self) -> Result<Vec<Partner>, Error> {
        partner::get_all_partners(&*self.connection()?)
    }

    fn get_partner(&self, id: PartnerId) -> Result<Partner, Error> {
        partner::get_partner(id, &*self.connection()?)
    }

    fn create_partner(&self, new_partner: NewPartner) -> Result<Partner, Error> {
        partner::create_partner(new_partner, &*self.connection()?)
    }

    fn delete_partner(&self, id: PartnerId) -> Result<(), Error> {
        partner::delete_partner(id, &*self.connection()?)
    }

    fn get_ride(&self, id: RideId) -> Result<Ride, Error> {
        ride::get_ride(id, &*self.connection()?)
    }

    fn get_rides(&self, partner_ids: &[PartnerId]) -> Result<Vec<Ride>, Error> {
        ride::get_rides_for_partners(partner_ids, &*self.connection()?)
    }

    fn get_recent_rides(&self, limit: u64) -> Result<Vec<Ride>, Error> {
        ride::get_recent_rides(limit, &*self.connection()?)
    }

    fn create_rides(&self, rides: &[NewRide]) -> Result<Vec<Ride>, Error> {
        ride::create_rides(rides, &*self.connection()?)
    }

    fn update_ride(&self, id: RideId, update: RideUpdate) -> Result<Ride, Error> {
        ride::update_ride(id, update, &*self.connection()?)
    }

    fn delete_ride(&self, id: RideId) -> Result<(), Error> {
        ride::delete_ride(id, &*self.connection()?)
    }

    fn get_payments(&self, partner_ids: &[PartnerId]) -> Result<Vec<Payment>, Error> {
        payment::get_payments_for_partners(partner_ids, &*self.connection()?)
    }

    fn get_recent_payments(&self, limit: u64) -> Result<Vec<Payment>, Error> {
        payment::get_recent_payments(limit, &*self.connection()?)
    }

    fn create_payment(&self, new_payment: NewPayment) -> Result<Payment, Error> {
        payment::create_payment(new_payment, &*self.connection()?)
    }

    fn delete_payment(&self, id: PaymentId) -> Result<(), Error> {
        payment::delete_payment(id, &*self.connection()?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        partner::{NewPartner, PartnerName},
        payment::{NewPayment, PaymentAmount},
        pricing::RideLegs,
        ride::{NewRide, RideUpdate},
        stores::LedgerStore,
    };

    use super::SQLiteLedgerStore;

    fn get_store() -> SQLiteLedgerStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        SQLiteLedgerStore::new(Arc::new(Mutex::new(connection)))
    }

    #[test]
    fn create_ride_returns_single_ride() {
        let store = get_store();
        let partner = store
            .create_partner(
                NewPartner::build(PartnerName::new("Alex").unwrap())
                    .price_out("15")
                    .unwrap(),
            )
            .unwrap();

        let ride = store
            .create_ride(NewRide::priced(&partner, date!(2024 - 02 - 01), RideLegs::OUTBOUND))
            .unwrap();

        assert_eq!(ride.amount, "15.00");
        assert_eq!(store.get_rides(&[partner.id]).unwrap(), vec![ride]);
    }

    #[test]
    fn partner_delete_cascades() {
        let store = get_store();
        let partner = store
            .create_partner(NewPartner::build(PartnerName::new("Alex").unwrap()))
            .unwrap();
        let other = store
            .create_partner(NewPartner::build(PartnerName::new("Sam").unwrap()))
            .unwrap();
        for id in [partner.id, other.id] {
            let owner = store.get_partner(id).unwrap();
            store
                .create_ride(NewRide::priced(&owner, date!(2024 - 02 - 01), RideLegs::BOTH))
                .unwrap();
            store
                .create_payment(NewPayment::new(
                    id,
                    PaymentAmount::new("10").unwrap(),
                    date!(2024 - 02 - 01),
                    None,
                ))
                .unwrap();
        }

        store.delete_partner(partner.id).unwrap();

        assert_eq!(store.get_partners().unwrap(), vec![other.clone()]);
        assert_eq!(store.get_rides(&[partner.id]).unwrap(), vec![]);
        assert_eq!(store.get_payments(&[partner.id]).unwrap(), vec![]);
        assert_eq!(store.get_rides(&[other.id]).unwrap().len(), 1);
        assert_eq!(store.get_payments(&[other.id]).unwrap().len(), 1);
    }

    #[test]
    fn updates_lists_and_deletes_through_store() {
        let store = get_store();
        let partner = store
            .create_partner(
                NewPartner::build(PartnerName::new("Alex").unwrap())
                    .price_out("15")
                    .unwrap()
                    .price_back("12")
                    .unwrap(),
            )
            .unwrap();
        let ride = store
            .create_ride(NewRide::priced(&partner, date!(2024 - 02 - 01), RideLegs::OUTBOUND))
            .unwrap();
        let payment = store
            .create_payment(NewPayment::new(
                partner.id,
                PaymentAmount::new("30").unwrap(),
                date!(2024 - 02 - 02),
                None,
            ))
            .unwrap();

        let updated = store
            .update_ride(
                ride.id,
                RideUpdate::priced(&partner, date!(2024 - 02 - 03), RideLegs::BOTH),
            )
            .unwrap();

        assert_eq!(updated.amount, "27.00");
        assert_eq!(store.get_ride(ride.id).unwrap(), updated);
        assert_eq!(store.get_recent_rides(10).unwrap(), vec![updated]);
        assert_eq!(store.get_recent_payments(10).unwrap(), vec![payment.clone()]);

        store.delete_ride(ride.id).unwrap();
        store.delete_payment(payment.id).unwrap();

        assert_eq!(store.get_recent_rides(10).unwrap(), vec![]);
        assert_eq!(store.get_recent_payments(10).unwrap(), vec![]);
    }
}
