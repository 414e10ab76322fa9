//! Defines the ledger store trait.

use std::slice;

use crate::{
    Error, PartnerId, PaymentId, RideId,
    partner::{NewPartner, Partner},
    payment::{NewPayment, Payment},
    ride::{NewRide, Ride, RideUpdate},
};

/// Handles the creation, retrieval and deletion of partners, rides and payments.
///
/// Monetary fields cross this boundary as two-decimal text. Listings may come
/// back in any order unless stated otherwise; callers sort and filter what they
/// need.
pub trait LedgerStore {
    /// Retrieve all partners, oldest first.
    fn get_partners(&self) -> Result<Vec<Partner>, Error>;

    /// Retrieve a partner by ID.
    ///
    /// Implementers should return [Error::NotFound] if the partner does not exist.
    fn get_partner(&self, id: PartnerId) -> Result<Partner, Error>;

    /// Add a partner to the store.
    fn create_partner(&self, partner: NewPartner) -> Result<Partner, Error>;

    /// Remove a partner along with all of its rides and payments.
    ///
    /// Implementers should return [Error::DeleteMissingPartner] if the partner does not exist.
    fn delete_partner(&self, id: PartnerId) -> Result<(), Error>;

    /// Retrieve a ride by ID.
    ///
    /// Implementers should return [Error::NotFound] if the ride does not exist.
    fn get_ride(&self, id: RideId) -> Result<Ride, Error>;

    /// Retrieve every ride belonging to one of `partner_ids`.
    fn get_rides(&self, partner_ids: &[PartnerId]) -> Result<Vec<Ride>, Error>;

    /// Retrieve up to `limit` rides across all partners, newest first.
    fn get_recent_rides(&self, limit: u64) -> Result<Vec<Ride>, Error>;

    /// Add many rides to the store at once.
    ///
    /// Implementers should either store every ride or none of them.
    fn create_rides(&self, rides: &[NewRide]) -> Result<Vec<Ride>, Error>;

    /// Add a single ride to the store.
    fn create_ride(&self, ride: NewRide) -> Result<Ride, Error> {
        self.create_rides(slice::from_ref(&ride))?
            .pop()
            .ok_or(Error::NotFound)
    }

    /// Overwrite a ride's date, legs and charge.
    ///
    /// Implementers should return [Error::UpdateMissingRide] if the ride does not exist.
    fn update_ride(&self, id: RideId, update: RideUpdate) -> Result<Ride, Error>;

    /// Remove a ride.
    ///
    /// Implementers should return [Error::DeleteMissingRide] if the ride does not exist.
    fn delete_ride(&self, id: RideId) -> Result<(), Error>;

    /// Retrieve every payment from one of `partner_ids`.
    fn get_payments(&self, partner_ids: &[PartnerId]) -> Result<Vec<Payment>, Error>;

    /// Retrieve up to `limit` payments across all partners, newest first.
    fn get_recent_payments(&self, limit: u64) -> Result<Vec<Payment>, Error>;

    /// Add a payment to the store.
    fn create_payment(&self, payment: NewPayment) -> Result<Payment, Error>;

    /// Remove a payment.
    ///
    /// Implementers should return [Error::DeleteMissingPayment] if the payment does not exist.
    fn delete_payment(&self, id: PaymentId) -> Result<(), Error>;
}
