//! Removing rides.

use crate::{Error, RideId, ride::Ride, stores::LedgerStore};

/// Delete a ride and return it as it was.
///
/// # Errors
/// Returns [Error::DeleteMissingRide] if the ride does not exist.
pub fn remove_ride(store: &impl LedgerStore, id: RideId) -> Result<Ride, Error> {
    let ride = store.get_ride(id).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingRide,
        error => error,
    })?;

    store.delete_ride(id)?;

    tracing::info!(
        "Deleted ride {} of partner {} on {} ({})",
        ride.id,
        ride.partner_id,
        ride.date,
        ride.amount
    );

    Ok(ride)
}
