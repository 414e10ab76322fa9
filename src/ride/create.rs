//! Recording and editing single rides.

use time::Date;

use crate::{
    Error, PartnerId, RideId,
    partner::Partner,
    pricing::RideLegs,
    ride::{NewRide, Ride, RideUpdate},
    stores::LedgerStore,
};

/// Record a ride for a partner, charged at the partner's current prices.
///
/// # Errors
/// Returns [Error::PartnerNotFound] if the partner does not exist, or the
/// store's error if the ride could not be saved.
pub fn add_ride(
    store: &impl LedgerStore,
    partner_id: PartnerId,
    date: Date,
    legs: RideLegs,
) -> Result<Ride, Error> {
    let partner = get_ride_partner(store, partner_id)?;
    let ride = store.create_ride(NewRide::priced(&partner, date, legs))?;

    tracing::info!(
        "Added ride {} for {} on {} ({}), charged {}",
        ride.id,
        partner.name,
        ride.date,
        ride.legs.label(),
        ride.amount
    );

    Ok(ride)
}

/// Change the date and legs of a ride.
///
/// The charge is recalculated from the partner's prices as they are now, which
/// may differ from the prices when the ride was first recorded.
///
/// # Errors
/// Returns [Error::UpdateMissingRide] if the ride does not exist,
/// [Error::PartnerNotFound] if its partner no longer exists, or the store's
/// error if the update failed.
pub fn edit_ride(
    store: &impl LedgerStore,
    ride_id: RideId,
    date: Date,
    legs: RideLegs,
) -> Result<Ride, Error> {
    let ride = store.get_ride(ride_id).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingRide,
        error => error,
    })?;
    let partner = get_ride_partner(store, ride.partner_id)?;

    let updated = store.update_ride(ride_id, RideUpdate::priced(&partner, date, legs))?;

    tracing::info!(
        "Updated ride {} for {}: {} -> {}, charge {} -> {}",
        ride_id,
        partner.name,
        ride.date,
        updated.date,
        ride.amount,
        updated.amount
    );

    Ok(updated)
}

fn get_ride_partner(store: &impl LedgerStore, partner_id: PartnerId) -> Result<Partner, Error> {
    store.get_partner(partner_id).map_err(|error| match error {
        Error::NotFound => {
            tracing::warn!("Partner {partner_id} does not exist");
            Error::PartnerNotFound
        }
        error => error,
    })
}


#[cfg(test)]
mod edit_ride_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        pricing::RideLegs,
        stores::LedgerStore,
        test_utils::{create_test_partner, get_test_store},
    };

    use super::{add_ride, edit_ride};

    fn set_partner_prices(connection: &Connection, price_out: &str, price_back: &str) {
        connection
            .execute(
                "UPDATE partner SET price_out = ?1, price_back = ?2",
                (price_out, price_back),
            )
            .unwrap();
    }

    #[test]
    fn edit_recomputes_charge_from_current_prices() {
        let store = get_test_store();
        let partner = create_test_partner(&store, "Alex", "15.00", "12.00");
        let ride = add_ride(&store, partner.id, date!(2024 - 02 - 01), RideLegs::OUTBOUND).unwrap();
        set_partner_prices(&store.connection_for_tests(), "20.00", "18.00");

        let edited = edit_ride(&store, ride.id, date!(2024 - 02 - 02), RideLegs::BOTH).unwrap();

        assert_eq!(edited.date, date!(2024 - 02 - 02));
        assert_eq!(edited.legs, RideLegs::BOTH);
        assert_eq!(edited.amount, "38.00");
        assert_eq!(edited.partner_id, partner.id);
    }

    #[test]
    fn price_changes_do_not_touch_existing_charges() {
        let store = get_test_store();
        let partner = create_test_partner(&store, "Alex", "15.00", "12.00");
        let ride = add_ride(&store, partner.id, date!(2024 - 02 - 01), RideLegs::BOTH).unwrap();

        set_partner_prices(&store.connection_for_tests(), "20.00", "18.00");

        assert_eq!(store.get_ride(ride.id).unwrap().amount, "27.00");
    }

    #[test]
    fn editing_missing_ride_fails() {
        let store = get_test_store();

        let result = edit_ride(&store, 5, date!(2024 - 02 - 02), RideLegs::BOTH);

        assert_eq!(result, Err(Error::UpdateMissingRide));
    }
}
