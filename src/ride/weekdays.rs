//! Adding a ride for every weekday of a month in one go.

use std::{collections::HashSet, fmt::Display};

use serde::Serialize;
use time::Date;

use crate::{
    Error, PartnerId,
    month::{month_range, weekdays_in_month},
    pricing::RideLegs,
    ride::NewRide,
    stores::LedgerStore,
};

/// The most rides sent to the store in one insert.
pub const RIDE_BATCH_SIZE: usize = 200;

/// The outcome of adding rides for the weekdays of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekdayRidesReport {
    /// How many rides were added.
    pub inserted: usize,
    /// How many weekdays were skipped because the partner already had a ride that day.
    pub skipped: usize,
}

impl Display for WeekdayRidesReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Added {} weekday rides. Skipped {} existing dates.",
            self.inserted, self.skipped
        )
    }
}

/// Add a ride with `legs` for `partner_id` on every Monday to Friday of the
/// month containing `month`.
///
/// Days on which the partner already has a ride are skipped. Rides are
/// charged at the partner's current prices and sent in batches of
/// [RIDE_BATCH_SIZE].
///
/// # Errors
/// Returns [Error::PartnerNotFound] if the partner does not exist, or
/// [Error::BatchInsertFailed] with the number of rides already added if a
/// batch could not be saved. Batches after a failed batch are not sent.
pub fn add_month_weekday_rides(
    store: &impl LedgerStore,
    partner_id: PartnerId,
    month: Date,
    legs: RideLegs,
) -> Result<WeekdayRidesReport, Error> {
    add_month_weekday_rides_in_batches(store, partner_id, month, legs, RIDE_BATCH_SIZE)
}

fn add_month_weekday_rides_in_batches(
    store: &impl LedgerStore,
    partner_id: PartnerId,
    month: Date,
    legs: RideLegs,
    batch_size: usize,
) -> Result<WeekdayRidesReport, Error> {
    let partner = store.get_partner(partner_id).map_err(|error| match error {
        Error::NotFound => Error::PartnerNotFound,
        error => error,
    })?;

    let weekdays = weekdays_in_month(month);
    let range = month_range(month);

    let existing_dates: HashSet<Date> = store
        .get_rides(&[partner.id])?
        .into_iter()
        .map(|ride| ride.date)
        .filter(|date| range.contains(*date))
        .collect();

    let rides: Vec<NewRide> = weekdays
        .iter()
        .filter(|date| !existing_dates.contains(*date))
        .map(|date| NewRide::priced(&partner, *date, legs))
        .collect();

    let inserted = insert_in_batches(store, &rides, batch_size)?;

    let report = WeekdayRidesReport {
        inserted,
        skipped: weekdays.len() - inserted,
    };

    tracing::info!("{} for {} in {}", report, partner.name, range.key());

    Ok(report)
}

/// Send `rides` to the store in sequential batches of at most `batch_size`.
///
/// Returns the number of rides inserted. Stops at the first failed batch.
fn insert_in_batches(
    store: &impl LedgerStore,
    rides: &[NewRide],
    batch_size: usize,
) -> Result<usize, Error> {
    let mut inserted = 0;

    for batch in rides.chunks(batch_size.max(1)) {
        match store.create_rides(batch) {
            Ok(created) => {
                inserted += created.len();
                tracing::debug!("Inserted batch of {} rides ({inserted} total)", created.len());
            }
            Err(error) => {
                tracing::warn!("Ride batch failed after {inserted} rides were inserted: {error}");
                return Err(Error::BatchInsertFailed {
                    inserted,
                    source: Box::new(error),
                });
            }
        }
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use time::{Date, macros::date};

    use crate::{
        Error, PartnerId, PaymentId, RideId, SQLiteLedgerStore,
        partner::{NewPartner, Partner},
        payment::{NewPayment, Payment},
        pricing::RideLegs,
        ride::{NewRide, Ride, RideUpdate, add_ride},
        stores::LedgerStore,
        test_utils::{create_test_partner, get_test_store},
    };

    use super::{WeekdayRidesReport, add_month_weekday_rides, add_month_weekday_rides_in_batches};

    /// Delegates to a SQLite store but fails the `fail_on`-th call to `create_rides`.
    struct FlakyStore {
        inner: SQLiteLedgerStore,
        fail_on: usize,
        calls: Cell<usize>,
    }

    impl LedgerStore for FlakyStore {
        fn get_partners(&self) -> Result<Vec<Partner>, Error> {
            self.inner.get_partners()
        }

        fn get_partner(&self, id: PartnerId) -> Result<Partner, Error> {
            self.inner.get_partner(id)
        }

        fn create_partner(&self, partner: NewPartner) -> Result<Partner, Error> {
            self.inner.create_partner(partner)
        }

        fn delete_partner(&self, id: PartnerId) -> Result<(), Error> {
            self.inner.delete_partner(id)
        }

        fn get_ride(&self, id: RideId) -> Result<Ride, Error> {
            self.inner.get_ride(id)
        }

        fn get_rides(&self, partner_ids: &[PartnerId]) -> Result<Vec<Ride>, Error> {
            self.inner.get_rides(partner_ids)
        }

        fn get_recent_rides(&self, limit: u64) -> Result<Vec<Ride>, Error> {
            self.inner.get_recent_rides(limit)
        }

        fn create_rides(&self, rides: &[NewRide]) -> Result<Vec<Ride>, Error> {
            let call = self.calls.get() + 1;
            self.calls.set(call);

            if call == self.fail_on {
                return Err(Error::Backend("request entity too large".to_owned()));
            }

            self.inner.create_rides(rides)
        }

        fn update_ride(&self, id: RideId, update: RideUpdate) -> Result<Ride, Error> {
            self.inner.update_ride(id, update)
        }

        fn delete_ride(&self, id: RideId) -> Result<(), Error> {
            self.inner.delete_ride(id)
        }

        fn get_payments(&self, partner_ids: &[PartnerId]) -> Result<Vec<Payment>, Error> {
            self.inner.get_payments(partner_ids)
        }

        fn get_recent_payments(&self, limit: u64) -> Result<Vec<Payment>, Error> {
            self.inner.get_recent_payments(limit)
        }

        fn create_payment(&self, payment: NewPayment) -> Result<Payment, Error> {
            self.inner.create_payment(payment)
        }

        fn delete_payment(&self, id: PaymentId) -> Result<(), Error> {
            self.inner.delete_payment(id)
        }
    }

    fn ride_dates(store: &impl LedgerStore, partner_id: PartnerId) -> Vec<Date> {
        let mut dates: Vec<_> = store
            .get_rides(&[partner_id])
            .unwrap()
            .into_iter()
            .map(|ride| ride.date)
            .collect();
        dates.sort();
        dates
    }

    #[test]
    fn adds_every_weekday() {
        let store = get_test_store();
        let partner = create_test_partner(&store, "Alex", "15.00", "12.00");

        let report =
            add_month_weekday_rides(&store, partner.id, date!(2024 - 02 - 10), RideLegs::OUTBOUND)
                .unwrap();

        assert_eq!(
            report,
            WeekdayRidesReport {
                inserted: 21,
                skipped: 0
            }
        );
        let rides = store.get_rides(&[partner.id]).unwrap();
        assert_eq!(rides.len(), 21);
        assert!(rides.iter().all(|ride| ride.amount == "15.00"));
    }

    #[test]
    fn skips_dates_with_existing_rides() {
        let store = get_test_store();
        let partner = create_test_partner(&store, "Alex", "15.00", "12.00");
        let existing = [
            date!(2024 - 02 - 01),
            date!(2024 - 02 - 02),
            date!(2024 - 02 - 12),
            date!(2024 - 02 - 20),
            date!(2024 - 02 - 29),
        ];
        for day in existing {
            add_ride(&store, partner.id, day, RideLegs::BOTH).unwrap();
        }

        let report =
            add_month_weekday_rides(&store, partner.id, date!(2024 - 02 - 01), RideLegs::OUTBOUND)
                .unwrap();

        assert_eq!(report.inserted, 16);
        assert_eq!(report.skipped, 5);
        assert_eq!(
            report.to_string(),
            "Added 16 weekday rides. Skipped 5 existing dates."
        );
        let dates = ride_dates(&store, partner.id);
        assert_eq!(dates.len(), 21);
        dates
            .windows(2)
            .for_each(|pair| assert_ne!(pair[0], pair[1], "duplicate ride on {}", pair[0]));
    }

    #[test]
    fn rides_of_other_partners_and_months_do_not_count() {
        let store = get_test_store();
        let partner = create_test_partner(&store, "Alex", "15.00", "12.00");
        let other = create_test_partner(&store, "Sam", "10.00", "10.00");
        add_ride(&store, other.id, date!(2024 - 02 - 01), RideLegs::BOTH).unwrap();
        add_ride(&store, partner.id, date!(2024 - 01 - 31), RideLegs::BOTH).unwrap();
        add_ride(&store, partner.id, date!(2024 - 03 - 01), RideLegs::BOTH).unwrap();

        let report =
            add_month_weekday_rides(&store, partner.id, date!(2024 - 02 - 01), RideLegs::RETURN)
                .unwrap();

        assert_eq!(report.inserted, 21);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn missing_partner_is_reported() {
        let store = get_test_store();

        let result =
            add_month_weekday_rides(&store, 3, date!(2024 - 02 - 01), RideLegs::OUTBOUND);

        assert_eq!(result, Err(Error::PartnerNotFound));
    }

    #[test]
    fn failed_batch_stops_later_batches_and_reports_progress() {
        let store = FlakyStore {
            inner: get_test_store(),
            fail_on: 3,
            calls: Cell::new(0),
        };
        let partner = create_test_partner(&store, "Alex", "15.00", "12.00");

        let result = add_month_weekday_rides_in_batches(
            &store,
            partner.id,
            date!(2024 - 02 - 01),
            RideLegs::OUTBOUND,
            5,
        );

        assert_eq!(
            result,
            Err(Error::BatchInsertFailed {
                inserted: 10,
                source: Box::new(Error::Backend("request entity too large".to_owned())),
            })
        );
        assert_eq!(store.calls.get(), 3);
        let dates = ride_dates(&store, partner.id);
        assert_eq!(dates.len(), 10);
        assert_eq!(dates.first(), Some(&date!(2024 - 02 - 01)));
        assert_eq!(dates.last(), Some(&date!(2024 - 02 - 14)));
    }

    #[test]
    fn batches_cover_all_rides() {
        let store = FlakyStore {
            inner: get_test_store(),
            fail_on: usize::MAX,
            calls: Cell::new(0),
        };
        let partner = create_test_partner(&store, "Alex", "15.00", "12.00");

        let report = add_month_weekday_rides_in_batches(
            &store,
            partner.id,
            date!(2024 - 02 - 01),
            RideLegs::BOTH,
            5,
        )
        .unwrap();

        assert_eq!(report.inserted, 21);
        assert_eq!(store.calls.get(), 5);
    }
}
