//! Rides given to partners, charged per leg.

mod core;
mod create;
mod delete;
mod weekdays;

pub use self::core::{
    NewRide, Ride, RideUpdate, create_ride_table, create_rides, delete_ride, get_recent_rides,
    get_ride, get_rides_for_partners, update_ride,
};
pub use create::{add_ride, edit_ride};
pub use delete::remove_ride;
pub use weekdays::{RIDE_BATCH_SIZE, WeekdayRidesReport, add_month_weekday_rides};
