//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a ride partner.
pub type PartnerId = DatabaseId;
/// The ID of a ride.
pub type RideId = DatabaseId;
/// The ID of a payment.
pub type PaymentId = DatabaseId;
