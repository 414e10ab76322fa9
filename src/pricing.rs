//! Per-leg ride pricing.
//!
//! A ride is charged at the partner's prices as they are when the ride is
//! recorded or edited. Stored charges are not updated when a partner's prices
//! change later.

use serde::Serialize;

use crate::{Error, money::normalize_amount, partner::Partner};

/// The charge for a ride with the given legs at `partner`'s current prices.
///
/// Prices that cannot be read as numbers count as zero. Selecting neither leg
/// charges nothing; use [RideLegs] to reject that combination before saving
/// a ride.
pub fn charge(partner: &Partner, outbound: bool, return_ride: bool) -> f64 {
    let outbound_charge = if outbound {
        normalize_amount(&partner.price_out)
    } else {
        0.0
    };
    let return_charge = if return_ride {
        normalize_amount(&partner.price_back)
    } else {
        0.0
    };

    outbound_charge + return_charge
}

/// The legs of a ride, with at least one leg selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RideLegs {
    outbound: bool,
    return_ride: bool,
}

impl RideLegs {
    /// An outbound-only ride.
    pub const OUTBOUND: Self = Self {
        outbound: true,
        return_ride: false,
    };

    /// A return-only ride.
    pub const RETURN: Self = Self {
        outbound: false,
        return_ride: true,
    };

    /// A ride with both legs.
    pub const BOTH: Self = Self {
        outbound: true,
        return_ride: true,
    };

    /// Select the legs of a ride.
    ///
    /// # Errors
    /// Returns [Error::NoLegSelected] if neither leg is selected.
    pub fn new(outbound: bool, return_ride: bool) -> Result<Self, Error> {
        if !outbound && !return_ride {
            return Err(Error::NoLegSelected);
        }

        Ok(Self {
            outbound,
            return_ride,
        })
    }

    /// Create legs without validation.
    ///
    /// Used for rows read back from the database, which were validated when they were written.
    pub(crate) fn new_unchecked(outbound: bool, return_ride: bool) -> Self {
        Self {
            outbound,
            return_ride,
        }
    }

    /// Whether the outbound leg was taken.
    pub fn outbound(&self) -> bool {
        self.outbound
    }

    /// Whether the return leg was taken.
    pub fn return_ride(&self) -> bool {
        self.return_ride
    }

    /// The charge for these legs at `partner`'s current prices.
    pub fn charge(&self, partner: &Partner) -> f64 {
        charge(partner, self.outbound, self.return_ride)
    }

    /// A short label for listings: "Out", "Back" or "Out + Back".
    pub fn label(&self) -> &'static str {
        match (self.outbound, self.return_ride) {
            (true, true) => "Out + Back",
            (true, false) => "Out",
            (false, true) => "Back",
            (false, false) => "",
        }
    }
}
