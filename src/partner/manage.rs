//! Adding and removing partners.

use std::fmt::Display;

use serde::Serialize;

use crate::{
    Error, PartnerId,
    partner::{NewPartner, Partner},
    stores::LedgerStore,
};

/// Save a new partner.
pub fn add_partner(store: &impl LedgerStore, new_partner: NewPartner) -> Result<Partner, Error> {
    let partner = store.create_partner(new_partner)?;

    tracing::info!(
        "Added partner {} \"{}\" (out {}, back {})",
        partner.id,
        partner.name,
        partner.price_out,
        partner.price_back
    );

    Ok(partner)
}

/// A deleted partner and the records deleted along with them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerRemoval {
    /// The partner as it was before deletion.
    pub partner: Partner,
    /// How many of the partner's rides were deleted.
    pub rides_removed: usize,
    /// How many of the partner's payments were deleted.
    pub payments_removed: usize,
}

impl Display for PartnerRemoval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Deleted {} with {} rides and {} payments.",
            self.partner.name, self.rides_removed, self.payments_removed
        )
    }
}

/// Delete a partner together with all of their rides and payments.
///
/// # Errors
/// Returns [Error::DeleteMissingPartner] if the partner does not exist.
pub fn remove_partner(store: &impl LedgerStore, id: PartnerId) -> Result<PartnerRemoval, Error> {
    let partner = store.get_partner(id).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingPartner,
        error => error,
    })?;
    let rides_removed = store.get_rides(&[id])?.len();
    let payments_removed = store.get_payments(&[id])?.len();

    store.delete_partner(id)?;

    let removal = PartnerRemoval {
        partner,
        rides_removed,
        payments_removed,
    };
    tracing::info!("{removal}");

    Ok(removal)
}
