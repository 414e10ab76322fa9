//! Recording and removing payments.

use crate::{
    Error, PaymentId,
    payment::{NewPayment, Payment},
    stores::LedgerStore,
};

/// Save a payment received from a partner.
///
/// # Errors
/// Returns [Error::PartnerNotFound] if the partner does not exist, or the
/// store's error if the payment could not be saved.
pub fn add_payment(store: &impl LedgerStore, new_payment: NewPayment) -> Result<Payment, Error> {
    let partner = store
        .get_partner(new_payment.partner_id)
        .map_err(|error| match error {
            Error::NotFound => {
                tracing::warn!("Partner {} does not exist", new_payment.partner_id);
                Error::PartnerNotFound
            }
            error => error,
        })?;

    let payment = store.create_payment(new_payment)?;

    tracing::info!(
        "Recorded payment {} of {} from {} on {}",
        payment.id,
        payment.amount,
        partner.name,
        payment.date
    );

    Ok(payment)
}

/// Delete a payment.
///
/// # Errors
/// Returns [Error::DeleteMissingPayment] if the payment does not exist.
pub fn remove_payment(store: &impl LedgerStore, id: PaymentId) -> Result<(), Error> {
    store.delete_payment(id)?;

    tracing::info!("Deleted payment {id}");

    Ok(())
}
