//! Loads ledger records from a store and builds balance reports from them.

use serde::Serialize;
use time::Date;

use crate::{
    Error, PartnerId,
    balance::{PartnerBalance, SummaryRow, dashboard_balances, monthly_summary, share_text},
    month::{MonthRange, month_range},
    partner::Partner,
    payment::Payment,
    ride::Ride,
    stores::LedgerStore,
};

/// Every partner with their rides and payments, as fetched at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    /// All partners, oldest first.
    pub partners: Vec<Partner>,
    /// The rides of those partners.
    pub rides: Vec<Ride>,
    /// The payments of those partners.
    pub payments: Vec<Payment>,
}

/// Fetch all partners and the rides and payments that belong to them.
pub fn load_snapshot(store: &impl LedgerStore) -> Result<LedgerSnapshot, Error> {
    let partners = store.get_partners()?;

    if partners.is_empty() {
        return Ok(LedgerSnapshot::default());
    }

    let partner_ids: Vec<PartnerId> = partners.iter().map(|partner| partner.id).collect();
    let rides = store.get_rides(&partner_ids)?;
    let payments = store.get_payments(&partner_ids)?;

    tracing::debug!(
        "Loaded {} partners, {} rides and {} payments",
        partners.len(),
        rides.len(),
        payments.len()
    );

    Ok(LedgerSnapshot {
        partners,
        rides,
        payments,
    })
}

/// The all-time balance of every partner.
pub fn load_dashboard(store: &impl LedgerStore) -> Result<Vec<PartnerBalance>, Error> {
    let snapshot = load_snapshot(store)?;

    Ok(dashboard_balances(
        &snapshot.partners,
        &snapshot.rides,
        &snapshot.payments,
    ))
}

/// The summary of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// The month summarised.
    pub month: MonthRange,
    /// One row per partner.
    pub rows: Vec<SummaryRow>,
}

impl MonthlySummary {
    /// The summary as a message to send to partners.
    pub fn share_text(&self) -> String {
        share_text(&self.month, &self.rows)
    }
}

/// Summarise the month containing `month` for every partner.
pub fn load_monthly_summary(store: &impl LedgerStore, month: Date) -> Result<MonthlySummary, Error> {
    let snapshot = load_snapshot(store)?;
    let month = month_range(month);

    Ok(MonthlySummary {
        month,
        rows: monthly_summary(
            &snapshot.partners,
            &snapshot.rides,
            &snapshot.payments,
            month,
        ),
    })
}
