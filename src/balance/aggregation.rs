//! Balance arithmetic over rides and payments.
//!
//! A partner's balance is the total they have paid minus the total they have
//! been charged for rides. Totals are grouped per partner in a single pass
//! over each collection, so the work grows with the number of records rather
//! than with records times partners.

use std::collections::HashMap;

use serde::Serialize;
use time::Date;

use crate::{
    PartnerId,
    money::normalize_amount,
    month::MonthRange,
    partner::Partner,
    payment::Payment,
    ride::Ride,
};

/// A ride or payment that moves a partner's balance.
pub trait LedgerEntry {
    /// The partner the entry belongs to.
    fn partner_id(&self) -> PartnerId;
    /// The day of the entry.
    fn date(&self) -> Date;
    /// The amount of the entry, with unreadable amounts counted as zero.
    fn amount(&self) -> f64;
}

impl LedgerEntry for Ride {
    fn partner_id(&self) -> PartnerId {
        self.partner_id
    }

    fn date(&self) -> Date {
        self.date
    }

    fn amount(&self) -> f64 {
        normalize_amount(&self.amount)
    }
}

impl LedgerEntry for Payment {
    fn partner_id(&self) -> PartnerId {
        self.partner_id
    }

    fn date(&self) -> Date {
        self.date
    }

    fn amount(&self) -> f64 {
        normalize_amount(&self.amount)
    }
}

/// The sums of ride charges and payments for a partner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    /// The sum of ride charges.
    pub charged: f64,
    /// The sum of payments.
    pub paid: f64,
}

impl Totals {
    /// Paid minus charged. Positive is a credit, negative is a debit.
    pub fn balance(&self) -> f64 {
        self.paid - self.charged
    }
}

/// Totals for the rides and payments of `partner_id` across all time.
///
/// `rides` and `payments` may include records of other partners, which are ignored.
pub fn partner_totals(partner_id: PartnerId, rides: &[Ride], payments: &[Payment]) -> Totals {
    Totals {
        charged: sum_for_partner(partner_id, rides, None),
        paid: sum_for_partner(partner_id, payments, None),
    }
}

/// Totals for the rides and payments of `partner_id` dated within `month`.
pub fn partner_totals_in(
    partner_id: PartnerId,
    rides: &[Ride],
    payments: &[Payment],
    month: MonthRange,
) -> Totals {
    Totals {
        charged: sum_for_partner(partner_id, rides, Some(month)),
        paid: sum_for_partner(partner_id, payments, Some(month)),
    }
}

fn sum_for_partner<E: LedgerEntry>(
    partner_id: PartnerId,
    entries: &[E],
    month: Option<MonthRange>,
) -> f64 {
    entries
        .iter()
        .filter(|entry| entry.partner_id() == partner_id)
        .filter(|entry| month.is_none_or(|month| month.contains(entry.date())))
        .map(LedgerEntry::amount)
        .fold(0.0, |sum, amount| sum + amount)
}

/// Per-partner totals built in one pass over rides and one over payments.
///
/// All-time totals are always kept. When built with a month, totals for
/// entries within that month are kept as well.
#[derive(Debug, Clone, Default)]
pub struct LedgerIndex {
    month: Option<MonthRange>,
    all_time: HashMap<PartnerId, Totals>,
    in_month: HashMap<PartnerId, Totals>,
}

impl LedgerIndex {
    /// Group `rides` and `payments` by partner.
    pub fn build(rides: &[Ride], payments: &[Payment], month: Option<MonthRange>) -> Self {
        let mut index = Self {
            month,
            ..Self::default()
        };

        for ride in rides {
            index.add(ride, |totals, amount| totals.charged += amount);
        }

        for payment in payments {
            index.add(payment, |totals, amount| totals.paid += amount);
        }

        index
    }

    fn add(&mut self, entry: &impl LedgerEntry, apply: impl Fn(&mut Totals, f64)) {
        let amount = entry.amount();

        apply(self.all_time.entry(entry.partner_id()).or_default(), amount);

        if self.month.is_some_and(|month| month.contains(entry.date())) {
            apply(self.in_month.entry(entry.partner_id()).or_default(), amount);
        }
    }

    /// All-time totals for a partner; zero if the partner has no entries.
    pub fn all_time(&self, partner_id: PartnerId) -> Totals {
        self.all_time.get(&partner_id).copied().unwrap_or_default()
    }

    /// Totals within the index's month for a partner.
    ///
    /// Zero if the partner has no entries in the month or the index was built
    /// without a month.
    pub fn in_month(&self, partner_id: PartnerId) -> Totals {
        self.in_month.get(&partner_id).copied().unwrap_or_default()
    }
}

/// A partner's all-time position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerBalance {
    /// The partner.
    pub partner: Partner,
    /// The sum of all payments from the partner.
    pub total_paid: f64,
    /// The sum of all ride charges for the partner.
    pub total_charged: f64,
    /// `total_paid - total_charged`.
    pub balance: f64,
}

/// The all-time balance of each partner, in the order of `partners`.
pub fn dashboard_balances(
    partners: &[Partner],
    rides: &[Ride],
    payments: &[Payment],
) -> Vec<PartnerBalance> {
    let index = LedgerIndex::build(rides, payments, None);

    partners
        .iter()
        .map(|partner| {
            let totals = index.all_time(partner.id);

            PartnerBalance {
                partner: partner.clone(),
                total_paid: totals.paid,
                total_charged: totals.charged,
                balance: totals.balance(),
            }
        })
        .collect()
}

/// Whether a balance is in the partner's favour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BalanceStatus {
    /// The partner has paid at least as much as they have been charged.
    Credit,
    /// The partner owes money.
    Debit,
}

impl BalanceStatus {
    /// Zero and positive balances are credits.
    pub fn of(balance: f64) -> Self {
        if balance >= 0.0 {
            Self::Credit
        } else {
            Self::Debit
        }
    }
}

impl std::fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credit => write!(f, "CREDIT"),
            Self::Debit => write!(f, "DEBIT"),
        }
    }
}

/// One partner's line in a monthly summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// The partner.
    pub partner: Partner,
    /// Ride charges dated within the month.
    pub rides_total: f64,
    /// Payments dated within the month.
    pub payments_total: f64,
    /// `payments_total - rides_total`.
    pub net: f64,
    /// The all-time balance, regardless of the month.
    pub balance_to_date: f64,
}

impl SummaryRow {
    /// Credit or debit, from the all-time balance.
    pub fn status(&self) -> BalanceStatus {
        BalanceStatus::of(self.balance_to_date)
    }
}

/// Month totals and the all-time balance of each partner, in the order of `partners`.
///
/// The balance to date always covers every ride and payment: a balance built
/// from one month without the months before it would be meaningless.
pub fn monthly_summary(
    partners: &[Partner],
    rides: &[Ride],
    payments: &[Payment],
    month: MonthRange,
) -> Vec<SummaryRow> {
    let index = LedgerIndex::build(rides, payments, Some(month));

    partners
        .iter()
        .map(|partner| {
            let month_totals = index.in_month(partner.id);

            SummaryRow {
                partner: partner.clone(),
                rides_total: month_totals.charged,
                payments_total: month_totals.paid,
                net: month_totals.balance(),
                balance_to_date: index.all_time(partner.id).balance(),
            }
        })
        .collect()
}



#[cfg(test)]
mod ledger_index_tests {
    use time::macros::date;

    use crate::{money::format_amount, month::month_range};

    use super::{
        LedgerIndex, Totals, partner_totals,
        test_records::{payment, ride},
    };

    #[test]
    fn matches_per_partner_totals() {
        let day = date!(2024 - 02 - 05);
        let rides = [ride(1, "15.00", day), ride(2, "12.00", day), ride(1, "12.00", day)];
        let payments = [payment(2, "40.00", day), payment(3, "5.00", day)];

        let index = LedgerIndex::build(&rides, &payments, None);

        for partner_id in [1, 2, 3, 4] {
            assert_eq!(
                index.all_time(partner_id),
                partner_totals(partner_id, &rides, &payments),
                "partner {partner_id}"
            );
        }
    }

    #[test]
    fn keeps_month_and_all_time_totals() {
        let rides = [
            ride(1, "15.00", date!(2024 - 01 - 10)),
            ride(1, "12.00", date!(2024 - 02 - 10)),
        ];
        let payments = [payment(1, "50.00", date!(2024 - 01 - 31))];

        let index = LedgerIndex::build(&rides, &payments, Some(month_range(date!(2024 - 02 - 01))));

        assert_eq!(
            index.in_month(1),
            Totals {
                charged: 12.0,
                paid: 0.0
            }
        );
        assert_eq!(
            index.all_time(1),
            Totals {
                charged: 27.0,
                paid: 50.0
            }
        );
    }

    #[test]
    fn no_month_means_no_month_totals() {
        let rides = [ride(1, "15.00", date!(2024 - 01 - 10))];

        let index = LedgerIndex::build(&rides, &[], None);

        assert_eq!(index.in_month(1), Totals::default());
    }

    #[test]
    fn order_of_records_does_not_matter() {
        let rides = vec![
            ride(1, "15.10", date!(2024 - 02 - 01)),
            ride(1, "12.20", date!(2024 - 02 - 02)),
            ride(2, "0.30", date!(2024 - 02 - 03)),
            ride(1, "7.45", date!(2024 - 01 - 03)),
        ];
        let payments = vec![
            payment(1, "20.05", date!(2024 - 02 - 01)),
            payment(1, "0.10", date!(2024 - 02 - 09)),
            payment(2, "3.33", date!(2024 - 02 - 03)),
        ];
        let mut reversed_rides = rides.clone();
        reversed_rides.reverse();
        let mut rotated_payments = payments.clone();
        rotated_payments.rotate_left(1);
        let month = Some(month_range(date!(2024 - 02 - 01)));

        let index = LedgerIndex::build(&rides, &payments, month);
        let permuted = LedgerIndex::build(&reversed_rides, &rotated_payments, month);

        for partner_id in [1, 2] {
            for (left, right) in [
                (index.all_time(partner_id), permuted.all_time(partner_id)),
                (index.in_month(partner_id), permuted.in_month(partner_id)),
            ] {
                assert_eq!(format_amount(left.charged), format_amount(right.charged));
                assert_eq!(format_amount(left.paid), format_amount(right.paid));
            }
        }
    }
}
