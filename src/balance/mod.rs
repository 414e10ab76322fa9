//! Partner balances: all-time positions, monthly summaries and share text.

mod aggregation;
mod report;
mod share;

pub use aggregation::{
    BalanceStatus, LedgerEntry, LedgerIndex, PartnerBalance, SummaryRow, Totals,
    dashboard_balances, monthly_summary, partner_totals, partner_totals_in,
};
pub use report::{
    LedgerSnapshot, MonthlySummary, load_dashboard, load_monthly_summary, load_snapshot,
};
pub use share::{share_text, whatsapp_share_url};
