//! Plain-text rendering of a monthly summary for sending to partners.

use crate::{
    Error,
    balance::SummaryRow,
    money::{format_amount, format_signed_amount},
    month::MonthRange,
};

const WHATSAPP_SHARE_URL: &str = "https://wa.me/";

/// Render `rows` as a message: a header naming the month, then one line per partner.
///
/// ```text
/// Ride summary for 2024-02
/// Alex: rides 45.00 | paid 70.00 | net +25.00 | balance +25.00 (CREDIT)
/// ```
///
/// Lines are separated by `\n` with no trailing newline.
pub fn share_text(month: &MonthRange, rows: &[SummaryRow]) -> String {
    let header = format!("Ride summary for {}", month.key());

    std::iter::once(header)
        .chain(rows.iter().map(share_line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn share_line(row: &SummaryRow) -> String {
    format!(
        "{}: rides {} | paid {} | net {} | balance {} ({})",
        row.partner.name,
        format_amount(row.rides_total),
        format_amount(row.payments_total),
        format_signed_amount(row.net),
        format_signed_amount(row.balance_to_date),
        row.status()
    )
}

/// A link that opens WhatsApp with `text` ready to send.
///
/// # Errors
/// Returns [Error::UrlEncodingError] if the text could not be form encoded.
pub fn whatsapp_share_url(text: &str) -> Result<String, Error> {
    let query = serde_urlencoded::to_string([("text", text)])
        .map_err(|error| Error::UrlEncodingError(error.to_string()))?;

    Ok(format!("{WHATSAPP_SHARE_URL}?{query}"))
}
