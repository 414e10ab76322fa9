//! Reading loosely typed monetary values as amounts and formatting amounts for
//! display and storage.
//!
//! Amounts cross the store boundary as two-decimal text (e.g. `"15.00"`) and
//! are only parsed to `f64` for arithmetic. Reading an amount never fails:
//! anything that is not a finite number, or text holding one, reads as zero.

use serde_json::Value;

/// A value that can be read as a monetary amount.
pub trait ToAmount {
    /// Read `self` as a finite amount, falling back to `0.0`.
    fn to_amount(&self) -> f64;
}

impl ToAmount for f64 {
    fn to_amount(&self) -> f64 {
        if self.is_finite() { *self } else { 0.0 }
    }
}

impl ToAmount for str {
    fn to_amount(&self) -> f64 {
        let text = self.trim();

        if text.is_empty() {
            return 0.0;
        }

        text.parse::<f64>().map_or(0.0, |amount| amount.to_amount())
    }
}

impl ToAmount for String {
    fn to_amount(&self) -> f64 {
        self.as_str().to_amount()
    }
}

impl ToAmount for Value {
    fn to_amount(&self) -> f64 {
        match self {
            Value::Number(number) => number.as_f64().map_or(0.0, |amount| amount.to_amount()),
            Value::String(text) => text.to_amount(),
            _ => 0.0,
        }
    }
}

impl<T: ToAmount> ToAmount for Option<T> {
    fn to_amount(&self) -> f64 {
        self.as_ref().map_or(0.0, ToAmount::to_amount)
    }
}

impl<T: ToAmount + ?Sized> ToAmount for &T {
    fn to_amount(&self) -> f64 {
        (**self).to_amount()
    }
}

/// Read `value` as a finite amount.
///
/// Finite numbers are returned unchanged, text is trimmed and parsed, and
/// everything else (empty or non-numeric text, missing values, NaN, infinities)
/// becomes `0.0`.
pub fn normalize_amount(value: impl ToAmount) -> f64 {
    value.to_amount()
}

/// Format `value` with exactly two decimal places, e.g. `"12.50"`.
pub fn format_amount(value: impl ToAmount) -> String {
    format!("{:.2}", value.to_amount())
}

/// Format `value` with an explicit sign and two decimal places.
///
/// Non-negative amounts (including zero) get a `+`, negative amounts a `-`,
/// e.g. `"+12.50"`, `"-3.00"`, `"+0.00"`.
pub fn format_signed_amount(value: impl ToAmount) -> String {
    let amount = value.to_amount();
    let sign = if amount < 0.0 { '-' } else { '+' };

    format!("{sign}{:.2}", amount.abs())
}
