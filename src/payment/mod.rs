//! Payments received from partners.

mod core;
mod record;

pub use self::core::{
    NewPayment, Payment, PaymentAmount, create_payment, create_payment_table, delete_payment,
    get_payments_for_partners, get_recent_payments,
};
pub use record::{add_payment, remove_payment};
