//! Ride partners: the people rides are charged to.

mod core;
mod manage;

pub use self::core::{
    DEFAULT_PRICE, NewPartner, Partner, PartnerName, create_partner, create_partner_table,
    delete_partner, get_all_partners, get_partner,
};
pub use manage::{PartnerRemoval, add_partner, remove_partner};
