#![allow(missing_docs)]

pub(crate) mod store;

pub(crate) use store::{create_test_partner, get_test_store};
