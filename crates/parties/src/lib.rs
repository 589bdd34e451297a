//! Parties master data (customers and suppliers).
//!
//! Shipping carriers, products, and purchase orders reference suppliers from
//! this crate; sales orders reference customers.

pub mod party;

pub use party::{ContactInfo, Party, PartyId, PartyKind, PartyStatus};
