//! Application layer: stores, configuration, calendar context, and the
//! `OpsPipeline` service that wires the operational rules into the sales
//! workflow.
//!
//! Every mutation entry point recomputes the order's cached derived fields;
//! `confirm_order` additionally attempts purchase-order issuance under the
//! log-and-swallow policy so a batch confirmation never fails because of one
//! order's shipping purchase order.

pub mod clock;
pub mod config;
pub mod registry;
pub mod service;
pub mod store;

pub use clock::{Calendar, Clock, FixedClock, SystemClock};
pub use config::OpsConfig;
pub use service::{OpsPipeline, PoCounts};
pub use store::{
    CarrierRegistry, CategoryRegistry, LeadTimeStore, PartyDirectory, ProductCatalog,
    PurchaseOrderStore, SalesOrderStore, StageRegistry,
};

#[cfg(test)]
mod integration_tests;
