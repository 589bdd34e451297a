//! Operations rules for the sales pipeline.
//!
//! This crate contains the business rules that drive the operational view of
//! a sales order, implemented purely as deterministic domain logic (no IO,
//! no HTTP, no storage):
//!
//! - destination classification (inside/outside Riyadh),
//! - shipping carrier configuration,
//! - manufacturing lead-time rules per product category,
//! - the transit calculator (expected delivery date, delivery status),
//! - pipeline stage master data.

pub mod carrier;
pub mod leadtime;
pub mod stage;
pub mod transit;
pub mod zone;

pub use carrier::{CarrierId, ShippingCarrier};
pub use leadtime::{LeadTimeBook, LeadTimeRule, LeadTimeRuleId};
pub use stage::{OpsArea, Stage, StageId};
pub use transit::{
    DEFAULT_SHIPPING_DAYS, DeliveryStatus, ShippingExecution, expected_delivery,
    manufacturing_days, shipping_days,
};
pub use zone::{ShippingZone, is_riyadh_city};
