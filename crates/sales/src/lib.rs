//! Sales orders and their operational view.
//!
//! `SalesOrder` holds the order data plus cached derived fields (shipping
//! zone, expected delivery date, delivery status, products summary) that are
//! recomputed whenever a dependency changes. `procurement` contains the pure
//! decision logic for issuing purchase orders from a confirmed order.

pub mod order;
pub mod procurement;

pub use order::{LineKind, OrderLine, SalesOrder, SalesOrderId, SalesOrderStatus};
pub use procurement::{
    LineShippingCost, ManufacturingPoLine, ManufacturingPoPlan, ShippingPoPlan,
    outside_shipping_cost, plan_manufacturing_pos, plan_shipping_po, riyadh_shipping_cost,
};
