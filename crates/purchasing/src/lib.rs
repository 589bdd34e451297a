//! Purchase orders.
//!
//! Purchase orders issued by the pipeline are tagged with the originating
//! sales order and a type (manufacturing or shipping), which is what the
//! per-order counters and filtered views key on.

pub mod order;

pub use order::{PoType, PurchaseOrder, PurchaseOrderId, PurchaseOrderLine};
