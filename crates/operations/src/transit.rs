//! Transit calculation: manufacturing days, shipping days, expected delivery.
//!
//! Manufacturing stages for different product lines proceed in parallel, so
//! the order-level manufacturing time is the **maximum** configured days over
//! the categories present on the order, not the sum. Calendar days only; no
//! business-day or holiday adjustment.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use saleops_products::CategoryId;

use crate::carrier::ShippingCarrier;
use crate::leadtime::LeadTimeBook;
use crate::zone::ShippingZone;

/// Fallback shipping days when no carrier is selected.
///
/// The fallback is the same for both zones; preserved as configured in the
/// operational data even though Riyadh deliveries are normally faster.
pub const DEFAULT_SHIPPING_DAYS: u32 = 3;

/// Who performs the delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingExecution {
    /// Company driver; no shipping purchase order is issued.
    Company,
    /// External carrier; a shipping purchase order is issued per the rules.
    Carrier,
}

/// Order-level manufacturing days: the maximum over the categories that have
/// an active lead-time rule. Categories without a rule contribute nothing;
/// no match at all means zero days.
pub fn manufacturing_days(categories: &[CategoryId], book: &LeadTimeBook) -> u32 {
    categories
        .iter()
        .filter_map(|c| book.days_for(*c))
        .max()
        .unwrap_or(0)
}

/// Shipping days for an order's current configuration.
pub fn shipping_days(
    execution: ShippingExecution,
    carrier: Option<&ShippingCarrier>,
    zone: ShippingZone,
) -> u32 {
    if execution == ShippingExecution::Company {
        return 0;
    }

    match carrier {
        Some(c) if c.is_internal() => 0,
        Some(c) => c.days_for(zone),
        None => DEFAULT_SHIPPING_DAYS,
    }
}

/// Expected delivery date: base date + manufacturing days + shipping days.
pub fn expected_delivery(base: NaiveDate, mfg_days: u32, ship_days: u32) -> NaiveDate {
    base.checked_add_days(Days::new(u64::from(mfg_days) + u64::from(ship_days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Delivery status of an order relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Late,
    Today,
    Future,
}

impl DeliveryStatus {
    /// Compare an expected delivery date against today's local date.
    /// No expected date means no status.
    pub fn evaluate(expected: Option<NaiveDate>, today: NaiveDate) -> Option<Self> {
        let expected = expected?;
        Some(match expected.cmp(&today) {
            core::cmp::Ordering::Less => DeliveryStatus::Late,
            core::cmp::Ordering::Equal => DeliveryStatus::Today,
            core::cmp::Ordering::Greater => DeliveryStatus::Future,
        })
    }
}
