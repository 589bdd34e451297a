//! Purchase-order planning for a sales order.
//!
//! Pure decision logic: given an order and the resolved master data, decide
//! whether a purchase order should be issued and what it should contain. The
//! pipeline executes the returned plans; nothing here touches storage.

use serde::{Deserialize, Serialize};

use saleops_core::{DomainError, DomainResult};
use saleops_operations::{ShippingCarrier, ShippingExecution, ShippingZone};
use saleops_parties::PartyId;
use saleops_products::ProductId;

use crate::order::SalesOrder;

/// Per-line shipping-cost input, resolved from product master data by the
/// caller: the line quantity and the product's per-unit outside-Riyadh cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineShippingCost {
    pub quantity: i64,
    pub per_unit_cost: u64,
}

/// What a shipping purchase order should contain, once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPoPlan {
    pub vendor_id: PartyId,
    pub service_product_id: ProductId,
    /// Total cost in the smallest currency unit; becomes the unit price of
    /// the single qty-1 purchase line.
    pub total_cost: u64,
    pub zone: ShippingZone,
    pub description: String,
}

/// One line of a planned manufacturing purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManufacturingPoLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// A planned manufacturing purchase order: one per manufacturing vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManufacturingPoPlan {
    pub vendor_id: PartyId,
    pub lines: Vec<ManufacturingPoLine>,
}

/// Total shipping cost for an outside-Riyadh delivery: per-unit cost times
/// quantity, summed over the product lines. Lines whose product has no
/// configured per-unit cost contribute nothing.
pub fn outside_shipping_cost(lines: &[LineShippingCost]) -> u64 {
    lines
        .iter()
        .filter(|l| l.per_unit_cost > 0)
        .map(|l| l.per_unit_cost.saturating_mul(l.quantity.max(0) as u64))
        .fold(0u64, u64::saturating_add)
}

/// Flat shipping cost for an in-Riyadh delivery: the carrier's flat cost when
/// configured and nonzero, otherwise the injected global fallback.
pub fn riyadh_shipping_cost(carrier: Option<&ShippingCarrier>, fallback_flat_cost: u64) -> u64 {
    match carrier {
        Some(c) if c.flat_cost_riyadh() > 0 => c.flat_cost_riyadh(),
        _ => fallback_flat_cost,
    }
}

fn resolve_vendor_and_service(
    order: &SalesOrder,
    carrier: Option<&ShippingCarrier>,
) -> (Option<PartyId>, Option<ProductId>) {
    // A selected carrier wins outright; the order's own fields are a legacy
    // fallback, never mixed with carrier data.
    match carrier {
        Some(c) => (c.vendor_id(), c.service_product_id()),
        None => (
            order.shipping_vendor_id(),
            order.shipping_service_product_id(),
        ),
    }
}

/// Decide whether a shipping purchase order is due for this order, and plan
/// its content.
///
/// Returns `Ok(None)` when no purchase order should be issued: company-driver
/// execution, an internal carrier, an already-existing shipping purchase
/// order, or a computed total of zero. A resolvable vendor and service
/// product are required before anything is planned; missing ones are
/// validation errors.
pub fn plan_shipping_po(
    order: &SalesOrder,
    carrier: Option<&ShippingCarrier>,
    line_costs: &[LineShippingCost],
    existing_shipping_pos: usize,
    fallback_flat_cost: u64,
) -> DomainResult<Option<ShippingPoPlan>> {
    if order.shipping_execution() != ShippingExecution::Carrier {
        return Ok(None);
    }
    if carrier.is_some_and(|c| c.is_internal()) {
        return Ok(None);
    }

    let (vendor_id, service_product_id) = resolve_vendor_and_service(order, carrier);
    let vendor_id = vendor_id.ok_or_else(|| {
        DomainError::validation("select a shipping vendor (carrier) for this order")
    })?;
    let service_product_id = service_product_id.ok_or_else(|| {
        DomainError::validation("select a shipping service product for this order")
    })?;

    if existing_shipping_pos > 0 {
        return Ok(None);
    }

    let zone = order.shipping_zone();
    let total_cost = match zone {
        ShippingZone::Riyadh => riyadh_shipping_cost(carrier, fallback_flat_cost),
        ShippingZone::Outside => outside_shipping_cost(line_costs),
    };
    if total_cost == 0 {
        return Ok(None);
    }

    Ok(Some(ShippingPoPlan {
        vendor_id,
        service_product_id,
        total_cost,
        zone,
        description: format!(
            "Shipping cost for order {} ({})",
            order.reference(),
            zone.label()
        ),
    }))
}

/// Group the order's product lines by their product's default manufacturing
/// vendor: one plan per vendor, in first-seen line order. Lines whose product
/// has no manufacturing vendor are skipped.
pub fn plan_manufacturing_pos(
    order: &SalesOrder,
    vendor_of: impl Fn(ProductId) -> Option<PartyId>,
) -> Vec<ManufacturingPoPlan> {
    let mut plans: Vec<ManufacturingPoPlan> = Vec::new();

    for line in order.product_lines() {
        let Some(product_id) = line.product_id else {
            continue;
        };
        let Some(vendor_id) = vendor_of(product_id) else {
            continue;
        };

        let po_line = ManufacturingPoLine {
            product_id,
            quantity: line.quantity,
        };
        match plans.iter_mut().find(|p| p.vendor_id == vendor_id) {
            Some(plan) => plan.lines.push(po_line),
            None => plans.push(ManufacturingPoPlan {
                vendor_id,
                lines: vec![po_line],
            }),
        }
    }

    plans
}
