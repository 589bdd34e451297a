use serde::{Deserialize, Serialize};

use saleops_core::{DomainError, DomainResult, Entity, RecordId};
use saleops_parties::PartyId;
use saleops_products::ProductId;

use crate::zone::ShippingZone;

/// Shipping carrier identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarrierId(pub RecordId);

impl CarrierId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CarrierId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Master-data entity: shipping carrier configuration.
///
/// Bundles the vendor and service product used when issuing a shipping
/// purchase order, the flat in-Riyadh cost, and the lead-time days per zone.
/// A carrier flagged internal means delivery by the company's own driver, so
/// no shipping purchase order is issued for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingCarrier {
    id: CarrierId,
    name: String,
    sequence: u32,
    active: bool,
    is_internal: bool,
    vendor_id: Option<PartyId>,
    service_product_id: Option<ProductId>,
    /// Flat per-order cost for deliveries inside Riyadh, in the smallest
    /// currency unit. 0 means "not configured" and the global fallback
    /// applies.
    flat_cost_riyadh: u64,
    ship_days_riyadh: u32,
    ship_days_outside: u32,
}

impl ShippingCarrier {
    pub fn new(id: CarrierId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("carrier name must not be empty"));
        }

        Ok(Self {
            id,
            name,
            sequence: 10,
            active: true,
            is_internal: false,
            vendor_id: None,
            service_product_id: None,
            flat_cost_riyadh: 0,
            ship_days_riyadh: 1,
            ship_days_outside: 3,
        })
    }

    pub fn id_typed(&self) -> CarrierId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_internal(&self) -> bool {
        self.is_internal
    }

    pub fn vendor_id(&self) -> Option<PartyId> {
        self.vendor_id
    }

    pub fn service_product_id(&self) -> Option<ProductId> {
        self.service_product_id
    }

    pub fn flat_cost_riyadh(&self) -> u64 {
        self.flat_cost_riyadh
    }

    /// Lead-time days for a shipping zone.
    pub fn days_for(&self, zone: ShippingZone) -> u32 {
        match zone {
            ShippingZone::Riyadh => self.ship_days_riyadh,
            ShippingZone::Outside => self.ship_days_outside,
        }
    }

    /// Non-internal carriers need a vendor to issue purchase orders against.
    pub fn requires_vendor(&self) -> bool {
        !self.is_internal
    }

    pub fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
    }

    pub fn set_internal(&mut self, is_internal: bool) {
        self.is_internal = is_internal;
    }

    pub fn set_vendor(&mut self, vendor_id: Option<PartyId>) {
        self.vendor_id = vendor_id;
    }

    pub fn set_service_product(&mut self, service_product_id: Option<ProductId>) {
        self.service_product_id = service_product_id;
    }

    pub fn set_flat_cost_riyadh(&mut self, flat_cost: u64) {
        self.flat_cost_riyadh = flat_cost;
    }

    pub fn set_ship_days(&mut self, riyadh: u32, outside: u32) {
        self.ship_days_riyadh = riyadh;
        self.ship_days_outside = outside;
    }

    pub fn archive(&mut self) {
        self.active = false;
    }

    pub fn restore(&mut self) {
        self.active = true;
    }
}

impl Entity for ShippingCarrier {
    type Id = CarrierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
