use serde::{Deserialize, Serialize};

use saleops_core::{DomainError, DomainResult, Entity, RecordId};
use saleops_parties::PartyId;

use crate::category::CategoryId;
use crate::uom::UnitOfMeasure;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub RecordId);

impl ProductId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Product kind: storable goods or a service.
///
/// Shipping purchase orders are lined with a service product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Goods,
    Service,
}

/// Master-data entity: Product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    sku: String,
    name: String,
    kind: ProductKind,
    category_id: Option<CategoryId>,
    uom: UnitOfMeasure,
    purchase_uom: Option<UnitOfMeasure>,
    /// Per-unit shipping cost paid to the carrier for deliveries outside
    /// Riyadh, in the smallest currency unit. 0 means "not configured".
    outside_shipping_cost: u64,
    /// Default vendor (factory) for manufacturing purchase orders.
    manufacturing_vendor: Option<PartyId>,
}

impl Product {
    pub fn new(
        id: ProductId,
        sku: impl Into<String>,
        name: impl Into<String>,
        kind: ProductKind,
    ) -> DomainResult<Self> {
        let sku = sku.into();
        let name = name.into();
        if sku.trim().is_empty() {
            return Err(DomainError::validation("product sku must not be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name must not be empty"));
        }

        Ok(Self {
            id,
            sku,
            name,
            kind,
            category_id: None,
            uom: UnitOfMeasure::default(),
            purchase_uom: None,
            outside_shipping_cost: 0,
            manufacturing_vendor: None,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProductKind {
        self.kind
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn uom(&self) -> UnitOfMeasure {
        self.uom
    }

    /// Unit of measure used on purchase-order lines, falling back to the
    /// general unit when no dedicated purchase unit is set.
    pub fn purchase_uom(&self) -> UnitOfMeasure {
        self.purchase_uom.unwrap_or(self.uom)
    }

    pub fn outside_shipping_cost(&self) -> u64 {
        self.outside_shipping_cost
    }

    pub fn manufacturing_vendor(&self) -> Option<PartyId> {
        self.manufacturing_vendor
    }

    pub fn is_service(&self) -> bool {
        self.kind == ProductKind::Service
    }

    pub fn set_category(&mut self, category_id: Option<CategoryId>) {
        self.category_id = category_id;
    }

    pub fn set_uoms(&mut self, uom: UnitOfMeasure, purchase_uom: Option<UnitOfMeasure>) {
        self.uom = uom;
        self.purchase_uom = purchase_uom;
    }

    pub fn set_outside_shipping_cost(&mut self, per_unit: u64) {
        self.outside_shipping_cost = per_unit;
    }

    pub fn set_manufacturing_vendor(&mut self, vendor: Option<PartyId>) {
        self.manufacturing_vendor = vendor;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
