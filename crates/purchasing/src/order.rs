use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saleops_core::{DomainError, DomainResult, Entity, RecordId};
use saleops_parties::PartyId;
use saleops_products::{ProductId, UnitOfMeasure};
use saleops_sales::SalesOrderId;

/// Purchase order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseOrderId(pub RecordId);

impl PurchaseOrderId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PurchaseOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// What a purchase order procures on behalf of a sales order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoType {
    Manufacturing,
    Shipping,
}

/// Purchase order line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub line_no: u32,
    pub product_id: ProductId,
    pub description: String,
    pub quantity: i64,
    /// Price in the smallest currency unit.
    pub unit_price: u64,
    pub uom: UnitOfMeasure,
    pub planned_date: DateTime<Utc>,
}

/// A purchase order sent to a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    id: PurchaseOrderId,
    vendor_id: PartyId,
    /// Reference of the document this order originates from.
    origin: String,
    sale_order_id: Option<SalesOrderId>,
    po_type: Option<PoType>,
    created_at: DateTime<Utc>,
    lines: Vec<PurchaseOrderLine>,
}

impl PurchaseOrder {
    pub fn new(
        id: PurchaseOrderId,
        vendor_id: PartyId,
        origin: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let origin = origin.into();
        if origin.trim().is_empty() {
            return Err(DomainError::validation(
                "purchase order origin must not be empty",
            ));
        }

        Ok(Self {
            id,
            vendor_id,
            origin,
            sale_order_id: None,
            po_type: None,
            created_at,
            lines: Vec::new(),
        })
    }

    pub fn id_typed(&self) -> PurchaseOrderId {
        self.id
    }

    pub fn vendor_id(&self) -> PartyId {
        self.vendor_id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn sale_order_id(&self) -> Option<SalesOrderId> {
        self.sale_order_id
    }

    pub fn po_type(&self) -> Option<PoType> {
        self.po_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn lines(&self) -> &[PurchaseOrderLine] {
        &self.lines
    }

    /// Tag this order with the sales order it procures for.
    pub fn attribute_to(&mut self, sale_order_id: SalesOrderId, po_type: PoType) {
        self.sale_order_id = Some(sale_order_id);
        self.po_type = Some(po_type);
    }

    pub fn is_shipping(&self) -> bool {
        self.po_type == Some(PoType::Shipping)
    }

    pub fn is_manufacturing(&self) -> bool {
        self.po_type == Some(PoType::Manufacturing)
    }

    pub fn add_line(
        &mut self,
        product_id: ProductId,
        description: impl Into<String>,
        quantity: i64,
        unit_price: u64,
        uom: UnitOfMeasure,
        planned_date: DateTime<Utc>,
    ) -> DomainResult<u32> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let line_no = (self.lines.len() as u32) + 1;
        self.lines.push(PurchaseOrderLine {
            line_no,
            product_id,
            description: description.into(),
            quantity,
            unit_price,
            uom,
            planned_date,
        });
        Ok(line_no)
    }
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
