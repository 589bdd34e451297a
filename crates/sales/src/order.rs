use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use saleops_core::{DomainError, DomainResult, Entity, RecordId};
use saleops_operations::{
    CarrierId, DeliveryStatus, ShippingExecution, ShippingZone, StageId,
};
use saleops_parties::PartyId;
use saleops_products::ProductId;

/// Sales order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalesOrderId(pub RecordId);

impl SalesOrderId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SalesOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Sales order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesOrderStatus {
    Draft,
    Confirmed,
}

/// Order line kind. Section and note lines are display-only and are ignored
/// by every operational rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Product,
    Section,
    Note,
}

/// Order line: a product with a quantity, or a display-only section/note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_no: u32,
    pub kind: LineKind,
    pub product_id: Option<ProductId>,
    pub quantity: i64,
    pub label: Option<String>,
}

impl OrderLine {
    /// Whether this line carries a product the operational rules act on.
    pub fn is_product_line(&self) -> bool {
        self.kind == LineKind::Product && self.product_id.is_some()
    }
}

/// A sales order with its operational view.
///
/// The derived fields (shipping zone, expected delivery, delivery status,
/// products summary) are caches of the last recomputation; the zone is
/// refreshed synchronously on destination change since it depends on nothing
/// but the city string, while the schedule fields need master data and are
/// refreshed by the pipeline at every mutation entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrder {
    id: SalesOrderId,
    reference: String,
    status: SalesOrderStatus,
    order_date: Option<DateTime<Utc>>,
    destination_city: Option<String>,
    shipping_zone: ShippingZone,
    shipping_execution: ShippingExecution,
    carrier_id: Option<CarrierId>,
    /// Legacy fallback vendor, used only when no carrier is selected.
    shipping_vendor_id: Option<PartyId>,
    /// Legacy fallback service product, used only when no carrier is selected.
    shipping_service_product_id: Option<ProductId>,
    stage_id: Option<StageId>,
    lines: Vec<OrderLine>,
    expected_delivery: Option<NaiveDate>,
    delivery_status: Option<DeliveryStatus>,
    products_summary: Option<String>,
}

impl SalesOrder {
    pub fn new(
        id: SalesOrderId,
        reference: impl Into<String>,
        order_date: Option<DateTime<Utc>>,
    ) -> DomainResult<Self> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(DomainError::validation("order reference must not be empty"));
        }

        Ok(Self {
            id,
            reference,
            status: SalesOrderStatus::Draft,
            order_date,
            destination_city: None,
            shipping_zone: ShippingZone::Outside,
            shipping_execution: ShippingExecution::Carrier,
            carrier_id: None,
            shipping_vendor_id: None,
            shipping_service_product_id: None,
            stage_id: None,
            lines: Vec::new(),
            expected_delivery: None,
            delivery_status: None,
            products_summary: None,
        })
    }

    pub fn id_typed(&self) -> SalesOrderId {
        self.id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn status(&self) -> SalesOrderStatus {
        self.status
    }

    pub fn order_date(&self) -> Option<DateTime<Utc>> {
        self.order_date
    }

    pub fn destination_city(&self) -> Option<&str> {
        self.destination_city.as_deref()
    }

    pub fn shipping_zone(&self) -> ShippingZone {
        self.shipping_zone
    }

    pub fn shipping_execution(&self) -> ShippingExecution {
        self.shipping_execution
    }

    pub fn carrier_id(&self) -> Option<CarrierId> {
        self.carrier_id
    }

    pub fn shipping_vendor_id(&self) -> Option<PartyId> {
        self.shipping_vendor_id
    }

    pub fn shipping_service_product_id(&self) -> Option<ProductId> {
        self.shipping_service_product_id
    }

    pub fn stage_id(&self) -> Option<StageId> {
        self.stage_id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Lines that carry a product (sections and notes excluded).
    pub fn product_lines(&self) -> impl Iterator<Item = &OrderLine> {
        self.lines.iter().filter(|l| l.is_product_line())
    }

    pub fn expected_delivery(&self) -> Option<NaiveDate> {
        self.expected_delivery
    }

    pub fn delivery_status(&self) -> Option<DeliveryStatus> {
        self.delivery_status
    }

    pub fn products_summary(&self) -> Option<&str> {
        self.products_summary.as_deref()
    }

    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, SalesOrderStatus::Draft)
    }

    // ------------------------------------------------------------------
    // Mutations. Line edits are draft-only; shipping configuration can
    // change at any time (carriers do change after confirmation).
    // ------------------------------------------------------------------

    pub fn set_order_date(&mut self, order_date: Option<DateTime<Utc>>) {
        self.order_date = order_date;
    }

    /// Change the shipping destination. The cached zone is recomputed
    /// immediately since it depends only on the city string.
    pub fn set_destination(&mut self, city: Option<String>) {
        self.shipping_zone = ShippingZone::classify(city.as_deref());
        self.destination_city = city;
    }

    pub fn set_shipping_execution(&mut self, execution: ShippingExecution) {
        self.shipping_execution = execution;
    }

    pub fn select_carrier(&mut self, carrier_id: Option<CarrierId>) {
        self.carrier_id = carrier_id;
    }

    pub fn set_legacy_shipping(
        &mut self,
        vendor_id: Option<PartyId>,
        service_product_id: Option<ProductId>,
    ) {
        self.shipping_vendor_id = vendor_id;
        self.shipping_service_product_id = service_product_id;
    }

    pub fn assign_stage(&mut self, stage_id: Option<StageId>) {
        self.stage_id = stage_id;
    }

    pub fn add_product_line(&mut self, product_id: ProductId, quantity: i64) -> DomainResult<u32> {
        if !self.is_modifiable() {
            return Err(DomainError::invariant(
                "cannot modify order once it is confirmed",
            ));
        }
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let line_no = (self.lines.len() as u32) + 1;
        self.lines.push(OrderLine {
            line_no,
            kind: LineKind::Product,
            product_id: Some(product_id),
            quantity,
            label: None,
        });
        Ok(line_no)
    }

    pub fn add_section_line(&mut self, label: impl Into<String>) -> DomainResult<u32> {
        self.add_display_line(LineKind::Section, label.into())
    }

    pub fn add_note_line(&mut self, label: impl Into<String>) -> DomainResult<u32> {
        self.add_display_line(LineKind::Note, label.into())
    }

    fn add_display_line(&mut self, kind: LineKind, label: String) -> DomainResult<u32> {
        if !self.is_modifiable() {
            return Err(DomainError::invariant(
                "cannot modify order once it is confirmed",
            ));
        }

        let line_no = (self.lines.len() as u32) + 1;
        self.lines.push(OrderLine {
            line_no,
            kind,
            product_id: None,
            quantity: 0,
            label: Some(label),
        });
        Ok(line_no)
    }

    /// Confirm the order. Confirming an already-confirmed order is a no-op,
    /// so the surrounding confirmation action can be retried or batched.
    pub fn confirm(&mut self) -> DomainResult<()> {
        if self.status == SalesOrderStatus::Confirmed {
            return Ok(());
        }
        if self.lines.is_empty() {
            return Err(DomainError::validation(
                "cannot confirm order without lines",
            ));
        }
        self.status = SalesOrderStatus::Confirmed;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Derived-field caches, written by the recomputation in the pipeline.
    // ------------------------------------------------------------------

    pub fn set_schedule(
        &mut self,
        expected_delivery: Option<NaiveDate>,
        delivery_status: Option<DeliveryStatus>,
    ) {
        self.expected_delivery = expected_delivery;
        self.delivery_status = delivery_status;
    }

    pub fn set_products_summary(&mut self, summary: Option<String>) {
        self.products_summary = summary;
    }
}

impl Entity for SalesOrder {
    type Id = SalesOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
