//! The operations pipeline service.
//!
//! `OpsPipeline` composes the stores, the calendar context, and the injected
//! configuration. Every mutation entry point ends with a recomputation of the
//! order's cached derived fields, which is the explicit form of the
//! "dependency change → recompute" contract. Failures in secondary
//! computations (lead-time lookups, purchase-order counters, issuance during
//! confirmation) are logged and degraded so the primary user action always
//! goes through.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saleops_core::{DomainError, DomainResult, RecordId};
use saleops_operations::{
    CarrierId, DeliveryStatus, ShippingExecution, StageId, expected_delivery,
    manufacturing_days, shipping_days,
};
use saleops_parties::PartyId;
use saleops_products::{CategoryId, ProductId, UnitOfMeasure};
use saleops_purchasing::{PoType, PurchaseOrder, PurchaseOrderId};
use saleops_sales::{
    LineShippingCost, SalesOrder, SalesOrderId, plan_manufacturing_pos, plan_shipping_po,
};

use crate::clock::Calendar;
use crate::config::OpsConfig;
use crate::store::{
    CarrierRegistry, CategoryRegistry, LeadTimeStore, PartyDirectory, ProductCatalog,
    PurchaseOrderStore, SalesOrderStore, StageRegistry,
};

/// Per-order purchase-order counters (the stat-button numbers).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoCounts {
    pub manufacturing: usize,
    pub shipping: usize,
}

pub struct OpsPipeline {
    calendar: Calendar,
    config: OpsConfig,
    orders: SalesOrderStore,
    purchase_orders: PurchaseOrderStore,
    carriers: CarrierRegistry,
    stages: StageRegistry,
    products: ProductCatalog,
    categories: CategoryRegistry,
    parties: PartyDirectory,
    lead_times: LeadTimeStore,
}

impl OpsPipeline {
    pub fn new(calendar: Calendar, config: OpsConfig) -> Self {
        Self {
            calendar,
            config,
            orders: SalesOrderStore::new(),
            purchase_orders: PurchaseOrderStore::new(),
            carriers: CarrierRegistry::new(),
            stages: StageRegistry::new(),
            products: ProductCatalog::new(),
            categories: CategoryRegistry::new(),
            parties: PartyDirectory::new(),
            lead_times: LeadTimeStore::new(),
        }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn config(&self) -> OpsConfig {
        self.config
    }

    // Master-data CRUD passes through the stores.

    pub fn products(&self) -> &ProductCatalog {
        &self.products
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn parties(&self) -> &PartyDirectory {
        &self.parties
    }

    pub fn carriers(&self) -> &CarrierRegistry {
        &self.carriers
    }

    pub fn stages(&self) -> &StageRegistry {
        &self.stages
    }

    pub fn lead_times(&self) -> &LeadTimeStore {
        &self.lead_times
    }

    pub fn purchase_orders(&self) -> &PurchaseOrderStore {
        &self.purchase_orders
    }

    // ------------------------------------------------------------------
    // Order entry points. Each one recomputes the cached derived fields.
    // ------------------------------------------------------------------

    pub fn create_order(&self, mut order: SalesOrder) -> DomainResult<()> {
        self.refresh(&mut order);
        self.orders.insert(order.id_typed(), order)
    }

    pub fn order(&self, id: SalesOrderId) -> Option<SalesOrder> {
        self.orders.get(&id)
    }

    pub fn orders(&self) -> Vec<SalesOrder> {
        self.orders.list()
    }

    pub fn set_order_date(
        &self,
        id: SalesOrderId,
        order_date: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        self.mutate(id, |order| {
            order.set_order_date(order_date);
            Ok(())
        })
    }

    pub fn set_destination(&self, id: SalesOrderId, city: Option<String>) -> DomainResult<()> {
        self.mutate(id, |order| {
            order.set_destination(city);
            Ok(())
        })
    }

    pub fn set_shipping_execution(
        &self,
        id: SalesOrderId,
        execution: ShippingExecution,
    ) -> DomainResult<()> {
        self.mutate(id, |order| {
            order.set_shipping_execution(execution);
            Ok(())
        })
    }

    pub fn select_carrier(&self, id: SalesOrderId, carrier_id: Option<CarrierId>) -> DomainResult<()> {
        if let Some(carrier_id) = carrier_id {
            if self.carriers.get(&carrier_id).is_none() {
                return Err(DomainError::not_found());
            }
        }
        self.mutate(id, |order| {
            order.select_carrier(carrier_id);
            Ok(())
        })
    }

    pub fn set_legacy_shipping(
        &self,
        id: SalesOrderId,
        vendor_id: Option<PartyId>,
        service_product_id: Option<ProductId>,
    ) -> DomainResult<()> {
        self.mutate(id, |order| {
            order.set_legacy_shipping(vendor_id, service_product_id);
            Ok(())
        })
    }

    pub fn assign_stage(&self, id: SalesOrderId, stage_id: Option<StageId>) -> DomainResult<()> {
        if let Some(stage_id) = stage_id {
            if self.stages.get(&stage_id).is_none() {
                return Err(DomainError::not_found());
            }
        }
        self.mutate(id, |order| {
            order.assign_stage(stage_id);
            Ok(())
        })
    }

    pub fn add_product_line(
        &self,
        id: SalesOrderId,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<u32> {
        if self.products.get(&product_id).is_none() {
            return Err(DomainError::not_found());
        }
        let mut line_no = 0;
        self.mutate(id, |order| {
            line_no = order.add_product_line(product_id, quantity)?;
            Ok(())
        })?;
        Ok(line_no)
    }

    pub fn add_section_line(&self, id: SalesOrderId, label: &str) -> DomainResult<u32> {
        let mut line_no = 0;
        self.mutate(id, |order| {
            line_no = order.add_section_line(label)?;
            Ok(())
        })?;
        Ok(line_no)
    }

    pub fn add_note_line(&self, id: SalesOrderId, label: &str) -> DomainResult<u32> {
        let mut line_no = 0;
        self.mutate(id, |order| {
            line_no = order.add_note_line(label)?;
            Ok(())
        })?;
        Ok(line_no)
    }

    /// Re-run the derived-field computation for one order without changing
    /// anything else.
    pub fn recompute_order(&self, id: SalesOrderId) -> DomainResult<()> {
        self.mutate(id, |_| Ok(()))
    }

    /// Batch refresh of every stored order (post-install and periodic jobs).
    pub fn recompute_all(&self) -> DomainResult<usize> {
        let orders = self.orders.try_list()?;
        let mut refreshed = 0;
        for mut order in orders {
            self.refresh(&mut order);
            self.orders.save(order.id_typed(), order)?;
            refreshed += 1;
        }
        Ok(refreshed)
    }

    // ------------------------------------------------------------------
    // Actions.
    // ------------------------------------------------------------------

    /// Confirm the order, then attempt purchase-order issuance.
    ///
    /// Issuance failures are logged and swallowed: confirming a batch of
    /// orders must never fail because of one order's purchase orders. Only
    /// order-level problems (unknown id, no lines) fail the action.
    pub fn confirm_order(&self, id: SalesOrderId) -> DomainResult<()> {
        self.mutate(id, |order| order.confirm())?;

        if let Err(error) = self.create_shipping_po(id) {
            tracing::error!(
                order = %id,
                %error,
                "failed to create shipping purchase order on confirmation"
            );
        }
        if let Err(error) = self.create_manufacturing_pos(id) {
            tracing::error!(
                order = %id,
                %error,
                "failed to create manufacturing purchase orders on confirmation"
            );
        }
        Ok(())
    }

    /// Issue the shipping purchase order for an order, if one is due.
    ///
    /// Standalone invocation surfaces validation errors (missing vendor or
    /// service product) to the caller; the skip rules return `Ok(None)`.
    /// At most one shipping purchase order ever exists per sales order.
    pub fn create_shipping_po(&self, id: SalesOrderId) -> DomainResult<Option<PurchaseOrderId>> {
        let order = self.orders.get(&id).ok_or_else(DomainError::not_found)?;

        let carrier = match order.carrier_id() {
            Some(carrier_id) => self.carriers.get(&carrier_id),
            None => None,
        };
        let line_costs: Vec<LineShippingCost> = order
            .product_lines()
            .filter_map(|line| {
                let product_id = line.product_id?;
                let per_unit = self
                    .products
                    .get(&product_id)
                    .map(|p| p.outside_shipping_cost())
                    .unwrap_or(0);
                Some(LineShippingCost {
                    quantity: line.quantity,
                    per_unit_cost: per_unit,
                })
            })
            .collect();
        let existing = self
            .purchase_orders
            .count_for(id, Some(PoType::Shipping))?;

        let Some(plan) = plan_shipping_po(
            &order,
            carrier.as_ref(),
            &line_costs,
            existing,
            self.config.riyadh_flat_cost_fallback,
        )?
        else {
            return Ok(None);
        };

        let uom = self
            .products
            .get(&plan.service_product_id)
            .map(|p| p.purchase_uom())
            .unwrap_or_default();
        let now = self.calendar.now_utc();
        let total_cost = plan.total_cost;

        let po_id = PurchaseOrderId::new(RecordId::new());
        let mut po = PurchaseOrder::new(po_id, plan.vendor_id, order.reference(), now)?;
        po.attribute_to(id, PoType::Shipping);
        po.add_line(plan.service_product_id, plan.description, 1, total_cost, uom, now)?;
        self.purchase_orders.insert(po)?;

        tracing::info!(
            order = %order.reference(),
            po = %po_id,
            cost = total_cost,
            "shipping purchase order created"
        );
        Ok(Some(po_id))
    }

    /// Issue manufacturing purchase orders, one per manufacturing vendor on
    /// the order's product lines. Skipped entirely when the order already has
    /// manufacturing purchase orders.
    pub fn create_manufacturing_pos(
        &self,
        id: SalesOrderId,
    ) -> DomainResult<Vec<PurchaseOrderId>> {
        let order = self.orders.get(&id).ok_or_else(DomainError::not_found)?;

        let existing = self
            .purchase_orders
            .count_for(id, Some(PoType::Manufacturing))?;
        if existing > 0 {
            return Ok(Vec::new());
        }

        let plans = plan_manufacturing_pos(&order, |product_id| {
            self.products
                .get(&product_id)
                .and_then(|p| p.manufacturing_vendor())
        });
        let now = self.calendar.now_utc();

        let mut created = Vec::with_capacity(plans.len());
        for plan in plans {
            let po_id = PurchaseOrderId::new(RecordId::new());
            let mut po = PurchaseOrder::new(po_id, plan.vendor_id, order.reference(), now)?;
            po.attribute_to(id, PoType::Manufacturing);
            for line in &plan.lines {
                let (description, uom) = self
                    .products
                    .get(&line.product_id)
                    .map(|p| (p.name().to_string(), p.purchase_uom()))
                    .unwrap_or_else(|| (line.product_id.to_string(), UnitOfMeasure::default()));
                // Prices come from procurement later; the factory order
                // carries products and quantities only.
                po.add_line(line.product_id, description, line.quantity, 0, uom, now)?;
            }
            self.purchase_orders.insert(po)?;
            created.push(po_id);
        }

        if !created.is_empty() {
            tracing::info!(
                order = %order.reference(),
                count = created.len(),
                "manufacturing purchase orders created"
            );
        }
        Ok(created)
    }

    /// Manufacturing purchase orders attributed to a sales order.
    pub fn manufacturing_pos(&self, id: SalesOrderId) -> Vec<PurchaseOrder> {
        self.purchase_orders
            .for_sale_order(id, Some(PoType::Manufacturing))
    }

    /// Shipping purchase orders attributed to a sales order.
    pub fn shipping_pos(&self, id: SalesOrderId) -> Vec<PurchaseOrder> {
        self.purchase_orders
            .for_sale_order(id, Some(PoType::Shipping))
    }

    /// Purchase-order counters for the stat buttons. Store failures degrade
    /// to zero counts; the counters must never block rendering an order.
    pub fn po_counts(&self, id: SalesOrderId) -> PoCounts {
        let count = |po_type: PoType| match self.purchase_orders.count_for(id, Some(po_type)) {
            Ok(n) => n,
            Err(error) => {
                tracing::warn!(
                    order = %id,
                    %error,
                    "failed to count purchase orders; defaulting to 0"
                );
                0
            }
        };

        PoCounts {
            manufacturing: count(PoType::Manufacturing),
            shipping: count(PoType::Shipping),
        }
    }

    // ------------------------------------------------------------------
    // Recomputation.
    // ------------------------------------------------------------------

    fn mutate<F>(&self, id: SalesOrderId, f: F) -> DomainResult<()>
    where
        F: FnOnce(&mut SalesOrder) -> DomainResult<()>,
    {
        let mut order = self.orders.get(&id).ok_or_else(DomainError::not_found)?;
        f(&mut order)?;
        self.refresh(&mut order);
        self.orders.save(id, order)
    }

    /// Recompute the cached derived fields. Lead-time lookup failures degrade
    /// to zero days so the schedule estimate never blocks the mutation that
    /// triggered it.
    fn refresh(&self, order: &mut SalesOrder) {
        let today = self.calendar.today();

        let mfg_days = match self.manufacturing_days_for(order) {
            Ok(days) => days,
            Err(error) => {
                tracing::warn!(
                    order = %order.reference(),
                    %error,
                    "failed to compute manufacturing days; defaulting to 0"
                );
                0
            }
        };
        let ship_days = match self.shipping_days_for(order) {
            Ok(days) => days,
            Err(error) => {
                tracing::warn!(
                    order = %order.reference(),
                    %error,
                    "failed to compute shipping days; defaulting to 0"
                );
                0
            }
        };

        let base = order
            .order_date()
            .map(|at| self.calendar.local_date(at))
            .unwrap_or(today);
        let expected = expected_delivery(base, mfg_days, ship_days);

        order.set_schedule(Some(expected), DeliveryStatus::evaluate(Some(expected), today));
        order.set_products_summary(self.products_summary_for(order));
    }

    fn manufacturing_days_for(&self, order: &SalesOrder) -> DomainResult<u32> {
        let mut categories: Vec<CategoryId> = Vec::new();
        for line in order.product_lines() {
            let Some(product_id) = line.product_id else {
                continue;
            };
            let Some(category) = self.products.try_get(&product_id)?.and_then(|p| p.category_id())
            else {
                continue;
            };
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        if categories.is_empty() {
            return Ok(0);
        }

        let book = self.lead_times.snapshot()?;
        Ok(manufacturing_days(&categories, &book))
    }

    fn shipping_days_for(&self, order: &SalesOrder) -> DomainResult<u32> {
        let carrier = match order.carrier_id() {
            Some(carrier_id) => self.carriers.try_get(&carrier_id)?,
            None => None,
        };
        Ok(shipping_days(
            order.shipping_execution(),
            carrier.as_ref(),
            order.shipping_zone(),
        ))
    }

    fn products_summary_for(&self, order: &SalesOrder) -> Option<String> {
        let mut entries = Vec::new();
        for line in order.product_lines() {
            let Some(product_id) = line.product_id else {
                continue;
            };
            let name = self
                .products
                .get(&product_id)
                .map(|p| p.name().to_string())
                .unwrap_or_else(|| product_id.to_string());
            entries.push(format!("{name} × {}", line.quantity));
        }

        if entries.is_empty() {
            None
        } else {
            Some(entries.join("\n"))
        }
    }
}
