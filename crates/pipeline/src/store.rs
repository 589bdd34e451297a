//! Typed stores over the in-memory registry.

use std::sync::RwLock;

use saleops_core::DomainResult;
use saleops_operations::{
    CarrierId, LeadTimeBook, LeadTimeRule, LeadTimeRuleId, ShippingCarrier, Stage, StageId,
};
use saleops_parties::{Party, PartyId};
use saleops_products::{Category, CategoryId, Product, ProductId};
use saleops_purchasing::{PoType, PurchaseOrder, PurchaseOrderId};
use saleops_sales::{SalesOrder, SalesOrderId};

use crate::registry::{InMemoryRegistry, poisoned};

pub type SalesOrderStore = InMemoryRegistry<SalesOrderId, SalesOrder>;
pub type ProductCatalog = InMemoryRegistry<ProductId, Product>;
pub type PartyDirectory = InMemoryRegistry<PartyId, Party>;
pub type CategoryRegistry = InMemoryRegistry<CategoryId, Category>;

/// Purchase orders, queryable by originating sales order and type.
#[derive(Debug, Default)]
pub struct PurchaseOrderStore {
    inner: InMemoryRegistry<PurchaseOrderId, PurchaseOrder>,
}

impl PurchaseOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a purchase order. Uniqueness of (sales order, shipping) is
    /// enforced here, under the store's write lock, in addition to the
    /// issuer's read-then-check guard; a race between two issuers resolves
    /// into a conflict instead of a duplicate.
    pub fn insert(&self, po: PurchaseOrder) -> DomainResult<()> {
        let key = po.id_typed();
        match (po.sale_order_id(), po.po_type()) {
            (Some(sale_order_id), Some(PoType::Shipping)) => self.inner.insert_unless(
                key,
                po,
                |existing| Self::matches(existing, sale_order_id, Some(PoType::Shipping)),
                "a shipping purchase order already exists for this sales order",
            ),
            _ => self.inner.insert(key, po),
        }
    }

    pub fn get(&self, id: &PurchaseOrderId) -> Option<PurchaseOrder> {
        self.inner.get(id)
    }

    pub fn list(&self) -> Vec<PurchaseOrder> {
        self.inner.list()
    }

    fn matches(po: &PurchaseOrder, sale_order_id: SalesOrderId, po_type: Option<PoType>) -> bool {
        po.sale_order_id() == Some(sale_order_id)
            && po_type.is_none_or(|t| po.po_type() == Some(t))
    }

    /// Count purchase orders attributed to a sales order, optionally
    /// restricted to one type. A store failure is reported, not read as zero;
    /// callers decide whether to degrade.
    pub fn count_for(
        &self,
        sale_order_id: SalesOrderId,
        po_type: Option<PoType>,
    ) -> DomainResult<usize> {
        let all = self.inner.try_list()?;
        Ok(all
            .iter()
            .filter(|po| Self::matches(po, sale_order_id, po_type))
            .count())
    }

    /// Purchase orders attributed to a sales order, oldest first.
    pub fn for_sale_order(
        &self,
        sale_order_id: SalesOrderId,
        po_type: Option<PoType>,
    ) -> Vec<PurchaseOrder> {
        let mut found: Vec<PurchaseOrder> = self
            .inner
            .list()
            .into_iter()
            .filter(|po| Self::matches(po, sale_order_id, po_type))
            .collect();
        found.sort_by_key(|po| (po.created_at(), po.id_typed().0));
        found
    }
}

/// Shipping carriers, listable in configured order.
#[derive(Debug, Default)]
pub struct CarrierRegistry {
    inner: InMemoryRegistry<CarrierId, ShippingCarrier>,
}

impl CarrierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, carrier: ShippingCarrier) -> DomainResult<()> {
        self.inner.insert(carrier.id_typed(), carrier)
    }

    pub fn save(&self, carrier: ShippingCarrier) -> DomainResult<()> {
        self.inner.save(carrier.id_typed(), carrier)
    }

    pub fn get(&self, id: &CarrierId) -> Option<ShippingCarrier> {
        self.inner.get(id)
    }

    /// Lookup that reports a poisoned lock instead of reading it as "absent",
    /// so the lead-time recomputation can degrade explicitly.
    pub fn try_get(&self, id: &CarrierId) -> DomainResult<Option<ShippingCarrier>> {
        self.inner.try_get(id)
    }

    pub fn remove(&self, id: &CarrierId) -> DomainResult<Option<ShippingCarrier>> {
        self.inner.remove(id)
    }

    /// Active carriers in (sequence, id) order.
    pub fn active_ordered(&self) -> Vec<ShippingCarrier> {
        let mut carriers: Vec<ShippingCarrier> = self
            .inner
            .list()
            .into_iter()
            .filter(ShippingCarrier::is_active)
            .collect();
        carriers.sort_by_key(|c| (c.sequence(), c.id_typed().0));
        carriers
    }
}

/// Pipeline stages, listable in kanban-column order.
#[derive(Debug, Default)]
pub struct StageRegistry {
    inner: InMemoryRegistry<StageId, Stage>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, stage: Stage) -> DomainResult<()> {
        self.inner.insert(stage.id_typed(), stage)
    }

    pub fn save(&self, stage: Stage) -> DomainResult<()> {
        self.inner.save(stage.id_typed(), stage)
    }

    pub fn get(&self, id: &StageId) -> Option<Stage> {
        self.inner.get(id)
    }

    pub fn remove(&self, id: &StageId) -> DomainResult<Option<Stage>> {
        self.inner.remove(id)
    }

    /// All stages in (sequence, id) order.
    pub fn ordered(&self) -> Vec<Stage> {
        let mut stages = self.inner.list();
        stages.sort_by_key(|s| (s.sequence(), s.id_typed().0));
        stages
    }
}

/// Manufacturing lead-time rules behind a lock; the uniqueness invariant is
/// enforced by [`LeadTimeBook`] itself.
#[derive(Debug, Default)]
pub struct LeadTimeStore {
    inner: RwLock<LeadTimeBook>,
}

impl LeadTimeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&self, rule: LeadTimeRule) -> DomainResult<()> {
        self.inner.write().map_err(|_| poisoned())?.insert(rule)
    }

    pub fn set_days(&self, id: LeadTimeRuleId, days: u32) -> DomainResult<()> {
        self.inner.write().map_err(|_| poisoned())?.set_days(id, days)
    }

    pub fn activate(&self, id: LeadTimeRuleId) -> DomainResult<()> {
        self.inner.write().map_err(|_| poisoned())?.activate(id)
    }

    pub fn deactivate(&self, id: LeadTimeRuleId) -> DomainResult<()> {
        self.inner.write().map_err(|_| poisoned())?.deactivate(id)
    }

    pub fn remove(&self, id: LeadTimeRuleId) -> DomainResult<LeadTimeRule> {
        self.inner.write().map_err(|_| poisoned())?.remove(id)
    }

    pub fn days_for(&self, category_id: CategoryId) -> Option<u32> {
        self.inner.read().ok()?.days_for(category_id)
    }

    /// Consistent copy of the whole rule book for a recomputation pass.
    pub fn snapshot(&self) -> DomainResult<LeadTimeBook> {
        Ok(self.inner.read().map_err(|_| poisoned())?.clone())
    }
}
