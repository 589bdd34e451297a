//! Manufacturing lead-time rules, keyed by product category.

use serde::{Deserialize, Serialize};

use saleops_core::{DomainError, DomainResult, Entity, RecordId};
use saleops_products::CategoryId;

/// Lead-time rule identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadTimeRuleId(pub RecordId);

impl LeadTimeRuleId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LeadTimeRuleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Master-data entity: manufacturing days for one product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTimeRule {
    id: LeadTimeRuleId,
    category_id: CategoryId,
    days: u32,
    active: bool,
    note: Option<String>,
}

impl LeadTimeRule {
    pub fn new(id: LeadTimeRuleId, category_id: CategoryId, days: u32) -> Self {
        Self {
            id,
            category_id,
            days,
            active: true,
            note: None,
        }
    }

    pub fn id_typed(&self) -> LeadTimeRuleId {
        self.id
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note;
    }
}

impl Entity for LeadTimeRule {
    type Id = LeadTimeRuleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// The collection of lead-time rules.
///
/// Invariant: a category has at most one *active* rule. Inserting or
/// re-activating a rule that would violate this is rejected with a conflict
/// at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTimeBook {
    rules: Vec<LeadTimeRule>,
}

impl LeadTimeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[LeadTimeRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn active_rule_for(&self, category_id: CategoryId) -> Option<&LeadTimeRule> {
        self.rules
            .iter()
            .find(|r| r.active && r.category_id == category_id)
    }

    fn position(&self, id: LeadTimeRuleId) -> DomainResult<usize> {
        self.rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(DomainError::not_found)
    }

    /// Manufacturing days configured for a category (active rules only).
    pub fn days_for(&self, category_id: CategoryId) -> Option<u32> {
        self.active_rule_for(category_id).map(|r| r.days)
    }

    pub fn insert(&mut self, rule: LeadTimeRule) -> DomainResult<()> {
        if self.rules.iter().any(|r| r.id == rule.id) {
            return Err(DomainError::conflict("lead-time rule already exists"));
        }
        if rule.active && self.active_rule_for(rule.category_id).is_some() {
            return Err(DomainError::conflict(
                "an active lead-time rule for this category already exists",
            ));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn set_days(&mut self, id: LeadTimeRuleId, days: u32) -> DomainResult<()> {
        let idx = self.position(id)?;
        self.rules[idx].days = days;
        Ok(())
    }

    pub fn deactivate(&mut self, id: LeadTimeRuleId) -> DomainResult<()> {
        let idx = self.position(id)?;
        self.rules[idx].active = false;
        Ok(())
    }

    /// Re-activating a rule re-checks the one-active-rule-per-category
    /// invariant.
    pub fn activate(&mut self, id: LeadTimeRuleId) -> DomainResult<()> {
        let idx = self.position(id)?;
        let category_id = self.rules[idx].category_id;
        if let Some(existing) = self.active_rule_for(category_id) {
            if existing.id != id {
                return Err(DomainError::conflict(
                    "an active lead-time rule for this category already exists",
                ));
            }
        }
        self.rules[idx].active = true;
        Ok(())
    }

    pub fn remove(&mut self, id: LeadTimeRuleId) -> DomainResult<LeadTimeRule> {
        let idx = self.position(id)?;
        Ok(self.rules.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_id() -> LeadTimeRuleId {
        LeadTimeRuleId::new(RecordId::new())
    }

    fn category_id() -> CategoryId {
        CategoryId::new(RecordId::new())
    }

    #[test]
    fn one_active_rule_per_category() {
        let mut book = LeadTimeBook::new();
        let category = category_id();
        book.insert(LeadTimeRule::new(rule_id(), category, 5)).unwrap();

        let err = book
            .insert(LeadTimeRule::new(rule_id(), category, 7))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn deactivated_rule_frees_the_category() {
        let mut book = LeadTimeBook::new();
        let category = category_id();
        let first = rule_id();
        book.insert(LeadTimeRule::new(first, category, 5)).unwrap();
        book.deactivate(first).unwrap();

        book.insert(LeadTimeRule::new(rule_id(), category, 7)).unwrap();
        assert_eq!(book.days_for(category), Some(7));
    }

    #[test]
    fn reactivation_rechecks_the_invariant() {
        let mut book = LeadTimeBook::new();
        let category = category_id();
        let first = rule_id();
        book.insert(LeadTimeRule::new(first, category, 5)).unwrap();
        book.deactivate(first).unwrap();
        book.insert(LeadTimeRule::new(rule_id(), category, 7)).unwrap();

        let err = book.activate(first).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn days_for_ignores_inactive_rules() {
        let mut book = LeadTimeBook::new();
        let category = category_id();
        let id = rule_id();
        book.insert(LeadTimeRule::new(id, category, 5)).unwrap();
        assert_eq!(book.days_for(category), Some(5));

        book.deactivate(id).unwrap();
        assert_eq!(book.days_for(category), None);
    }

    #[test]
    fn unknown_rule_is_not_found() {
        let mut book = LeadTimeBook::new();
        assert_eq!(book.set_days(rule_id(), 3), Err(DomainError::NotFound));
    }
}
