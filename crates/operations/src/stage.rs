use serde::{Deserialize, Serialize};

use saleops_core::{DomainError, DomainResult, Entity, RecordId};

/// Pipeline stage identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub RecordId);

impl StageId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for StageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Operational area a stage belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpsArea {
    Manufacturing,
    Shipping,
    Other,
    Done,
}

/// Master-data entity: a stage of the operations pipeline.
///
/// Stages list in (sequence, id) order; orders carry an optional stage
/// assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    id: StageId,
    name: String,
    sequence: u32,
    area: OpsArea,
    is_done: bool,
}

impl Stage {
    pub fn new(id: StageId, name: impl Into<String>, area: OpsArea) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("stage name must not be empty"));
        }

        Ok(Self {
            id,
            name,
            sequence: 10,
            area,
            is_done: false,
        })
    }

    pub fn id_typed(&self) -> StageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn area(&self) -> OpsArea {
        self.area
    }

    /// Orders in a done stage are considered finished/delivered.
    pub fn is_done(&self) -> bool {
        self.is_done
    }

    pub fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
    }

    pub fn mark_done(&mut self, is_done: bool) {
        self.is_done = is_done;
    }
}

impl Entity for Stage {
    type Id = StageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
