use serde::{Deserialize, Serialize};

/// Unit of measure for order and purchase lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitOfMeasure {
    #[default]
    Each,
    Hour,
    Kilogram,
    Litre,
}

impl core::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            UnitOfMeasure::Each => "Each",
            UnitOfMeasure::Hour => "Hour",
            UnitOfMeasure::Kilogram => "Kilogram",
            UnitOfMeasure::Litre => "Litre",
        };
        f.write_str(label)
    }
}
