//! Shipping-destination classification.
//!
//! The shipping zone of a sales order is a pure function of the free-text
//! destination city; it is re-evaluated whenever the destination changes.

use serde::{Deserialize, Serialize};

/// Known spellings of Riyadh, Latin and Arabic.
const RIYADH_ALIASES: [&str; 5] = ["riyadh", "alriyadh", "al riyadh", "الرياض", "لرياض"];

/// Where an order ships to, relative to Riyadh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingZone {
    Riyadh,
    Outside,
}

impl ShippingZone {
    /// Classify a free-text destination city.
    pub fn classify(city: Option<&str>) -> Self {
        if is_riyadh_city(city) {
            ShippingZone::Riyadh
        } else {
            ShippingZone::Outside
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShippingZone::Riyadh => "inside Riyadh",
            ShippingZone::Outside => "outside Riyadh",
        }
    }
}

/// Whether a free-text city name denotes Riyadh.
///
/// Latin input is trimmed and matched case-insensitively; Arabic input is
/// matched as written. A city matches if it equals one of the known aliases
/// or contains "riyadh"/"الرياض" as a substring. Null/empty input never
/// matches.
pub fn is_riyadh_city(city: Option<&str>) -> bool {
    let Some(raw) = city else {
        return false;
    };
    let city = raw.trim().to_lowercase();
    if city.is_empty() {
        return false;
    }

    RIYADH_ALIASES.contains(&city.as_str())
        || city.contains("riyadh")
        || city.contains("الرياض")
}
