//! Pure extraction and classification over raw USURDB rate items.
//!
//! Every function here is total: any partially-populated item yields an
//! answer (or `None`), never an error.

use std::collections::HashSet;

use usurdb_api::types::RawRateItem;

use crate::record::{RateStructure, UtilityType};

/// Keywords marking member-owned cooperatives. Checked before the municipal
/// set; a name matching both classifies as coop.
const COOP_KEYWORDS: &[&str] = &["coop", "cooperative", "co-op", "emc", "ec ", "rec ", "remc"];

/// Keywords marking municipal and other public-power utilities.
const MUNI_KEYWORDS: &[&str] = &[
    "city of",
    "municipal",
    "dept of",
    "department of",
    "public util",
    "pud",
    "district",
    "authority",
    "board",
    "town of",
    "village of",
    "cwl&p",
    "city light",
    "electric service",
    "utilities board",
];

/// Derives an average per-kWh rate from one rate item.
///
/// Mean of `(rate + adj)` over every tier in every period: a flat arithmetic
/// mean, not weighted by tier width or period length. The understatement for
/// high-usage tiered customers is intentional and relied on downstream.
/// Falls back to `fixedmonthlycharge / 1000` (1000 kWh assumed monthly
/// usage) when no energy-rate matrix is present.
pub fn extract_rate(item: &RawRateItem) -> Option<f64> {
    let mut total = 0.0;
    let mut count = 0u32;
    for period in &item.energyratestructure {
        for tier in period {
            if let Some(rate) = tier.rate {
                total += rate + tier.adj.unwrap_or(0.0);
                count += 1;
            }
        }
    }
    if count > 0 {
        return Some(round5(total / f64::from(count)));
    }

    match item.fixedmonthlycharge {
        Some(fixed) if fixed > 0.0 => Some(round5(fixed / 1000.0)),
        _ => None,
    }
}

/// Classifies the rate structure. Time-of-use takes priority: more than one
/// distinct period index anywhere in the weekday schedule means TOU no
/// matter how the tiers look. Otherwise any multi-tier period means tiered.
pub fn classify_structure(item: &RawRateItem) -> RateStructure {
    let mut periods_used = HashSet::new();
    for month in &item.energyweekdayschedule {
        for val in month {
            periods_used.insert(*val);
        }
    }
    if periods_used.len() > 1 {
        return RateStructure::Tou;
    }

    if item.energyratestructure.iter().any(|period| period.len() > 1) {
        return RateStructure::Tiered;
    }

    RateStructure::Flat
}

/// True when any demand-charge field is populated.
pub fn has_demand_charges(item: &RawRateItem) -> bool {
    !item.demandratestructure.is_empty()
        || !item.flatdemandstructure.is_empty()
        || item.demandmax.unwrap_or(0.0) > 0.0
}

/// Classifies ownership from the utility name. Cooperative keywords win over
/// municipal ones; anything else is an IOU.
pub fn classify_utility_type(utility_name: &str) -> UtilityType {
    let name_lower = utility_name.to_lowercase();
    if COOP_KEYWORDS.iter().any(|kw| name_lower.contains(kw)) {
        return UtilityType::Coop;
    }
    if MUNI_KEYWORDS.iter().any(|kw| name_lower.contains(kw)) {
        return UtilityType::Muni;
    }
    UtilityType::Iou
}

fn round5(value: f64) -> f64 {
    (value * 100000.0).round() / 100000.0
}
