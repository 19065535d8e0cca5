//! The normalized per-utility record emitted by reconciliation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::reference::NetMeteringType;

/// Utility ownership classification. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtilityType {
    /// Investor-owned utility.
    #[serde(rename = "IOU")]
    Iou,
    /// Municipal or other public-power utility.
    #[serde(rename = "muni")]
    Muni,
    /// Member-owned cooperative.
    #[serde(rename = "coop")]
    Coop,
}

/// How the rate varies: not at all, by usage tier, or by time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateStructure {
    Flat,
    Tiered,
    Tou,
}

/// One normalized record per `(state, utility_id)` pair.
///
/// Field names and order are the output-file contract; downstream consumers
/// read these files directly. `residential_avg_rate` is always within the
/// plausible `[0.01, 1.0]` dollars-per-kWh band after reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityRecord {
    /// Stable identity: the EIA id, or a name-derived hash where none exists.
    pub utility_id: String,
    pub utility_name: String,
    /// Two-letter state code.
    pub state: String,
    pub states_served: Vec<String>,
    #[serde(rename = "type")]
    pub utility_type: UtilityType,
    /// Residential customer count from reference data; 0 = unknown.
    pub customer_count: u64,
    /// Dollars per kWh.
    pub residential_avg_rate: f64,
    pub rate_structure: RateStructure,
    pub has_net_metering: bool,
    pub net_metering_type: NetMeteringType,
    pub export_rate: Option<f64>,
    /// True iff `rate_structure` is time-of-use.
    pub tou_available: bool,
    pub demand_charges: bool,
    pub updated_at: NaiveDate,
}
