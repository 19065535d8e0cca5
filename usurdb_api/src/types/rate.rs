//! Wire types for USURDB rate entries.
//!
//! Every field is optional or defaulted: real USURDB entries are frequently
//! partial, and downstream extraction must be total over any shape the API
//! returns.

use serde::{Deserialize, Serialize};

/// Top-level response envelope. A `{}` body parses as zero items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatesResponse {
    #[serde(default)]
    pub items: Vec<RawRateItem>,
}

/// One rate schedule for one utility, as returned with `detail=full`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRateItem {
    /// Opaque rate-entry identifier.
    pub label: Option<String>,

    /// EIA utility identifier. Primary deduplication key across query points.
    pub eiaid: Option<i64>,

    /// Utility display name.
    pub utility: Option<String>,

    /// Rate-schedule name (e.g. "Residential Service R").
    pub name: Option<String>,

    /// Where the utility publishes this schedule.
    pub source: Option<String>,

    /// Effective-start timestamp, epoch seconds.
    pub startdate: Option<i64>,

    /// Effective-end timestamp, epoch seconds. Absent for open-ended rates.
    pub enddate: Option<i64>,

    /// Fixed monthly charge in dollars.
    pub fixedmonthlycharge: Option<f64>,

    /// Energy rate matrix: one inner vec of tiers per rate period.
    #[serde(default)]
    pub energyratestructure: Vec<Vec<RateTier>>,

    /// Weekday schedule: 12 months x 24 hours of period indices into
    /// `energyratestructure`.
    #[serde(default)]
    pub energyweekdayschedule: Vec<Vec<i64>>,

    /// Weekend schedule, same shape as the weekday schedule.
    #[serde(default)]
    pub energyweekendschedule: Vec<Vec<i64>>,

    /// Demand rate matrix, tiered by period.
    #[serde(default)]
    pub demandratestructure: Vec<Vec<RateTier>>,

    /// Flat (seasonal) demand rate matrix.
    #[serde(default)]
    pub flatdemandstructure: Vec<Vec<RateTier>>,

    /// Maximum billable demand in kW.
    pub demandmax: Option<f64>,
}

/// One tier within a rate period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateTier {
    /// Upper bound of the tier in the schedule's usage unit.
    pub max: Option<f64>,

    /// Price per unit in dollars.
    pub rate: Option<f64>,

    /// Adjustment added to the rate (riders, fuel surcharges).
    pub adj: Option<f64>,

    /// Usage unit, typically "kWh".
    pub unit: Option<String>,

    /// Compensation rate for exported energy, where offered.
    pub sell: Option<f64>,
}
