//! Per-state and national rollups over reconciled utility records.
//!
//! Purely arithmetic: timestamps are injected by the caller and nothing here
//! touches the filesystem or network.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UtilityRatesError;
use crate::record::UtilityRecord;
use crate::reference::{NetMeteringPolicy, ReferenceData};

/// Provenance string stamped on the national file.
pub const DATA_SOURCE: &str = "OpenEI USURDB + EIA-861";

/// One state's rollup plus its full utility list. Built once after
/// reconciliation, written once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSummary {
    pub state: String,
    pub utility_count: usize,
    pub avg_residential_rate: f64,
    pub eia_state_avg_rate: f64,
    pub net_metering: NetMeteringPolicy,
    pub utilities: Vec<UtilityRecord>,
    pub fetched_at: DateTime<Utc>,
}

/// Per-state entry of the national file's `state_summary` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRollup {
    pub utility_count: usize,
    pub avg_rate: f64,
    pub eia_avg_rate: f64,
}

/// The national rollup across every processed state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NationalSummary {
    pub total_utilities: usize,
    pub states_covered: usize,
    pub national_avg_rate: f64,
    pub state_summary: BTreeMap<String, StateRollup>,
    pub utilities: Vec<UtilityRecord>,
    pub fetched_at: DateTime<Utc>,
    pub source: String,
}

/// Rolls one state's records into its summary. The per-state average is the
/// arithmetic mean of member utilities' rates; an empty state divides by one
/// instead of zero.
pub fn summarize_state(
    state: &str,
    utilities: Vec<UtilityRecord>,
    reference: &ReferenceData,
    fetched_at: DateTime<Utc>,
) -> StateSummary {
    let sum: f64 = utilities.iter().map(|u| u.residential_avg_rate).sum();
    let avg = round4(sum / utilities.len().max(1) as f64);
    StateSummary {
        state: state.to_string(),
        utility_count: utilities.len(),
        avg_residential_rate: avg,
        eia_state_avg_rate: reference.avg_rate(state).unwrap_or(0.0),
        net_metering: reference.net_metering_for(state),
        utilities,
        fetched_at,
    }
}

/// Rolls all state summaries into the national summary. The national average
/// is the unweighted mean of the reference state rates, independent of how
/// many utilities were found.
pub fn summarize_national(
    states: &[StateSummary],
    reference: &ReferenceData,
    fetched_at: DateTime<Utc>,
) -> NationalSummary {
    let mut state_summary = BTreeMap::new();
    let mut utilities = Vec::new();
    for summary in states {
        state_summary.insert(
            summary.state.clone(),
            StateRollup {
                utility_count: summary.utility_count,
                avg_rate: summary.avg_residential_rate,
                eia_avg_rate: summary.eia_state_avg_rate,
            },
        );
        utilities.extend(summary.utilities.iter().cloned());
    }
    NationalSummary {
        total_utilities: utilities.len(),
        states_covered: states.len(),
        national_avg_rate: round4(reference.national_avg_rate()),
        state_summary,
        utilities,
        fetched_at,
        source: DATA_SOURCE.to_string(),
    }
}

/// Serializes a summary the way the output files expect it: pretty-printed,
/// 2-space indent.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, UtilityRatesError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn round4(value: f64) -> f64 {
    (value * 10000.0).round() / 10000.0
}
