//! Library layer for the utility-rates pipeline: reference tables, a paced
//! and retrying API client, rate extraction, per-state reconciliation, and
//! state/national rollups.
//!
//! Wraps the `usurdb_api` crate with the sequential, rate-limited calling
//! discipline the upstream service requires, and turns raw USURDB rate
//! entries into one normalized record per utility.

pub mod aggregate;
pub mod client;
pub mod error;
pub mod extract;
pub mod reconcile;
pub mod record;
pub mod reference;

pub use usurdb_api;

pub use aggregate::{NationalSummary, StateRollup, StateSummary};
pub use client::{PacedClient, PacingConfig};
pub use error::UtilityRatesError;
pub use record::{RateStructure, UtilityRecord, UtilityType};
pub use reference::{
    GeoQueryPoint, KnownUtility, NetMeteringPolicy, NetMeteringType, ReferenceData,
};
