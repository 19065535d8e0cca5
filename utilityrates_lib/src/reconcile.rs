//! Per-state reconciliation: merges raw rate items from every geographic
//! query point into one normalized record per utility identity, then
//! back-fills known major utilities the sweep missed.
//!
//! A failed query anywhere degrades to zero items for that query; nothing
//! here aborts a state.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use usurdb_api::types::RawRateItem;
use usurdb_api::{GeoRateQuery, UtilityRateQuery};

use crate::client::PacedClient;
use crate::extract;
use crate::record::{RateStructure, UtilityRecord};
use crate::reference::{KnownUtility, ReferenceData};

/// Plausible band for a residential per-kWh rate, dollars. Anything outside
/// is replaced by the state average before a record is emitted.
const MIN_PLAUSIBLE_RATE: f64 = 0.01;
const MAX_PLAUSIBLE_RATE: f64 = 1.0;

/// Stable identity for a raw item: the EIA id. Items without one cannot be
/// deduplicated and are dropped from the geographic merge.
pub fn utility_id(item: &RawRateItem) -> Option<String> {
    item.eiaid.map(|id| id.to_string())
}

/// Identity for records that may lack an EIA id: falls back to a hash of the
/// utility name.
fn name_fallback_id(item: &RawRateItem, utility_name: &str) -> String {
    utility_id(item).unwrap_or_else(|| hashed_name_id(utility_name))
}

fn hashed_name_id(utility_name: &str) -> String {
    let mut hasher = DefaultHasher::new();
    utility_name.hash(&mut hasher);
    format!("name:{:016x}", hasher.finish())
}

/// Reduces candidate items to at most one per utility identity.
///
/// Last-writer-wins by `startdate`: a later item replaces an earlier one only
/// when its start is strictly greater; ties keep the first-seen item. The
/// result preserves first-appearance order.
pub fn merge_candidates<I>(items: I) -> Vec<RawRateItem>
where
    I: IntoIterator<Item = RawRateItem>,
{
    let mut merged: Vec<RawRateItem> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for item in items {
        let Some(id) = utility_id(&item) else {
            continue;
        };
        match index.get(&id) {
            Some(&slot) => {
                if item.startdate.unwrap_or(0) > merged[slot].startdate.unwrap_or(0) {
                    merged[slot] = item;
                }
            }
            None => {
                index.insert(id, merged.len());
                merged.push(item);
            }
        }
    }
    merged
}

/// Resolves a customer count from the known-utility table: exact name match
/// first, then case-insensitive substring containment in either direction.
pub fn resolve_customer_count(utility_name: &str, known: &[KnownUtility]) -> u64 {
    let mut count = known
        .iter()
        .find(|k| k.name == utility_name)
        .map(|k| k.customer_count)
        .unwrap_or(0);
    if count == 0 {
        let name_lower = utility_name.to_lowercase();
        for k in known {
            let known_lower = k.name.to_lowercase();
            if known_lower.contains(&name_lower) || name_lower.contains(&known_lower) {
                count = k.customer_count;
                break;
            }
        }
    }
    count
}

fn plausible_or_fallback(rate: Option<f64>, state_avg: f64) -> f64 {
    match rate {
        Some(r) if (MIN_PLAUSIBLE_RATE..=MAX_PLAUSIBLE_RATE).contains(&r) => r,
        _ => state_avg,
    }
}

fn round4(value: f64) -> f64 {
    (value * 10000.0).round() / 10000.0
}

/// Builds a record from a merged geographic item. Items without an EIA id
/// have no stable identity and yield `None`.
pub fn record_from_item(
    item: &RawRateItem,
    state: &str,
    reference: &ReferenceData,
    today: NaiveDate,
) -> Option<UtilityRecord> {
    let id = utility_id(item)?;
    let utility_name = item.utility.clone().unwrap_or_else(|| "Unknown".to_string());
    let customer_count = resolve_customer_count(&utility_name, reference.known_for(state));
    Some(assemble_record(
        item,
        id,
        utility_name,
        customer_count,
        state,
        reference,
        today,
    ))
}

/// Builds a record from a direct-name lookup hit. The known utility supplies
/// the name and customer count; the item supplies rate and structure.
pub fn record_from_direct_lookup(
    item: &RawRateItem,
    known: &KnownUtility,
    state: &str,
    reference: &ReferenceData,
    today: NaiveDate,
) -> UtilityRecord {
    let id = name_fallback_id(item, &known.name);
    assemble_record(
        item,
        id,
        known.name.clone(),
        known.customer_count,
        state,
        reference,
        today,
    )
}

/// Synthesizes a record from reference data alone, for known utilities the
/// API returned nothing for. Rate structure defaults to tiered with the
/// state-average rate; TOU and demand flags stay off.
pub fn synthesize_record(
    known: &KnownUtility,
    state: &str,
    reference: &ReferenceData,
    today: NaiveDate,
) -> UtilityRecord {
    let nm = reference.net_metering_for(state);
    UtilityRecord {
        utility_id: hashed_name_id(&known.name),
        utility_name: known.name.clone(),
        state: state.to_string(),
        states_served: vec![state.to_string()],
        utility_type: extract::classify_utility_type(&known.name),
        customer_count: known.customer_count,
        residential_avg_rate: round4(reference.avg_rate_for(state)),
        rate_structure: RateStructure::Tiered,
        has_net_metering: nm.has_net_metering,
        net_metering_type: nm.net_metering_type,
        export_rate: nm.export_rate,
        tou_available: false,
        demand_charges: false,
        updated_at: today,
    }
}

fn assemble_record(
    item: &RawRateItem,
    id: String,
    utility_name: String,
    customer_count: u64,
    state: &str,
    reference: &ReferenceData,
    today: NaiveDate,
) -> UtilityRecord {
    let rate_structure = extract::classify_structure(item);
    let avg_rate = plausible_or_fallback(extract::extract_rate(item), reference.avg_rate_for(state));
    let nm = reference.net_metering_for(state);
    UtilityRecord {
        utility_id: id,
        utility_type: extract::classify_utility_type(&utility_name),
        utility_name,
        state: state.to_string(),
        states_served: vec![state.to_string()],
        customer_count,
        residential_avg_rate: round4(avg_rate),
        rate_structure,
        has_net_metering: nm.has_net_metering,
        net_metering_type: nm.net_metering_type,
        export_rate: nm.export_rate,
        tou_available: rate_structure == RateStructure::Tou,
        demand_charges: extract::has_demand_charges(item),
        updated_at: today,
    }
}

/// Reconciles one state: sweeps every geographic query point, merges by
/// utility identity, then gives every known major utility a second chance
/// via direct lookup (or a synthesized record) so it is always represented.
///
/// Returns records sorted by customer count descending; ties keep encounter
/// order. Query failures shrink coverage; they never abort the state.
pub async fn reconcile_state(
    client: &PacedClient,
    reference: &ReferenceData,
    state: &str,
    today: NaiveDate,
) -> Vec<UtilityRecord> {
    let mut collected: Vec<RawRateItem> = Vec::new();
    for point in reference.points_for(state) {
        tracing::info!(
            "querying {}, {} ({}, {})",
            point.label,
            state,
            point.lat,
            point.lon
        );
        match client.geo_rates(&GeoRateQuery::new(point.lat, point.lon)).await {
            Ok(items) => collected.extend(items),
            Err(e) => {
                tracing::warn!("no data for {}, {}: {}", point.label, state, e);
            }
        }
    }

    let mut records: Vec<UtilityRecord> = merge_candidates(collected)
        .iter()
        .filter_map(|item| record_from_item(item, state, reference, today))
        .collect();

    // Second chance for known majors the sweep missed.
    for known in reference.known_for(state) {
        if known.customer_count == 0 {
            continue;
        }
        let known_lower = known.name.to_lowercase();
        let already_found = records.iter().any(|r| {
            let record_lower = r.utility_name.to_lowercase();
            known_lower.contains(&record_lower) || record_lower.contains(&known_lower)
        });
        if already_found {
            continue;
        }

        tracing::info!("searching directly for {}", known.name);
        let record = match client
            .rates_for_utility(&UtilityRateQuery::new(&known.name))
            .await
        {
            Ok(items) if !items.is_empty() => {
                record_from_direct_lookup(&items[0], known, state, reference, today)
            }
            Ok(_) => synthesize_record(known, state, reference, today),
            Err(e) => {
                tracing::warn!("direct lookup for {} failed: {}", known.name, e);
                synthesize_record(known, state, reference, today)
            }
        };
        // One record per identity even if a direct lookup collides with a
        // geographic hit.
        match records.iter().position(|r| r.utility_id == record.utility_id) {
            Some(slot) => records[slot] = record,
            None => records.push(record),
        }
    }

    records.sort_by(|a, b| b.customer_count.cmp(&a.customer_count));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::UtilityType;
    use crate::reference::NetMeteringType;
    use usurdb_api::types::RateTier;

    fn item(eiaid: Option<i64>, utility: &str, startdate: i64, rate: f64) -> RawRateItem {
        RawRateItem {
            eiaid,
            utility: Some(utility.to_string()),
            startdate: Some(startdate),
            energyratestructure: vec![vec![RateTier {
                rate: Some(rate),
                ..RateTier::default()
            }]],
            ..RawRateItem::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    #[test]
    fn newer_start_date_wins() {
        let merged = merge_candidates(vec![
            item(Some(1), "Util A", 100, 0.10),
            item(Some(1), "Util A", 200, 0.12),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].startdate, Some(200));
    }

    #[test]
    fn equal_start_dates_keep_first_seen() {
        let merged = merge_candidates(vec![
            item(Some(1), "First", 100, 0.10),
            item(Some(1), "Second", 100, 0.12),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].utility.as_deref(), Some("First"));
    }

    #[test]
    fn older_item_is_discarded() {
        let merged = merge_candidates(vec![
            item(Some(1), "Newer", 200, 0.12),
            item(Some(1), "Older", 100, 0.10),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].utility.as_deref(), Some("Newer"));
    }

    #[test]
    fn merge_preserves_first_appearance_order() {
        let merged = merge_candidates(vec![
            item(Some(3), "C", 50, 0.10),
            item(Some(1), "A", 50, 0.10),
            item(Some(3), "C newer", 90, 0.11),
            item(Some(2), "B", 50, 0.10),
        ]);
        let ids: Vec<_> = merged.iter().map(|i| i.eiaid.unwrap()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(merged[0].utility.as_deref(), Some("C newer"));
    }

    #[test]
    fn items_without_eiaid_are_dropped() {
        let merged = merge_candidates(vec![
            item(None, "No id", 100, 0.10),
            item(Some(7), "Has id", 100, 0.10),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].eiaid, Some(7));
    }

    #[test]
    fn customer_count_exact_then_substring() {
        let known = vec![
            KnownUtility {
                name: "Delmarva Power".to_string(),
                customer_count: 310000,
            },
            KnownUtility {
                name: "Georgia Power Co".to_string(),
                customer_count: 2700000,
            },
        ];
        assert_eq!(resolve_customer_count("Delmarva Power", &known), 310000);
        // API name is longer than the known name
        assert_eq!(
            resolve_customer_count("Delmarva Power & Light Co", &known),
            310000
        );
        // Known name is longer than the API name
        assert_eq!(resolve_customer_count("Georgia Power", &known), 2700000);
        assert_eq!(resolve_customer_count("Mystery Electric", &known), 0);
    }

    #[test]
    fn implausible_rate_replaced_by_state_average() {
        let reference = ReferenceData::builtin();
        let mut raw = item(Some(1), "Delmarva Power", 100, 5.0);
        let record = record_from_item(&raw, "DE", &reference, today()).unwrap();
        assert_eq!(record.residential_avg_rate, 0.1432);

        raw.energyratestructure[0][0].rate = Some(0.001);
        let record = record_from_item(&raw, "DE", &reference, today()).unwrap();
        assert_eq!(record.residential_avg_rate, 0.1432);
    }

    #[test]
    fn missing_rate_replaced_by_state_average() {
        let raw = RawRateItem {
            eiaid: Some(1),
            utility: Some("Delmarva Power".to_string()),
            ..RawRateItem::default()
        };
        let reference = ReferenceData::builtin();
        let record = record_from_item(&raw, "DE", &reference, today()).unwrap();
        assert_eq!(record.residential_avg_rate, 0.1432);
    }

    #[test]
    fn plausible_rate_survives() {
        let reference = ReferenceData::builtin();
        let raw = item(Some(1), "Delmarva Power", 100, 0.1102);
        let record = record_from_item(&raw, "DE", &reference, today()).unwrap();
        assert_eq!(record.residential_avg_rate, 0.1102);
    }

    #[test]
    fn record_carries_state_net_metering_policy() {
        let reference = ReferenceData::builtin();
        let raw = item(Some(1), "Georgia Power Co", 100, 0.12);
        let record = record_from_item(&raw, "GA", &reference, today()).unwrap();
        assert!(!record.has_net_metering);
        assert_eq!(record.net_metering_type, NetMeteringType::None);
        assert_eq!(record.customer_count, 2700000);
    }

    #[test]
    fn synthesized_record_uses_reference_defaults() {
        let reference = ReferenceData::builtin();
        let known = KnownUtility {
            name: "Delmarva Power".to_string(),
            customer_count: 310000,
        };
        let record = synthesize_record(&known, "DE", &reference, today());
        assert_eq!(record.utility_name, "Delmarva Power");
        assert_eq!(record.state, "DE");
        assert_eq!(record.utility_type, UtilityType::Iou);
        assert_eq!(record.customer_count, 310000);
        assert_eq!(record.residential_avg_rate, 0.1432);
        assert_eq!(record.rate_structure, RateStructure::Tiered);
        assert!(!record.tou_available);
        assert!(!record.demand_charges);
        assert!(record.has_net_metering);
        assert!(record.utility_id.starts_with("name:"));
    }

    #[test]
    fn direct_lookup_record_prefers_eiaid() {
        let reference = ReferenceData::builtin();
        let known = KnownUtility {
            name: "Delmarva Power".to_string(),
            customer_count: 310000,
        };
        let raw = item(Some(9026), "Delmarva Power Co", 100, 0.1054);
        let record = record_from_direct_lookup(&raw, &known, "DE", &reference, today());
        assert_eq!(record.utility_id, "9026");
        // Name and count come from the reference entry, not the item.
        assert_eq!(record.utility_name, "Delmarva Power");
        assert_eq!(record.customer_count, 310000);
        assert_eq!(record.residential_avg_rate, 0.1054);

        let no_id = item(None, "Delmarva Power Co", 100, 0.1054);
        let record = record_from_direct_lookup(&no_id, &known, "DE", &reference, today());
        assert!(record.utility_id.starts_with("name:"));
    }
}
