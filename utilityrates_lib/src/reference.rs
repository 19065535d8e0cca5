//! Static reference tables: per-state query coordinates, known major-utility
//! customer counts, EIA state-average rates, and net-metering policy.
//!
//! All of it is carried by [`ReferenceData`], an immutable configuration
//! object handed into the pipeline at startup. Tests substitute their own
//! tables through [`ReferenceData::new`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Fallback when a state has no entry in the average-rate table.
const DEFAULT_AVG_RATE: f64 = 0.13;

/// One geographic query point: a population center the pipeline searches
/// around to pick up the utilities serving it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoQueryPoint {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

/// A major utility known from EIA-861 data, with its residential customer
/// count. Count 0 means "known to exist, size unknown".
#[derive(Debug, Clone, PartialEq)]
pub struct KnownUtility {
    pub name: String,
    pub customer_count: u64,
}

/// Compensation policy for customer-exported energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetMeteringType {
    /// Full retail-rate net metering.
    #[serde(rename = "NEM")]
    Nem,
    /// Exports credited below retail.
    #[serde(rename = "net_billing")]
    NetBilling,
    /// Exports credited at the utility's avoided cost.
    #[serde(rename = "avoided_cost")]
    AvoidedCost,
    /// No statewide compensation mandate.
    #[serde(rename = "none")]
    None,
}

/// State-level net-metering policy, embedded verbatim in output files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetMeteringPolicy {
    pub has_net_metering: bool,
    pub net_metering_type: NetMeteringType,
    pub export_rate: Option<f64>,
}

impl Default for NetMeteringPolicy {
    fn default() -> Self {
        Self {
            has_net_metering: false,
            net_metering_type: NetMeteringType::None,
            export_rate: None,
        }
    }
}

/// Immutable reference tables keyed by 2-letter state code.
pub struct ReferenceData {
    query_points: HashMap<String, Vec<GeoQueryPoint>>,
    known_utilities: HashMap<String, Vec<KnownUtility>>,
    state_avg_rates: HashMap<String, f64>,
    net_metering: HashMap<String, NetMeteringPolicy>,
}

impl ReferenceData {
    /// Builds reference data from explicit tables. Tests use this to run the
    /// pipeline against a small fixture instead of the national dataset.
    pub fn new(
        query_points: HashMap<String, Vec<GeoQueryPoint>>,
        known_utilities: HashMap<String, Vec<KnownUtility>>,
        state_avg_rates: HashMap<String, f64>,
        net_metering: HashMap<String, NetMeteringPolicy>,
    ) -> Self {
        Self {
            query_points,
            known_utilities,
            state_avg_rates,
            net_metering,
        }
    }

    /// All states with query points, sorted. This is the processing order.
    pub fn states(&self) -> Vec<String> {
        let mut states: Vec<String> = self.query_points.keys().cloned().collect();
        states.sort();
        states
    }

    /// Geographic query points for a state.
    pub fn points_for(&self, state: &str) -> &[GeoQueryPoint] {
        self.query_points.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Known major utilities for a state.
    pub fn known_for(&self, state: &str) -> &[KnownUtility] {
        self.known_utilities
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// EIA average residential rate for a state, if tabulated.
    pub fn avg_rate(&self, state: &str) -> Option<f64> {
        self.state_avg_rates.get(state).copied()
    }

    /// EIA average residential rate for a state, with the national-ballpark
    /// fallback used when a rate must be substituted.
    pub fn avg_rate_for(&self, state: &str) -> f64 {
        self.avg_rate(state).unwrap_or(DEFAULT_AVG_RATE)
    }

    /// Net-metering policy for a state. Unknown states get the no-policy default.
    pub fn net_metering_for(&self, state: &str) -> NetMeteringPolicy {
        self.net_metering.get(state).cloned().unwrap_or_default()
    }

    /// Unweighted mean of the tabulated state average rates.
    pub fn national_avg_rate(&self) -> f64 {
        if self.state_avg_rates.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.state_avg_rates.values().sum();
        sum / self.state_avg_rates.len() as f64
    }

    /// The built-in national tables: 2-4 population centers per state,
    /// EIA-861 customer counts, EIA Electric Power Monthly average rates
    /// (2025, residential), and net-metering policy status (2026).
    pub fn builtin() -> Self {
        use NetMeteringType::{AvoidedCost, Nem, NetBilling};

        let points_raw: &[(&str, &[(&str, f64, f64)])] = &[
            ("AL", &[("Birmingham", 33.52, -86.81), ("Mobile", 30.69, -88.04), ("Huntsville", 34.73, -86.59)]),
            ("AK", &[("Anchorage", 61.22, -149.90), ("Fairbanks", 64.84, -147.72), ("Juneau", 58.30, -134.42)]),
            ("AZ", &[("Phoenix", 33.45, -112.07), ("Tucson", 32.22, -110.97), ("Flagstaff", 35.20, -111.65)]),
            ("AR", &[("Little Rock", 34.75, -92.29), ("Fayetteville", 36.06, -94.16), ("Jonesboro", 35.84, -90.70)]),
            ("CA", &[("Los Angeles", 34.05, -118.24), ("San Francisco", 37.77, -122.42), ("Sacramento", 38.58, -121.49), ("San Diego", 32.72, -117.16)]),
            ("CO", &[("Denver", 39.74, -104.99), ("Colorado Springs", 38.83, -104.82), ("Grand Junction", 39.06, -108.55)]),
            ("CT", &[("Hartford", 41.76, -72.68), ("New Haven", 41.31, -72.92), ("Stamford", 41.05, -73.54)]),
            ("DE", &[("Wilmington", 39.74, -75.55), ("Dover", 39.16, -75.52)]),
            ("FL", &[("Miami", 25.76, -80.19), ("Orlando", 28.54, -81.38), ("Tampa", 27.95, -82.46), ("Jacksonville", 30.33, -81.66)]),
            ("GA", &[("Atlanta", 33.75, -84.39), ("Savannah", 32.08, -81.09), ("Augusta", 33.47, -81.97)]),
            ("HI", &[("Honolulu", 21.31, -157.86), ("Hilo", 19.72, -155.08), ("Kahului", 20.89, -156.47)]),
            ("ID", &[("Boise", 43.62, -116.20), ("Idaho Falls", 43.47, -112.03), ("Coeur d'Alene", 47.68, -116.78)]),
            ("IL", &[("Chicago", 41.88, -87.63), ("Springfield", 39.78, -89.65), ("Rockford", 42.27, -89.09)]),
            ("IN", &[("Indianapolis", 39.77, -86.16), ("Fort Wayne", 41.08, -85.14), ("Evansville", 37.97, -87.56)]),
            ("IA", &[("Des Moines", 41.59, -93.62), ("Cedar Rapids", 41.98, -91.66), ("Davenport", 41.52, -90.58)]),
            ("KS", &[("Wichita", 37.69, -97.34), ("Topeka", 39.05, -95.68), ("Kansas City", 39.11, -94.63)]),
            ("KY", &[("Louisville", 38.25, -85.76), ("Lexington", 38.04, -84.50), ("Bowling Green", 36.99, -86.44)]),
            ("LA", &[("New Orleans", 29.95, -90.07), ("Baton Rouge", 30.45, -91.19), ("Shreveport", 32.53, -93.75)]),
            ("ME", &[("Portland", 43.66, -70.26), ("Bangor", 44.80, -68.77), ("Augusta", 44.31, -69.78)]),
            ("MD", &[("Baltimore", 39.29, -76.61), ("Rockville", 39.08, -77.15), ("Annapolis", 38.98, -76.49)]),
            ("MA", &[("Boston", 42.36, -71.06), ("Worcester", 42.26, -71.80), ("Springfield", 42.10, -72.59)]),
            ("MI", &[("Detroit", 42.33, -83.05), ("Grand Rapids", 42.96, -85.66), ("Traverse City", 44.76, -85.62)]),
            ("MN", &[("Minneapolis", 44.98, -93.27), ("Rochester", 44.02, -92.47), ("Duluth", 46.79, -92.10)]),
            ("MS", &[("Jackson", 32.30, -90.18), ("Gulfport", 30.37, -89.09), ("Tupelo", 34.26, -88.70)]),
            ("MO", &[("Kansas City", 39.10, -94.58), ("St. Louis", 38.63, -90.20), ("Springfield", 37.22, -93.29)]),
            ("MT", &[("Billings", 45.78, -108.50), ("Missoula", 46.87, -114.00), ("Great Falls", 47.51, -111.30)]),
            ("NE", &[("Omaha", 41.26, -95.94), ("Lincoln", 40.81, -96.70), ("Grand Island", 40.92, -98.34)]),
            ("NV", &[("Las Vegas", 36.17, -115.14), ("Reno", 39.53, -119.81), ("Carson City", 39.16, -119.77)]),
            ("NH", &[("Manchester", 42.99, -71.46), ("Concord", 43.21, -71.54), ("Nashua", 42.77, -71.47)]),
            ("NJ", &[("Newark", 40.74, -74.17), ("Trenton", 40.22, -74.76), ("Atlantic City", 39.36, -74.42)]),
            ("NM", &[("Albuquerque", 35.08, -106.65), ("Las Cruces", 32.35, -106.76), ("Santa Fe", 35.69, -105.94)]),
            ("NY", &[("New York", 40.71, -74.01), ("Buffalo", 42.89, -78.88), ("Albany", 42.65, -73.75), ("Syracuse", 43.05, -76.15)]),
            ("NC", &[("Charlotte", 35.23, -80.84), ("Raleigh", 35.78, -78.64), ("Asheville", 35.60, -82.55)]),
            ("ND", &[("Fargo", 46.88, -96.79), ("Bismarck", 46.81, -100.78), ("Grand Forks", 47.93, -97.03)]),
            ("OH", &[("Columbus", 39.96, -83.00), ("Cleveland", 41.50, -81.69), ("Cincinnati", 39.10, -84.51)]),
            ("OK", &[("Oklahoma City", 35.47, -97.52), ("Tulsa", 36.15, -95.99), ("Lawton", 34.60, -98.39)]),
            ("OR", &[("Portland", 45.52, -122.68), ("Eugene", 44.05, -123.09), ("Bend", 44.06, -121.31)]),
            ("PA", &[("Philadelphia", 39.95, -75.17), ("Pittsburgh", 40.44, -80.00), ("Harrisburg", 40.27, -76.88)]),
            ("RI", &[("Providence", 41.82, -71.41), ("Warwick", 41.70, -71.42)]),
            ("SC", &[("Charleston", 32.78, -79.93), ("Columbia", 34.00, -81.03), ("Greenville", 34.85, -82.40)]),
            ("SD", &[("Sioux Falls", 43.55, -96.73), ("Rapid City", 44.08, -103.23), ("Aberdeen", 45.46, -98.49)]),
            ("TN", &[("Nashville", 36.16, -86.78), ("Memphis", 35.15, -90.05), ("Knoxville", 35.96, -83.92)]),
            ("TX", &[("Houston", 29.76, -95.37), ("Dallas", 32.78, -96.80), ("Austin", 30.27, -97.74), ("San Antonio", 29.42, -98.49)]),
            ("UT", &[("Salt Lake City", 40.76, -111.89), ("Provo", 40.23, -111.66), ("St. George", 37.10, -113.58)]),
            ("VT", &[("Burlington", 44.48, -73.21), ("Montpelier", 44.26, -72.58), ("Rutland", 43.61, -72.97)]),
            ("VA", &[("Richmond", 37.54, -77.44), ("Virginia Beach", 36.85, -75.98), ("Roanoke", 37.27, -79.94)]),
            ("WA", &[("Seattle", 47.61, -122.33), ("Spokane", 47.66, -117.43), ("Tacoma", 47.25, -122.44)]),
            ("WV", &[("Charleston", 38.35, -81.63), ("Huntington", 38.42, -82.45), ("Morgantown", 39.63, -79.96)]),
            ("WI", &[("Milwaukee", 43.04, -87.91), ("Madison", 43.07, -89.40), ("Green Bay", 44.51, -88.02)]),
            ("WY", &[("Cheyenne", 41.14, -104.82), ("Casper", 42.87, -106.31), ("Laramie", 41.31, -105.59)]),
        ];

        let known_raw: &[(&str, &[(&str, u64)])] = &[
            ("AL", &[("Alabama Power Co", 1500000), ("Tennessee Valley Authority", 0)]),
            ("AK", &[("Chugach Electric Assn Inc", 92000), ("Golden Valley Elec Assn Inc", 45000), ("Matanuska Electric Assn Inc", 60000)]),
            ("AZ", &[("Arizona Public Service Co", 1300000), ("Tucson Electric Power Co", 430000), ("Salt River Project", 1100000)]),
            ("AR", &[("Entergy Arkansas LLC", 720000), ("Southwestern Electric Power Co", 110000), ("Empire District Electric Co", 50000)]),
            ("CA", &[("Pacific Gas & Electric Co", 5500000), ("Southern California Edison Co", 5100000), ("San Diego Gas & Electric Co", 1500000), ("Los Angeles Dept of Water & Power", 1500000), ("Sacramento Municipal Util Dist", 650000)]),
            ("CO", &[("Public Service Co of Colorado", 1500000), ("Colorado Springs Utilities", 240000), ("Black Hills Colorado Electric", 100000)]),
            ("CT", &[("Eversource Energy", 1300000), ("United Illuminating Co", 340000)]),
            ("DE", &[("Delmarva Power", 310000)]),
            ("FL", &[("Florida Power & Light Co", 5600000), ("Duke Energy Florida LLC", 1900000), ("Tampa Electric Co", 800000), ("JEA", 490000), ("Gulf Power Co", 480000)]),
            ("GA", &[("Georgia Power Co", 2700000), ("Cobb EMC", 200000), ("Jackson EMC", 230000)]),
            ("HI", &[("Hawaiian Electric Co Inc", 470000), ("Maui Electric Co Ltd", 75000), ("Hawaii Electric Light Co Inc", 85000)]),
            ("ID", &[("Idaho Power Co", 600000), ("Rocky Mountain Power", 90000), ("Avista Corp", 50000)]),
            ("IL", &[("Commonwealth Edison Co", 4000000), ("Ameren Illinois Co", 1200000), ("MidAmerican Energy Co", 150000)]),
            ("IN", &[("Indiana Michigan Power Co", 470000), ("Duke Energy Indiana LLC", 850000), ("Indianapolis Power & Light Co", 500000), ("Indiana & Michigan Electric", 200000)]),
            ("IA", &[("MidAmerican Energy Co", 780000), ("Alliant Energy", 500000), ("Interstate Power and Light Co", 230000)]),
            ("KS", &[("Evergy Kansas Central", 700000), ("Evergy Kansas Metro", 330000), ("Empire District Electric Co", 50000)]),
            ("KY", &[("Kentucky Utilities Co", 540000), ("Louisville Gas & Electric Co", 410000), ("Duke Energy Kentucky", 150000), ("Kentucky Power Co", 165000)]),
            ("LA", &[("Entergy Louisiana LLC", 1100000), ("Cleco Power LLC", 300000), ("Southwestern Electric Power Co", 150000)]),
            ("ME", &[("Central Maine Power Co", 640000), ("Versant Power", 160000)]),
            ("MD", &[("Baltimore Gas & Electric Co", 1300000), ("Potomac Electric Power Co", 600000), ("Delmarva Power", 200000)]),
            ("MA", &[("Eversource Energy", 1500000), ("National Grid", 1300000), ("Unitil Energy Systems", 110000)]),
            ("MI", &[("DTE Electric Co", 2200000), ("Consumers Energy Co", 1800000), ("Indiana Michigan Power Co", 80000)]),
            ("MN", &[("Northern States Power Co", 1500000), ("Minnesota Power", 150000), ("Otter Tail Power Co", 65000)]),
            ("MS", &[("Entergy Mississippi LLC", 460000), ("Mississippi Power Co", 190000), ("Tennessee Valley Authority", 0)]),
            ("MO", &[("Ameren Missouri", 1200000), ("Evergy Missouri West", 300000), ("Empire District Electric Co", 170000)]),
            ("MT", &[("NorthWestern Corp", 380000), ("Flathead Electric Coop", 60000)]),
            ("NE", &[("Omaha Public Power District", 390000), ("Nebraska Public Power District", 250000), ("Lincoln Electric System", 140000)]),
            ("NV", &[("NV Energy (Sierra Pacific)", 400000), ("NV Energy (Nevada Power)", 1000000)]),
            ("NH", &[("Eversource Energy", 520000), ("Liberty Utilities", 45000), ("Unitil Energy Systems", 40000)]),
            ("NJ", &[("Public Service Elec & Gas Co", 2300000), ("Jersey Central Power & Light", 1100000), ("Atlantic City Electric Co", 560000)]),
            ("NM", &[("Public Service Co of New Mexico", 550000), ("El Paso Electric Co", 110000), ("Southwestern Public Service Co", 60000)]),
            ("NY", &[("Consolidated Edison Co", 3400000), ("National Grid", 1700000), ("New York State Elec & Gas Corp", 900000), ("Central Hudson Gas & Elec Corp", 310000), ("Rochester Gas & Electric Corp", 380000), ("Long Island Power Authority", 1100000)]),
            ("NC", &[("Duke Energy Carolinas LLC", 2700000), ("Duke Energy Progress LLC", 1700000), ("Dominion Energy North Carolina", 130000)]),
            ("ND", &[("Montana-Dakota Utilities Co", 70000), ("Otter Tail Power Co", 35000), ("Xcel Energy", 40000)]),
            ("OH", &[("Ohio Edison Co", 1050000), ("Cleveland Elec Illuminating Co", 750000), ("Ohio Power Co", 1500000), ("Duke Energy Ohio Inc", 720000), ("Dayton Power & Light Co", 530000)]),
            ("OK", &[("Oklahoma Gas & Electric Co", 880000), ("Public Service Co of Oklahoma", 560000), ("Empire District Electric Co", 40000)]),
            ("OR", &[("Portland General Electric Co", 900000), ("PacifiCorp", 600000), ("Idaho Power Co", 30000)]),
            ("PA", &[("PECO Energy Co", 1600000), ("PPL Electric Utilities Corp", 1400000), ("Duquesne Light Co", 600000), ("West Penn Power Co", 720000), ("Metropolitan Edison Co", 560000)]),
            ("RI", &[("Rhode Island Energy", 500000)]),
            ("SC", &[("Duke Energy Carolinas LLC", 800000), ("Duke Energy Progress LLC", 500000), ("South Carolina Electric & Gas", 730000)]),
            ("SD", &[("Northwestern Energy", 75000), ("Xcel Energy", 50000), ("Otter Tail Power Co", 20000)]),
            ("TN", &[("Tennessee Valley Authority", 0), ("Nashville Electric Service", 400000), ("Memphis Light Gas & Water", 450000), ("Knoxville Utilities Board", 200000)]),
            ("TX", &[("Oncor Electric Delivery Co", 3700000), ("CenterPoint Energy", 2600000), ("AEP Texas", 1100000), ("Texas-New Mexico Power Co", 250000), ("Austin Energy", 500000), ("CPS Energy", 870000)]),
            ("UT", &[("Rocky Mountain Power", 950000), ("City of St George", 35000)]),
            ("VT", &[("Green Mountain Power Corp", 270000), ("Vermont Electric Coop", 33000)]),
            ("VA", &[("Dominion Energy Virginia", 2700000), ("Appalachian Power Co", 530000), ("Virginia Electric & Power Co", 0)]),
            ("WA", &[("Puget Sound Energy Inc", 1200000), ("Avista Corp", 260000), ("Seattle City Light", 450000), ("Tacoma Power", 190000), ("Snohomish County PUD No 1", 350000)]),
            ("WV", &[("Appalachian Power Co", 490000), ("Monongahela Power Co", 390000), ("Potomac Edison Co", 125000)]),
            ("WI", &[("Wisconsin Electric Power Co", 1100000), ("Wisconsin Public Service Corp", 460000), ("Alliant Energy", 480000), ("Madison Gas & Electric Co", 160000)]),
            ("WY", &[("Rocky Mountain Power", 135000), ("Cheyenne Light Fuel & Power Co", 42000), ("Black Hills Power Inc", 25000)]),
        ];

        let rates_raw: &[(&str, f64)] = &[
            ("AL", 0.1398), ("AK", 0.2350), ("AZ", 0.1305), ("AR", 0.1187), ("CA", 0.2737),
            ("CO", 0.1412), ("CT", 0.2663), ("DE", 0.1432), ("FL", 0.1398), ("GA", 0.1323),
            ("HI", 0.3878), ("ID", 0.1060), ("IL", 0.1547), ("IN", 0.1362), ("IA", 0.1397),
            ("KS", 0.1390), ("KY", 0.1181), ("LA", 0.1133), ("ME", 0.2245), ("MD", 0.1566),
            ("MA", 0.2837), ("MI", 0.1783), ("MN", 0.1407), ("MS", 0.1267), ("MO", 0.1262),
            ("MT", 0.1194), ("NE", 0.1171), ("NV", 0.1285), ("NH", 0.2361), ("NJ", 0.1792),
            ("NM", 0.1382), ("NY", 0.2226), ("NC", 0.1218), ("ND", 0.1142), ("OH", 0.1413),
            ("OK", 0.1153), ("OR", 0.1199), ("PA", 0.1622), ("RI", 0.2678), ("SC", 0.1315),
            ("SD", 0.1275), ("TN", 0.1177), ("TX", 0.1356), ("UT", 0.1076), ("VT", 0.2074),
            ("VA", 0.1297), ("WA", 0.1047), ("WV", 0.1243), ("WI", 0.1574), ("WY", 0.1109),
        ];

        let nm_raw: &[(&str, bool, NetMeteringType, Option<f64>)] = &[
            ("AL", false, AvoidedCost, None),
            ("AK", true, Nem, None),
            ("AZ", true, NetBilling, None),
            ("AR", true, Nem, None),
            ("CA", true, NetBilling, Some(0.05)),
            ("CO", true, Nem, None),
            ("CT", true, Nem, None),
            ("DE", true, Nem, None),
            ("FL", true, Nem, None),
            ("GA", false, NetMeteringType::None, None),
            ("HI", true, NetBilling, None),
            ("ID", true, NetBilling, None),
            ("IL", true, Nem, None),
            ("IN", true, NetBilling, None),
            ("IA", true, Nem, None),
            ("KS", true, Nem, None),
            ("KY", true, Nem, None),
            ("LA", true, NetBilling, None),
            ("ME", true, NetBilling, None),
            ("MD", true, Nem, None),
            ("MA", true, Nem, None),
            ("MI", true, NetBilling, None),
            ("MN", true, Nem, None),
            ("MS", false, AvoidedCost, None),
            ("MO", true, Nem, None),
            ("MT", true, Nem, None),
            ("NE", true, Nem, None),
            ("NV", true, NetBilling, None),
            ("NH", true, Nem, None),
            ("NJ", true, Nem, None),
            ("NM", true, Nem, None),
            ("NY", true, NetBilling, None),
            ("NC", true, Nem, None),
            ("ND", true, Nem, None),
            ("OH", true, Nem, None),
            ("OK", true, Nem, None),
            ("OR", true, Nem, None),
            ("PA", true, Nem, None),
            ("RI", true, Nem, None),
            ("SC", true, NetBilling, None),
            ("SD", true, Nem, None),
            ("TN", false, AvoidedCost, None),
            ("TX", false, NetMeteringType::None, None),
            ("UT", true, NetBilling, None),
            ("VT", true, Nem, None),
            ("VA", true, Nem, None),
            ("WA", true, Nem, None),
            ("WV", true, Nem, None),
            ("WI", true, Nem, None),
            ("WY", true, Nem, None),
        ];

        let mut query_points = HashMap::new();
        for (state, pts) in points_raw {
            query_points.insert(
                (*state).to_string(),
                pts.iter()
                    .map(|(label, lat, lon)| GeoQueryPoint {
                        label: (*label).to_string(),
                        lat: *lat,
                        lon: *lon,
                    })
                    .collect(),
            );
        }

        let mut known_utilities = HashMap::new();
        for (state, utils) in known_raw {
            known_utilities.insert(
                (*state).to_string(),
                utils
                    .iter()
                    .map(|(name, customer_count)| KnownUtility {
                        name: (*name).to_string(),
                        customer_count: *customer_count,
                    })
                    .collect(),
            );
        }

        let mut state_avg_rates = HashMap::new();
        for (state, rate) in rates_raw {
            state_avg_rates.insert((*state).to_string(), *rate);
        }

        let mut net_metering = HashMap::new();
        for (state, has, ty, export) in nm_raw {
            net_metering.insert(
                (*state).to_string(),
                NetMeteringPolicy {
                    has_net_metering: *has,
                    net_metering_type: *ty,
                    export_rate: *export,
                },
            );
        }

        Self::new(query_points, known_utilities, state_avg_rates, net_metering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_all_fifty_states() {
        let reference = ReferenceData::builtin();
        let states = reference.states();
        assert_eq!(states.len(), 50);
        // Sorted processing order
        assert_eq!(states.first().map(String::as_str), Some("AK"));
        assert_eq!(states.last().map(String::as_str), Some("WY"));
        for state in &states {
            assert!(!reference.points_for(state).is_empty());
            assert!(reference.avg_rate(state).is_some());
        }
    }

    #[test]
    fn delaware_tables() {
        let reference = ReferenceData::builtin();
        assert_eq!(reference.points_for("DE").len(), 2);
        assert_eq!(reference.avg_rate("DE"), Some(0.1432));

        let known = reference.known_for("DE");
        assert_eq!(known.len(), 1);
        assert_eq!(known[0].name, "Delmarva Power");
        assert_eq!(known[0].customer_count, 310000);
    }

    #[test]
    fn california_export_rate() {
        let reference = ReferenceData::builtin();
        let policy = reference.net_metering_for("CA");
        assert!(policy.has_net_metering);
        assert_eq!(policy.net_metering_type, NetMeteringType::NetBilling);
        assert_eq!(policy.export_rate, Some(0.05));
    }

    #[test]
    fn unknown_state_falls_back() {
        let reference = ReferenceData::builtin();
        assert!(reference.points_for("PR").is_empty());
        assert_eq!(reference.avg_rate("PR"), None);
        assert_eq!(reference.avg_rate_for("PR"), 0.13);
        assert_eq!(reference.net_metering_for("PR"), NetMeteringPolicy::default());
    }

    #[test]
    fn net_metering_policy_serializes_with_contract_names() {
        let policy = NetMeteringPolicy {
            has_net_metering: true,
            net_metering_type: NetMeteringType::NetBilling,
            export_rate: Some(0.05),
        };
        let value = serde_json::to_value(&policy).unwrap();
        assert_eq!(value["has_net_metering"], true);
        assert_eq!(value["net_metering_type"], "net_billing");
        assert_eq!(value["export_rate"], 0.05);
    }
}
