use url::Url;

use super::common::{Query, QueryCommon};

/// Geographic rate search: all rates within `radius` miles of a point.
///
/// Defaults mirror the residential sweep the pipeline runs per query point:
/// approved default rates, USA, 100-mile radius, up to 30 companies,
/// full detail, 500 entries.
pub struct GeoRateQuery {
    pub common: QueryCommon,
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
    pub country: String,
    pub co_limit: i64,
    pub is_default: bool,
}

impl GeoRateQuery {
    /// Creates a geographic query centered on the given coordinates.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            common: QueryCommon::default(),
            lat,
            lon,
            radius: 100.0,
            country: "USA".to_string(),
            co_limit: 30,
            is_default: true,
        }
    }

    /// Sets the search radius in miles.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the maximum number of distinct companies returned.
    pub fn with_co_limit(mut self, co_limit: i64) -> Self {
        self.co_limit = co_limit;
        self
    }

    /// Restricts to each utility's default rate schedule (the default) or not.
    pub fn with_is_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
}

impl Query for GeoRateQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        url.query_pairs_mut()
            .append_pair("is_default", if self.is_default { "true" } else { "false" })
            .append_pair("country", self.country.as_str())
            .append_pair("lat", &self.lat.to_string())
            .append_pair("lon", &self.lon.to_string())
            .append_pair("radius", &self.radius.to_string())
            .append_pair("co_limit", &self.co_limit.to_string());
        url
    }
}
