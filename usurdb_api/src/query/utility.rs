use std::str::FromStr;

use url::Url;

use super::common::{Query, QueryCommon, SortDirection};

/// Direct rate lookup by utility name via the `ratesforutility` parameter.
///
/// Defaults to the newest-first, 10-entry lookup the pipeline uses as a
/// second chance for known utilities the geographic sweep missed.
pub struct UtilityRateQuery {
    pub common: QueryCommon,
    pub utility_name: String,
    pub order_by: OrderBy,
    pub direction: SortDirection,
}

impl UtilityRateQuery {
    /// Creates a direct lookup for the given utility name.
    pub fn new(utility_name: &str) -> Self {
        Self {
            common: QueryCommon {
                limit: 10,
                ..QueryCommon::default()
            },
            utility_name: utility_name.to_string(),
            order_by: OrderBy::default(),
            direction: SortDirection::default(),
        }
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }
}

impl Query for UtilityRateQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("ratesforutility", self.utility_name.as_str());
        let mut url = self.common.add_to_url(&url);
        url.query_pairs_mut()
            .append_pair("orderby", self.order_by.to_string().as_str())
            .append_pair("direction", self.direction.to_string().as_str());
        url
    }
}

/// Sort field for direct lookups.
#[derive(Clone, Copy, Default)]
pub enum OrderBy {
    /// Effective-start date. This is the default.
    #[default]
    StartDate,
}
impl std::fmt::Display for OrderBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                OrderBy::StartDate => "startdate",
            }
        )?;
        Ok(())
    }
}
impl FromStr for OrderBy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "startdate" => Ok(OrderBy::StartDate),
            _ => Err(()),
        }
    }
}
