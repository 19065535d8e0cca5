//! Shared query infrastructure: the [`Query`] trait, [`QueryCommon`] fields,
//! and the enums sent as USURDB query-parameter values.

use std::str::FromStr;

use url::Url;

/// Trait implemented by both query builders. Provides URL serialization and
/// shared builder methods for sector, approval, detail level, and result limit.
pub trait Query {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Sets the customer sector to fetch rates for.
    fn with_sector(mut self, sector: Sector) -> Self
    where
        Self: Sized,
    {
        self.get_common().sector = sector;
        self
    }

    /// Restricts results to utility-approved rates (the default) or not.
    fn with_approved(mut self, approved: bool) -> Self
    where
        Self: Sized,
    {
        self.get_common().approved = approved;
        self
    }

    /// Sets the response detail level.
    fn with_detail(mut self, detail: DetailLevel) -> Self
    where
        Self: Sized,
    {
        self.get_common().detail = detail;
        self
    }

    /// Sets the maximum number of rate entries returned.
    fn with_limit(mut self, limit: i64) -> Self
    where
        Self: Sized,
    {
        self.get_common().limit = limit;
        self
    }
}

/// Customer sector a rate schedule applies to.
#[derive(Clone, Copy, Default)]
pub enum Sector {
    /// Residential rates. This is the default.
    #[default]
    Residential,
    Commercial,
    Industrial,
    Lighting,
}
impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Sector::Residential => "Residential",
                Sector::Commercial => "Commercial",
                Sector::Industrial => "Industrial",
                Sector::Lighting => "Lighting",
            }
        )?;
        Ok(())
    }
}

/// Response detail level. `Full` includes the nested rate-structure matrices.
#[derive(Clone, Copy, Default)]
pub enum DetailLevel {
    /// Full rate structures (tier matrices, schedules, demand fields).
    #[default]
    Full,
    /// Summary fields only.
    Minimal,
}
impl std::fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DetailLevel::Full => "full",
                DetailLevel::Minimal => "minimal",
            }
        )?;
        Ok(())
    }
}

/// Sort order for API results.
#[derive(Clone, Copy, Default)]
pub enum SortDirection {
    /// Ascending order (oldest first).
    Asc,
    /// Descending order (newest first). This is the default.
    #[default]
    Desc,
}
impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            }
        )?;
        Ok(())
    }
}
impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

/// Fields shared by both query types: sector, approval, detail, and limit.
#[derive(Clone, Copy)]
pub struct QueryCommon {
    /// Customer sector. Defaults to residential.
    pub sector: Sector,
    /// Only utility-approved rates. Defaults to true.
    pub approved: bool,
    /// Response detail level. Defaults to full.
    pub detail: DetailLevel,
    /// Maximum number of rate entries returned.
    pub limit: i64,
}

impl Default for QueryCommon {
    fn default() -> QueryCommon {
        QueryCommon {
            sector: Sector::Residential,
            approved: true,
            detail: DetailLevel::Full,
            limit: 500,
        }
    }
}

impl QueryCommon {
    /// Appends the common parameters to the URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("sector", self.sector.to_string().as_str())
            .append_pair("approved", if self.approved { "true" } else { "false" })
            .append_pair("detail", self.detail.to_string().as_str())
            .append_pair("limit", &self.limit.to_string());
        url
    }
}
