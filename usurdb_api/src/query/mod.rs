mod common;
pub use self::common::{DetailLevel, Query, Sector, SortDirection};

mod geo;
pub use self::geo::GeoRateQuery;

mod utility;
pub use self::utility::{OrderBy, UtilityRateQuery};
