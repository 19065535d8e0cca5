mod rate;
pub use self::rate::{RateTier, RatesResponse, RawRateItem};
