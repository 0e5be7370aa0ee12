use std::time::Duration;

/// Host serving the historical CSV download endpoint.
pub const DOWNLOAD_BASE: &str = "https://query1.finance.yahoo.com";
/// Quote pages; visiting one seeds the session cookies.
pub const QUOTE_BASE: &str = "https://finance.yahoo.com/quote";
/// Returns the crumb bound to the current cookies as plain text.
pub const CRUMB_URL: &str = "https://query2.finance.yahoo.com/v1/test/getcrumb";

pub const USER_AGENT: &str = concat!("price-projector/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_HORIZON_MONTHS: u32 = 240;
pub const DEFAULT_TRIALS: usize = 1000;
pub const DEFAULT_HISTORY_YEARS: u32 = 5;
