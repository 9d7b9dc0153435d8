use serde::{Deserialize, Serialize};

/// Seconds east of UTC for the queried city.
pub type TimezoneOffset = i64;

/// Time-ascending samples exactly as the remote source returned them.
pub type ForecastList = Vec<ForecastEntry>;

/// One timestamped forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Unix seconds, UTC.
    pub timestamp: i64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Short icon code such as `10d`; `None` when the sample carried none.
    pub condition_code: Option<String>,
    pub description: String,
}

/// What a source hands back once the transport and body decoding succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastReply {
    /// The embedded status signalled success.
    Forecast {
        entries: ForecastList,
        timezone_offset: TimezoneOffset,
    },
    /// The embedded status signalled failure.
    Rejected { message: Option<String> },
}
