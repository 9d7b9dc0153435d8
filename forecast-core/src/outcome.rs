use serde::Serialize;
use tracing::warn;

use crate::{
    model::{ForecastEntry, ForecastList, ForecastReply, TimezoneOffset},
    provider::FetchError,
};

/// Shown when the service rejects a query without saying why.
pub const QUERY_FAILED_MESSAGE: &str = "Query failed";

/// Shown when the request never produced a usable response.
pub const NETWORK_FAILURE_MESSAGE: &str = "Network failure";

/// Result of the latest query, completed or in progress.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Cleared: no request, no error, no data.
    #[default]
    Empty,
    Loading,
    Error { message: String },
    Success {
        entries: ForecastList,
        timezone_offset: TimezoneOffset,
    },
}

impl QueryOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        QueryOutcome::Error { message: message.into() }
    }

    /// Classify a finished fetch.
    pub fn from_fetch(result: Result<ForecastReply, FetchError>) -> Self {
        match result {
            Ok(ForecastReply::Forecast { entries, timezone_offset }) => {
                QueryOutcome::Success { entries, timezone_offset }
            }
            Ok(ForecastReply::Rejected { message }) => {
                QueryOutcome::error(message.unwrap_or_else(|| QUERY_FAILED_MESSAGE.to_string()))
            }
            Err(err) => {
                warn!(error = %err, "forecast fetch failed");
                QueryOutcome::error(NETWORK_FAILURE_MESSAGE)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryOutcome::Loading)
    }

    /// Entries of a successful query; empty otherwise.
    pub fn entries(&self) -> &[ForecastEntry] {
        match self {
            QueryOutcome::Success { entries, .. } => entries,
            _ => &[],
        }
    }
}
