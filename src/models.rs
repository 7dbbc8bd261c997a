use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PENDING_STATUS: &str = "Pending...";
pub const PENDING_TIMESTAMP: &str = "-";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Last observed state of one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: String,
    pub timestamp: String,
}

impl StatusRecord {
    /// Placeholder stored for a target that has not been probed yet.
    pub fn pending() -> Self {
        Self {
            status: PENDING_STATUS.into(),
            timestamp: PENDING_TIMESTAMP.into(),
        }
    }

    pub fn from_outcome(outcome: &ProbeOutcome, at: DateTime<Utc>) -> Self {
        Self {
            status: outcome.to_string(),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PENDING_STATUS
    }
}

/// Coarse health bucket derived from a status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    Error,
    Pending,
}

impl StatusClass {
    /// Errors and 503s count as failures; any other text containing 200 is ok.
    pub fn of(status: &str) -> Self {
        if status.contains("Error") || status.contains("503") {
            Self::Error
        } else if status.contains("200") {
            Self::Ok
        } else {
            Self::Pending
        }
    }
}

/// Why an outbound request produced no response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeErrorKind {
    Timeout,
    ConnectionError,
    InvalidUrl,
    TooManyRedirects,
    RequestError,
}

impl ProbeErrorKind {
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::InvalidUrl
        } else if err.is_redirect() {
            Self::TooManyRedirects
        } else if err.is_connect() {
            Self::ConnectionError
        } else {
            Self::RequestError
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "Timeout",
            Self::ConnectionError => "ConnectionError",
            Self::InvalidUrl => "InvalidURL",
            Self::TooManyRedirects => "TooManyRedirects",
            Self::RequestError => "RequestError",
        }
    }
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single GET against a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Status(u16),
    Error(ProbeErrorKind),
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Status(code) => write!(f, "Status: {}", code),
            ProbeOutcome::Error(kind) => write!(f, "Error: {}", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn outcome_status_text() {
        assert_eq!(ProbeOutcome::Status(200).to_string(), "Status: 200");
        assert_eq!(
            ProbeOutcome::Error(ProbeErrorKind::InvalidUrl).to_string(),
            "Error: InvalidURL"
        );
    }

    #[test]
    fn record_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let record = StatusRecord::from_outcome(&ProbeOutcome::Status(503), at);
        assert_eq!(record.status, "Status: 503");
        assert_eq!(record.timestamp, "2024-03-09 07:05:01 UTC");
        assert!(!record.is_pending());
        assert!(StatusRecord::pending().is_pending());
    }

    #[test]
    fn status_class_buckets() {
        assert_eq!(StatusClass::of("Status: 200"), StatusClass::Ok);
        assert_eq!(StatusClass::of("Status: 503"), StatusClass::Error);
        assert_eq!(StatusClass::of("Error: Timeout"), StatusClass::Error);
        assert_eq!(StatusClass::of("Status: 404"), StatusClass::Pending);
        assert_eq!(StatusClass::of(PENDING_STATUS), StatusClass::Pending);
    }
}
