use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

const MAX_LEN: usize = 128;

/// Identifier of one scan session
///
/// Used as the storage key and as a directory name on disk, so it is limited
/// to ASCII letters, digits, `_` and `-`.
///
/// # Examples
///
/// ```
/// use transferscan::SessionId;
///
/// assert!(SessionId::new("wigo_2024-10").is_ok());
/// assert!(SessionId::new("../etc").is_err());
/// assert!(SessionId::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ConfigError::invalid_value("SESSION_ID", "must not be empty"));
        }
        if id.len() > MAX_LEN {
            return Err(ConfigError::invalid_value(
                "SESSION_ID",
                format!("longer than {MAX_LEN} characters"),
            ));
        }
        if let Some(bad) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(ConfigError::invalid_value(
                "SESSION_ID",
                format!("unsupported character {bad:?}"),
            ));
        }
        Ok(Self(id))
    }

    /// `session_YYYYmmdd_HHMMSS` for the given instant
    pub fn timestamped(at: DateTime<Utc>) -> Self {
        Self(at.format("session_%Y%m%d_%H%M%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SessionId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(value: SessionId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamped_name() {
        let at = Utc.with_ymd_and_hms(2024, 10, 10, 8, 5, 9).unwrap();
        assert_eq!(
            SessionId::timestamped(at).as_str(),
            "session_20241010_080509"
        );
    }

    #[test]
    fn test_rejects_path_characters_and_long_ids() {
        assert!(SessionId::new("a/b").is_err());
        assert!(SessionId::new("a b").is_err());
        assert!(SessionId::new("x".repeat(MAX_LEN)).is_ok());
        assert!(SessionId::new("x".repeat(MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let id: SessionId = serde_json::from_str("\"run-1\"").unwrap();
        assert_eq!(id.as_str(), "run-1");
        assert!(serde_json::from_str::<SessionId>("\"..\"").is_err());
    }
}
