use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// Seconds since the Unix epoch.
///
/// Used both as the expiration embedded in a full token and as the "now" a token is
/// checked against. Only `0..=i64::MAX` is representable on the wire; see
/// [`Timestamp::is_representable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_epoch_seconds(seconds: u64) -> Self {
        Self(seconds)
    }

    pub const fn epoch_seconds(&self) -> u64 {
        self.0
    }

    /// Current wall-clock time. Times before the epoch clamp to zero.
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    pub fn saturating_sub(&self, other: Timestamp) -> u64 {
        self.0.saturating_sub(other.0)
    }

    /// Whether the value fits the non-negative signed range the token format allows.
    pub const fn is_representable(&self) -> bool {
        self.0 <= i64::MAX as u64
    }

    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let seconds = i64::try_from(self.0).ok()?;
        DateTime::<Utc>::from_timestamp(seconds, 0)
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        let seconds = time
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        Self(seconds)
    }
}

impl From<Timestamp> for SystemTime {
    fn from(timestamp: Timestamp) -> Self {
        UNIX_EPOCH + Duration::from_secs(timestamp.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
