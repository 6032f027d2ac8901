pub mod guru;
pub mod jurnal;
pub mod siswa;
pub mod user;

pub use guru::Guru;
pub use jurnal::{JurnalEntry, JURNAL_STATUS_SUBMITTED};
pub use siswa::Siswa;
pub use user::{User, UserSummary};

use serde::{de::DeserializeOwned, Serialize};

/// A record stored as one flat document in a named collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    /// Human label used in not-found messages.
    const NOT_FOUND: &'static str;
}

/// Parse a `YYYY-MM-DD` date or an RFC 3339 timestamp into a calendar date.
pub fn parse_iso_date(s: &str) -> Option<chrono::NaiveDate> {
    let s = s.trim();
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| chrono::DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc().date()))
}
