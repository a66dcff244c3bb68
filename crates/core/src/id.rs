//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Prefix carried by every mattress record identifier.
pub const RECORD_ID_PREFIX: &str = "MTR-";

/// Largest timestamp component the generator will track: the last
/// millisecond of year 9999. Ids beyond it are treated as foreign.
pub const MAX_TRACKED_MILLIS: i64 = 253_402_300_799_999;

/// Identifier of a mattress record: `MTR-<milliseconds since epoch>`.
///
/// Deserialization is structural only (any string is accepted) so that
/// collections written by older clients load unchanged; `FromStr` is the
/// validating entry point for operator input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    fn from_millis(millis: i64) -> Self {
        Self(format!("{RECORD_ID_PREFIX}{millis}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The timestamp component, if this id follows the generated format.
    pub fn millis(&self) -> Option<i64> {
        self.0.strip_prefix(RECORD_ID_PREFIX)?.parse().ok()
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix(RECORD_ID_PREFIX).ok_or_else(|| {
            DomainError::invalid_id(format!("RecordId: missing `{RECORD_ID_PREFIX}` prefix in {s:?}"))
        })?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_id(format!(
                "RecordId: expected digits after prefix in {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

/// Issues timestamp-derived record ids that never repeat.
///
/// Two creations inside the same millisecond (or a clock that steps backwards)
/// would otherwise collide, so the generator keeps a high-water mark and bumps
/// the timestamp component past it when needed.
#[derive(Debug, Clone, Default)]
pub struct RecordIdGenerator {
    high_water: Option<i64>,
}

impl RecordIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the high-water mark past an id issued elsewhere (e.g. loaded from storage).
    ///
    /// Ids whose timestamp is negative or past [`MAX_TRACKED_MILLIS`] are
    /// ignored, like ids that do not follow the generated format.
    pub fn observe(&mut self, id: &RecordId) {
        if let Some(millis) = id.millis().filter(|m| (0..=MAX_TRACKED_MILLIS).contains(m)) {
            self.high_water = Some(self.high_water.map_or(millis, |hw| hw.max(millis)));
        }
    }

    /// Issue the next id for a creation happening at `now_millis`.
    pub fn next(&mut self, now_millis: i64) -> RecordId {
        let millis = match self.high_water {
            Some(hw) if now_millis <= hw => hw.saturating_add(1),
            _ => now_millis,
        };
        self.high_water = Some(millis);
        RecordId::from_millis(millis)
    }
}
