//! Opaque identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of one unlock ceremony instance.
///
/// Generated through `RandomEffects` at ceremony creation; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CeremonyId(pub Uuid);

impl CeremonyId {
    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CeremonyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ceremony-{}", self.0)
    }
}

impl FromStr for CeremonyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both raw UUIDs and the prefixed display form
        let uuid_str = s.strip_prefix("ceremony-").unwrap_or(s);
        Ok(CeremonyId(Uuid::parse_str(uuid_str)?))
    }
}

impl From<Uuid> for CeremonyId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let id = CeremonyId::from_uuid(Uuid::from_u128(7));
        let text = id.to_string();
        assert!(text.starts_with("ceremony-"));
        assert_eq!(text.parse::<CeremonyId>().unwrap(), id);
    }

    #[test]
    fn test_parse_raw_uuid() {
        let uuid = Uuid::from_u128(42);
        let id: CeremonyId = uuid.to_string().parse().unwrap();
        assert_eq!(id.uuid(), uuid);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("ceremony-not-a-uuid".parse::<CeremonyId>().is_err());
    }
}
