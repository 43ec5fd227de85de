use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Length of the hyphenated 8-4-4-4-12 form.
const CANONICAL_LEN: usize = 36;
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("'{0}' is not a UUID in canonical 8-4-4-4-12 form")]
pub struct InvalidFormat(String);

impl InvalidFormat {
    pub fn raw(&self) -> &str {
        &self.0
    }
}

/// Identifier shared by every AMON resource.
///
/// Always holds a UUID that renders in canonical lowercase hyphenated form,
/// so two ids that differ only in letter case on input compare equal.
#[derive(Debug, ToSchema, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
#[repr(transparent)]
#[schema(value_type = String, example = "0b8e6c9a-4f7e-4b7e-9a59-3f0d1c2b4a11")]
pub struct ResourceId(Uuid);

impl ResourceId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// Accepts only the canonical 36 character form, in any letter case.
/// Braced, URN and unhyphenated forms are rejected even though they name a valid UUID.
pub fn validate_and_normalize(raw: &str) -> Result<ResourceId, InvalidFormat> {
    let bytes = raw.as_bytes();
    if bytes.len() != CANONICAL_LEN {
        return Err(InvalidFormat(raw.to_owned()));
    }

    let well_formed = bytes.iter().enumerate().all(|(i, b)| {
        if HYPHEN_POSITIONS.contains(&i) {
            *b == b'-'
        } else {
            b.is_ascii_hexdigit()
        }
    });

    if !well_formed {
        return Err(InvalidFormat(raw.to_owned()));
    }

    Uuid::parse_str(raw)
        .map(ResourceId)
        .map_err(|_| InvalidFormat(raw.to_owned()))
}

impl From<Uuid> for ResourceId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for ResourceId {
    type Err = InvalidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_and_normalize(s)
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl Serialize for ResourceId {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(de)?;
        validate_and_normalize(&raw).map_err(serde::de::Error::custom)
    }
}
