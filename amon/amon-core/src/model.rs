use chrono::{DateTime, Utc};
use ids::ResourceId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use utoipa::ToSchema;

/// Top level owner of metering points, e.g. an account or a building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: ResourceId,
    pub description: Option<String>,
}

impl Entity {
    pub fn new(id: ResourceId, description: Option<String>) -> Self {
        Self { id, description }
    }
}

/// An entity together with the ids of the metering points it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDetail {
    pub id: ResourceId,
    pub description: Option<String>,
    pub metering_point_ids: Vec<ResourceId>,
}

impl EntityDetail {
    pub fn new(entity: Entity, metering_point_ids: Vec<ResourceId>) -> Self {
        Self {
            id: entity.id,
            description: entity.description,
            metering_point_ids,
        }
    }
}

/// Position in some local 3D coordinate space. This is not a geographic location.
#[derive(Debug, Serialize, Deserialize, ToSchema, Default, Copy, Clone, PartialEq)]
pub struct Coordinates {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeteringPoint {
    pub id: ResourceId,
    pub entity_id: ResourceId,
    pub description: Option<String>,
    pub metadata: Coordinates,
}

impl MeteringPoint {
    pub fn new(
        id: ResourceId,
        entity_id: ResourceId,
        description: Option<String>,
        metadata: Coordinates,
    ) -> Self {
        Self {
            id,
            entity_id,
            description,
            metadata,
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Private,
    Public,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Private => "private",
            Privacy::Public => "public",
        }
    }
}

impl FromStr for Privacy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "private" => Ok(Privacy::Private),
            "public" => Ok(Privacy::Public),
            _ => Err(UnknownVariant {
                kind: "privacy",
                value: s.to_owned(),
            }),
        }
    }
}

impl Display for Privacy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical sensor or meter attached to a metering point.
/// `entity_id` is a copy of the parent metering point's entity, kept for querying.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: ResourceId,
    pub entity_id: ResourceId,
    pub metering_point_id: ResourceId,
    pub description: Option<String>,
    pub privacy: Privacy,
    pub metadata: Coordinates,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Instant,
    Cumulative,
    Pulse,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Instant => "instant",
            Period::Cumulative => "cumulative",
            Period::Pulse => "pulse",
        }
    }
}

impl FromStr for Period {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "instant" => Ok(Period::Instant),
            "cumulative" => Ok(Period::Cumulative),
            "pulse" => Ok(Period::Pulse),
            _ => Err(UnknownVariant {
                kind: "period",
                value: s.to_owned(),
            }),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes one channel a device reports on.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub device_id: ResourceId,
    pub reading_type: String,
    pub unit: Option<String>,
    pub resolution: Option<f64>,
    pub accuracy: Option<f64>,
    pub period: Period,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub correction: Option<Correction>,
}

/// Linear correction applied to raw values, e.g. a calorific value for gas.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub factor: Option<f64>,
    pub corrected_unit: Option<String>,
    pub factor_breakdown: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub device_id: ResourceId,
    pub reading_type: String,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub error: Option<String>,
    /// false for raw samples, true for values derived from other samples
    pub aggregated: bool,
}

impl Measurement {
    pub fn raw(
        device_id: ResourceId,
        reading_type: String,
        timestamp: DateTime<Utc>,
        value: f64,
    ) -> Self {
        Self {
            device_id,
            reading_type,
            timestamp,
            value,
            error: None,
            aggregated: false,
        }
    }
}
