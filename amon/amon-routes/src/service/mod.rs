use ids::{InvalidFormat, ResourceId};
use std::fmt::{Display, Formatter};

mod entities;
mod metering_points;

pub use entities::EntityService;
pub use metering_points::MeteringPointService;

/// Why an identifier in a request could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdProblem {
    Malformed(InvalidFormat),
    /// Creating a metering point needs its own id.
    MissingId,
    /// Creating a metering point needs a parent entity.
    MissingEntityId,
    /// The entity id is well formed but no such entity exists.
    UnknownEntity(ResourceId),
}

impl Display for IdProblem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IdProblem::Malformed(e) => write!(f, "{e}"),
            IdProblem::MissingId => f.write_str("meteringPointId is required"),
            IdProblem::MissingEntityId => f.write_str("entityId is required"),
            IdProblem::UnknownEntity(id) => write!(f, "entity '{id}' does not exist"),
        }
    }
}

impl From<InvalidFormat> for IdProblem {
    fn from(value: InvalidFormat) -> Self {
        IdProblem::Malformed(value)
    }
}

#[derive(Debug, PartialEq)]
pub enum GetOutcome<T> {
    Found(T),
    InvalidId(IdProblem),
    NotFound,
}

#[derive(Debug, PartialEq)]
pub enum CreateOutcome<T> {
    Created(T),
    InvalidId(IdProblem),
    AlreadyExists,
}

#[derive(Debug, PartialEq)]
pub enum UpsertOutcome<T> {
    Created(T),
    Updated,
    InvalidId(IdProblem),
    /// Only reachable when a concurrent writer created and removed the record
    /// between our insert attempt and the retry.
    AlreadyExists,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    InvalidId(IdProblem),
    NotFound,
}
