use crate::ServiceResult;
use crate::error::AmonServiceError;
use crate::metrics;
use crate::service::{CreateOutcome, GetOutcome, IdProblem, UpsertOutcome};
use amon_core::model::{Coordinates, MeteringPoint};
use amon_core::result::{Reason, write_failure};
use amon_core::{AmonEngine, MeteringPointRepository};
use error_stack::ResultExt;
use ids::{ResourceId, validate_and_normalize};
use optional_field::Field;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
pub struct MeteringPointService<T> {
    engine: T,
}

/// Result of trying to write over a metering point that may already exist.
enum Overwrite {
    Done,
    Absent,
    UnknownEntity(ResourceId),
}

impl<T> MeteringPointService<T>
where
    T: AmonEngine,
{
    pub fn new(engine: T) -> Self {
        MeteringPointService { engine }
    }

    #[instrument(skip_all, name = "service#list_metering_points")]
    pub async fn list(&self) -> ServiceResult<Vec<MeteringPoint>> {
        let metering_points = self
            .engine
            .metering_points()
            .list()
            .await
            .change_context(AmonServiceError)?;

        metrics::increment_metering_points_retrieved_by(metering_points.len());
        Ok(metering_points)
    }

    #[instrument(skip_all, name = "service#get_metering_point")]
    pub async fn get(&self, raw_id: &str) -> ServiceResult<GetOutcome<MeteringPoint>> {
        let id = match validate_and_normalize(raw_id) {
            Ok(id) => id,
            Err(e) => return Ok(GetOutcome::InvalidId(e.into())),
        };

        let metering_point = self
            .engine
            .metering_points()
            .get(id)
            .await
            .change_context(AmonServiceError)?;

        match metering_point {
            Some(metering_point) => {
                metrics::increment_metering_points_retrieved();
                Ok(GetOutcome::Found(metering_point))
            }
            None => Ok(GetOutcome::NotFound),
        }
    }

    /// Both ids are checked for shape here; whether the entity exists is left to
    /// the store, which refuses to write an orphan.
    #[instrument(skip_all, name = "service#create_metering_point")]
    pub async fn create(
        &self,
        raw_id: &str,
        raw_entity_id: &str,
        description: Option<String>,
        metadata: Option<Coordinates>,
    ) -> ServiceResult<CreateOutcome<MeteringPoint>> {
        let id = match validate_and_normalize(raw_id) {
            Ok(id) => id,
            Err(e) => return Ok(CreateOutcome::InvalidId(e.into())),
        };
        let entity_id = match validate_and_normalize(raw_entity_id) {
            Ok(id) => id,
            Err(e) => return Ok(CreateOutcome::InvalidId(e.into())),
        };

        let new = MeteringPoint::new(id, entity_id, description, metadata.unwrap_or_default());
        let result = self.engine.metering_points().insert(new).await;

        match result {
            Ok(metering_point) => {
                debug!("created metering point {id} under entity {entity_id}");
                metrics::increment_metering_points_created();
                Ok(CreateOutcome::Created(metering_point))
            }
            Err(report) => match write_failure(&report) {
                Some(Reason::DuplicateKey) => Ok(CreateOutcome::AlreadyExists),
                Some(Reason::ReferentialViolation) => Ok(CreateOutcome::InvalidId(
                    IdProblem::UnknownEntity(entity_id),
                )),
                _ => Err(report.change_context(AmonServiceError)),
            },
        }
    }

    /// Creates the metering point under `raw_id`, or rewrites the existing one.
    ///
    /// On an existing record `description` is always replaced, a different
    /// `raw_entity_id` moves the metering point to that entity, and `metadata`
    /// is only touched when it was sent (`null` clears it).
    #[instrument(skip_all, name = "service#upsert_metering_point")]
    pub async fn upsert(
        &self,
        raw_id: &str,
        raw_entity_id: Option<&str>,
        description: Option<String>,
        metadata: Field<Coordinates>,
    ) -> ServiceResult<UpsertOutcome<MeteringPoint>> {
        let id = match validate_and_normalize(raw_id) {
            Ok(id) => id,
            Err(e) => return Ok(UpsertOutcome::InvalidId(e.into())),
        };
        let entity_id = match raw_entity_id.map(validate_and_normalize).transpose() {
            Ok(entity_id) => entity_id,
            Err(e) => return Ok(UpsertOutcome::InvalidId(e.into())),
        };

        match self
            .overwrite(id, entity_id, &description, &metadata)
            .await?
        {
            Overwrite::Done => {
                metrics::increment_metering_points_updated();
                return Ok(UpsertOutcome::Updated);
            }
            Overwrite::UnknownEntity(entity_id) => {
                return Ok(UpsertOutcome::InvalidId(IdProblem::UnknownEntity(
                    entity_id,
                )));
            }
            Overwrite::Absent => {}
        }

        let Some(entity_id) = entity_id else {
            return Ok(UpsertOutcome::InvalidId(IdProblem::MissingEntityId));
        };

        let initial_metadata = match &metadata {
            Field::Present(Some(coordinates)) => *coordinates,
            Field::Present(None) | Field::Missing => Coordinates::default(),
        };
        let new = MeteringPoint::new(id, entity_id, description.clone(), initial_metadata);
        let result = self.engine.metering_points().insert(new).await;

        match result {
            Ok(metering_point) => {
                metrics::increment_metering_points_created();
                Ok(UpsertOutcome::Created(metering_point))
            }
            Err(report) => match write_failure(&report) {
                Some(Reason::DuplicateKey) => {
                    warn!("metering point {id} was created concurrently, retrying as an update");
                    match self
                        .overwrite(id, Some(entity_id), &description, &metadata)
                        .await?
                    {
                        Overwrite::Done => {
                            metrics::increment_metering_points_updated();
                            Ok(UpsertOutcome::Updated)
                        }
                        Overwrite::UnknownEntity(entity_id) => Ok(UpsertOutcome::InvalidId(
                            IdProblem::UnknownEntity(entity_id),
                        )),
                        Overwrite::Absent => Ok(UpsertOutcome::AlreadyExists),
                    }
                }
                Some(Reason::ReferentialViolation) => Ok(UpsertOutcome::InvalidId(
                    IdProblem::UnknownEntity(entity_id),
                )),
                _ => Err(report.change_context(AmonServiceError)),
            },
        }
    }

    async fn overwrite(
        &self,
        id: ResourceId,
        entity_id: Option<ResourceId>,
        description: &Option<String>,
        metadata: &Field<Coordinates>,
    ) -> ServiceResult<Overwrite> {
        let metering_points = self.engine.metering_points();
        let Some(existing) = metering_points
            .get(id)
            .await
            .change_context(AmonServiceError)?
        else {
            return Ok(Overwrite::Absent);
        };

        let entity_id = match entity_id {
            Some(entity_id) if entity_id != existing.entity_id => {
                debug!(
                    "moving metering point {id} from entity {} to {entity_id}",
                    existing.entity_id
                );
                entity_id
            }
            _ => existing.entity_id,
        };

        let metadata = match metadata {
            Field::Missing => existing.metadata,
            Field::Present(None) => Coordinates::default(),
            Field::Present(Some(coordinates)) => *coordinates,
        };

        let updated = MeteringPoint::new(id, entity_id, description.clone(), metadata);
        match metering_points.update(updated).await {
            Ok(()) => Ok(Overwrite::Done),
            Err(report) if write_failure(&report) == Some(Reason::ReferentialViolation) => {
                Ok(Overwrite::UnknownEntity(entity_id))
            }
            Err(report) => Err(report.change_context(AmonServiceError)),
        }
    }
}
