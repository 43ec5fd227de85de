use crate::ServiceResult;
use crate::error::AmonServiceError;
use crate::metrics;
use crate::service::{CreateOutcome, DeleteOutcome, GetOutcome, UpsertOutcome};
use amon_core::model::{Entity, EntityDetail};
use amon_core::result::{Reason, write_failure};
use amon_core::{AmonEngine, EntityRepository, MeteringPointRepository};
use error_stack::ResultExt;
use ids::{ResourceId, validate_and_normalize};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
pub struct EntityService<T> {
    engine: T,
}

impl<T> EntityService<T>
where
    T: AmonEngine,
{
    pub fn new(engine: T) -> Self {
        EntityService { engine }
    }

    #[instrument(skip_all, name = "service#list_entities")]
    pub async fn list_summaries(&self) -> ServiceResult<Vec<Entity>> {
        let entities = self
            .engine
            .entities()
            .list()
            .await
            .change_context(AmonServiceError)?;

        metrics::increment_entities_retrieved_by(entities.len());
        Ok(entities)
    }

    #[instrument(skip_all, name = "service#get_entity")]
    pub async fn get(&self, raw_id: &str) -> ServiceResult<GetOutcome<EntityDetail>> {
        let id = match validate_and_normalize(raw_id) {
            Ok(id) => id,
            Err(e) => return Ok(GetOutcome::InvalidId(e.into())),
        };

        let Some(entity) = self
            .engine
            .entities()
            .get(id)
            .await
            .change_context(AmonServiceError)?
        else {
            return Ok(GetOutcome::NotFound);
        };

        metrics::increment_entities_retrieved();
        Ok(GetOutcome::Found(self.detail(entity).await?))
    }

    #[instrument(skip_all, name = "service#create_entity")]
    pub async fn create(
        &self,
        requested_id: Option<&str>,
        description: Option<String>,
    ) -> ServiceResult<CreateOutcome<EntityDetail>> {
        let id = match requested_id.map(validate_and_normalize) {
            None => ResourceId::generate(),
            Some(Ok(id)) => id,
            Some(Err(e)) => return Ok(CreateOutcome::InvalidId(e.into())),
        };

        let result = self
            .engine
            .entities()
            .insert(Entity::new(id, description))
            .await;

        match result {
            Ok(entity) => {
                debug!("created entity {}", entity.id);
                metrics::increment_entities_created();
                Ok(CreateOutcome::Created(EntityDetail::new(entity, vec![])))
            }
            Err(report) if write_failure(&report) == Some(Reason::DuplicateKey) => {
                debug!("entity {id} already exists");
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(report) => Err(report.change_context(AmonServiceError)),
        }
    }

    /// Replaces the description of an existing entity, or creates the entity
    /// under the given id. Its metering points are never touched.
    #[instrument(skip_all, name = "service#upsert_entity")]
    pub async fn upsert(
        &self,
        raw_id: &str,
        description: Option<String>,
    ) -> ServiceResult<UpsertOutcome<EntityDetail>> {
        let id = match validate_and_normalize(raw_id) {
            Ok(id) => id,
            Err(e) => return Ok(UpsertOutcome::InvalidId(e.into())),
        };

        if self.update_if_present(id, &description).await? {
            metrics::increment_entities_updated();
            return Ok(UpsertOutcome::Updated);
        }

        let result = self
            .engine
            .entities()
            .insert(Entity::new(id, description.clone()))
            .await;

        match result {
            Ok(entity) => {
                metrics::increment_entities_created();
                Ok(UpsertOutcome::Created(EntityDetail::new(entity, vec![])))
            }
            Err(report) if write_failure(&report) == Some(Reason::DuplicateKey) => {
                warn!("entity {id} was created concurrently, retrying as an update");
                if self.update_if_present(id, &description).await? {
                    metrics::increment_entities_updated();
                    Ok(UpsertOutcome::Updated)
                } else {
                    Ok(UpsertOutcome::AlreadyExists)
                }
            }
            Err(report) => Err(report.change_context(AmonServiceError)),
        }
    }

    /// Deletes the entity along with all of its metering points.
    #[instrument(skip_all, name = "service#delete_entity")]
    pub async fn delete(&self, raw_id: &str) -> ServiceResult<DeleteOutcome> {
        let id = match validate_and_normalize(raw_id) {
            Ok(id) => id,
            Err(e) => return Ok(DeleteOutcome::InvalidId(e.into())),
        };

        let entities = self.engine.entities();
        if entities
            .get(id)
            .await
            .change_context(AmonServiceError)?
            .is_none()
        {
            return Ok(DeleteOutcome::NotFound);
        }

        entities.delete(id).await.change_context(AmonServiceError)?;
        debug!("deleted entity {id}");
        metrics::increment_entities_deleted();
        Ok(DeleteOutcome::Deleted)
    }

    async fn update_if_present(
        &self,
        id: ResourceId,
        description: &Option<String>,
    ) -> ServiceResult<bool> {
        let entities = self.engine.entities();
        let Some(mut entity) = entities.get(id).await.change_context(AmonServiceError)? else {
            return Ok(false);
        };

        entity.description = description.clone();
        entities
            .update(entity)
            .await
            .change_context(AmonServiceError)?;
        Ok(true)
    }

    async fn detail(&self, entity: Entity) -> ServiceResult<EntityDetail> {
        let metering_point_ids = self
            .engine
            .metering_points()
            .list_for_entity(entity.id)
            .await
            .change_context(AmonServiceError)?
            .into_iter()
            .map(|mp| mp.id)
            .collect();

        Ok(EntityDetail::new(entity, metering_point_ids))
    }
}
