use amon_core::model::{Entity, MeteringPoint};
use amon_core::result::{OptRepoResult, Reason, RepoError, RepoResult};
use amon_core::{AmonStores, EntityRepository, MeteringPointRepository};
use error_stack::IntoReport;
use ids::ResourceId;
use indexmap::IndexMap;
use routing::ArwLock;

#[derive(Debug, Clone, Default)]
struct Tables {
    entities: IndexMap<ResourceId, Entity>,
    metering_points: IndexMap<ResourceId, MeteringPoint>,
}

/// Store that lives and dies with the process. Every operation takes the single
/// lock over all tables, so uniqueness, parent checks and cascades are atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    db: ArwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> InMemoryEntities {
        InMemoryEntities {
            db: self.db.clone(),
        }
    }

    pub fn metering_points(&self) -> InMemoryMeteringPoints {
        InMemoryMeteringPoints {
            db: self.db.clone(),
        }
    }

    pub fn into_engine(self) -> AmonStores<InMemoryEntities, InMemoryMeteringPoints> {
        AmonStores::new(self.entities(), self.metering_points())
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryEntities {
    db: ArwLock<Tables>,
}

impl EntityRepository for InMemoryEntities {
    async fn get(&self, id: ResourceId) -> OptRepoResult<Entity> {
        let db = self.db.read().await;

        Ok(db.entities.get(&id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Entity>> {
        let db = self.db.read().await;

        Ok(db.entities.values().cloned().collect())
    }

    async fn insert(&self, entity: Entity) -> RepoResult<Entity> {
        let mut db = self.db.write().await;

        if db.entities.contains_key(&entity.id) {
            return Err(RepoError::Insert(Reason::DuplicateKey).into_report());
        }

        db.entities.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Entity) -> RepoResult<()> {
        let mut db = self.db.write().await;

        if let Some(existing) = db.entities.get_mut(&entity.id) {
            *existing = entity;
        }
        Ok(())
    }

    async fn delete(&self, id: ResourceId) -> RepoResult<()> {
        let mut db = self.db.write().await;

        if db.entities.shift_remove(&id).is_some() {
            db.metering_points.retain(|_, mp| mp.entity_id != id);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryMeteringPoints {
    db: ArwLock<Tables>,
}

impl MeteringPointRepository for InMemoryMeteringPoints {
    async fn get(&self, id: ResourceId) -> OptRepoResult<MeteringPoint> {
        let db = self.db.read().await;

        Ok(db.metering_points.get(&id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<MeteringPoint>> {
        let db = self.db.read().await;

        Ok(db.metering_points.values().cloned().collect())
    }

    async fn list_for_entity(&self, entity_id: ResourceId) -> RepoResult<Vec<MeteringPoint>> {
        let db = self.db.read().await;

        Ok(db
            .metering_points
            .values()
            .filter(|mp| mp.entity_id == entity_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, metering_point: MeteringPoint) -> RepoResult<MeteringPoint> {
        let mut db = self.db.write().await;

        if db.metering_points.contains_key(&metering_point.id) {
            return Err(RepoError::Insert(Reason::DuplicateKey).into_report());
        }

        if !db.entities.contains_key(&metering_point.entity_id) {
            return Err(RepoError::Insert(Reason::ReferentialViolation).into_report());
        }

        db.metering_points
            .insert(metering_point.id, metering_point.clone());
        Ok(metering_point)
    }

    async fn update(&self, metering_point: MeteringPoint) -> RepoResult<()> {
        let mut db = self.db.write().await;

        if !db.entities.contains_key(&metering_point.entity_id) {
            return Err(RepoError::Update(Reason::ReferentialViolation).into_report());
        }

        if let Some(existing) = db.metering_points.get_mut(&metering_point.id) {
            *existing = metering_point;
        }
        Ok(())
    }

    async fn delete(&self, id: ResourceId) -> RepoResult<()> {
        let mut db = self.db.write().await;

        db.metering_points.shift_remove(&id);
        Ok(())
    }
}
