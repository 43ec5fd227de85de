use ids::ResourceId;
use model::{Entity, MeteringPoint};
use result::{OptRepoResult, RepoResult};

pub mod model;
pub mod result;

/// Everything a request handler needs from the outside world.
/// Built once at startup and handed to the services, never reached through globals.
pub trait AmonEngine: Clone + Send + Sync + 'static {
    type Entities: EntityRepository;
    type MeteringPoints: MeteringPointRepository;

    fn entities(&self) -> Self::Entities;
    fn metering_points(&self) -> Self::MeteringPoints;
}

/// Store contract for entities.
///
/// `update` and `delete` assume the entity exists; callers check first.
pub trait EntityRepository: Clone + Send + Sync + 'static {
    fn get(&self, id: ResourceId) -> impl Future<Output = OptRepoResult<Entity>> + Send;

    fn list(&self) -> impl Future<Output = RepoResult<Vec<Entity>>> + Send;

    /// Fails with [`result::Reason::DuplicateKey`] when the id is taken.
    /// The uniqueness check and the write happen atomically.
    fn insert(&self, entity: Entity) -> impl Future<Output = RepoResult<Entity>> + Send;

    fn update(&self, entity: Entity) -> impl Future<Output = RepoResult<()>> + Send;

    /// Removes the entity together with every metering point it owns.
    fn delete(&self, id: ResourceId) -> impl Future<Output = RepoResult<()>> + Send;
}

/// Store contract for metering points.
///
/// Writes that point `entity_id` at an entity that does not exist fail with
/// [`result::Reason::ReferentialViolation`].
pub trait MeteringPointRepository: Clone + Send + Sync + 'static {
    fn get(&self, id: ResourceId) -> impl Future<Output = OptRepoResult<MeteringPoint>> + Send;

    fn list(&self) -> impl Future<Output = RepoResult<Vec<MeteringPoint>>> + Send;

    fn list_for_entity(
        &self,
        entity_id: ResourceId,
    ) -> impl Future<Output = RepoResult<Vec<MeteringPoint>>> + Send;

    fn insert(
        &self,
        metering_point: MeteringPoint,
    ) -> impl Future<Output = RepoResult<MeteringPoint>> + Send;

    fn update(&self, metering_point: MeteringPoint) -> impl Future<Output = RepoResult<()>> + Send;

    fn delete(&self, id: ResourceId) -> impl Future<Output = RepoResult<()>> + Send;
}

/// Plain [`AmonEngine`] over a pair of stores.
#[derive(Debug, Clone)]
pub struct AmonStores<E, M> {
    entities: E,
    metering_points: M,
}

impl<E, M> AmonStores<E, M> {
    pub fn new(entities: E, metering_points: M) -> Self {
        Self {
            entities,
            metering_points,
        }
    }
}

impl<E, M> AmonEngine for AmonStores<E, M>
where
    E: EntityRepository,
    M: MeteringPointRepository,
{
    type Entities = E;
    type MeteringPoints = M;

    fn entities(&self) -> Self::Entities {
        self.entities.clone()
    }

    fn metering_points(&self) -> Self::MeteringPoints {
        self.metering_points.clone()
    }
}
