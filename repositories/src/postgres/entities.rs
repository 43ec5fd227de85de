use crate::postgres::statements::{self, prepare_all};
use crate::postgres::{RepoInitErr, client, write_reason};
use amon_core::EntityRepository;
use amon_core::model::Entity;
use amon_core::result::{OptRepoResult, Reason, RepoError, RepoResult};
use deadpool_postgres::Pool;
use error_stack::{IntoReport, Report, ResultExt};
use ids::ResourceId;
use tokio_postgres::Row;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EntityRepo {
    pool: Pool,
}

impl EntityRepo {
    pub async fn new(pool: Pool) -> Result<Self, Report<RepoInitErr>> {
        let handle = pool.get().await.change_context(RepoInitErr::entities())?;

        prepare_all(&handle, &statements::entities::ALL)
            .await
            .change_context(RepoInitErr::entities())?;

        Ok(Self { pool })
    }
}

fn row_to_entity(row: Row) -> Entity {
    Entity::new(
        ResourceId::from(row.get::<_, Uuid>("id")),
        row.get("description"),
    )
}

impl EntityRepository for EntityRepo {
    async fn get(&self, id: ResourceId) -> OptRepoResult<Entity> {
        let client = client(&self.pool, RepoError::Get).await?;
        let statement = statements::entities::GET
            .prepare(&client)
            .await
            .change_context(RepoError::Get)?;

        let entity = client
            .query_opt(&statement, &[id.as_uuid()])
            .await
            .change_context(RepoError::Get)?
            .map(row_to_entity);
        Ok(entity)
    }

    async fn list(&self) -> RepoResult<Vec<Entity>> {
        let client = client(&self.pool, RepoError::List).await?;
        let statement = statements::entities::LIST
            .prepare(&client)
            .await
            .change_context(RepoError::List)?;

        let rows = client
            .query(&statement, &[])
            .await
            .change_context(RepoError::List)?;

        Ok(rows.into_iter().map(row_to_entity).collect())
    }

    async fn insert(&self, entity: Entity) -> RepoResult<Entity> {
        let client = client(&self.pool, RepoError::Insert(Reason::Db)).await?;
        let statement = statements::entities::INSERT
            .prepare(&client)
            .await
            .change_context(RepoError::Insert(Reason::Db))?;

        match client
            .query_one(&statement, &[entity.id.as_uuid(), &entity.description])
            .await
        {
            Ok(row) => Ok(row_to_entity(row)),
            Err(e) => {
                let reason = write_reason(&e);
                Err(e.into_report()).change_context(RepoError::Insert(reason))
            }
        }
    }

    async fn update(&self, entity: Entity) -> RepoResult<()> {
        let client = client(&self.pool, RepoError::Update(Reason::Db)).await?;
        let statement = statements::entities::UPDATE
            .prepare(&client)
            .await
            .change_context(RepoError::Update(Reason::Db))?;

        match client
            .execute(&statement, &[entity.id.as_uuid(), &entity.description])
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                let reason = write_reason(&e);
                Err(e.into_report()).change_context(RepoError::Update(reason))
            }
        }
    }

    async fn delete(&self, id: ResourceId) -> RepoResult<()> {
        let client = client(&self.pool, RepoError::Delete).await?;
        let statement = statements::entities::DELETE
            .prepare(&client)
            .await
            .change_context(RepoError::Delete)?;

        client
            .execute(&statement, &[id.as_uuid()])
            .await
            .change_context(RepoError::Delete)?;
        Ok(())
    }
}
