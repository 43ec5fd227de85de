use crate::postgres::statements::{self, prepare_all};
use crate::postgres::{RepoInitErr, client, write_reason};
use amon_core::MeteringPointRepository;
use amon_core::model::{Coordinates, MeteringPoint};
use amon_core::result::{OptRepoResult, Reason, RepoError, RepoResult};
use deadpool_postgres::Pool;
use error_stack::{IntoReport, Report, ResultExt};
use ids::ResourceId;
use tokio_postgres::Row;
use tokio_stream::StreamExt;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MeteringPointRepo {
    pool: Pool,
}

impl MeteringPointRepo {
    pub async fn new(pool: Pool) -> Result<Self, Report<RepoInitErr>> {
        let handle = pool
            .get()
            .await
            .change_context(RepoInitErr::metering_points())?;

        prepare_all(&handle, &statements::metering_points::ALL)
            .await
            .change_context(RepoInitErr::metering_points())?;

        Ok(Self { pool })
    }
}

fn row_to_metering_point(row: Row) -> MeteringPoint {
    MeteringPoint::new(
        ResourceId::from(row.get::<_, Uuid>("id")),
        ResourceId::from(row.get::<_, Uuid>("entity_id")),
        row.get("description"),
        Coordinates {
            x: row.get("x"),
            y: row.get("y"),
            z: row.get("z"),
        },
    )
}

impl MeteringPointRepository for MeteringPointRepo {
    async fn get(&self, id: ResourceId) -> OptRepoResult<MeteringPoint> {
        let client = client(&self.pool, RepoError::Get).await?;
        let statement = statements::metering_points::GET
            .prepare(&client)
            .await
            .change_context(RepoError::Get)?;

        let metering_point = client
            .query_opt(&statement, &[id.as_uuid()])
            .await
            .change_context(RepoError::Get)?
            .map(row_to_metering_point);
        Ok(metering_point)
    }

    async fn list(&self) -> RepoResult<Vec<MeteringPoint>> {
        let client = client(&self.pool, RepoError::List).await?;
        let statement = statements::metering_points::LIST
            .prepare(&client)
            .await
            .change_context(RepoError::List)?;

        let rows = client
            .query(&statement, &[])
            .await
            .change_context(RepoError::List)?;

        Ok(rows.into_iter().map(row_to_metering_point).collect())
    }

    async fn list_for_entity(&self, entity_id: ResourceId) -> RepoResult<Vec<MeteringPoint>> {
        let client = client(&self.pool, RepoError::List).await?;
        let statement = statements::metering_points::LIST_FOR_ENTITY
            .prepare(&client)
            .await
            .change_context(RepoError::List)?;

        let metering_points = client
            .query_raw(&statement, [entity_id.as_uuid()])
            .await
            .change_context(RepoError::List)?
            .map(|r| r.map(row_to_metering_point))
            .collect::<Result<_, _>>()
            .await;

        metering_points.change_context(RepoError::List)
    }

    async fn insert(&self, metering_point: MeteringPoint) -> RepoResult<MeteringPoint> {
        let client = client(&self.pool, RepoError::Insert(Reason::Db)).await?;
        let statement = statements::metering_points::INSERT
            .prepare(&client)
            .await
            .change_context(RepoError::Insert(Reason::Db))?;

        let MeteringPoint {
            id,
            entity_id,
            description,
            metadata,
        } = &metering_point;

        match client
            .query_one(
                &statement,
                &[
                    id.as_uuid(),
                    entity_id.as_uuid(),
                    description,
                    &metadata.x,
                    &metadata.y,
                    &metadata.z,
                ],
            )
            .await
        {
            Ok(row) => Ok(row_to_metering_point(row)),
            Err(e) => {
                let reason = write_reason(&e);
                Err(e.into_report()).change_context(RepoError::Insert(reason))
            }
        }
    }

    async fn update(&self, metering_point: MeteringPoint) -> RepoResult<()> {
        let client = client(&self.pool, RepoError::Update(Reason::Db)).await?;
        let statement = statements::metering_points::UPDATE
            .prepare(&client)
            .await
            .change_context(RepoError::Update(Reason::Db))?;

        let MeteringPoint {
            id,
            entity_id,
            description,
            metadata,
        } = &metering_point;

        match client
            .execute(
                &statement,
                &[
                    id.as_uuid(),
                    entity_id.as_uuid(),
                    description,
                    &metadata.x,
                    &metadata.y,
                    &metadata.z,
                ],
            )
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
        let statement = statements::metering_points::DELETE
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
