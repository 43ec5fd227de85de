use deadpool_postgres::ClientWrapper;
use error_stack::{Report, ResultExt};
use tokio_postgres::types::Type;

#[derive(Debug, thiserror::Error)]
#[error("failed to prepare statement")]
pub struct StatementPrepareError;

/// A query together with the parameter types it is prepared with.
pub struct Sql {
    pub query: &'static str,
    pub types: fn() -> Vec<Type>,
}

impl Sql {
    pub async fn prepare(
        &self,
        client: &ClientWrapper,
    ) -> Result<tokio_postgres::Statement, tokio_postgres::Error> {
        client
            .prepare_typed_cached(self.query, &(self.types)())
            .await
    }
}

pub async fn prepare_all(
    client: &ClientWrapper,
    statements: &[&Sql],
) -> Result<(), Report<StatementPrepareError>> {
    for sql in statements {
        sql.prepare(client)
            .await
            .change_context(StatementPrepareError)
            .attach_with(|| sql.query.to_string())?;
    }
    Ok(())
}

fn uuid() -> Vec<Type> {
    vec![Type::UUID]
}

fn none() -> Vec<Type> {
    vec![]
}

pub mod entities {
    use super::{Sql, none, uuid};
    use tokio_postgres::types::Type;

    pub const GET: Sql = Sql {
        query: "select id, description from entities where id = $1",
        types: uuid,
    };

    pub const LIST: Sql = Sql {
        query: "select id, description from entities order by id",
        types: none,
    };

    fn id_and_description() -> Vec<Type> {
        vec![Type::UUID, Type::TEXT]
    }

    pub const INSERT: Sql = Sql {
        query: "insert into entities (id, description) values ($1, $2) returning id, description",
        types: id_and_description,
    };

    pub const UPDATE: Sql = Sql {
        query: "update entities set description = $2 where id = $1",
        types: id_and_description,
    };

    // metering points and everything below them go with the entity via on delete cascade
    pub const DELETE: Sql = Sql {
        query: "delete from entities where id = $1",
        types: uuid,
    };

    pub const ALL: [&Sql; 5] = [&GET, &LIST, &INSERT, &UPDATE, &DELETE];
}

pub mod metering_points {
    use super::{Sql, none, uuid};
    use tokio_postgres::types::Type;

    fn full_row() -> Vec<Type> {
        vec![
            Type::UUID,
            Type::UUID,
            Type::TEXT,
            Type::FLOAT8,
            Type::FLOAT8,
            Type::FLOAT8,
        ]
    }

    pub const GET: Sql = Sql {
        query: "select id, entity_id, description, x, y, z from metering_points where id = $1",
        types: uuid,
    };

    pub const LIST: Sql = Sql {
        query: "select id, entity_id, description, x, y, z from metering_points order by id",
        types: none,
    };

    pub const LIST_FOR_ENTITY: Sql = Sql {
        query: "select id, entity_id, description, x, y, z from metering_points where entity_id = $1 order by id",
        types: uuid,
    };

    pub const INSERT: Sql = Sql {
        query: "insert into metering_points (id, entity_id, description, x, y, z) values ($1, $2, $3, $4, $5, $6) \
                returning id, entity_id, description, x, y, z",
        types: full_row,
    };

    pub const UPDATE: Sql = Sql {
        query: "update metering_points set entity_id = $2, description = $3, x = $4, y = $5, z = $6 where id = $1",
        types: full_row,
    };

    pub const DELETE: Sql = Sql {
        query: "delete from metering_points where id = $1",
        types: uuid,
    };

    pub const ALL: [&Sql; 6] = [&GET, &LIST, &LIST_FOR_ENTITY, &INSERT, &UPDATE, &DELETE];
}
