use amon_core::result::{Reason, RepoError, RepoResult};
use deadpool_postgres::{Object, Pool};
use error_stack::ResultExt;
use tokio_postgres::error::SqlState;

pub mod entities;
pub mod initializer;
pub mod metering_points;
mod statements;

pub enum ConnectionDetails {
    Url(String),
}

#[derive(Debug, thiserror::Error)]
#[error("failed to initialize postgres {0} repo")]
pub struct RepoInitErr(&'static str);

impl RepoInitErr {
    fn entities() -> Self {
        Self("entities")
    }

    fn metering_points() -> Self {
        Self("metering points")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to run postgres migrations")]
pub struct RepoMigrationErr;

async fn client(pool: &Pool, on_err: RepoError) -> RepoResult<Object> {
    pool.get().await.change_context(on_err)
}

/// Classifies a failed write by the constraint postgres says it broke.
fn write_reason(err: &tokio_postgres::Error) -> Reason {
    match err.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => Reason::DuplicateKey,
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => Reason::ReferentialViolation,
        _ => Reason::Db,
    }
}
