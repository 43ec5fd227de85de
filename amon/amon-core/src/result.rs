use error_stack::Report;

pub type RepoResult<T> = Result<T, Report<RepoError>>;
pub type OptRepoResult<T> = Result<Option<T>, Report<RepoError>>;

#[derive(Debug, thiserror::Error, Copy, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error("failed to get resource")]
    Get,
    #[error("failed to list resources")]
    List,
    #[error("failed to insert resource: {0}")]
    Insert(Reason),
    #[error("failed to update resource: {0}")]
    Update(Reason),
    #[error("failed to delete resource")]
    Delete,
}

impl RepoError {
    pub fn reason(&self) -> Option<Reason> {
        match self {
            RepoError::Insert(reason) | RepoError::Update(reason) => Some(*reason),
            RepoError::Get | RepoError::List | RepoError::Delete => None,
        }
    }
}

#[derive(Debug, thiserror::Error, Copy, Clone, PartialEq, Eq)]
pub enum Reason {
    #[error("a resource with this id already exists")]
    DuplicateKey,
    #[error("the referenced parent resource does not exist")]
    ReferentialViolation,
    #[error("database call failed")]
    Db,
}

/// Pulls the write failure reason out of a store report, if there is one.
pub fn write_failure(report: &Report<RepoError>) -> Option<Reason> {
    report.current_context().reason()
}
