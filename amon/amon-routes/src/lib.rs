use crate::error::AmonServiceError;
use error_stack::Report;

pub type ServiceResult<T> = Result<T, Report<AmonServiceError>>;

pub mod error;
mod metrics;
pub mod routes;
pub mod service;
pub mod state;
