use crate::service::{EntityService, MeteringPointService};
use amon_core::AmonEngine;
use axum::extract::FromRef;
use error_stack::{Report, ResultExt};
use metrics_exporter_prometheus::PrometheusHandle;

pub type StateResult<T> = Result<T, Report<StateError>>;

#[derive(Debug, thiserror::Error)]
#[error("failed to build app state")]
pub struct StateError;

#[derive(Clone)]
pub struct AmonAppState<T: AmonEngine> {
    pub entities: EntityService<T>,
    pub metering_points: MeteringPointService<T>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl<T: AmonEngine> AmonAppState<T> {
    /// Installs the global metrics recorder, so this can only succeed once per process.
    pub fn new_with_metrics(engine: T) -> StateResult<Self> {
        let handle = routing::metrics::setup_recorder().change_context(StateError)?;

        Ok(Self {
            metrics_handle: Some(handle),
            ..Self::new_without_metrics(engine)
        })
    }

    pub fn new_without_metrics(engine: T) -> Self {
        Self {
            entities: EntityService::new(engine.clone()),
            metering_points: MeteringPointService::new(engine),
            metrics_handle: None,
        }
    }
}

impl<T: AmonEngine> FromRef<AmonAppState<T>> for EntityService<T> {
    fn from_ref(input: &AmonAppState<T>) -> Self {
        input.entities.clone()
    }
}

impl<T: AmonEngine> FromRef<AmonAppState<T>> for MeteringPointService<T> {
    fn from_ref(input: &AmonAppState<T>) -> Self {
        input.metering_points.clone()
    }
}
