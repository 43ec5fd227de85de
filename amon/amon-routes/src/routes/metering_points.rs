use super::{METERING_POINT_PATH, METERING_POINTS_PATH};
use crate::error::AmonServiceError;
use crate::routes::requests::{
    CreateMeteringPointRequest, JsonPayload, UpsertMeteringPointRequest,
};
use crate::routes::responses::{
    AmonError, MeteringPointCreated, MeteringPointView, MeteringPointsBody,
};
use crate::service::{CreateOutcome, IdProblem, MeteringPointService};
use amon_core::AmonEngine;
use amon_core::model::MeteringPoint;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use routing::error::EndpointError;
use tracing::instrument;

type EndpointResult = Result<Response, EndpointError<AmonServiceError>>;

#[utoipa::path(
    get,
    path = METERING_POINTS_PATH,
    tag = "metering-points",
    responses(
        (status = OK, description = "All stored metering points, possibly none", body = MeteringPointsBody<MeteringPointView>),
    )
)]
#[instrument(skip(service), err(Debug))]
pub async fn list_metering_points<T: AmonEngine>(
    State(service): State<MeteringPointService<T>>,
) -> EndpointResult {
    let metering_points = service.list().await?;

    Ok(MeteringPointsBody::new(
        metering_points
            .into_iter()
            .map(MeteringPointView::from)
            .collect(),
    )
    .into_response())
}

#[utoipa::path(
    get,
    path = METERING_POINT_PATH,
    tag = "metering-points",
    responses(
        (status = OK, description = "The metering point was found", body = MeteringPointsBody<MeteringPointView>),
        (status = BAD_REQUEST, description = "The id is not a canonical UUID", body = AmonError),
        (status = NOT_FOUND, description = "No metering point has this id", body = AmonError),
    ),
    params(
        ("metering_point_id" = String, Path, description = "Id of the metering point to get")
    )
)]
#[instrument(skip(service), err(Debug))]
pub async fn get_metering_point<T: AmonEngine>(
    State(service): State<MeteringPointService<T>>,
    Path(metering_point_id): Path<String>,
) -> EndpointResult {
    Ok(service.get(&metering_point_id).await?.into_response())
}

/// Create a metering point under an existing entity.
#[utoipa::path(
    post,
    path = METERING_POINTS_PATH,
    tag = "metering-points",
    responses(
        (status = CREATED, description = "The metering point was created", body = MeteringPointCreated,
            headers(("Location" = String, description = "Where the new metering point can be found"))),
        (status = BAD_REQUEST, description = "An id is missing, malformed or names an unknown entity, or the body is empty or malformed", body = AmonError),
        (status = FORBIDDEN, description = "A metering point with this id already exists", body = AmonError),
        (status = UNSUPPORTED_MEDIA_TYPE, description = "The body is not JSON", body = AmonError),
    ),
    request_body = CreateMeteringPointRequest,
)]
#[instrument(skip(service), err(Debug))]
pub async fn create_metering_point<T: AmonEngine>(
    State(service): State<MeteringPointService<T>>,
    JsonPayload(request): JsonPayload<CreateMeteringPointRequest>,
) -> EndpointResult {
    let (metering_point_id, entity_id) = match (request.metering_point_id, request.entity_id) {
        (Some(metering_point_id), Some(entity_id)) => (metering_point_id, entity_id),
        (None, _) => return Ok(missing(IdProblem::MissingId)),
        (_, None) => return Ok(missing(IdProblem::MissingEntityId)),
    };

    let outcome = service
        .create(
            &metering_point_id,
            &entity_id,
            request.description,
            request.metadata,
        )
        .await?;

    Ok(outcome.into_response())
}

fn missing(problem: IdProblem) -> Response {
    CreateOutcome::<MeteringPoint>::InvalidId(problem).into_response()
}

/// Create or rewrite a metering point. Sending a different `entityId` moves it
/// to that entity; leaving `metadata` out keeps the stored coordinates.
#[utoipa::path(
    put,
    path = METERING_POINT_PATH,
    tag = "metering-points",
    responses(
        (status = CREATED, description = "No metering point had this id, so it was created", body = MeteringPointCreated,
            headers(("Location" = String, description = "Where the new metering point can be found"))),
        (status = NO_CONTENT, description = "The metering point was updated"),
        (status = BAD_REQUEST, description = "An id is missing, malformed or names an unknown entity, or the body is empty or malformed", body = AmonError),
        (status = FORBIDDEN, description = "The metering point changed concurrently and could not be written", body = AmonError),
        (status = UNSUPPORTED_MEDIA_TYPE, description = "The body is not JSON", body = AmonError),
    ),
    params(
        ("metering_point_id" = String, Path, description = "Id of the metering point to create or update")
    ),
    request_body = UpsertMeteringPointRequest,
)]
#[instrument(skip(service), err(Debug))]
pub async fn upsert_metering_point<T: AmonEngine>(
    State(service): State<MeteringPointService<T>>,
    Path(metering_point_id): Path<String>,
    JsonPayload(request): JsonPayload<UpsertMeteringPointRequest>,
) -> EndpointResult {
    let outcome = service
        .upsert(
            &metering_point_id,
            request.entity_id.as_deref(),
            request.description,
            request.metadata,
        )
        .await?;

    Ok(outcome.into_response())
}
