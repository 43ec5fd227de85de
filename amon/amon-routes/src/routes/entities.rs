use super::{ENTITIES_PATH, ENTITY_PATH};
use crate::error::AmonServiceError;
use crate::routes::requests::{CreateEntityRequest, JsonPayload, UpsertEntityRequest};
use crate::routes::responses::{
    self, AmonError, EntitiesBody, EntityCreated, EntityDetailView, EntitySummaryView,
};
use crate::service::EntityService;
use amon_core::AmonEngine;
use amon_core::model::EntityDetail;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use routing::error::EndpointError;
use tracing::instrument;

type EndpointResult = Result<Response, EndpointError<AmonServiceError>>;

/// List every entity. Metering point ids are left out of the listing.
#[utoipa::path(
    get,
    path = ENTITIES_PATH,
    tag = "entities",
    responses(
        (status = OK, description = "All stored entities, possibly none", body = EntitiesBody<EntitySummaryView>),
    )
)]
#[instrument(skip(service), err(Debug))]
pub async fn list_entities<T: AmonEngine>(
    State(service): State<EntityService<T>>,
) -> EndpointResult {
    let entities = service.list_summaries().await?;

    Ok(EntitiesBody::new(entities.into_iter().map(EntitySummaryView::from).collect()).into_response())
}

/// Get an entity along with the ids of its metering points.
#[utoipa::path(
    get,
    path = ENTITY_PATH,
    tag = "entities",
    responses(
        (status = OK, description = "The entity was found", body = EntitiesBody<EntityDetailView>),
        (status = BAD_REQUEST, description = "The id is not a canonical UUID", body = AmonError),
        (status = NOT_FOUND, description = "No entity has this id", body = AmonError),
    ),
    params(
        ("entity_id" = String, Path, description = "Id of the entity to get")
    )
)]
#[instrument(skip(service), err(Debug))]
pub async fn get_entity<T: AmonEngine>(
    State(service): State<EntityService<T>>,
    Path(entity_id): Path<String>,
) -> EndpointResult {
    Ok(service.get(&entity_id).await?.into_response())
}

/// Create an entity. An id is generated when the request does not carry one.
#[utoipa::path(
    post,
    path = ENTITIES_PATH,
    tag = "entities",
    responses(
        (status = CREATED, description = "The entity was created", body = EntityCreated,
            headers(("Location" = String, description = "Where the new entity can be found"))),
        (status = BAD_REQUEST, description = "The id is malformed, or the body is empty or malformed", body = AmonError),
        (status = FORBIDDEN, description = "An entity with this id already exists", body = AmonError),
        (status = UNSUPPORTED_MEDIA_TYPE, description = "The body is not JSON", body = AmonError),
    ),
    request_body = CreateEntityRequest,
)]
#[instrument(skip(service), err(Debug))]
pub async fn create_entity<T: AmonEngine>(
    State(service): State<EntityService<T>>,
    JsonPayload(request): JsonPayload<CreateEntityRequest>,
) -> EndpointResult {
    let outcome = service
        .create(request.entity_id.as_deref(), request.description)
        .await?;

    Ok(outcome.into_response())
}

/// Replace the description of an entity, creating the entity if it does not exist.
#[utoipa::path(
    put,
    path = ENTITY_PATH,
    tag = "entities",
    responses(
        (status = CREATED, description = "No entity had this id, so it was created", body = EntityCreated,
            headers(("Location" = String, description = "Where the new entity can be found"))),
        (status = NO_CONTENT, description = "The entity was updated"),
        (status = BAD_REQUEST, description = "The id is malformed, or the body is empty or malformed", body = AmonError),
        (status = FORBIDDEN, description = "The entity changed concurrently and could not be written", body = AmonError),
        (status = UNSUPPORTED_MEDIA_TYPE, description = "The body is not JSON", body = AmonError),
    ),
    params(
        ("entity_id" = String, Path, description = "Id of the entity to create or update")
    ),
    request_body = UpsertEntityRequest,
)]
#[instrument(skip(service), err(Debug))]
pub async fn upsert_entity<T: AmonEngine>(
    State(service): State<EntityService<T>>,
    Path(entity_id): Path<String>,
    JsonPayload(request): JsonPayload<UpsertEntityRequest>,
) -> EndpointResult {
    Ok(service
        .upsert(&entity_id, request.description)
        .await?
        .into_response())
}

/// Delete an entity and every metering point it owns.
#[utoipa::path(
    delete,
    path = ENTITY_PATH,
    tag = "entities",
    responses(
        (status = NO_CONTENT, description = "The entity and its metering points were deleted"),
        (status = BAD_REQUEST, description = "The id is not a canonical UUID", body = AmonError),
        (status = NOT_FOUND, description = "No entity has this id", body = AmonError),
    ),
    params(
        ("entity_id" = String, Path, description = "Id of the entity to delete")
    )
)]
#[instrument(skip(service), err(Debug))]
pub async fn delete_entity<T: AmonEngine>(
    State(service): State<EntityService<T>>,
    Path(entity_id): Path<String>,
) -> EndpointResult {
    let outcome = service.delete(&entity_id).await?;

    Ok(responses::deletion::<EntityDetail>(outcome))
}
