use crate::routes::requests::PayloadRejection;
use crate::routes::{ENTITIES_LOCATION, METERING_POINTS_LOCATION};
use crate::service::{CreateOutcome, DeleteOutcome, GetOutcome, UpsertOutcome};
use amon_core::model::{Coordinates, Entity, EntityDetail, MeteringPoint};
use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use ids::ResourceId;
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;
use utoipa::ToSchema;

/// Client facing messages for one kind of resource.
pub struct Messages {
    pub not_found: &'static str,
    pub invalid: &'static str,
    pub already_exists: &'static str,
}

/// How a resource shows up in responses. Every outcome the services report is
/// turned into a status code, body and headers from this alone.
pub trait AmonResource {
    const MESSAGES: Messages;

    fn location(id: ResourceId) -> String;

    fn id(&self) -> ResourceId;

    fn found_body(self) -> impl Serialize;

    fn created_body(id: ResourceId) -> impl Serialize;
}

impl AmonResource for EntityDetail {
    const MESSAGES: Messages = Messages {
        not_found: "Entity not found",
        invalid: "Invalid entity parameters",
        already_exists: "The entity already exists",
    };

    fn location(id: ResourceId) -> String {
        format!("{ENTITIES_LOCATION}/{id}")
    }

    fn id(&self) -> ResourceId {
        self.id
    }

    fn found_body(self) -> impl Serialize {
        EntitiesBody::new(vec![EntityDetailView::from(self)])
    }

    fn created_body(id: ResourceId) -> impl Serialize {
        EntityCreated { entity_id: id }
    }
}

impl AmonResource for MeteringPoint {
    const MESSAGES: Messages = Messages {
        not_found: "Metering Point not found",
        invalid: "Invalid metering point parameters",
        already_exists: "The metering point already exists",
    };

    fn location(id: ResourceId) -> String {
        format!("{METERING_POINTS_LOCATION}/{id}")
    }

    fn id(&self) -> ResourceId {
        self.id
    }

    fn found_body(self) -> impl Serialize {
        MeteringPointsBody::new(vec![MeteringPointView::from(self)])
    }

    fn created_body(id: ResourceId) -> impl Serialize {
        MeteringPointCreated {
            metering_point_id: id,
        }
    }
}

impl<R: AmonResource> IntoResponse for GetOutcome<R> {
    fn into_response(self) -> Response {
        match self {
            GetOutcome::Found(resource) => {
                (StatusCode::OK, Json(resource.found_body())).into_response()
            }
            GetOutcome::InvalidId(problem) => AmonError::invalid::<R>(problem).into_response(),
            GetOutcome::NotFound => AmonError::not_found(R::MESSAGES.not_found).into_response(),
        }
    }
}

impl<R: AmonResource> IntoResponse for CreateOutcome<R> {
    fn into_response(self) -> Response {
        match self {
            CreateOutcome::Created(resource) => created(&resource),
            CreateOutcome::InvalidId(problem) => AmonError::invalid::<R>(problem).into_response(),
            CreateOutcome::AlreadyExists => {
                AmonError::forbidden(R::MESSAGES.already_exists).into_response()
            }
        }
    }
}

impl<R: AmonResource> IntoResponse for UpsertOutcome<R> {
    fn into_response(self) -> Response {
        match self {
            UpsertOutcome::Created(resource) => created(&resource),
            UpsertOutcome::Updated => StatusCode::NO_CONTENT.into_response(),
            UpsertOutcome::InvalidId(problem) => AmonError::invalid::<R>(problem).into_response(),
            UpsertOutcome::AlreadyExists => {
                AmonError::forbidden(R::MESSAGES.already_exists).into_response()
            }
        }
    }
}

pub fn deletion<R: AmonResource>(outcome: DeleteOutcome) -> Response {
    match outcome {
        DeleteOutcome::Deleted => StatusCode::NO_CONTENT.into_response(),
        DeleteOutcome::InvalidId(problem) => AmonError::invalid::<R>(problem).into_response(),
        DeleteOutcome::NotFound => AmonError::not_found(R::MESSAGES.not_found).into_response(),
    }
}

/// 201 with a `Location` a client can GET straight away.
fn created<R: AmonResource>(resource: &R) -> Response {
    let id = resource.id();
    (
        StatusCode::CREATED,
        [(header::LOCATION, R::location(id))],
        Json(R::created_body(id)),
    )
        .into_response()
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityCreated {
    entity_id: ResourceId,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeteringPointCreated {
    metering_point_id: ResourceId,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntitiesBody<V> {
    entities: Vec<V>,
}

impl<V> EntitiesBody<V> {
    pub fn new(entities: Vec<V>) -> Self {
        Self { entities }
    }
}

impl<V: Serialize> IntoResponse for EntitiesBody<V> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeteringPointsBody<V> {
    metering_points: Vec<V>,
}

impl<V> MeteringPointsBody<V> {
    pub fn new(metering_points: Vec<V>) -> Self {
        Self { metering_points }
    }
}

impl<V: Serialize> IntoResponse for MeteringPointsBody<V> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummaryView {
    entity_id: ResourceId,
    description: Option<String>,
}

impl From<Entity> for EntitySummaryView {
    fn from(entity: Entity) -> Self {
        Self {
            entity_id: entity.id,
            description: entity.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetailView {
    entity_id: ResourceId,
    description: Option<String>,
    metering_point_ids: Vec<ResourceId>,
}

impl From<EntityDetail> for EntityDetailView {
    fn from(detail: EntityDetail) -> Self {
        Self {
            entity_id: detail.id,
            description: detail.description,
            metering_point_ids: detail.metering_point_ids,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeteringPointView {
    metering_point_id: ResourceId,
    entity_id: ResourceId,
    description: Option<String>,
    metadata: Coordinates,
}

impl From<MeteringPoint> for MeteringPointView {
    fn from(metering_point: MeteringPoint) -> Self {
        Self {
            metering_point_id: metering_point.id,
            entity_id: metering_point.entity_id,
            description: metering_point.description,
            metadata: metering_point.metadata,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AmonError {
    #[serde(skip)]
    status_code: StatusCode,
    message: Cow<'static, str>,
}

pub type ErrorMessageType = Cow<'static, str>;

impl AmonError {
    pub fn new(status_code: StatusCode, message: impl Into<ErrorMessageType>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    fn invalid<R: AmonResource>(problem: impl std::fmt::Display) -> Self {
        debug!("rejecting request: {problem}");
        Self::bad_request(format!("{}: {problem}", R::MESSAGES.invalid))
    }
}

impl IntoResponse for AmonError {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

impl IntoResponse for PayloadRejection {
    fn into_response(self) -> Response {
        let status_code = match &self {
            PayloadRejection::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            PayloadRejection::EmptyBody | PayloadRejection::Malformed(_) => StatusCode::BAD_REQUEST,
            PayloadRejection::Unreadable(rejection) => rejection.status(),
        };
        debug!("rejecting request payload: {self}");
        AmonError::new(status_code, self.to_string()).into_response()
    }
}
