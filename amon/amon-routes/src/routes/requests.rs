use amon_core::model::Coordinates;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, header};
use optional_field::{Field, serde_optional_fields};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{PartialSchema, ToSchema};

/// JSON request body. Unlike [`axum::Json`] this tells an empty body apart from
/// a malformed one, and never answers with 422.
#[derive(Debug)]
pub struct JsonPayload<T>(pub T);

#[derive(Debug, thiserror::Error)]
pub enum PayloadRejection {
    #[error("expected request with `Content-Type: application/json`")]
    UnsupportedMediaType,
    #[error("request body is empty")]
    EmptyBody,
    #[error("failed to parse request body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("failed to read request body")]
    Unreadable(#[from] BytesRejection),
}

impl<T, S> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = PayloadRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(PayloadRejection::UnsupportedMediaType);
        }

        let bytes = Bytes::from_request(req, state).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(PayloadRejection::EmptyBody);
        }

        Ok(JsonPayload(serde_json::from_slice(&bytes)?))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json")
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

pub fn nullable_coordinates_schema() -> impl Into<RefOr<Schema>> {
    <Option<Coordinates> as PartialSchema>::schema()
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityRequest {
    /// Id for the new entity. A fresh one is generated when left out.
    pub entity_id: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertEntityRequest {
    /// Replaces the stored description. Left out or null clears it.
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeteringPointRequest {
    pub metering_point_id: Option<String>,
    /// The entity that owns the new metering point. Must already exist.
    pub entity_id: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<Coordinates>,
}

#[serde_optional_fields]
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMeteringPointRequest {
    /// Moves the metering point to this entity. Required when the metering point does not exist yet.
    pub entity_id: Option<String>,
    /// Replaces the stored description. Left out or null clears it.
    pub description: Option<String>,
    /// Left out keeps the stored coordinates, null clears them.
    #[schema(schema_with = nullable_coordinates_schema)]
    pub metadata: Field<Coordinates>,
}
