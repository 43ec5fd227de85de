use crate::state::AmonAppState;
use amon_core::AmonEngine;
use axum::Router;
use const_format::concatcp;
use routing::router::RouterBuilder;
use tracing::info;
use utoipa::OpenApi;

mod entities;
mod metering_points;
pub mod requests;
pub mod responses;

pub const AMON_ROOT_PATH: &str = "/amon";

const ENTITIES_PATH: &str = "/entities";
const ENTITY_PATH: &str = concatcp!(ENTITIES_PATH, "/{entity_id}");
const METERING_POINTS_PATH: &str = "/metering-points";
const METERING_POINT_PATH: &str = concatcp!(METERING_POINTS_PATH, "/{metering_point_id}");

/// Absolute collection paths, used to build `Location` headers.
pub(crate) const ENTITIES_LOCATION: &str = concatcp!(AMON_ROOT_PATH, ENTITIES_PATH);
pub(crate) const METERING_POINTS_LOCATION: &str = concatcp!(AMON_ROOT_PATH, METERING_POINTS_PATH);

#[derive(OpenApi)]
#[openapi(
    nest(
        (path = AMON_ROOT_PATH, api = AmonDocs),
    )
)]
struct ApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        entities::list_entities,
        entities::get_entity,
        entities::create_entity,
        entities::upsert_entity,
        entities::delete_entity,
        metering_points::list_metering_points,
        metering_points::get_metering_point,
        metering_points::create_metering_point,
        metering_points::upsert_metering_point,
    ),
    tags(
        (name = "entities", description = "Entities and the metering points they own"),
        (name = "metering-points", description = "Metering points and their coordinates"),
    )
)]
struct AmonDocs;

pub fn build<T: AmonEngine>(app_state: AmonAppState<T>) -> Router {
    let builder = RouterBuilder::new(AMON_ROOT_PATH)
        .get(ENTITIES_PATH, entities::list_entities::<T>)
        .post(ENTITIES_PATH, entities::create_entity::<T>)
        .get(ENTITY_PATH, entities::get_entity::<T>)
        .put(ENTITY_PATH, entities::upsert_entity::<T>)
        .delete(ENTITY_PATH, entities::delete_entity::<T>)
        .get(METERING_POINTS_PATH, metering_points::list_metering_points::<T>)
        .post(METERING_POINTS_PATH, metering_points::create_metering_point::<T>)
        .get(METERING_POINT_PATH, metering_points::get_metering_point::<T>)
        .put(METERING_POINT_PATH, metering_points::upsert_metering_point::<T>);

    match app_state.metrics_handle.clone() {
        Some(handle) => {
            info!("metrics enabled, setting up metrics handler");
            builder.build_with_metrics(app_state, ApiDoc::openapi(), handle)
        }
        None => {
            info!("metrics not enabled, setting up service unavailable metrics handler");
            builder.build_no_metrics(app_state, ApiDoc::openapi())
        }
    }
}
