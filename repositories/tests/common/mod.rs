//! Behaviour every store has to share. Each backend's test target drives these.

use amon_core::model::{Coordinates, Entity, MeteringPoint};
use amon_core::result::{Reason, RepoError, write_failure};
use amon_core::{AmonEngine, EntityRepository, MeteringPointRepository};
use ids::ResourceId;

pub fn entity(description: &str) -> Entity {
    Entity::new(ResourceId::generate(), Some(description.to_string()))
}

pub fn metering_point(entity_id: ResourceId) -> MeteringPoint {
    MeteringPoint::new(
        ResourceId::generate(),
        entity_id,
        Some("boiler room".to_string()),
        Coordinates {
            x: Some(1.5),
            y: None,
            z: Some(-3.0),
        },
    )
}

fn sorted(mut ids: Vec<ResourceId>) -> Vec<ResourceId> {
    ids.sort();
    ids
}

pub async fn get_absent_entity_returns_none(engine: impl AmonEngine) {
    let found = engine
        .entities()
        .get(ResourceId::generate())
        .await
        .unwrap();

    assert!(found.is_none());
}

pub async fn insert_then_get_returns_entity(engine: impl AmonEngine) {
    let entities = engine.entities();
    let new = entity("lobby sensor");

    let inserted = entities.insert(new.clone()).await.unwrap();
    let found = entities.get(new.id).await.unwrap();

    assert_eq!(new, inserted);
    assert_eq!(Some(new), found);
}

pub async fn insert_entity_without_description(engine: impl AmonEngine) {
    let entities = engine.entities();
    let new = Entity::new(ResourceId::generate(), None);

    entities.insert(new.clone()).await.unwrap();
    let found = entities.get(new.id).await.unwrap();

    assert_eq!(Some(new), found);
}

pub async fn duplicate_entity_insert_fails_and_keeps_first(engine: impl AmonEngine) {
    let entities = engine.entities();
    let first = entity("first");
    let second = Entity::new(first.id, Some("second".to_string()));

    entities.insert(first.clone()).await.unwrap();
    let err = entities.insert(second).await.unwrap_err();
    let found = entities.get(first.id).await.unwrap();

    assert_eq!(&RepoError::Insert(Reason::DuplicateKey), err.current_context());
    assert_eq!(Some(Reason::DuplicateKey), write_failure(&err));
    assert_eq!(Some(first), found);
}

pub async fn list_returns_every_entity(engine: impl AmonEngine) {
    let entities = engine.entities();
    let a = entity("a");
    let b = entity("b");
    entities.insert(a.clone()).await.unwrap();
    entities.insert(b.clone()).await.unwrap();

    let listed = entities.list().await.unwrap();

    assert_eq!(
        sorted(vec![a.id, b.id]),
        sorted(listed.iter().map(|e| e.id).collect())
    );
}

pub async fn list_with_no_entities_is_empty(engine: impl AmonEngine) {
    assert!(engine.entities().list().await.unwrap().is_empty());
}

pub async fn update_replaces_entity_description(engine: impl AmonEngine) {
    let entities = engine.entities();
    let original = entity("before");
    entities.insert(original.clone()).await.unwrap();

    let updated = Entity::new(original.id, None);
    entities.update(updated.clone()).await.unwrap();

    assert_eq!(Some(updated), entities.get(original.id).await.unwrap());
}

pub async fn metering_point_insert_then_get(engine: impl AmonEngine) {
    let parent = entity("parent");
    engine.entities().insert(parent.clone()).await.unwrap();
    let new = metering_point(parent.id);

    engine.metering_points().insert(new.clone()).await.unwrap();

    assert_eq!(
        Some(new.clone()),
        engine.metering_points().get(new.id).await.unwrap()
    );
}

pub async fn metering_point_insert_with_unknown_entity_fails(engine: impl AmonEngine) {
    let orphan = metering_point(ResourceId::generate());

    let err = engine
        .metering_points()
        .insert(orphan.clone())
        .await
        .unwrap_err();

    assert_eq!(
        &RepoError::Insert(Reason::ReferentialViolation),
        err.current_context()
    );
    assert!(
        engine
            .metering_points()
            .get(orphan.id)
            .await
            .unwrap()
            .is_none()
    );
}

pub async fn duplicate_metering_point_insert_fails(engine: impl AmonEngine) {
    let parent = entity("parent");
    engine.entities().insert(parent.clone()).await.unwrap();
    let first = metering_point(parent.id);
    engine.metering_points().insert(first.clone()).await.unwrap();

    let err = engine
        .metering_points()
        .insert(first.clone())
        .await
        .unwrap_err();

    assert_eq!(Some(Reason::DuplicateKey), write_failure(&err));
}

pub async fn metering_point_update_reparents(engine: impl AmonEngine) {
    let old_parent = entity("old");
    let new_parent = entity("new");
    engine.entities().insert(old_parent.clone()).await.unwrap();
    engine.entities().insert(new_parent.clone()).await.unwrap();
    let original = metering_point(old_parent.id);
    engine.metering_points().insert(original.clone()).await.unwrap();

    let moved = MeteringPoint {
        entity_id: new_parent.id,
        ..original.clone()
    };
    engine.metering_points().update(moved.clone()).await.unwrap();

    let metering_points = engine.metering_points();
    assert_eq!(Some(moved), metering_points.get(original.id).await.unwrap());
    assert!(
        metering_points
            .list_for_entity(old_parent.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        vec![original.id],
        metering_points
            .list_for_entity(new_parent.id)
            .await
            .unwrap()
            .into_iter()
            .map(|mp| mp.id)
            .collect::<Vec<_>>()
    );
}

pub async fn metering_point_update_to_unknown_entity_fails(engine: impl AmonEngine) {
    let parent = entity("parent");
    engine.entities().insert(parent.clone()).await.unwrap();
    let original = metering_point(parent.id);
    engine.metering_points().insert(original.clone()).await.unwrap();

    let err = engine
        .metering_points()
        .update(MeteringPoint {
            entity_id: ResourceId::generate(),
            ..original.clone()
        })
        .await
        .unwrap_err();

    assert_eq!(
        &RepoError::Update(Reason::ReferentialViolation),
        err.current_context()
    );
    assert_eq!(
        Some(original.clone()),
        engine.metering_points().get(original.id).await.unwrap()
    );
}

pub async fn list_for_entity_only_returns_its_children(engine: impl AmonEngine) {
    let a = entity("a");
    let b = entity("b");
    engine.entities().insert(a.clone()).await.unwrap();
    engine.entities().insert(b.clone()).await.unwrap();
    let a1 = metering_point(a.id);
    let a2 = metering_point(a.id);
    let b1 = metering_point(b.id);
    for mp in [&a1, &a2, &b1] {
        engine.metering_points().insert(mp.clone()).await.unwrap();
    }

    let children = engine.metering_points().list_for_entity(a.id).await.unwrap();
    let all = engine.metering_points().list().await.unwrap();

    assert_eq!(
        sorted(vec![a1.id, a2.id]),
        sorted(children.into_iter().map(|mp| mp.id).collect())
    );
    assert_eq!(3, all.len());
}

pub async fn deleting_entity_removes_its_metering_points(engine: impl AmonEngine) {
    let doomed = entity("doomed");
    let survivor = entity("survivor");
    engine.entities().insert(doomed.clone()).await.unwrap();
    engine.entities().insert(survivor.clone()).await.unwrap();
    let child1 = metering_point(doomed.id);
    let child2 = metering_point(doomed.id);
    let other = metering_point(survivor.id);
    for mp in [&child1, &child2, &other] {
        engine.metering_points().insert(mp.clone()).await.unwrap();
    }

    engine.entities().delete(doomed.id).await.unwrap();

    let metering_points = engine.metering_points();
    assert!(engine.entities().get(doomed.id).await.unwrap().is_none());
    assert!(metering_points.get(child1.id).await.unwrap().is_none());
    assert!(metering_points.get(child2.id).await.unwrap().is_none());
    assert_eq!(
        Some(other.clone()),
        metering_points.get(other.id).await.unwrap()
    );
}

pub async fn deleting_metering_point_leaves_siblings(engine: impl AmonEngine) {
    let parent = entity("parent");
    engine.entities().insert(parent.clone()).await.unwrap();
    let gone = metering_point(parent.id);
    let kept = metering_point(parent.id);
    engine.metering_points().insert(gone.clone()).await.unwrap();
    engine.metering_points().insert(kept.clone()).await.unwrap();

    engine.metering_points().delete(gone.id).await.unwrap();

    let remaining = engine
        .metering_points()
        .list_for_entity(parent.id)
        .await
        .unwrap();
    assert_eq!(vec![kept], remaining);
}
