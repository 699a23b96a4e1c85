//! End-to-end placement scenarios across tracking, assets and session.

use arplace_assets::{AssetCache, AssetKind, AssetReference, AssetSource, NormalizeConfig};
use arplace_common::Ray;
use arplace_input::Action;
use arplace_session::{
    ActionOutcome, NoCapture, PlacementError, PlacementSession, SessionConfig, SessionEvent,
    SessionMode, Status,
};
use arplace_tracking::{ScriptedFrame, ScriptedOracle};
use glam::Vec3;
use std::collections::HashSet;

const TRIANGLE_OBJ: &str = "\
v 0 0 0
v 4 0 0
v 0 2 0
f 1 2 3
";

fn config() -> SessionConfig {
    SessionConfig {
        seed: Some(2024),
        ..SessionConfig::default()
    }
}

#[test]
fn unsupported_device_places_on_virtual_ground() {
    let mut session = PlacementSession::new(ScriptedOracle::unsupported(), config());
    assert_eq!(session.enter_session(), SessionMode::Simulation);
    assert_eq!(session.status(), Status::Simulation);

    let ray = Ray::new(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, -1.0, 0.0));
    let entity = session.place_active(Some(ray)).unwrap();
    assert_eq!(entity.position(), Vec3::ZERO);
    assert_eq!(entity.asset(), &AssetReference::cube());
    assert_eq!(session.entities().len(), 1);
}

#[test]
fn anchor_found_on_fourth_frame() {
    let mut session = PlacementSession::new(ScriptedOracle::new(), config());
    assert_eq!(session.enter_session(), SessionMode::Tracking);

    for _ in 0..3 {
        let outcomes =
            session.handle_frame(&ScriptedFrame::empty(), [Action::place()], &mut NoCapture);
        assert_eq!(
            outcomes,
            vec![ActionOutcome::Rejected(PlacementError::NotVisible)]
        );
        assert_eq!(session.status(), Status::DetectingSurface);
    }

    let target = Vec3::new(0.3, 0.0, -0.8);
    let outcomes =
        session.handle_frame(&ScriptedFrame::hit(target), [Action::place()], &mut NoCapture);
    assert_eq!(session.status(), Status::TrackingActive);
    match &outcomes[..] {
        [ActionOutcome::Placed(entity)] => assert_eq!(entity.position(), target),
        other => panic!("expected a placement, got {other:?}"),
    }
    assert_eq!(session.oracle().request_count(), 1);
}

#[test]
fn placements_have_unique_ids_until_reset() {
    let mut session = PlacementSession::new(ScriptedOracle::unsupported(), config());
    session.enter_session();
    for i in 0..25 {
        let ray = Ray::new(Vec3::new(i as f32 * 0.1, 1.6, 0.0), Vec3::NEG_Y);
        session.place_active(Some(ray)).unwrap();
    }
    let ids: HashSet<_> = session.entities().iter().map(|e| e.id()).collect();
    assert_eq!(ids.len(), 25);

    assert_eq!(session.reset(), 25);
    assert!(session.entities().is_empty());
    assert_eq!(session.mode(), SessionMode::Simulation);
}

#[test]
fn selecting_an_asset_leaves_placed_entities_alone() {
    let mut session = PlacementSession::new(ScriptedOracle::unsupported(), config());
    session.enter_session();
    let ray = Ray::new(Vec3::new(0.0, 1.6, 0.0), Vec3::NEG_Y);
    let cube = session.place_active(Some(ray)).unwrap();

    let chair = session.upload_asset(TRIANGLE_OBJ.as_bytes().to_vec(), "chair.obj");
    session.select_asset(AssetReference::cube());
    session.select_asset(chair.clone());
    let placed_chair = session.place_active(Some(ray)).unwrap();

    assert_eq!(session.entities()[0], cube);
    assert_eq!(session.entities()[0].asset(), &AssetReference::cube());
    assert_eq!(placed_chair.asset(), &chair);
    assert_eq!(chair.kind(), AssetKind::Obj);
}

#[test]
fn entities_sharing_an_asset_normalize_independently() {
    let mut session = PlacementSession::new(ScriptedOracle::unsupported(), config());
    session.enter_session();
    session.upload_asset(TRIANGLE_OBJ.as_bytes().to_vec(), "triangle.obj");
    let ray = Ray::new(Vec3::new(0.0, 1.6, 0.0), Vec3::NEG_Y);
    let first = session.place_active(Some(ray)).unwrap();
    let second = session.place_active(Some(ray)).unwrap();
    assert_eq!(first.asset(), second.asset());

    let mut cache = AssetCache::new();
    let normalize = NormalizeConfig::default();
    let source: &dyn AssetSource = session.store();
    let mut a = cache.resolve(source, first.asset(), &normalize).unwrap();
    let b = cache.resolve(source, second.asset(), &normalize).unwrap();
    assert_eq!(cache.len(), 1);

    let fitted = a.bounds().unwrap().max_dimension();
    assert!((fitted - 0.5).abs() < 1e-5);

    a.root.transform.position = Vec3::splat(9.0);
    a.root.surfaces[0].positions.clear();
    assert_eq!(b.root.transform.position, Vec3::ZERO);
    assert_eq!(b.root.surfaces[0].positions.len(), 3);
}

#[test]
fn broken_upload_is_remembered_as_a_failure() {
    let mut session = PlacementSession::new(ScriptedOracle::unsupported(), config());
    let broken = session.upload_asset(vec![0xff, 0x00, 0x13], "broken.fbx");
    let mut cache = AssetCache::new();
    let normalize = NormalizeConfig::default();
    assert!(cache.resolve(session.store(), &broken, &normalize).is_err());
    assert!(cache.resolve(session.store(), &broken, &normalize).is_err());
    assert_eq!(cache.len(), 1);
}

#[test]
fn device_ending_the_session_returns_to_menu() {
    let mut session = PlacementSession::new(ScriptedOracle::new(), config());
    session.enter_session();
    session.handle_frame(
        &ScriptedFrame::hit(Vec3::ZERO),
        [Action::place()],
        &mut NoCapture,
    );
    session.drain_events();

    session.oracle_mut().interrupt();
    session.update(&ScriptedFrame::empty());

    assert_eq!(session.mode(), SessionMode::Menu);
    assert_eq!(session.entities().len(), 1);
    assert!(session.events().contains(&SessionEvent::ModeChanged {
        from: SessionMode::Tracking,
        to: SessionMode::Menu,
    }));

    let outcomes = session.handle_frame(&ScriptedFrame::empty(), [Action::place()], &mut NoCapture);
    assert_eq!(
        outcomes,
        vec![ActionOutcome::Rejected(PlacementError::NotPlaying)]
    );
}

#[test]
fn start_failure_degrades_to_simulation() {
    let oracle = ScriptedOracle::new().with_start_failure("permission denied");
    let mut session = PlacementSession::new(oracle, config());
    let outcomes = session.handle_frame(
        &ScriptedFrame::empty(),
        [
            Action::EnterSession,
            Action::place_along(Ray::new(Vec3::new(1.0, 2.0, 1.0), Vec3::NEG_Y)),
        ],
        &mut NoCapture,
    );
    assert_eq!(outcomes[0], ActionOutcome::Mode(SessionMode::Simulation));
    assert!(matches!(outcomes[1], ActionOutcome::Placed(_)));
    assert_eq!(session.status(), Status::TrackingFailed);
}
