use sliding_door::animation::EasingCurve;
use sliding_door::audio::CueClip;
use sliding_door::config::DoorSettings;
use sliding_door::controllers::SlidingDoorController;
use sliding_door::errors::DoorError;
use sliding_door::models::{
    Direction, DoorEvent, DoorEventKind, DoorRequest, DoorState, EntityId, LeafPose, OperationMode,
    PendingKind, PendingOperation, RejectReason, Vec3,
};
use sliding_door::rig::{PoseMotion, RecordingRig};
use sliding_door::sensors::SensorListener;

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn closed_pose() -> LeafPose {
    LeafPose::new(Vec3::new(-0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0))
}

fn open_pose() -> LeafPose {
    LeafPose::new(Vec3::new(-1.5, 0.0, 0.0), Vec3::new(1.5, 0.0, 0.0))
}

fn create_mock_settings() -> DoorSettings {
    DoorSettings {
        name: "test-door".to_string(),
        left_open_offset: Vec3::new(-1.0, 0.0, 0.0),
        right_open_offset: Vec3::new(1.0, 0.0, 0.0),
        transition_duration: 1.0,
        operation_mode: OperationMode::Normal,
        locking_enabled: true,
        door_locked: false,
        play_close_cue_reversed: false,
        easing_curve: EasingCurve::Linear,
        delayed_close_grace: 0.25,
        cue_clip_length: 2.0,
        reconcile_interval: 0.0,
    }
}

fn create_door(settings: DoorSettings) -> SlidingDoorController<RecordingRig> {
    SlidingDoorController::new(settings, RecordingRig::new(closed_pose())).unwrap()
}

/// Ticks in quarter seconds until the door stops moving, with an upper bound.
fn run_until_settled(door: &mut SlidingDoorController<RecordingRig>) {
    for _ in 0..64 {
        if !door.state().is_moving() {
            return;
        }
        door.tick(0.25);
    }
    panic!("door never settled; still {}", door.state());
}

fn open_door(door: &mut SlidingDoorController<RecordingRig>) {
    door.request_open(false);
    run_until_settled(door);
    assert_eq!(door.state(), DoorState::Open);
}

fn kinds(events: &[DoorEvent]) -> Vec<DoorEventKind> {
    events.iter().map(|e| e.kind.clone()).collect()
}

#[test]
fn test_open_completes_after_transition_duration() {
    let mut door = create_door(create_mock_settings());
    door.request_open(false);
    assert_eq!(door.state(), DoorState::Opening);

    for _ in 0..3 {
        door.tick(0.25);
        assert_eq!(door.state(), DoorState::Opening);
    }
    door.tick(0.25);

    assert_eq!(door.state(), DoorState::Open);
    assert_eq!(door.leaf_pose(), open_pose());
    assert_eq!(door.rig().pose(), Some(open_pose()));
    assert_eq!(door.rig().animated_frames(), 4);

    let cue = door.rig().last_cue().unwrap();
    assert_eq!(cue.clip, CueClip::Open);
    assert_eq!(cue.offset, 0.0);
    assert_eq!(cue.rate, 1.0);
}

#[test]
fn test_close_waits_for_occupants_then_closes() {
    let mut settings = create_mock_settings();
    settings.operation_mode = OperationMode::ProximitySensor;
    let mut door = create_door(settings);

    door.on_entity_entered(EntityId(1));
    door.on_entity_entered(EntityId(2));
    run_until_settled(&mut door);
    assert_eq!(door.state(), DoorState::Open);
    assert_eq!(door.occupancy(), 2);
    door.drain_events();

    door.request_close(false);
    assert_eq!(door.state(), DoorState::Open);
    assert!(kinds(&door.drain_events()).contains(&DoorEventKind::RequestRejected {
        request: DoorRequest::Close { force: false },
        reason: RejectReason::Occupied(2),
    }));

    door.on_entity_exited(EntityId(1));
    assert_eq!(door.state(), DoorState::Open);
    door.on_entity_exited(EntityId(2));
    assert_eq!(door.occupancy(), 0);
    assert_eq!(door.scheduled_calls(), 1);

    door.tick(0.25);
    assert_eq!(door.state(), DoorState::Closing);
    run_until_settled(&mut door);
    assert_eq!(door.state(), DoorState::Closed);
    assert_eq!(door.leaf_pose(), closed_pose());
}

#[test]
fn test_forced_close_mid_opening_reverses_progress() {
    let mut door = create_door(create_mock_settings());
    door.request_open(false);
    door.tick(0.3);
    assert!(approx_eq(door.progress(), 0.3));
    let before = door.leaf_pose();

    door.request_close(true);
    assert_eq!(door.state(), DoorState::Closing);
    assert!(approx_eq(door.progress(), 0.7));
    assert!(door.leaf_pose().max_distance(before) < EPSILON);

    let events = kinds(&door.drain_events());
    assert!(events.iter().any(|kind| matches!(
        kind,
        DoorEventKind::TransitionReversed { to: Direction::Closing, progress } if approx_eq(*progress, 0.7)
    )));

    door.tick(0.1);
    assert!(approx_eq(door.progress(), 0.8));
    assert!(approx_eq(door.open_fraction(), 0.2));

    run_until_settled(&mut door);
    assert_eq!(door.state(), DoorState::Closed);
}

#[test]
fn test_force_clear_snaps_closed_without_animating() {
    let mut door = create_door(create_mock_settings());
    door.on_entity_entered(EntityId(1));
    door.tick(0.25);
    door.tick(0.25);
    assert_eq!(door.state(), DoorState::Opening);
    assert_eq!(door.occupancy(), 1);

    let frames_before = door.rig().frames.len();
    door.force_clear();

    assert_eq!(door.state(), DoorState::Closed);
    assert_eq!(door.occupancy(), 0);
    assert_eq!(door.leaf_pose(), closed_pose());
    assert_eq!(door.rig().pose(), Some(closed_pose()));
    assert_eq!(door.rig().frames.len(), frames_before + 1);
    assert_eq!(door.rig().frames.last().map(|(_, motion)| *motion), Some(PoseMotion::Snapped));
    assert_eq!(door.rig().cue_stops, 1);
    assert!(kinds(&door.drain_events()).contains(&DoorEventKind::Cleared));

    door.tick(0.25);
    assert_eq!(door.rig().frames.len(), frames_before + 1);
    assert!(door.is_idle());
}

#[test]
fn test_unlock_resets_occupancy() {
    let mut door = create_door(create_mock_settings());
    door.on_sensor_activated(3);
    assert_eq!(door.operation_mode(), OperationMode::ProximitySensor);
    assert_eq!(door.occupancy(), 3);

    door.lock();
    door.unlock();
    assert_eq!(door.occupancy(), 0);
    assert!(!door.is_locked());

    let mut settings = create_mock_settings();
    settings.locking_enabled = false;
    let mut door = create_door(settings);
    door.on_sensor_activated(2);
    door.unlock();
    assert_eq!(door.occupancy(), 0);
}

#[test]
fn test_exit_on_empty_region_clamps_at_zero() {
    let mut door = create_door(create_mock_settings());
    door.on_entity_exited(EntityId(9));
    door.on_entity_exited(EntityId(9));

    assert_eq!(door.occupancy(), 0);
    let underflows = door
        .drain_events()
        .iter()
        .filter(|e| e.kind == DoorEventKind::OccupancyUnderflow)
        .count();
    assert_eq!(underflows, 2);
}

#[test]
fn test_locked_door_never_starts_opening() {
    let mut settings = create_mock_settings();
    settings.door_locked = true;
    let mut door = create_door(settings);
    assert!(door.is_effectively_locked());

    door.request_open(false);
    door.request_open(true);
    door.on_entity_entered(EntityId(1));
    door.tick(0.25);

    assert_eq!(door.state(), DoorState::Closed);
    let rejections = door
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e.kind, DoorEventKind::RequestRejected { reason: RejectReason::Locked, .. }))
        .count();
    assert_eq!(rejections, 3);
}

#[test]
fn test_lock_flag_ignored_when_locking_disabled() {
    let mut settings = create_mock_settings();
    settings.locking_enabled = false;
    settings.door_locked = true;
    let mut door = create_door(settings);
    assert!(door.is_locked());
    assert!(!door.is_effectively_locked());

    door.request_open(false);
    assert_eq!(door.state(), DoorState::Opening);

    door.set_locking_enabled(true);
    assert!(door.is_effectively_locked());
}

#[test]
fn test_manual_open_rejected_in_proximity_mode() {
    let mut settings = create_mock_settings();
    settings.operation_mode = OperationMode::ProximitySensor;
    let mut door = create_door(settings);

    door.request_open(false);
    assert_eq!(door.state(), DoorState::Closed);
    assert!(kinds(&door.drain_events()).contains(&DoorEventKind::RequestRejected {
        request: DoorRequest::Open { triggered_by_sensor: false },
        reason: RejectReason::SensorModeOnly,
    }));

    door.request_open(true);
    assert_eq!(door.state(), DoorState::Opening);
}

#[test]
fn test_repeated_requests_are_no_ops() {
    let mut door = create_door(create_mock_settings());
    door.request_close(false);
    door.request_close(true);
    assert!(door.drain_events().is_empty());

    door.request_open(false);
    door.tick(0.25);
    door.drain_events();
    let progress = door.progress();

    door.request_open(false);
    door.request_open(true);
    assert!(door.drain_events().is_empty());
    assert_eq!(door.progress(), progress);
    assert_eq!(door.state(), DoorState::Opening);
    assert_eq!(door.pending(), None);
}

#[test]
fn test_toggle_follows_resting_state() {
    let mut door = create_door(create_mock_settings());
    door.toggle();
    assert_eq!(door.state(), DoorState::Opening);
    door.toggle();
    assert_eq!(door.state(), DoorState::Opening);

    run_until_settled(&mut door);
    door.toggle();
    assert_eq!(door.state(), DoorState::Closing);
}

#[test]
fn test_pending_close_dropped_when_still_occupied() {
    let mut door = create_door(create_mock_settings());
    door.on_entity_entered(EntityId(1));
    door.tick(0.25);

    door.request_close(false);
    assert_eq!(door.state(), DoorState::Opening);
    assert_eq!(door.pending(), Some(PendingOperation::close()));

    run_until_settled(&mut door);
    assert_eq!(door.state(), DoorState::Open);
    assert_eq!(door.pending(), None);
    assert!(door
        .drain_events()
        .iter()
        .any(|e| e.kind == DoorEventKind::PendingDiscarded { operation: PendingOperation::close() }));
}

#[test]
fn test_lock_while_opening_closes_after_arrival() {
    let mut door = create_door(create_mock_settings());
    door.request_open(false);
    door.tick(0.25);

    door.lock();
    assert_eq!(door.state(), DoorState::Opening);
    assert_eq!(door.pending().map(|op| op.kind), Some(PendingKind::Close));

    for _ in 0..3 {
        door.tick(0.25);
    }
    assert_eq!(door.state(), DoorState::Closing);
    assert_eq!(door.pending(), None);
    assert!(door
        .drain_events()
        .iter()
        .any(|e| matches!(e.kind, DoorEventKind::PendingDrained { .. })));

    run_until_settled(&mut door);
    assert_eq!(door.state(), DoorState::Closed);
}

#[test]
fn test_lock_on_open_door_requests_close() {
    let mut door = create_door(create_mock_settings());
    open_door(&mut door);
    door.lock();
    assert_eq!(door.state(), DoorState::Closing);
}

#[test]
fn test_pending_open_replayed_after_close() {
    let mut settings = create_mock_settings();
    settings.operation_mode = OperationMode::ProximitySensor;
    let mut door = create_door(settings);

    door.on_entity_entered(EntityId(1));
    run_until_settled(&mut door);
    door.on_entity_exited(EntityId(1));
    door.tick(0.25);
    assert_eq!(door.state(), DoorState::Closing);

    door.lock();
    door.on_entity_entered(EntityId(2));
    assert_eq!(door.state(), DoorState::Closing);
    assert_eq!(door.pending(), Some(PendingOperation::open(true)));

    door.unlock();
    run_until_settled(&mut door);
    // The replayed sensor open reaches Closed and immediately starts opening again.
    assert!(door
        .drain_events()
        .iter()
        .any(|e| e.kind == DoorEventKind::PendingDrained { operation: PendingOperation::open(true) }));
    assert_eq!(door.pending(), None);
}

#[test]
fn test_reversal_keeps_leaves_in_place_for_eased_curves() {
    for easing in [EasingCurve::SmoothStep, EasingCurve::SmootherStep, EasingCurve::SineInOut] {
        for ticks in 1..4 {
            let mut settings = create_mock_settings();
            settings.easing_curve = easing;
            let mut door = create_door(settings);
            door.request_open(false);
            for _ in 0..ticks {
                door.tick(0.25);
            }

            let before = door.leaf_pose();
            let fraction = door.open_fraction();
            door.request_close(true);
            assert!(door.leaf_pose().max_distance(before) < EPSILON, "{} jumped at tick {}", easing, ticks);
            assert!(approx_eq(door.open_fraction(), fraction));

            let before = door.leaf_pose();
            door.request_open(false);
            assert_eq!(door.state(), DoorState::Opening);
            assert!(door.leaf_pose().max_distance(before) < EPSILON);
        }
    }
}

#[test]
fn test_reversed_cue_resumes_from_leaf_position() {
    let mut door = create_door(create_mock_settings());
    door.request_open(false);
    door.tick(0.25);
    door.tick(0.25);
    door.request_close(true);

    let cue = door.rig().last_cue().unwrap();
    assert_eq!(cue.clip, CueClip::Close);
    assert!(approx_eq(cue.offset, 1.0));
    assert_eq!(cue.rate, 1.0);

    let mut settings = create_mock_settings();
    settings.play_close_cue_reversed = true;
    let mut door = create_door(settings);
    door.request_open(false);
    door.tick(0.25);
    door.request_close(true);

    let cue = door.rig().last_cue().unwrap();
    assert_eq!(cue.clip, CueClip::Close);
    assert!(approx_eq(cue.offset, 0.5));
    assert_eq!(cue.rate, -1.0);
}

#[test]
fn test_delayed_close_skipped_when_region_refilled() {
    let mut door = create_door(create_mock_settings());
    door.on_entity_entered(EntityId(1));
    run_until_settled(&mut door);
    door.on_entity_exited(EntityId(1));
    door.on_entity_entered(EntityId(2));
    door.drain_events();

    door.tick(0.25);
    assert_eq!(door.state(), DoorState::Open);
    assert!(kinds(&door.drain_events()).contains(&DoorEventKind::DelayedCloseSkipped { occupancy: 1 }));
    assert_eq!(door.scheduled_calls(), 0);
}

#[test]
fn test_sensor_deactivation_force_closes() {
    let mut door = create_door(create_mock_settings());
    door.on_sensor_activated(2);
    door.tick(0.25);
    assert_eq!(door.state(), DoorState::Opening);

    door.on_sensor_deactivated();
    assert_eq!(door.occupancy(), 0);
    assert_eq!(door.state(), DoorState::Closing);
}

#[test]
fn test_mode_change_resets_occupancy() {
    let mut door = create_door(create_mock_settings());
    door.on_entity_entered(EntityId(1));
    door.set_operation_mode(OperationMode::ProximitySensor);
    assert_eq!(door.occupancy(), 0);
    assert!(kinds(&door.drain_events()).contains(&DoorEventKind::ModeChanged {
        old: OperationMode::Normal,
        new: OperationMode::ProximitySensor,
    }));

    door.on_entity_entered(EntityId(2));
    door.set_operation_mode(OperationMode::ProximitySensor);
    assert_eq!(door.occupancy(), 0);
}

#[test]
fn test_keypad_granted_opens_in_normal_mode_only() {
    let mut settings = create_mock_settings();
    settings.door_locked = true;
    let mut door = create_door(settings.clone());
    door.keypad_granted();
    assert!(!door.is_locked());
    assert_eq!(door.state(), DoorState::Opening);

    settings.operation_mode = OperationMode::ProximitySensor;
    let mut door = create_door(settings);
    door.keypad_granted();
    assert!(!door.is_locked());
    assert_eq!(door.state(), DoorState::Closed);
}

#[test]
fn test_keypad_closed_locks_and_shuts_occupied_door() {
    let mut door = create_door(create_mock_settings());
    door.on_entity_entered(EntityId(1));
    run_until_settled(&mut door);

    door.keypad_closed();
    assert!(door.is_effectively_locked());
    assert_eq!(door.state(), DoorState::Closing);

    door.request_open(false);
    assert_eq!(door.pending(), Some(PendingOperation::open(false)));
    run_until_settled(&mut door);
    assert_eq!(door.state(), DoorState::Closed);
}

#[test]
fn test_force_trigger() {
    let mut door = create_door(create_mock_settings());
    door.force_trigger(true);
    assert_eq!(door.state(), DoorState::Opening);

    door.on_entity_entered(EntityId(1));
    run_until_settled(&mut door);
    door.force_trigger(false);
    assert_eq!(door.occupancy(), 0);
    assert_eq!(door.state(), DoorState::Closing);
}

#[test]
fn test_controller_refuses_rig_without_leaves() {
    let result = SlidingDoorController::new(create_mock_settings(), RecordingRig::without_leaves());
    assert!(matches!(result, Err(DoorError::MissingLeafTransform(_))));
}

#[test]
fn test_controller_refuses_zero_duration() {
    let mut settings = create_mock_settings();
    settings.transition_duration = 0.0;
    let result = SlidingDoorController::new(settings, RecordingRig::new(closed_pose()));
    assert!(matches!(result, Err(DoorError::InvalidDuration(_))));
}

#[test]
fn test_open_door_closes_after_occupancy_reset() {
    let mut door = create_door(create_mock_settings());
    door.request_open(false);
    door.tick(0.25);
    door.on_entity_entered(EntityId(1));
    door.request_close(false);
    assert_eq!(door.pending(), Some(PendingOperation::close()));

    run_until_settled(&mut door);
    assert_eq!(door.state(), DoorState::Open);
    assert_eq!(door.occupancy(), 1);
    assert_eq!(door.pending(), None);

    door.unlock();
    assert_eq!(door.occupancy(), 0);
    assert_eq!(door.scheduled_calls(), 1);

    for _ in 0..40 {
        door.tick(0.25);
    }
    assert_eq!(door.state(), DoorState::Closed);
}

#[test]
fn test_sensor_deactivation_drops_queued_sensor_open() {
    let mut settings = create_mock_settings();
    settings.operation_mode = OperationMode::ProximitySensor;
    let mut door = create_door(settings);

    door.on_entity_entered(EntityId(1));
    run_until_settled(&mut door);
    door.lock();
    door.on_entity_exited(EntityId(1));
    door.tick(0.25);
    assert_eq!(door.state(), DoorState::Closing);

    door.on_entity_entered(EntityId(2));
    assert_eq!(door.pending(), Some(PendingOperation::open(true)));
    door.drain_events();

    door.on_sensor_deactivated();
    assert_eq!(door.pending(), None);
    assert!(kinds(&door.drain_events())
        .contains(&DoorEventKind::PendingDiscarded { operation: PendingOperation::open(true) }));

    door.unlock();
    for _ in 0..40 {
        door.tick(0.25);
    }
    assert_eq!(door.state(), DoorState::Closed);
    assert_eq!(door.occupancy(), 0);
}
