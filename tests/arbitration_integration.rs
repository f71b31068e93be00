//! Action arbitration through the coordinator
//!
//! Default timings at 60Hz: retrigger guard 6 ticks, gesture 120,
//! critical action 90. Gestures go to the left limb, critical actions to
//! the right.

use action_coordinator::arbiter::ActionSignal;
use action_coordinator::coordinator::{ChannelConsumer, Coordinator, CoordinatorEvent, RecordingConsumer};
use action_coordinator::locks::LockReason;
use action_coordinator::{ActionType, CoordinatorConfig, Limb, LocomotionSensors};

fn coordinator() -> Coordinator {
    Coordinator::new(CoordinatorConfig::default()).unwrap()
}

fn idle_ticks(coord: &mut Coordinator, ticks: u32) {
    for _ in 0..ticks {
        coord.tick(LocomotionSensors::grounded());
    }
}

#[test]
fn test_duplicate_start_is_denied_and_changes_nothing() {
    let mut coord = coordinator();
    assert!(coord.request_action_start(Limb::Left, ActionType::Fire));
    let before = coord.current_snapshot();

    assert!(!coord.request_action_start(Limb::Left, ActionType::Fire));
    assert_eq!(coord.current_snapshot(), before);
}

#[test]
fn test_retrigger_guard_lapses() {
    let mut coord = coordinator();
    assert!(coord.request_action_start(Limb::Left, ActionType::Channel));
    coord.request_action_stop(Limb::Left, ActionType::Channel);

    idle_ticks(&mut coord, 5);
    assert!(!coord.request_action_start(Limb::Left, ActionType::Channel));
    idle_ticks(&mut coord, 1);
    assert!(coord.request_action_start(Limb::Left, ActionType::Channel));
    assert!(coord.is_channeling());
}

#[test]
fn test_limbs_and_actions_are_independent() {
    let mut coord = coordinator();
    assert!(coord.request_action_start(Limb::Left, ActionType::Fire));
    assert!(coord.request_action_start(Limb::Left, ActionType::Channel));
    assert!(coord.request_action_start(Limb::Right, ActionType::Fire));

    coord.request_action_stop(Limb::Left, ActionType::Fire);
    let flags = coord.limb_flags();
    assert!(!flags.get(Limb::Left).is_firing);
    assert!(flags.get(Limb::Left).is_channeling);
    assert!(flags.get(Limb::Right).is_firing);
    assert!(coord.is_shooting());
}

#[test]
fn test_stop_always_accepted() {
    let mut coord = coordinator();
    coord.request_action_stop(Limb::Right, ActionType::Fire);
    coord.request_action_stop(Limb::Right, ActionType::Gesture);
    coord.notify_completed(Limb::Right, ActionType::Channel);
    let snap = coord.tick(LocomotionSensors::grounded());
    assert!(!snap.right.flags.any());
}

#[test]
fn test_only_one_critical_action() {
    let mut coord = coordinator();
    assert!(coord.request_critical_action());
    idle_ticks(&mut coord, 10);
    assert!(!coord.request_critical_action());
    assert!(!coord.request_action_start(Limb::Left, ActionType::CriticalAction));
    assert!(!coord.request_gesture(0));
}

#[test]
fn test_critical_action_takes_over_firing_limb() {
    let consumer = RecordingConsumer::new();
    let recording = consumer.recording();
    let mut coord =
        Coordinator::with_consumers(CoordinatorConfig::default(), vec![Box::new(consumer)]).unwrap();

    coord.request_action_start(Limb::Right, ActionType::Fire);
    coord.request_critical_action();

    assert!(!coord.is_shooting());
    assert_eq!(coord.limb_locks().reason(Limb::Right), Some(LockReason::CriticalAction));
    assert_eq!(
        recording.borrow().signals,
        vec![
            ActionSignal::Begin { limb: Limb::Right, action: ActionType::Fire, tick: 0 },
            ActionSignal::End { limb: Limb::Right, action: ActionType::Fire, tick: 0 },
            ActionSignal::Begin { limb: Limb::Right, action: ActionType::CriticalAction, tick: 0 },
        ]
    );
}

#[test]
fn test_critical_action_cannot_be_stopped() {
    let mut coord = coordinator();
    coord.request_critical_action();
    coord.request_action_stop(Limb::Right, ActionType::CriticalAction);
    coord.notify_completed(Limb::Right, ActionType::CriticalAction);

    idle_ticks(&mut coord, 89);
    assert!(coord.is_in_critical_action());
    idle_ticks(&mut coord, 1);
    assert!(!coord.is_in_critical_action());
    assert!(!coord.limb_locks().any_locked());
    assert!(coord.request_action_start(Limb::Right, ActionType::Fire));
}

#[test]
fn test_gesture_locks_gesture_limb_until_completed() {
    let mut coord = coordinator();
    assert!(coord.request_gesture(1));
    assert_eq!(coord.limb_locks().reason(Limb::Left), Some(LockReason::Gesture));
    assert!(!coord.request_action_start(Limb::Left, ActionType::Fire));
    assert!(coord.request_action_start(Limb::Right, ActionType::Fire));

    coord.notify_completed(Limb::Left, ActionType::Gesture);
    // Queued until the next tick
    assert!(coord.is_gesturing());

    let snap = coord.tick(LocomotionSensors::grounded());
    assert!(!snap.gesturing);
    assert!(snap.left.lock.is_none());
    assert!(coord.request_action_start(Limb::Left, ActionType::Fire));
}

#[test]
fn test_gesture_expires_on_timer() {
    let mut coord = coordinator();
    coord.request_gesture(0);
    idle_ticks(&mut coord, 119);
    assert!(coord.is_gesturing());
    idle_ticks(&mut coord, 1);
    assert!(!coord.is_gesturing());
}

#[test]
fn test_gesture_and_critical_exclude_each_other() {
    let mut coord = coordinator();
    assert!(coord.request_gesture(0));
    assert!(!coord.request_critical_action());

    let snap = coord.tick(LocomotionSensors::grounded());
    assert_eq!(snap.left.lock, Some(LockReason::Gesture));
    assert_eq!(snap.right.lock, None);
    assert!(!snap.critical_action_active);

    // Once the gesture is reported finished the critical action can start
    coord.notify_completed(Limb::Left, ActionType::Gesture);
    coord.tick(LocomotionSensors::grounded());
    assert!(coord.request_critical_action());
    assert!(!coord.request_gesture(0));
    assert_eq!(coord.limb_locks().reason(Limb::Right), Some(LockReason::CriticalAction));
    assert_eq!(coord.limb_locks().reason(Limb::Left), None);
}

#[test]
fn test_channel_consumer_receives_events_in_order() {
    let (consumer, mut rx) = ChannelConsumer::new();
    let mut coord =
        Coordinator::with_consumers(CoordinatorConfig::default(), vec![Box::new(consumer)]).unwrap();

    coord.request_action_start(Limb::Left, ActionType::Fire);
    coord.tick(LocomotionSensors::grounded());
    coord.request_action_stop(Limb::Left, ActionType::Fire);

    match rx.try_recv().unwrap() {
        CoordinatorEvent::Signal(ActionSignal::Begin { limb, action, .. }) => {
            assert_eq!((limb, action), (Limb::Left, ActionType::Fire));
        }
        other => panic!("unexpected event {:?}", other),
    }
    match rx.try_recv().unwrap() {
        CoordinatorEvent::Snapshot(snap) => assert!(snap.left.flags.is_firing),
        other => panic!("unexpected event {:?}", other),
    }
    assert!(matches!(
        rx.try_recv().unwrap(),
        CoordinatorEvent::Signal(ActionSignal::End { tick: 1, .. })
    ));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_channel_consumer_tolerates_dropped_receiver() {
    let (consumer, rx) = ChannelConsumer::new();
    let mut coord =
        Coordinator::with_consumers(CoordinatorConfig::default(), vec![Box::new(consumer)]).unwrap();
    drop(rx);

    idle_ticks(&mut coord, 3);
    assert!(coord.request_action_start(Limb::Left, ActionType::Fire));
}
