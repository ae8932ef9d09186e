//! Cooldown and routing behavior of the command dispatcher

mod test_helpers;

use gesture_assist::{
    actions::ActionHandlers,
    command::{Command, CommandNames},
    config::DispatchConfig,
    dispatcher::{CommandDispatcher, DispatchOutcome, ManualClock},
    gesture_classifier::{GestureSignals, HeadTilt},
    Error,
};
use std::collections::BTreeMap;
use std::time::Duration;
use test_helpers::{failing_sms_handlers, recording_handlers, CallLog};

fn dispatcher(handlers: ActionHandlers, clock: &ManualClock) -> CommandDispatcher {
    CommandDispatcher::with_clock(
        Duration::from_secs(2),
        CommandNames::default(),
        handlers,
        Box::new(clock.clone()),
    )
}

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

#[test]
fn test_cooldown_window_sequence() {
    let log = CallLog::default();
    let clock = ManualClock::new();
    let mut dispatcher = dispatcher(recording_handlers(&log), &clock);

    let first = dispatcher.dispatch(Command::EmergencyAlert);
    assert_eq!(
        first,
        DispatchOutcome::Dispatched {
            command: Command::EmergencyAlert,
            delivered: true
        }
    );

    clock.set(secs(1.0));
    let second = dispatcher.dispatch(Command::ToggleLights);
    assert!(!second.is_dispatched());
    assert_eq!(second.command(), Command::ToggleLights);

    clock.set(secs(2.1));
    let third = dispatcher.dispatch(Command::ToggleLights);
    assert!(third.is_dispatched());

    assert_eq!(log.count_prefix("sms"), 1);
    assert_eq!(log.calls().iter().filter(|c| *c == "iot:LIGHTS_TOGGLE").count(), 1);
    assert_eq!(dispatcher.gate().last_dispatch(), Some(secs(2.1)));
}

#[test]
fn test_dropped_attempt_reports_remaining_time() {
    let clock = ManualClock::new();
    let mut dispatcher = dispatcher(recording_handlers(&CallLog::default()), &clock);

    dispatcher.dispatch(Command::NextItem);
    clock.set(secs(0.5));

    match dispatcher.dispatch(Command::ScrollLeft) {
        DispatchOutcome::Dropped { command, remaining } => {
            assert_eq!(command, Command::ScrollLeft);
            assert_eq!(remaining, secs(1.5));
        }
        other => panic!("expected a dropped attempt, got {other:?}"),
    }
}

#[test]
fn test_simultaneous_gestures_dispatch_once() {
    let log = CallLog::default();
    let clock = ManualClock::new();
    let mut dispatcher = dispatcher(recording_handlers(&log), &clock);

    let signals = GestureSignals {
        mouth_open: true,
        left_eye_closed: true,
        right_eye_closed: true,
        left_eyebrow_raise: true,
        right_eyebrow_raise: false,
        head_tilt: HeadTilt::Left,
    };

    let outcomes = dispatcher.process(&signals);
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[0].command(), Command::EmergencyAlert);
    assert!(outcomes[0].is_dispatched());
    assert!(outcomes[1..].iter().all(|o| !o.is_dispatched()));

    // Only the emergency path reached a handler
    assert_eq!(
        log.calls(),
        vec![
            "sms".to_string(),
            "speak:Emergency alert sent to your contacts".to_string()
        ]
    );
}

#[test]
fn test_no_gesture_no_attempt() {
    let log = CallLog::default();
    let clock = ManualClock::new();
    let mut dispatcher = dispatcher(recording_handlers(&log), &clock);

    assert!(dispatcher.process(&GestureSignals::default()).is_empty());
    assert!(log.calls().is_empty());
    assert_eq!(dispatcher.gate().last_dispatch(), None);
}

#[test]
fn test_failed_sms_still_consumes_the_window() {
    let log = CallLog::default();
    let clock = ManualClock::new();
    let mut dispatcher = dispatcher(failing_sms_handlers(&log), &clock);

    let outcome = dispatcher.dispatch(Command::EmergencyAlert);
    assert_eq!(
        outcome,
        DispatchOutcome::Dispatched {
            command: Command::EmergencyAlert,
            delivered: false
        }
    );
    // No confirmation is spoken for a failed alert
    assert_eq!(log.calls(), vec!["sms".to_string()]);

    clock.set(secs(1.0));
    assert!(!dispatcher.dispatch(Command::ToggleLights).is_dispatched());

    clock.set(secs(2.0));
    assert!(dispatcher.dispatch(Command::ToggleLights).is_dispatched());
    assert_eq!(log.count_prefix("iot:"), 1);
}

#[test]
fn test_iot_confirmation_uses_spoken_name() {
    let log = CallLog::default();
    let clock = ManualClock::new();
    let mut dispatcher = dispatcher(recording_handlers(&log), &clock);

    dispatcher.dispatch(Command::ToggleLights);
    assert_eq!(
        log.calls(),
        vec![
            "iot:LIGHTS_TOGGLE".to_string(),
            "speak:Command LIGHTS TOGGLE executed".to_string()
        ]
    );
}

#[test]
fn test_ui_navigation_announces() {
    let log = CallLog::default();
    let clock = ManualClock::new();
    let mut dispatcher = dispatcher(recording_handlers(&log), &clock);

    dispatcher.dispatch(Command::ScrollRight);
    assert_eq!(
        log.calls(),
        vec![
            "ui:SCROLL_RIGHT".to_string(),
            "speak:Navigating SCROLL RIGHT".to_string()
        ]
    );
}

#[test]
fn test_missing_iot_handler_is_not_delivered() {
    let log = CallLog::default();
    let clock = ManualClock::new();
    let handlers = ActionHandlers {
        iot: None,
        ..recording_handlers(&log)
    };
    let mut dispatcher = dispatcher(handlers, &clock);

    assert_eq!(
        dispatcher.dispatch(Command::ToggleLights),
        DispatchOutcome::Dispatched {
            command: Command::ToggleLights,
            delivered: false
        }
    );
    assert!(log.calls().is_empty());
}

#[test]
fn test_command_name_overrides_reach_handlers() {
    let log = CallLog::default();
    let clock = ManualClock::new();
    let mut overrides = BTreeMap::new();
    overrides.insert(Command::ToggleLights, "LIVING_ROOM_LAMP".to_string());

    let mut dispatcher = CommandDispatcher::with_clock(
        Duration::from_secs(2),
        CommandNames::new(overrides),
        recording_handlers(&log),
        Box::new(clock.clone()),
    );

    dispatcher.dispatch(Command::ToggleLights);
    assert_eq!(log.calls()[0], "iot:LIVING_ROOM_LAMP");
}

#[test]
fn test_zero_cooldown_never_drops() {
    let log = CallLog::default();
    let clock = ManualClock::new();
    let mut dispatcher = CommandDispatcher::with_clock(
        Duration::ZERO,
        CommandNames::default(),
        recording_handlers(&log),
        Box::new(clock.clone()),
    );

    let signals = GestureSignals {
        mouth_open: true,
        head_tilt: HeadTilt::Right,
        ..GestureSignals::default()
    };
    assert!(dispatcher.process(&signals).iter().all(DispatchOutcome::is_dispatched));
}

#[test]
fn test_from_config_rejects_negative_cooldown() {
    let config = DispatchConfig {
        cooldown_secs: -1.0,
        ..DispatchConfig::default()
    };
    let result = CommandDispatcher::from_config(&config, ActionHandlers::logging());
    assert!(matches!(result, Err(Error::ConfigError(_))));
}
