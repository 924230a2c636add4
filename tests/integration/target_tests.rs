//! TARGET role against the mock adapters: readiness polling, actuation,
//! nag cycles, and the power-saving duty cycle.

use crate::mock_hw::{EventLog, MockHardware};

use embedded_hal::digital::PinState;
use meshnag::app::commands::AppCommand;
use meshnag::app::events::AppEvent;
use meshnag::app::ports::PinMode;
use meshnag::app::service::AppService;
use meshnag::config::{ModuleConfig, PeerId, Role};
use meshnag::mesh::{MessageKind, NodeNum, Priority, ProcessMessage};

const LOCAL: NodeNum = 0x22;
const PEER: NodeNum = 0x11;

const OUTPUTS: [u8; 4] = [4, 5, 6, 7];
const READY_LED: u8 = 16;
const UNREADY_LED: u8 = 17;

fn target_config() -> ModuleConfig {
    ModuleConfig {
        enabled: true,
        role: Role::Target,
        peer: PeerId::try_from("11").unwrap(),
        ..ModuleConfig::default()
    }
}

fn started(config: ModuleConfig) -> (AppService, MockHardware, EventLog) {
    let mut app = AppService::new(config, LOCAL);
    let mut hw = MockHardware::new();
    let mut sink = EventLog::new();
    app.tick(0, &mut hw, &mut sink);
    assert!(app.is_running());
    (app, hw, sink)
}

fn deliver(app: &mut AppService, hw: &mut MockHardware, sink: &mut EventLog, now: u64, frame: &[u8]) -> ProcessMessage {
    app.handle_received(PEER, frame, now, hw, sink)
}

fn checks_sent(hw: &MockHardware) -> usize {
    hw.sent_texts().iter().filter(|t| *t == "READYONE:CHECK<BEL>").count()
}

// ── Activation ────────────────────────────────────────────────

#[test]
fn activation_drives_outputs_and_leds_off() {
    let (app, hw, sink) = started(target_config());

    for pin in OUTPUTS.into_iter().chain([READY_LED, UNREADY_LED]) {
        assert_eq!(hw.mode(pin), Some(PinMode::Output), "pin {pin}");
        assert_eq!(hw.output(pin), Some(PinState::Low), "pin {pin}");
    }
    assert_eq!(app.peer(), PEER);
    assert!(sink.contains(&AppEvent::Activated {
        role: Role::Target,
        local: LOCAL,
        peer: PEER
    }));
    assert!(app.channels().unwrap().iter().all(|c| c.configured && !c.actuated));
}

#[test]
fn active_low_outputs_idle_high() {
    let config = ModuleConfig {
        output_active_high: false,
        ..target_config()
    };
    let (mut app, mut hw, mut sink) = started(config);
    assert_eq!(hw.output(4), Some(PinState::High));

    deliver(&mut app, &mut hw, &mut sink, 1_000, b"DETECTED:TRUE:FALSE:FALSE:FALSE\x07");
    assert_eq!(hw.output(4), Some(PinState::Low));
}

// ── Readiness ─────────────────────────────────────────────────

#[test]
fn first_tick_checks_peer_and_shows_unready() {
    let (mut app, mut hw, mut sink) = started(target_config());

    let delay = app.tick(1_000, &mut hw, &mut sink);

    assert_eq!(delay, 1_000);
    assert_eq!(hw.sent_texts(), vec!["READYONE:CHECK<BEL>"]);
    assert_eq!(hw.sent[0].to, PEER);
    assert_eq!(hw.sent[0].priority, Priority::Default);
    assert!(hw.is_high(UNREADY_LED));
    assert!(!hw.is_high(READY_LED));
}

#[test]
fn ready_status_lights_ready_led() {
    let (mut app, mut hw, mut sink) = started(target_config());
    app.tick(1_000, &mut hw, &mut sink);

    let r = deliver(&mut app, &mut hw, &mut sink, 1_500, b"READYONE:TRUE\x07");
    app.tick(1_600, &mut hw, &mut sink);

    assert_eq!(r, ProcessMessage::Claimed);
    assert!(sink.contains(&AppEvent::PeerFound));
    assert!(sink.contains(&AppEvent::ReadinessChanged { ready: true }));
    assert!(hw.is_high(READY_LED));
    assert!(!hw.is_high(UNREADY_LED));
    let presence = app.presence().unwrap();
    assert!(presence.is_ready && presence.peer_present);
    assert_eq!(presence.last_peer_reply_ms, 1_500);
}

#[test]
fn checks_repeat_on_the_interval() {
    let (mut app, mut hw, mut sink) = started(target_config());

    for now in (1_000..=61_000).step_by(500) {
        app.tick(now, &mut hw, &mut sink);
    }

    // 1 000, 31 000, 61 000
    assert_eq!(checks_sent(&hw), 3);
}

#[test]
fn unanswered_check_marks_peer_unready_once() {
    let (mut app, mut hw, mut sink) = started(target_config());
    app.tick(1_000, &mut hw, &mut sink);
    deliver(&mut app, &mut hw, &mut sink, 1_500, b"READYONE:TRUE\x07");

    // Next CHECK at 31 000 goes unanswered; the window expires after 90 s.
    for now in (2_000..=121_000).step_by(1_000) {
        app.tick(now, &mut hw, &mut sink);
    }
    assert!(app.presence().unwrap().is_ready);

    app.tick(121_001, &mut hw, &mut sink);
    assert!(!app.presence().unwrap().is_ready);
    assert_eq!(sink.count(|e| *e == AppEvent::ReadinessChanged { ready: false }), 1);
    assert_eq!(sink.count(|e| *e == AppEvent::PeerLost), 1);
    assert!(hw.is_high(UNREADY_LED));

    for now in (122_000..=200_000).step_by(1_000) {
        app.tick(now, &mut hw, &mut sink);
    }
    assert_eq!(sink.count(|e| *e == AppEvent::PeerLost), 1);
}

#[test]
fn failed_check_does_not_arm_timeout() {
    let (mut app, mut hw, mut sink) = started(target_config());
    hw.exhausted = true;

    let delay = app.tick(1_000, &mut hw, &mut sink);

    assert_eq!(delay, 100);
    assert!(sink.contains(&AppEvent::SendFailed {
        kind: MessageKind::ReadyOneCheck,
        error: meshnag::error::TransportError::Exhausted
    }));
    assert!(app.presence().is_some());
    hw.exhausted = false;
    app.tick(2_000, &mut hw, &mut sink);
    assert!(hw.sent.is_empty(), "the check interval was still consumed");
}

// ── Actuation ─────────────────────────────────────────────────

#[test]
fn detected_with_sentinel_actuates_and_responds() {
    let (mut app, mut hw, mut sink) = started(target_config());

    let r = deliver(&mut app, &mut hw, &mut sink, 2_000, b"DETECTED:TRUE:FALSE:FALSE:TRUE\x07");

    assert_eq!(r, ProcessMessage::Claimed);
    assert!(hw.is_high(4));
    assert!(!hw.is_high(5));
    assert!(hw.is_high(7));
    assert_eq!(hw.sent_texts(), vec!["DONE [ 1 ][ 4 ]"]);
    assert_eq!(hw.sent[0].to, PEER);
    assert!(sink.contains(&AppEvent::ChannelActuated { channel: 0 }));
    assert!(sink.contains(&AppEvent::ChannelActuated { channel: 3 }));

    let ch = app.channels().unwrap()[0];
    assert!(ch.detected && ch.actuated && ch.nagging);
    assert_eq!(ch.actuated_at_ms, 2_000);
    assert_eq!(ch.nag_cutoff_ms, Some(12_000));
}

#[test]
fn single_pulse_ends_at_signal_duration() {
    let (mut app, mut hw, mut sink) = started(target_config());
    deliver(&mut app, &mut hw, &mut sink, 2_000, b"DETECTED:TRUE:FALSE:FALSE:FALSE\x07");

    app.tick(11_999, &mut hw, &mut sink);
    assert!(hw.is_high(4));

    app.tick(12_000, &mut hw, &mut sink);
    assert!(!hw.is_high(4));
    assert!(sink.contains(&AppEvent::NagCutoff { channel: 0 }));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::NagToggled { .. })), 0);
    assert!(!app.channels().unwrap()[0].nagging);
}

#[test]
fn nag_toggles_until_cutoff() {
    let config = ModuleConfig {
        nag_timeout_secs: 30,
        ..target_config()
    };
    let (mut app, mut hw, mut sink) = started(config);
    deliver(&mut app, &mut hw, &mut sink, 2_000, b"DETECTED:FALSE:TRUE:FALSE:FALSE\x07");

    app.tick(12_001, &mut hw, &mut sink);
    assert!(!hw.is_high(5));
    assert!(sink.contains(&AppEvent::NagToggled { channel: 1, on: false }));

    app.tick(22_002, &mut hw, &mut sink);
    assert!(hw.is_high(5));
    assert!(sink.contains(&AppEvent::NagToggled { channel: 1, on: true }));

    app.tick(32_000, &mut hw, &mut sink);
    assert!(!hw.is_high(5));
    assert!(sink.contains(&AppEvent::NagCutoff { channel: 1 }));

    sink.clear();
    app.tick(60_000, &mut hw, &mut sink);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::NagToggled { .. } | AppEvent::NagCutoff { .. })),
        0
    );
}

#[test]
fn detected_without_sentinel_is_only_remembered() {
    let (mut app, mut hw, mut sink) = started(target_config());

    let r = deliver(&mut app, &mut hw, &mut sink, 2_000, b"DETECTED:TRUE:FALSE:FALSE:FALSE");

    assert_eq!(r, ProcessMessage::Claimed);
    assert!(!hw.is_high(4));
    assert!(hw.sent.is_empty());
    let ch = app.channels().unwrap()[0];
    assert!(ch.detected && !ch.actuated);
}

#[test]
fn observed_updates_detected_flags() {
    let (mut app, mut hw, mut sink) = started(target_config());

    deliver(&mut app, &mut hw, &mut sink, 2_000, b"OBSERVED:FALSE:FALSE:TRUE:FALSE");

    let detected: Vec<bool> = app.channels().unwrap().iter().map(|c| c.detected).collect();
    assert_eq!(detected, vec![false, false, true, false]);
    assert!(hw.sent.is_empty());
}

#[test]
fn unconfigured_channel_is_skipped() {
    let mut config = target_config();
    config.channel_pins[1] = 0;
    let (mut app, mut hw, mut sink) = started(config);

    deliver(&mut app, &mut hw, &mut sink, 2_000, b"DETECTED:TRUE:TRUE:TRUE:TRUE\x07");

    assert_eq!(hw.sent_texts(), vec!["DONE [ 1 ][ 3 ][ 4 ]"]);
    assert!(!app.channels().unwrap()[1].configured);
}

#[test]
fn all_false_detected_still_responds() {
    let (mut app, mut hw, mut sink) = started(target_config());

    deliver(&mut app, &mut hw, &mut sink, 2_000, b"DETECTED:FALSE:FALSE:FALSE:FALSE\x07");

    assert_eq!(hw.sent_texts(), vec!["DONE"]);
    assert!(OUTPUTS.iter().all(|&p| !hw.is_high(p)));
}

#[test]
fn frames_from_self_or_strangers_are_ignored() {
    let (mut app, mut hw, mut sink) = started(target_config());

    let stranger = app.handle_received(0x33, b"DETECTED:TRUE:TRUE:TRUE:TRUE\x07", 2_000, &mut hw, &mut sink);
    let echo = app.handle_received(LOCAL, b"DETECTED:TRUE:TRUE:TRUE:TRUE\x07", 2_000, &mut hw, &mut sink);
    let check = deliver(&mut app, &mut hw, &mut sink, 2_000, b"READYONE:CHECK\x07");

    assert_eq!(stranger, ProcessMessage::Ignored);
    assert_eq!(echo, ProcessMessage::Ignored);
    assert_eq!(check, ProcessMessage::Ignored);
    assert!(OUTPUTS.iter().all(|&p| !hw.is_high(p)));
}

#[test]
fn empty_peer_falls_back_to_local_and_hears_nothing() {
    let config = ModuleConfig {
        peer: PeerId::new(),
        ..target_config()
    };
    let (mut app, mut hw, mut sink) = started(config);

    assert_eq!(app.peer(), LOCAL);
    let r = app.handle_received(LOCAL, b"READYONE:TRUE\x07", 2_000, &mut hw, &mut sink);
    assert_eq!(r, ProcessMessage::Ignored);
}

#[test]
fn disable_turns_outputs_off() {
    let config = ModuleConfig {
        nag_timeout_secs: 300,
        ..target_config()
    };
    let (mut app, mut hw, mut sink) = started(config);
    deliver(&mut app, &mut hw, &mut sink, 2_000, b"DETECTED:TRUE:TRUE:FALSE:FALSE\x07");
    assert!(hw.is_high(4) && hw.is_high(5));

    app.handle_command(AppCommand::Disable, &mut hw, &mut sink);

    assert!(!hw.is_high(4) && !hw.is_high(5));
    assert_eq!(hw.output(READY_LED), Some(PinState::Low));
    assert_eq!(hw.output(UNREADY_LED), Some(PinState::Low));
    assert!(app.channels().is_none());
}

// ── Power saving ──────────────────────────────────────────────

fn power_saving_config() -> ModuleConfig {
    ModuleConfig {
        power_saving: true,
        active_secs: 60,
        sleep_secs: 300,
        ..target_config()
    }
}

#[test]
fn sleeps_after_active_window_without_ready_peer() {
    let (mut app, mut hw, mut sink) = started(power_saving_config());

    app.tick(1_000, &mut hw, &mut sink);
    app.tick(61_000, &mut hw, &mut sink);
    assert!(hw.sleeps.is_empty());

    app.tick(61_001, &mut hw, &mut sink);
    assert_eq!(hw.sleeps, vec![300_000]);
    assert!(sink.contains(&AppEvent::DeepSleepRequested { duration_ms: 300_000 }));
}

#[test]
fn ready_peer_keeps_target_awake() {
    let (mut app, mut hw, mut sink) = started(power_saving_config());

    for now in (1_000..=400_000).step_by(1_000) {
        app.tick(now, &mut hw, &mut sink);
        if checks_sent(&hw) > 0 {
            hw.take_sent();
            deliver(&mut app, &mut hw, &mut sink, now + 200, b"READYONE:TRUE\x07");
        }
    }

    assert!(hw.sleeps.is_empty());
}

#[test]
fn power_saving_off_never_sleeps() {
    let (mut app, mut hw, mut sink) = started(target_config());

    for now in (1_000..=600_000).step_by(5_000) {
        app.tick(now, &mut hw, &mut sink);
    }

    assert!(hw.sleeps.is_empty());
}
