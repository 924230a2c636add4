//! REMOTE role against the mock adapters: input sampling, presence
//! replies, and broadcast pacing.

use crate::mock_hw::{EventLog, MockHardware};

use meshnag::app::commands::AppCommand;
use meshnag::app::events::AppEvent;
use meshnag::app::ports::PinMode;
use meshnag::app::service::AppService;
use meshnag::config::{ModuleConfig, PeerId, Role};
use meshnag::error::{ConfigError, Error};
use meshnag::mesh::{ChannelMask, MessageKind, NodeNum, Priority, ProcessMessage};

const LOCAL: NodeNum = 0x11;
const PEER: NodeNum = 0x22;

const BUTTON_1: u8 = 4;
const BUTTON_2: u8 = 5;
const PRESENCE: u8 = 15;

fn remote_config() -> ModuleConfig {
    ModuleConfig {
        enabled: true,
        role: Role::Remote,
        peer: PeerId::try_from("!00000022").unwrap(),
        ..ModuleConfig::default()
    }
}

/// Activated REMOTE with the presence switch closed (buttons pull low).
fn started(config: ModuleConfig) -> (AppService, MockHardware, EventLog) {
    let mut app = AppService::new(config, LOCAL);
    let mut hw = MockHardware::new();
    let mut sink = EventLog::new();
    hw.set_level(PRESENCE, false);
    app.tick(0, &mut hw, &mut sink);
    assert!(app.is_running());
    (app, hw, sink)
}

fn check_in(app: &mut AppService, hw: &mut MockHardware, sink: &mut EventLog, now: u64) {
    let r = app.handle_received(PEER, b"READYONE:CHECK\x07", now, hw, sink);
    assert_eq!(r, ProcessMessage::Claimed);
}

// ── Activation ────────────────────────────────────────────────

#[test]
fn activation_configures_inputs_with_pullup() {
    let (app, hw, sink) = started(remote_config());

    for pin in [4, 5, 6, 7, PRESENCE] {
        assert_eq!(hw.mode(pin), Some(PinMode::InputPullUp), "pin {pin}");
    }
    assert!(hw.writes.is_empty(), "a REMOTE never drives outputs");
    assert_eq!(app.role(), Some(Role::Remote));
    assert_eq!(app.peer(), PEER);
    assert!(sink.contains(&AppEvent::Activated {
        role: Role::Remote,
        local: LOCAL,
        peer: PEER
    }));
}

#[test]
fn plain_inputs_without_pullup() {
    let config = ModuleConfig {
        use_pullup: false,
        ..remote_config()
    };
    let (_app, hw, _sink) = started(config);
    assert_eq!(hw.mode(BUTTON_1), Some(PinMode::Input));
}

#[test]
fn missing_presence_pin_disables_module() {
    let config = ModuleConfig {
        presence_pin: 0,
        ..remote_config()
    };
    let mut app = AppService::new(config, LOCAL);
    let mut hw = MockHardware::new();
    let mut sink = EventLog::new();

    app.tick(0, &mut hw, &mut sink);

    assert!(app.is_disabled());
    assert!(hw.configured.is_empty());
    assert!(sink.contains(&AppEvent::Disabled(Some(Error::Config(
        ConfigError::MissingPin("presence")
    )))));
}

#[test]
fn not_enabled_stays_inert() {
    let config = ModuleConfig {
        enabled: false,
        ..remote_config()
    };
    let mut app = AppService::new(config, LOCAL);
    let mut hw = MockHardware::new();
    let mut sink = EventLog::new();

    let delay = app.tick(0, &mut hw, &mut sink);
    let again = app.tick(delay.into(), &mut hw, &mut sink);

    assert_eq!(delay, again);
    assert!(app.is_disabled());
    assert!(hw.configured.is_empty());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Disabled(_))), 1);
    assert_eq!(
        app.handle_received(PEER, b"READYONE:CHECK\x07", 100, &mut hw, &mut sink),
        ProcessMessage::Ignored
    );
}

// ── Presence ──────────────────────────────────────────────────

#[test]
fn silent_until_peer_checks_in() {
    let (mut app, mut hw, mut sink) = started(remote_config());
    hw.set_level(BUTTON_1, false);

    for now in (1_000..=60_000).step_by(1_000) {
        app.tick(now, &mut hw, &mut sink);
    }

    assert!(hw.sent.is_empty(), "sent {:?}", hw.sent_texts());
    assert!(app.last_detection().unwrap().channels[0]);
}

#[test]
fn check_reply_reports_closed_presence_switch() {
    let (mut app, mut hw, mut sink) = started(remote_config());
    app.tick(500, &mut hw, &mut sink);
    assert!(sink.contains(&AppEvent::ReadinessChanged { ready: true }));

    check_in(&mut app, &mut hw, &mut sink, 1_000);

    assert_eq!(hw.sent_texts(), vec!["READYONE:TRUE<BEL>"]);
    let reply = &hw.sent[0];
    assert_eq!(reply.to, PEER);
    assert_eq!(reply.priority, Priority::Default);
    assert!(!reply.want_ack);
    assert!(sink.contains(&AppEvent::PeerFound));
    assert!(sink.contains(&AppEvent::MessageReceived {
        kind: MessageKind::ReadyOneCheck,
        from: PEER,
        sentinel: true
    }));
    assert!(app.presence().unwrap().peer_present);
}

#[test]
fn check_reply_reports_open_presence_switch() {
    let (mut app, mut hw, mut sink) = started(remote_config());
    hw.set_level(PRESENCE, true);

    check_in(&mut app, &mut hw, &mut sink, 1_000);

    assert_eq!(hw.sent_texts(), vec!["READYONE:FALSE<BEL>"]);
    let presence = app.presence().unwrap();
    assert!(!presence.is_ready);
    assert!(!presence.peer_present, "an unready REMOTE does not hold the peer");
}

#[test]
fn peer_lost_after_silence() {
    let (mut app, mut hw, mut sink) = started(remote_config());
    app.tick(500, &mut hw, &mut sink);
    check_in(&mut app, &mut hw, &mut sink, 1_000);

    for now in (2_000..=130_000).step_by(1_000) {
        app.tick(now, &mut hw, &mut sink);
    }

    assert_eq!(sink.count(|e| *e == AppEvent::PeerLost), 1);
    assert!(!app.presence().unwrap().peer_present);

    hw.take_sent();
    hw.set_level(BUTTON_1, false);
    app.tick(200_000, &mut hw, &mut sink);
    assert!(hw.sent.is_empty());
}

// ── Reporting ─────────────────────────────────────────────────

#[test]
fn detected_is_reliable_and_rate_limited() {
    let (mut app, mut hw, mut sink) = started(remote_config());
    app.tick(500, &mut hw, &mut sink);
    check_in(&mut app, &mut hw, &mut sink, 1_000);
    hw.take_sent();

    hw.set_level(BUTTON_2, false);
    let delay = app.tick(1_100, &mut hw, &mut sink);

    assert_eq!(delay, 1_000, "a send settles the loop");
    assert_eq!(hw.sent_texts(), vec!["DETECTED:FALSE:TRUE:FALSE:FALSE<BEL>"]);
    assert_eq!(hw.sent[0].priority, Priority::Reliable);
    assert!(hw.sent[0].want_ack);
    hw.take_sent();

    app.tick(2_000, &mut hw, &mut sink);
    app.tick(46_000, &mut hw, &mut sink);
    assert!(hw.sent.is_empty(), "inside the minimum broadcast interval");

    app.tick(46_100, &mut hw, &mut sink);
    assert_eq!(hw.sent_texts(), vec!["DETECTED:FALSE:TRUE:FALSE:FALSE<BEL>"]);
}

#[test]
fn idle_inputs_send_periodic_observed() {
    let config = ModuleConfig {
        state_broadcast_secs: 60,
        ready_one_timeout_secs: 600,
        ..remote_config()
    };
    let (mut app, mut hw, mut sink) = started(config);
    app.tick(500, &mut hw, &mut sink);
    check_in(&mut app, &mut hw, &mut sink, 1_000);
    hw.take_sent();

    app.tick(1_100, &mut hw, &mut sink);
    assert_eq!(hw.sent_texts(), vec!["OBSERVED:FALSE:FALSE:FALSE:FALSE"]);
    assert_eq!(hw.sent[0].priority, Priority::Background);
    assert!(!hw.sent[0].want_ack);
    hw.take_sent();

    app.tick(50_000, &mut hw, &mut sink);
    assert!(hw.sent.is_empty());

    app.tick(61_100, &mut hw, &mut sink);
    assert_eq!(hw.sent_texts(), vec!["OBSERVED:FALSE:FALSE:FALSE:FALSE"]);
}

#[test]
fn triggered_high_inputs() {
    let config = ModuleConfig {
        triggered_high: true,
        use_pullup: false,
        ..remote_config()
    };
    let (mut app, mut hw, mut sink) = started(config);
    for pin in [4, 5, 6, 7] {
        hw.set_level(pin, false);
    }
    hw.set_level(PRESENCE, true);
    hw.set_level(7, true);

    app.tick(500, &mut hw, &mut sink);
    check_in(&mut app, &mut hw, &mut sink, 1_000);
    assert_eq!(hw.take_sent()[0].text(), "READYONE:TRUE<BEL>");

    app.tick(1_100, &mut hw, &mut sink);
    assert_eq!(hw.sent_texts(), vec!["DETECTED:FALSE:FALSE:FALSE:TRUE<BEL>"]);
}

#[test]
fn respond_frame_raises_event() {
    let (mut app, mut hw, mut sink) = started(remote_config());

    let r = app.handle_received(PEER, b"DONE [ 2 ][ 4 ]", 1_000, &mut hw, &mut sink);

    assert_eq!(r, ProcessMessage::Claimed);
    let mut mask = ChannelMask::EMPTY;
    mask.insert(1);
    mask.insert(3);
    assert!(sink.contains(&AppEvent::ResponseReceived(mask)));
    assert!(sink.contains(&AppEvent::PeerFound));
    assert!(hw.sent.is_empty());
}

#[test]
fn foreign_and_target_bound_frames_ignored() {
    let (mut app, mut hw, mut sink) = started(remote_config());

    let stranger = app.handle_received(0x33, b"READYONE:CHECK\x07", 1_000, &mut hw, &mut sink);
    let wrong_role =
        app.handle_received(PEER, b"DETECTED:TRUE:FALSE:FALSE:FALSE\x07", 1_000, &mut hw, &mut sink);
    let garbage = app.handle_received(PEER, b"HELLO:WORLD", 1_000, &mut hw, &mut sink);

    assert_eq!(stranger, ProcessMessage::Ignored);
    assert_eq!(wrong_role, ProcessMessage::Ignored);
    assert_eq!(garbage, ProcessMessage::Ignored);
    assert!(hw.sent.is_empty());
}

#[test]
fn exhausted_transport_spends_the_broadcast_slot() {
    let (mut app, mut hw, mut sink) = started(remote_config());
    app.tick(500, &mut hw, &mut sink);
    hw.exhausted = true;
    check_in(&mut app, &mut hw, &mut sink, 1_000);
    assert!(sink.contains(&AppEvent::SendFailed {
        kind: MessageKind::ReadyOneStatus,
        error: meshnag::error::TransportError::Exhausted
    }));

    hw.set_level(BUTTON_1, false);
    let delay = app.tick(1_100, &mut hw, &mut sink);
    assert_eq!(delay, 100);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SendFailed { kind: MessageKind::Detected, .. })),
        1
    );

    hw.exhausted = false;
    app.tick(2_000, &mut hw, &mut sink);
    assert!(hw.sent.is_empty());
    app.tick(46_100, &mut hw, &mut sink);
    assert_eq!(hw.sent_texts(), vec!["DETECTED:TRUE:FALSE:FALSE:FALSE<BEL>"]);
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn disable_then_enable_reactivates() {
    let (mut app, mut hw, mut sink) = started(remote_config());

    app.handle_command(AppCommand::Disable, &mut hw, &mut sink);
    assert!(app.is_disabled());
    assert!(sink.contains(&AppEvent::Disabled(None)));

    app.handle_command(AppCommand::Enable, &mut hw, &mut sink);
    app.tick(1_000, &mut hw, &mut sink);
    assert!(app.is_running());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Activated { .. })), 2);
}
