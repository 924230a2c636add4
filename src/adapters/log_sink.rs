//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Activated { role, local, peer } => {
                info!("START | role={:?} local=!{:08x} peer=!{:08x}", role, local, peer);
            }
            AppEvent::Disabled(Some(cause)) => warn!("STOP  | {}", cause),
            AppEvent::Disabled(None) => info!("STOP  | by command"),
            AppEvent::MessageSent { kind, to } => info!("TX    | {} -> !{:08x}", kind, to),
            AppEvent::SendFailed { kind, error } => warn!("TX    | {} dropped: {}", kind, error),
            AppEvent::MessageReceived { kind, from, sentinel } => {
                info!(
                    "RX    | {} <- !{:08x}{}",
                    kind,
                    from,
                    if *sentinel { " [BEL]" } else { "" }
                );
            }
            AppEvent::ReadinessChanged { ready } => {
                info!("READY | {}", if *ready { "yes" } else { "no" });
            }
            AppEvent::PeerFound => info!("PEER  | present"),
            AppEvent::PeerLost => info!("PEER  | lost"),
            AppEvent::ChannelActuated { channel } => info!("NAG   | ch{} on", channel + 1),
            AppEvent::NagToggled { channel, on } => {
                info!("NAG   | ch{} {}", channel + 1, if *on { "on" } else { "off" });
            }
            AppEvent::NagCutoff { channel } => info!("NAG   | ch{} cutoff", channel + 1),
            AppEvent::DeepSleepRequested { duration_ms } => info!("SLEEP | {} ms", duration_ms),
            AppEvent::ResponseReceived(mask) => {
                info!("ACK   | {} channel(s) fired on peer", mask.len());
            }
        }
    }
}
