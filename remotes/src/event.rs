//! Event types passing between the pulse source, the codecs and subscribers

use crate::codec::CodecType;
use std::time::Duration;

/// What an interval of receiver time contained
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulseKind {
    /// Carrier on (mark)
    Pulse,
    /// Carrier off
    Space,
    /// The receiver saw nothing for its configured timeout
    Timeout,
}

/// One timed interval reported by the receiver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulseEvent {
    pub kind: PulseKind,
    /// Microseconds
    pub duration: u32,
}

impl PulseEvent {
    pub fn pulse(duration: u32) -> Self {
        PulseEvent {
            kind: PulseKind::Pulse,
            duration,
        }
    }

    pub fn space(duration: u32) -> Self {
        PulseEvent {
            kind: PulseKind::Space,
            duration,
        }
    }

    pub fn timeout(duration: u32) -> Self {
        PulseEvent {
            kind: PulseKind::Timeout,
            duration,
        }
    }

    /// Interpret a transmit-style array (alternating pulse and space,
    /// starting with a pulse) as a sequence of receive events.
    pub fn from_pulses(pulses: &[u32]) -> Vec<PulseEvent> {
        pulses
            .iter()
            .enumerate()
            .map(|(i, duration)| {
                if i % 2 == 0 {
                    PulseEvent::pulse(*duration)
                } else {
                    PulseEvent::space(*duration)
                }
            })
            .collect()
    }
}

/// A decoded remote control key, as published by a codec
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemoteEvent {
    /// Which codec produced this event
    pub codec: CodecType,
    /// Monotonic time since the codec instance started
    pub timestamp: Duration,
    /// Protocol device (address) field
    pub device: u32,
    /// Protocol scancode (command) field
    pub scancode: u32,
    /// True for a held-key continuation frame
    pub repeat: bool,
}
