//! Philips RC5, 14 bit Manchester coded
//!
//! Every logical bit is a pair of half-symbols: `01` is a one, `10` a zero.
//! The line only shows runs of one or two equal halves, so the decoder
//! collects raw halves and pairs them up once all 28 are in. The leading
//! idle half and, for some codes, the final idle half are never on the wire;
//! the first pulse injects the former and a timeout report or the inter-frame
//! gap supplies the latter.

use crate::codec::CodecType;
use crate::event::{PulseEvent, PulseKind, RemoteEvent};
use crate::markspace::MarkSpace;
use crate::Error;
use log::trace;
use std::time::Instant;

const TOLERANCE: u32 = 35;
const BIT_LENGTH: usize = 14;
const HALF_LENGTH: usize = 28;

const SHORT_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 889, TOLERANCE);
const SHORT_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 889, TOLERANCE);
const LONG_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 1778, TOLERANCE);
const LONG_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 1778, TOLERANCE);
const REPEAT_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 90000, TOLERANCE);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    FirstPulse,
    Pulse,
    Space,
}

pub struct Rc5Decoder {
    state: State,
    halves: Vec<bool>,
    repeat: bool,
    started: Instant,
}

impl Default for Rc5Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Rc5Decoder {
    pub fn new() -> Rc5Decoder {
        Rc5Decoder {
            state: State::FirstPulse,
            halves: Vec::with_capacity(HALF_LENGTH),
            repeat: false,
            started: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.restart(false);
    }

    fn restart(&mut self, repeat: bool) {
        self.state = State::FirstPulse;
        self.halves.clear();
        self.repeat = repeat;
    }

    pub fn input(&mut self, event: PulseEvent) -> Option<RemoteEvent> {
        trace!("rc5: state={:?} event={event:?}", self.state);

        match self.state {
            State::FirstPulse => {
                if LONG_PULSE.matches(&event) {
                    self.eject(&[false, true, true]);
                    self.state = State::Space;
                } else if SHORT_PULSE.matches(&event) {
                    self.eject(&[false, true]);
                    self.state = State::Space;
                } else {
                    self.restart(false);
                }

                None
            }
            State::Space => {
                if SHORT_SPACE.matches(&event) {
                    let event = self.eject(&[false]);
                    self.state = State::Pulse;

                    event
                } else if LONG_SPACE.matches(&event) {
                    let event = self.eject(&[false, false]);
                    self.state = State::Pulse;

                    event
                } else if event.kind == PulseKind::Timeout {
                    // line went idle right after the frame, whatever the
                    // receiver's configured timeout happens to be
                    let event = self.eject(&[false]);
                    self.restart(false);

                    event
                } else if REPEAT_SPACE.matches(&event) {
                    // inter-frame gap with the key still down
                    let event = self.eject(&[false]);
                    self.restart(true);

                    event
                } else {
                    self.restart(false);

                    None
                }
            }
            State::Pulse => {
                if SHORT_PULSE.matches(&event) {
                    let event = self.eject(&[true]);
                    self.state = State::Space;

                    event
                } else if LONG_PULSE.matches(&event) {
                    let event = self.eject(&[true, true]);
                    self.state = State::Space;

                    event
                } else {
                    self.restart(false);

                    None
                }
            }
        }
    }

    /// Append raw half-symbols; once exactly 28 are in, pair them up into a
    /// frame. An equal pair is not valid Manchester and the frame is dropped.
    fn eject(&mut self, halves: &[bool]) -> Option<RemoteEvent> {
        self.halves.extend_from_slice(halves);

        if self.halves.len() != HALF_LENGTH {
            return None;
        }

        let mut value = 0u32;

        for pair in self.halves.chunks(2) {
            if pair[0] == pair[1] {
                return None;
            }

            value <<= 1;

            if !pair[0] {
                value |= 1;
            }
        }

        let (scancode, device) = code_for_value(value);

        Some(RemoteEvent {
            codec: CodecType::Rc5,
            timestamp: self.started.elapsed(),
            device,
            scancode,
            repeat: self.repeat,
        })
    }
}

/// Bits 13-11 are the start and toggle bits, 10-6 the device, 5-0 the
/// scancode. The toggle bit flips on every distinct key press.
// TODO: validate the second start bit once the rc5x_20 variant (which
// repurposes it) gets its own decoder
fn code_for_value(value: u32) -> (u32, u32) {
    (value & 0x003F, (value >> 6) & 0x1F)
}

pub(super) fn encode(device: u32, scancode: u32, repeats: u32) -> Result<Vec<u32>, Error> {
    if device > 0x1F {
        return Err(Error::InvalidArgument(format!(
            "rc5 device 0x{device:X} does not fit in 5 bits"
        )));
    }

    if scancode > 0x3F {
        return Err(Error::InvalidArgument(format!(
            "rc5 scancode 0x{scancode:X} does not fit in 6 bits"
        )));
    }

    // both start bits set, toggle clear
    let value = 0b11 << 12 | device << 6 | scancode;

    let mut halves = Vec::with_capacity(HALF_LENGTH);

    for i in (0..BIT_LENGTH).rev() {
        if value >> i & 1 == 1 {
            halves.push(false);
            halves.push(true);
        } else {
            halves.push(true);
            halves.push(false);
        }
    }

    // run-length encode, skipping the untransmitted leading idle half
    let mut frame = Vec::new();
    let mut i = 1;

    while i < halves.len() {
        let run = if i + 1 < halves.len() && halves[i + 1] == halves[i] {
            2
        } else {
            1
        };

        frame.push(SHORT_PULSE.nominal() * run);
        i += run as usize;
    }

    // a trailing idle half is not on the wire either
    if !halves[HALF_LENGTH - 1] {
        frame.pop();
    }

    let mut pulses = Vec::new();

    for repeat in 0..=repeats {
        pulses.extend_from_slice(&frame);

        if repeat < repeats {
            pulses.push(REPEAT_SPACE.nominal());
        }
    }

    Ok(pulses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_split() {
        // start 11, toggle 0, device 0x14, scancode 0x2C
        let value = 0b11_0_10100_101100;

        assert_eq!(code_for_value(value), (0x2C, 0x14));
    }

    #[test]
    fn encode_is_manchester() {
        let pulses = encode(0x14, 0x2C, 0).unwrap();

        // alternating runs of one or two half-symbols only
        for duration in &pulses {
            assert!(*duration == 889 || *duration == 1778, "run of {duration}");
        }

        // fourteen bits, two halves each, minus the idle halves
        let halves: u32 = pulses.iter().map(|p| p / 889).sum();
        assert!(halves == 26 || halves == 27);
    }

    #[test]
    fn encode_range_checks() {
        assert!(matches!(
            encode(0x20, 0x2C, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            encode(0x14, 0x40, 0),
            Err(Error::InvalidArgument(_))
        ));
    }
}
