//! Panasonic 48 bit protocol (the "kaseikyo" layout)
//!
//! Frames carry a fixed 0x4004 preamble, a device/subdevice pair, a scancode
//! and an xor checksum over those three bytes.

use crate::codec::CodecType;
use crate::event::{PulseEvent, PulseKind, RemoteEvent};
use crate::markspace::MarkSpace;
use crate::Error;
use log::{trace, warn};
use std::time::Instant;

const TOLERANCE: u32 = 35;
const BIT_LENGTH: u32 = 48;
const PREAMBLE: u64 = 0x4004;

const HEADER_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 3500, TOLERANCE);
const HEADER_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 1700, TOLERANCE);
const BIT_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 450, TOLERANCE);
const ONE_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 1300, TOLERANCE);
const ZERO_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 450, TOLERANCE);
const TRAIL_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 450, TOLERANCE);
const REPEAT_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 75000, TOLERANCE);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    HeaderPulse,
    HeaderSpace,
    BitPulse,
    BitSpace,
    Trail,
    Repeat,
}

pub struct PanasonicDecoder {
    state: State,
    value: u64,
    length: u32,
    repeat: bool,
    started: Instant,
}

impl Default for PanasonicDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PanasonicDecoder {
    pub fn new() -> PanasonicDecoder {
        PanasonicDecoder {
            state: State::HeaderPulse,
            value: 0,
            length: 0,
            repeat: false,
            started: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.state = State::HeaderPulse;
        self.value = 0;
        self.length = 0;
        self.repeat = false;
    }

    pub fn input(&mut self, event: PulseEvent) -> Option<RemoteEvent> {
        trace!("panasonic: state={:?} event={event:?}", self.state);

        match self.state {
            State::HeaderPulse => {
                if HEADER_PULSE.matches(&event) {
                    self.state = State::HeaderSpace;
                } else {
                    self.reset();
                }

                None
            }
            State::HeaderSpace => {
                if HEADER_SPACE.matches(&event) {
                    self.state = State::BitPulse;
                } else {
                    self.reset();
                }

                None
            }
            State::BitPulse => {
                if BIT_PULSE.matches(&event) {
                    self.state = State::BitSpace;
                } else {
                    self.reset();
                }

                None
            }
            State::BitSpace => {
                if ZERO_SPACE.matches(&event) {
                    self.value <<= 1;
                    self.length += 1;
                } else if ONE_SPACE.matches(&event) {
                    self.value = self.value << 1 | 1;
                    self.length += 1;
                } else {
                    self.reset();
                    return None;
                }

                self.state = if self.length == BIT_LENGTH {
                    State::Trail
                } else {
                    State::BitPulse
                };

                None
            }
            State::Trail => {
                if TRAIL_PULSE.matches(&event) {
                    let event = self.frame_event();

                    self.state = State::Repeat;

                    event
                } else {
                    self.reset();

                    None
                }
            }
            State::Repeat => {
                if REPEAT_SPACE.matches(&event) {
                    self.repeat = true;
                    self.value = 0;
                    self.length = 0;
                    self.state = State::HeaderPulse;
                } else {
                    self.reset();
                }

                None
            }
        }
    }

    fn frame_event(&self) -> Option<RemoteEvent> {
        let (scancode, device) = code_for_value(self.value)?;

        Some(RemoteEvent {
            codec: CodecType::Panasonic,
            timestamp: self.started.elapsed(),
            device,
            scancode,
            repeat: self.repeat,
        })
    }
}

/// Validate preamble and checksum; the emitted device field packs device and
/// subdevice as `(device << 8) | subdevice`
fn code_for_value(value: u64) -> Option<(u32, u32)> {
    let device = (value >> 24 & 0xFF) as u32;
    let subdevice = (value >> 16 & 0xFF) as u32;
    let scancode = (value >> 8 & 0xFF) as u32;
    let checksum = (value & 0xFF) as u32;

    if value >> 32 != PREAMBLE {
        return None;
    }

    if checksum != device ^ subdevice ^ scancode {
        warn!("panasonic: bad checksum in frame 0x{value:012X}");
        return None;
    }

    Some((scancode, device << 8 | subdevice))
}

pub(super) fn encode(device: u32, scancode: u32, repeats: u32) -> Result<Vec<u32>, Error> {
    if device > 0xFFFF {
        return Err(Error::InvalidArgument(format!(
            "panasonic device 0x{device:X} does not fit in 16 bits"
        )));
    }

    if scancode > 0xFF {
        return Err(Error::InvalidArgument(format!(
            "panasonic scancode 0x{scancode:X} does not fit in 8 bits"
        )));
    }

    let checksum = (device >> 8) ^ (device & 0xFF) ^ scancode;
    let mut pulses = Vec::with_capacity(100 * (repeats as usize + 1));

    for frame in 0..=repeats {
        pulses.push(HEADER_PULSE.nominal());
        pulses.push(HEADER_SPACE.nominal());

        send_byte(&mut pulses, (PREAMBLE >> 8) as u8);
        send_byte(&mut pulses, PREAMBLE as u8);
        send_byte(&mut pulses, (device >> 8) as u8);
        send_byte(&mut pulses, device as u8);
        send_byte(&mut pulses, scancode as u8);
        send_byte(&mut pulses, checksum as u8);

        pulses.push(TRAIL_PULSE.nominal());

        if frame < repeats {
            pulses.push(REPEAT_SPACE.nominal());
        }
    }

    Ok(pulses)
}

fn send_byte(pulses: &mut Vec<u32>, mut value: u8) {
    for _ in 0..8 {
        pulses.push(BIT_PULSE.nominal());

        if value & 0x80 == 0 {
            pulses.push(ZERO_SPACE.nominal());
        } else {
            pulses.push(ONE_SPACE.nominal());
        }

        value <<= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_validation() {
        // device 0x80, subdevice 0x00, scancode 0x3D, checksum 0xBD
        assert_eq!(code_for_value(0x4004_80_00_3D_BD), Some((0x3D, 0x8000)));
        assert_eq!(code_for_value(0x4004_80_00_3D_00), None);
    }

    #[test]
    fn preamble_validation() {
        assert_eq!(code_for_value(0x4003_80_00_3D_BD), None);
    }

    #[test]
    fn encode_layout() {
        let pulses = encode(0x8000, 0x3D, 0).unwrap();

        // header pair + 48 bit pairs + trail
        assert_eq!(pulses.len(), 2 + 96 + 1);
        assert_eq!(&pulses[..2], &[3500, 1700]);
        assert_eq!(*pulses.last().unwrap(), 450);
    }

    #[test]
    fn encode_range_checks() {
        assert!(matches!(
            encode(0x1_0000, 0x3D, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            encode(0x8000, 0x3D0, 0),
            Err(Error::InvalidArgument(_))
        ));
    }
}
