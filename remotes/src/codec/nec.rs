//! NEC family: NEC32, NEC16 and the Apple TV variant
//!
//! Fixed 562µs bit pulses; the width of the following space selects the bit
//! value. NEC32 and Apple TV share identical timing and are told apart only
//! by the 16 bit vendor prefix, so both codecs can run against the same
//! stream and exactly one of them will claim a given frame.

use crate::codec::CodecType;
use crate::event::{PulseEvent, PulseKind, RemoteEvent};
use crate::markspace::MarkSpace;
use crate::Error;
use log::{trace, warn};
use std::time::Instant;

const TOLERANCE: u32 = 35;

const HEADER_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 9000, TOLERANCE);
const HEADER_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 4500, TOLERANCE);
const BIT_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 562, TOLERANCE);
const ONE_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 1688, TOLERANCE);
const ZERO_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 562, TOLERANCE);
const TRAIL_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 562, TOLERANCE);

// NEC16 sends headerless continuation frames after a 17.5ms gap; NEC32 and
// Apple TV send 9ms/2.5ms repeat bursts after a 35ms gap. The ~96.6ms window
// is the gap real receivers report between repeat groups.
const TRAIL_SPACE_NEC16: MarkSpace = MarkSpace::new(PulseKind::Space, 17500, TOLERANCE);
const GAP_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 35000, TOLERANCE);
const REPEAT_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 9000, TOLERANCE);
const REPEAT_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 2500, TOLERANCE);
const LONG_GAP_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 96577, TOLERANCE);

/// 16 bit prefix the Apple TV remote identifies itself with
pub const APPLETV_VENDOR: u32 = 0x77E1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    HeaderPulse,
    HeaderSpace,
    BitPulse,
    BitSpace,
    EndPulse,
    TrailSpace,
    Gap,
    RepeatPulse,
    RepeatSpace,
}

pub struct NecDecoder {
    variant: CodecType,
    bit_length: u32,
    state: State,
    value: u32,
    length: u32,
    repeat: bool,
    /// Complete NEC16 frame awaiting proof that no further bits follow
    pending: Option<RemoteEvent>,
    started: Instant,
}

impl NecDecoder {
    pub fn new(variant: CodecType) -> NecDecoder {
        let bit_length = match variant {
            CodecType::Nec16 => 16,
            _ => 32,
        };

        NecDecoder {
            variant,
            bit_length,
            state: State::HeaderPulse,
            value: 0,
            length: 0,
            repeat: false,
            pending: None,
            started: Instant::now(),
        }
    }

    pub fn codec_type(&self) -> CodecType {
        self.variant
    }

    pub fn reset(&mut self) {
        self.state = State::HeaderPulse;
        self.value = 0;
        self.length = 0;
        self.repeat = false;
        self.pending = None;
    }

    pub fn input(&mut self, event: PulseEvent) -> Option<RemoteEvent> {
        trace!("{}: state={:?} event={event:?}", self.variant, self.state);

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

                self.state = if self.length == self.bit_length {
                    State::EndPulse
                } else {
                    State::BitPulse
                };

                None
            }
            State::EndPulse => {
                if TRAIL_PULSE.matches(&event) {
                    if self.variant == CodecType::Nec16 {
                        // could equally be the 17th bit of a longer
                        // protocol; hold the frame until the line shows a
                        // gap or goes idle
                        self.pending = self.frame_event();
                        self.state = State::TrailSpace;

                        None
                    } else {
                        let event = self.frame_event();

                        self.state = State::Gap;

                        event
                    }
                } else {
                    self.reset();

                    None
                }
            }
            State::TrailSpace => {
                let pending = self.pending.take();

                if TRAIL_SPACE_NEC16.matches(&event) {
                    // headerless continuation frame follows
                    self.value = 0;
                    self.length = 0;
                    self.repeat = true;
                    self.state = State::BitPulse;

                    pending
                } else if event.kind == PulseKind::Timeout {
                    self.reset();

                    pending
                } else {
                    // more bits followed, so this was no 16 bit frame
                    self.reset();

                    None
                }
            }
            State::Gap => {
                if GAP_SPACE.matches(&event) || LONG_GAP_SPACE.matches(&event) {
                    self.state = State::RepeatPulse;
                } else {
                    self.reset();
                }

                None
            }
            State::RepeatPulse => {
                if REPEAT_PULSE.matches(&event) {
                    self.repeat = true;
                    self.state = State::RepeatSpace;
                } else if TRAIL_PULSE.matches(&event) {
                    self.state = State::Gap;
                } else {
                    self.reset();
                }

                None
            }
            State::RepeatSpace => {
                if REPEAT_SPACE.matches(&event) {
                    let event = self.frame_event();

                    self.state = State::RepeatPulse;

                    event
                } else if HEADER_SPACE.matches(&event) {
                    // the 9ms burst was the next frame's header pulse
                    self.value = 0;
                    self.length = 0;
                    self.repeat = true;
                    self.state = State::BitPulse;

                    None
                } else {
                    self.reset();

                    None
                }
            }
        }
    }

    fn frame_event(&self) -> Option<RemoteEvent> {
        let (scancode, device) = code_for_variant(self.variant, self.value)?;

        Some(RemoteEvent {
            codec: self.variant,
            timestamp: self.started.elapsed(),
            device,
            scancode,
            repeat: self.repeat,
        })
    }
}

/// Unpack a received frame into `(scancode, device)`, or `None` for frames
/// that belong to another codec or fail validation
fn code_for_variant(variant: CodecType, value: u32) -> Option<(u32, u32)> {
    match variant {
        CodecType::AppleTv => {
            if value >> 16 != APPLETV_VENDOR {
                return None;
            }

            Some(((value & 0xFF00) >> 8, value & 0xFF))
        }
        CodecType::Nec32 => {
            // the appletv codec claims these
            if value >> 16 == APPLETV_VENDOR {
                return None;
            }

            let scancode = (value & 0xFF00) >> 8;

            if scancode != (value & 0xFF) ^ 0xFF {
                warn!("nec32: scancode and check byte disagree in frame 0x{value:08X}");
                return None;
            }

            Some((scancode, value >> 16))
        }
        CodecType::Nec16 => Some((value & 0xFF, (value >> 8) & 0xFF)),
        _ => None,
    }
}

pub(super) fn encode(
    variant: CodecType,
    device: u32,
    scancode: u32,
    repeats: u32,
) -> Result<Vec<u32>, Error> {
    let mut pulses = Vec::with_capacity(68 + 2 * repeats as usize);

    pulses.push(HEADER_PULSE.nominal());
    pulses.push(HEADER_SPACE.nominal());

    match variant {
        CodecType::Nec32 => {
            if device > 0xFFFF {
                return Err(Error::InvalidArgument(format!(
                    "nec32 device 0x{device:X} does not fit in 16 bits"
                )));
            }
            if scancode > 0xFF {
                return Err(Error::InvalidArgument(format!(
                    "nec32 scancode 0x{scancode:X} does not fit in 8 bits"
                )));
            }

            send_byte(&mut pulses, (device >> 8) as u8);
            send_byte(&mut pulses, device as u8);
            send_byte(&mut pulses, scancode as u8);
            send_byte(&mut pulses, !(scancode as u8));
        }
        CodecType::AppleTv => {
            if device > 0xFF {
                return Err(Error::InvalidArgument(format!(
                    "appletv device 0x{device:X} does not fit in 8 bits"
                )));
            }
            if scancode > 0xFF {
                return Err(Error::InvalidArgument(format!(
                    "appletv scancode 0x{scancode:X} does not fit in 8 bits"
                )));
            }

            send_byte(&mut pulses, (APPLETV_VENDOR >> 8) as u8);
            send_byte(&mut pulses, APPLETV_VENDOR as u8);
            send_byte(&mut pulses, scancode as u8);
            send_byte(&mut pulses, device as u8);
        }
        CodecType::Nec16 => {
            if device > 0xFF {
                return Err(Error::InvalidArgument(format!(
                    "nec16 device 0x{device:X} does not fit in 8 bits"
                )));
            }
            if scancode > 0xFF {
                return Err(Error::InvalidArgument(format!(
                    "nec16 scancode 0x{scancode:X} does not fit in 8 bits"
                )));
            }

            send_byte(&mut pulses, device as u8);
            send_byte(&mut pulses, scancode as u8);
        }
        other => {
            return Err(Error::InvalidArgument(format!(
                "no nec encoder for codec {other}"
            )))
        }
    }

    pulses.push(TRAIL_PULSE.nominal());

    if repeats > 0 {
        if variant == CodecType::Nec16 {
            // continuation frames, headerless, after a 17.5ms gap
            for _ in 0..repeats {
                pulses.push(TRAIL_SPACE_NEC16.nominal());
                send_byte(&mut pulses, device as u8);
                send_byte(&mut pulses, scancode as u8);
                pulses.push(TRAIL_PULSE.nominal());
            }
        } else {
            pulses.push(GAP_SPACE.nominal());

            for _ in 0..repeats {
                pulses.push(REPEAT_PULSE.nominal());
                pulses.push(REPEAT_SPACE.nominal());
            }

            pulses.push(TRAIL_PULSE.nominal());
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
    fn encode_starts_with_header() {
        let pulses = encode(CodecType::Nec32, 0x7F80, 0x13, 0).unwrap();

        assert_eq!(&pulses[..3], &[9000, 4500, 562]);
        // header + 32 bits + trailing pulse
        assert_eq!(pulses.len(), 2 + 64 + 1);
        assert_eq!(*pulses.last().unwrap(), 562);
    }

    #[test]
    fn encode_range_checks() {
        assert!(matches!(
            encode(CodecType::Nec32, 0x10000, 0x13, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            encode(CodecType::Nec32, 0x7F80, 0x113, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            encode(CodecType::AppleTv, 0x100, 0x30, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            encode(CodecType::Nec16, 0x100, 0x01, 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn nec32_check_byte() {
        assert_eq!(code_for_variant(CodecType::Nec32, 0x7F8013EC), Some((0x13, 0x7F80)));
        // check byte not the inverse of the scancode
        assert_eq!(code_for_variant(CodecType::Nec32, 0x7F801313), None);
    }

    #[test]
    fn appletv_prefix_is_exclusive() {
        assert_eq!(code_for_variant(CodecType::AppleTv, 0x77E130EB), Some((0x30, 0xEB)));
        assert_eq!(code_for_variant(CodecType::Nec32, 0x77E130EB), None);
        assert_eq!(code_for_variant(CodecType::AppleTv, 0x7F8013EC), None);
    }

    #[test]
    fn nec16_has_no_check_byte() {
        assert_eq!(code_for_variant(CodecType::Nec16, 0x1234), Some((0x34, 0x12)));
    }
}
