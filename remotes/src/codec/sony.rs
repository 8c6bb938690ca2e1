//! Sony SIRC, 12/15/20 bit variants
//!
//! Pulse-width coded: the mark length selects the bit, spaces are a fixed
//! 575µs. Frames repeat on a 45ms slot, so the gap window has to be
//! recomputed from the duration the frame actually consumed.

use crate::codec::CodecType;
use crate::event::{PulseEvent, PulseKind, RemoteEvent};
use crate::markspace::MarkSpace;
use crate::Error;
use log::trace;
use std::time::Instant;

const TOLERANCE: u32 = 35;

/// Each transmission occupies one 45ms slot
const TX_SLOT: u32 = 45000;

const HEADER_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 2400, TOLERANCE);
const BIT_SPACE: MarkSpace = MarkSpace::new(PulseKind::Space, 575, TOLERANCE);
const ONE_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 1200, TOLERANCE);
const ZERO_PULSE: MarkSpace = MarkSpace::new(PulseKind::Pulse, 575, TOLERANCE);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    HeaderPulse,
    Space,
    Bit,
}

pub struct SonyDecoder {
    variant: CodecType,
    bit_length: u32,
    state: State,
    value: u32,
    length: u32,
    duration: u32,
    repeat: bool,
    /// Complete frame awaiting confirmation that no further bits follow
    pending: Option<RemoteEvent>,
    gap: MarkSpace,
    started: Instant,
}

impl SonyDecoder {
    pub fn new(variant: CodecType) -> SonyDecoder {
        let bit_length = match variant {
            CodecType::Sony12 => 12,
            CodecType::Sony15 => 15,
            _ => 20,
        };

        SonyDecoder {
            variant,
            bit_length,
            state: State::HeaderPulse,
            value: 0,
            length: 0,
            duration: 0,
            repeat: false,
            pending: None,
            gap: MarkSpace::new(PulseKind::Space, TX_SLOT, TOLERANCE),
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
        self.duration = 0;
        self.repeat = false;
        self.pending = None;
    }

    pub fn input(&mut self, event: PulseEvent) -> Option<RemoteEvent> {
        trace!("{}: state={:?} event={event:?}", self.variant, self.state);

        match self.state {
            State::HeaderPulse => {
                if HEADER_PULSE.matches(&event) {
                    self.duration += event.duration;
                    self.state = State::Space;
                } else {
                    self.reset();
                }

                None
            }
            State::Space => {
                if BIT_SPACE.matches(&event) {
                    // another bit follows, so the frame was not complete
                    self.pending = None;
                    self.value <<= 1;
                    self.duration += event.duration;
                    self.state = State::Bit;

                    None
                } else {
                    let pending = self.pending.take();

                    self.gap
                        .set(TX_SLOT.saturating_sub(self.duration), TOLERANCE);

                    if self.length == self.bit_length && self.gap.matches(&event) {
                        // slot boundary; the next frame is a held-key repeat
                        self.value = 0;
                        self.length = 0;
                        self.duration = 0;
                        self.repeat = true;
                        self.state = State::HeaderPulse;

                        pending
                    } else if event.kind == PulseKind::Timeout {
                        self.reset();

                        pending
                    } else {
                        // sony has no checksum; without the slot gap or an
                        // idle report the frame is not trusted
                        self.reset();

                        None
                    }
                }
            }
            State::Bit => {
                if ONE_PULSE.matches(&event) {
                    self.value |= 1;
                } else if !ZERO_PULSE.matches(&event) {
                    self.reset();
                    return None;
                }

                self.length += 1;
                self.duration += event.duration;

                if self.length == self.bit_length {
                    self.pending = self.frame_event();
                }

                self.state = State::Space;

                None
            }
        }
    }

    fn frame_event(&self) -> Option<RemoteEvent> {
        let (scancode, device) = code_for_variant(self.variant, self.value);

        Some(RemoteEvent {
            codec: self.variant,
            timestamp: self.started.elapsed(),
            device,
            scancode,
            repeat: self.repeat,
        })
    }
}

/// Split a received frame into `(scancode, device)`. Sony carries no
/// checksum; the scancode is always the 7 most significant bits.
fn code_for_variant(variant: CodecType, value: u32) -> (u32, u32) {
    match variant {
        CodecType::Sony12 => ((value & 0x0FE0) >> 5, value & 0x001F),
        CodecType::Sony15 => ((value & 0x7F00) >> 8, value & 0x00FF),
        _ => ((value & 0xFE000) >> 13, value & 0x1FFF),
    }
}

pub(super) fn encode(
    variant: CodecType,
    device: u32,
    scancode: u32,
    repeats: u32,
) -> Result<Vec<u32>, Error> {
    let bits = bits_for_variant(variant, device, scancode)?;
    let mut pulses = Vec::with_capacity((2 * bits.len() + 2) * (repeats as usize + 1));

    for frame in 0..=repeats {
        let mut length = HEADER_PULSE.nominal();
        pulses.push(HEADER_PULSE.nominal());

        for bit in &bits {
            pulses.push(BIT_SPACE.nominal());
            length += BIT_SPACE.nominal();

            let pulse = if *bit {
                ONE_PULSE.nominal()
            } else {
                ZERO_PULSE.nominal()
            };

            pulses.push(pulse);
            length += pulse;
        }

        if frame < repeats {
            pulses.push(TX_SLOT - length);
        }
    }

    Ok(pulses)
}

fn bits_for_variant(variant: CodecType, device: u32, scancode: u32) -> Result<Vec<bool>, Error> {
    let device_bits: u32 = match variant {
        CodecType::Sony12 => 5,
        CodecType::Sony15 => 8,
        CodecType::Sony20 => 13,
        other => {
            return Err(Error::InvalidArgument(format!(
                "no sony encoder for codec {other}"
            )))
        }
    };

    if scancode >= 1 << 7 {
        return Err(Error::InvalidArgument(format!(
            "sony scancode 0x{scancode:X} does not fit in 7 bits"
        )));
    }

    if device >= 1 << device_bits {
        return Err(Error::InvalidArgument(format!(
            "{variant} device 0x{device:X} does not fit in {device_bits} bits"
        )));
    }

    let mut bits = Vec::with_capacity(7 + device_bits as usize);

    push_bits(&mut bits, scancode, 7);
    push_bits(&mut bits, device, device_bits);

    Ok(bits)
}

fn push_bits(bits: &mut Vec<bool>, value: u32, length: u32) {
    let mut mask = 1u32 << (length - 1);

    for _ in 0..length {
        bits.push(value & mask != 0);
        mask >>= 1;
    }
}
