//! Protocol codecs
//!
//! One module per protocol family. Every family contributes a pure decoder
//! state machine and a pure encoder; this module ties them to a pulse source
//! and a publisher so each codec runs as its own task.

use crate::event::{PulseEvent, RemoteEvent};
use crate::publisher::{Publisher, Subscription};
use crate::source::PulseSource;
use crate::Error;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

pub mod nec;
pub mod panasonic;
pub mod rc5;
pub mod sony;

/// Identifies a remote control protocol variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecType {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "rc5")]
    Rc5,
    #[serde(rename = "rc5x_20")]
    Rc5x20,
    #[serde(rename = "rc5_sz")]
    Rc5Sz,
    #[serde(rename = "jvc")]
    Jvc,
    #[serde(rename = "sony12")]
    Sony12,
    #[serde(rename = "sony15")]
    Sony15,
    #[serde(rename = "sony20")]
    Sony20,
    #[serde(rename = "nec16")]
    Nec16,
    #[serde(rename = "nec32")]
    Nec32,
    #[serde(rename = "necx")]
    Necx,
    #[serde(rename = "sanyo")]
    Sanyo,
    #[serde(rename = "rc6_0")]
    Rc6_0,
    #[serde(rename = "rc6_6a_20")]
    Rc6_6a20,
    #[serde(rename = "rc6_6a_24")]
    Rc6_6a24,
    #[serde(rename = "rc6_6a_32")]
    Rc6_6a32,
    #[serde(rename = "rc6_mce")]
    Rc6Mce,
    #[serde(rename = "sharp")]
    Sharp,
    #[serde(rename = "appletv")]
    AppleTv,
    #[serde(rename = "panasonic")]
    Panasonic,
}

impl CodecType {
    /// The variants this crate can decode and encode
    pub const SUPPORTED: [CodecType; 8] = [
        CodecType::Nec32,
        CodecType::Nec16,
        CodecType::AppleTv,
        CodecType::Sony12,
        CodecType::Sony15,
        CodecType::Sony20,
        CodecType::Panasonic,
        CodecType::Rc5,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CodecType::None => "none",
            CodecType::Rc5 => "rc5",
            CodecType::Rc5x20 => "rc5x_20",
            CodecType::Rc5Sz => "rc5_sz",
            CodecType::Jvc => "jvc",
            CodecType::Sony12 => "sony12",
            CodecType::Sony15 => "sony15",
            CodecType::Sony20 => "sony20",
            CodecType::Nec16 => "nec16",
            CodecType::Nec32 => "nec32",
            CodecType::Necx => "necx",
            CodecType::Sanyo => "sanyo",
            CodecType::Rc6_0 => "rc6_0",
            CodecType::Rc6_6a20 => "rc6_6a_20",
            CodecType::Rc6_6a24 => "rc6_6a_24",
            CodecType::Rc6_6a32 => "rc6_6a_32",
            CodecType::Rc6Mce => "rc6_mce",
            CodecType::Sharp => "sharp",
            CodecType::AppleTv => "appletv",
            CodecType::Panasonic => "panasonic",
        }
    }

    /// Frame length in bits for the variants this crate supports
    pub fn bit_length(self) -> Option<u32> {
        match self {
            CodecType::Nec32 | CodecType::AppleTv => Some(32),
            CodecType::Nec16 => Some(16),
            CodecType::Sony12 => Some(12),
            CodecType::Sony15 => Some(15),
            CodecType::Sony20 => Some(20),
            CodecType::Panasonic => Some(48),
            CodecType::Rc5 => Some(14),
            _ => None,
        }
    }

    /// Nominal transmit carrier in Hz
    pub fn carrier(self) -> Option<u32> {
        match self {
            CodecType::Nec32 | CodecType::Nec16 | CodecType::AppleTv => Some(38000),
            CodecType::Sony12 | CodecType::Sony15 | CodecType::Sony20 => Some(40000),
            CodecType::Panasonic => Some(37000),
            CodecType::Rc5 => Some(36000),
            _ => None,
        }
    }
}

impl fmt::Display for CodecType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            CodecType::None,
            CodecType::Rc5,
            CodecType::Rc5x20,
            CodecType::Rc5Sz,
            CodecType::Jvc,
            CodecType::Sony12,
            CodecType::Sony15,
            CodecType::Sony20,
            CodecType::Nec16,
            CodecType::Nec32,
            CodecType::Necx,
            CodecType::Sanyo,
            CodecType::Rc6_0,
            CodecType::Rc6_6a20,
            CodecType::Rc6_6a24,
            CodecType::Rc6_6a32,
            CodecType::Rc6Mce,
            CodecType::Sharp,
            CodecType::AppleTv,
            CodecType::Panasonic,
        ]
        .into_iter()
        .find(|codec| codec.name() == s)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown codec ‘{s}’")))
    }
}

/// A protocol decoder state machine.
///
/// Feeding it receiver events one at a time yields a [`RemoteEvent`] for
/// every complete, valid frame. Anything off-template silently returns the
/// machine to its initial state.
pub enum Decoder {
    Nec(nec::NecDecoder),
    Sony(sony::SonyDecoder),
    Panasonic(panasonic::PanasonicDecoder),
    Rc5(rc5::Rc5Decoder),
}

impl Decoder {
    pub fn new(codec_type: CodecType) -> Result<Decoder, Error> {
        match codec_type {
            CodecType::Nec32 | CodecType::Nec16 | CodecType::AppleTv => {
                Ok(Decoder::Nec(nec::NecDecoder::new(codec_type)))
            }
            CodecType::Sony12 | CodecType::Sony15 | CodecType::Sony20 => {
                Ok(Decoder::Sony(sony::SonyDecoder::new(codec_type)))
            }
            CodecType::Panasonic => Ok(Decoder::Panasonic(panasonic::PanasonicDecoder::new())),
            CodecType::Rc5 => Ok(Decoder::Rc5(rc5::Rc5Decoder::new())),
            other => Err(Error::InvalidArgument(format!(
                "no decoder for codec {other}"
            ))),
        }
    }

    pub fn codec_type(&self) -> CodecType {
        match self {
            Decoder::Nec(decoder) => decoder.codec_type(),
            Decoder::Sony(decoder) => decoder.codec_type(),
            Decoder::Panasonic(_) => CodecType::Panasonic,
            Decoder::Rc5(_) => CodecType::Rc5,
        }
    }

    /// Advance the state machine by one receiver event
    pub fn input(&mut self, event: PulseEvent) -> Option<RemoteEvent> {
        match self {
            Decoder::Nec(decoder) => decoder.input(event),
            Decoder::Sony(decoder) => decoder.input(event),
            Decoder::Panasonic(decoder) => decoder.input(event),
            Decoder::Rc5(decoder) => decoder.input(event),
        }
    }

    /// Return to the initial state, discarding any partial frame
    pub fn reset(&mut self) {
        match self {
            Decoder::Nec(decoder) => decoder.reset(),
            Decoder::Sony(decoder) => decoder.reset(),
            Decoder::Panasonic(decoder) => decoder.reset(),
            Decoder::Rc5(decoder) => decoder.reset(),
        }
    }
}

/// Encode a frame plus `repeats` continuations into the pulse array a lirc
/// device transmits
pub fn encode(
    codec_type: CodecType,
    device: u32,
    scancode: u32,
    repeats: u32,
) -> Result<Vec<u32>, Error> {
    match codec_type {
        CodecType::Nec32 | CodecType::Nec16 | CodecType::AppleTv => {
            nec::encode(codec_type, device, scancode, repeats)
        }
        CodecType::Sony12 | CodecType::Sony15 | CodecType::Sony20 => {
            sony::encode(codec_type, device, scancode, repeats)
        }
        CodecType::Panasonic => panasonic::encode(device, scancode, repeats),
        CodecType::Rc5 => rc5::encode(device, scancode, repeats),
        other => Err(Error::InvalidArgument(format!(
            "no encoder for codec {other}"
        ))),
    }
}

enum Control {
    Reset,
    Shutdown,
}

/// A running codec instance: one decoder task bound to a pulse source,
/// publishing to any number of subscribers.
pub struct Codec {
    codec_type: CodecType,
    source: Arc<dyn PulseSource>,
    publisher: Arc<Publisher>,
    ctl: mpsc::UnboundedSender<Control>,
    task: Option<JoinHandle<()>>,
}

impl Codec {
    /// Spawn a codec against a pulse source. Must be called inside a tokio
    /// runtime. Fails with `InvalidArgument` for unsupported variants.
    pub fn new(source: Arc<dyn PulseSource>, codec_type: CodecType) -> Result<Codec, Error> {
        let decoder = Decoder::new(codec_type)?;
        let publisher = Arc::new(Publisher::new());
        let events = source.subscribe();
        let (ctl, ctl_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(pulse_task(decoder, events, ctl_rx, publisher.clone()));

        Ok(Codec {
            codec_type,
            source,
            publisher,
            ctl,
            task: Some(task),
        })
    }

    pub fn codec_type(&self) -> CodecType {
        self.codec_type
    }

    /// A new subscriber to this codec's decoded events
    pub fn subscribe(&self) -> Subscription {
        self.publisher.subscribe()
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.publisher.unsubscribe(subscription)
    }

    /// Encode and transmit through the pulse source. Errors surface here;
    /// nothing is written on invalid parameters.
    pub fn send(&self, device: u32, scancode: u32, repeats: u32) -> Result<(), Error> {
        let pulses = encode(self.codec_type, device, scancode, repeats)?;

        self.source.pulse_send(&pulses)
    }

    /// Force the decoder back to its initial state
    pub fn reset(&self) {
        let _ = self.ctl.send(Control::Reset);
    }

    /// Detach from the pulse source, drop all subscribers and stop the task
    pub async fn close(mut self) {
        let _ = self.ctl.send(Control::Shutdown);

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }

        self.publisher.close();
    }
}

impl Drop for Codec {
    fn drop(&mut self) {
        let _ = self.ctl.send(Control::Shutdown);
    }
}

async fn pulse_task(
    mut decoder: Decoder,
    mut events: broadcast::Receiver<PulseEvent>,
    mut ctl: mpsc::UnboundedReceiver<Control>,
    publisher: Arc<Publisher>,
) {
    loop {
        tokio::select! {
            // control wins over buffered pulses so shutdown is prompt
            biased;

            msg = ctl.recv() => match msg {
                Some(Control::Reset) => decoder.reset(),
                Some(Control::Shutdown) | None => break,
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(remote) = decoder.input(event) {
                        debug!(
                            "{}: device=0x{:04X} scancode=0x{:02X} repeat={}",
                            remote.codec, remote.device, remote.scancode, remote.repeat
                        );

                        publisher.emit(&remote);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!("{}: lost {missed} pulse events, resetting", decoder.codec_type());

                    decoder.reset();
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}
