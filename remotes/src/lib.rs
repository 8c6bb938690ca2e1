//! Decode and encode consumer infrared remote control protocols
//!
//! Raw pulse and space durations read from a lirc device are fed to one
//! state machine per protocol; each state machine publishes decoded
//! [`RemoteEvent`]s to its subscribers. The reverse direction encodes a
//! `(device, scancode, repeats)` triple into the pulse array a lirc device
//! transmits.

pub mod codec;
pub mod event;
pub mod keymap;
pub mod markspace;
pub mod merger;
pub mod publisher;
pub mod rawir;
pub mod source;

pub use codec::{encode, Codec, CodecType, Decoder};
pub use event::{PulseEvent, PulseKind, RemoteEvent};
pub use markspace::MarkSpace;
pub use merger::Merger;
pub use publisher::{Publisher, Subscription};
pub use source::{LircSource, PulseSource};

/// Errors surfaced by constructors and the encode path. The decode path
/// never errors; malformed frames are dropped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not implemented")]
    NotImplemented,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
