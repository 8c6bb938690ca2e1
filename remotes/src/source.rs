//! Pulse sources
//!
//! A pulse source broadcasts receiver events to every codec instance and
//! accepts encoded pulse arrays for transmission. The broadcast matters:
//! all codecs run against the same stream, so the source must deliver each
//! event to each subscriber, not hand events out round-robin.

use crate::event::PulseEvent;
use crate::Error;
use log::warn;
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use tokio::sync::broadcast;

/// Receiver events buffered per codec before a slow codec starts lagging
const PULSE_BUFFER: usize = 1024;

/// Contract between the codecs and whatever produces raw pulse timings
pub trait PulseSource: Send + Sync {
    /// A new, independent stream of receiver events. Dropping the receiver
    /// unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<PulseEvent>;

    /// Transmit alternating mark/space durations, starting with a mark
    fn pulse_send(&self, pulses: &[u32]) -> Result<(), Error>;

    /// Ask the receiver to report after this much idle time, best effort
    fn set_receive_timeout(&self, timeout: u32) -> Result<(), Error> {
        let _ = timeout;
        Err(Error::NotImplemented)
    }

    /// Enable or disable idle timeout records in the stream, best effort
    fn set_timeout_reports(&self, enable: bool) -> Result<(), Error> {
        let _ = enable;
        Err(Error::NotImplemented)
    }
}

/// A [`PulseSource`] backed by a Linux lirc character device.
///
/// A dedicated thread blocks on the device and fans records out on a
/// broadcast channel; sends and ioctls go through a duplicate handle so they
/// never wait on the reader.
pub struct LircSource {
    ctl: Mutex<lirc::Lirc>,
    tx: broadcast::Sender<PulseEvent>,
}

impl LircSource {
    pub fn new(path: &Path) -> Result<LircSource, Error> {
        let mut dev = lirc::open(path)?;

        if dev.can_receive_raw() {
            // Timeout records tell the Manchester decoder when the line went
            // idle; ignore drivers that cannot report them.
            let _ = dev.set_timeout_reports(true);
        }

        let ctl = dev.try_clone()?;
        let (tx, _) = broadcast::channel(PULSE_BUFFER);

        if dev.can_receive_raw() {
            let tx = tx.clone();

            thread::Builder::new()
                .name(String::from("lirc-reader"))
                .spawn(move || read_device(dev, tx))?;
        }

        Ok(LircSource {
            ctl: Mutex::new(ctl),
            tx,
        })
    }
}

fn read_device(mut dev: lirc::Lirc, tx: broadcast::Sender<PulseEvent>) {
    let mut raw = Vec::with_capacity(1024);

    loop {
        if let Err(err) = dev.receive_raw(&mut raw) {
            warn!("lirc read failed: {err}");
            return;
        }

        for record in &raw {
            let event = if record.is_pulse() {
                PulseEvent::pulse(record.value())
            } else if record.is_space() {
                PulseEvent::space(record.value())
            } else if record.is_timeout() {
                PulseEvent::timeout(record.value())
            } else {
                // carrier frequency reports are not timing information
                continue;
            };

            // An error just means no codec is listening right now
            let _ = tx.send(event);
        }
    }
}

impl PulseSource for LircSource {
    fn subscribe(&self) -> broadcast::Receiver<PulseEvent> {
        self.tx.subscribe()
    }

    fn pulse_send(&self, pulses: &[u32]) -> Result<(), Error> {
        let mut dev = self.ctl.lock().unwrap();

        dev.send(pulses)?;

        Ok(())
    }

    fn set_receive_timeout(&self, timeout: u32) -> Result<(), Error> {
        let mut dev = self.ctl.lock().unwrap();

        if !dev.can_set_timeout() {
            return Err(Error::NotImplemented);
        }

        dev.set_timeout(timeout)?;

        Ok(())
    }

    fn set_timeout_reports(&self, enable: bool) -> Result<(), Error> {
        let mut dev = self.ctl.lock().unwrap();

        // older kernels and tx-only devices reject the ioctl
        dev.set_timeout_reports(enable)
            .map_err(|_| Error::NotImplemented)
    }
}
