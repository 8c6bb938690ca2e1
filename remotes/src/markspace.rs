//! Timing window matching for mark and space durations
//!
//! All tolerance arithmetic lives here; the codec state machines only ask
//! whether an event falls inside a window.

use crate::event::{PulseEvent, PulseKind};

/// A nominal mark or space duration with a tolerance window around it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkSpace {
    kind: PulseKind,
    nominal: u32,
    min: u32,
    max: u32,
}

impl MarkSpace {
    /// A window of `nominal` microseconds ± `tolerance` percent
    pub const fn new(kind: PulseKind, nominal: u32, tolerance: u32) -> Self {
        let delta = (nominal as u64 * tolerance as u64 / 100) as u32;

        MarkSpace {
            kind,
            nominal,
            min: nominal.saturating_sub(delta),
            max: nominal + delta,
        }
    }

    /// Rewrite the window in place. Used where the nominal depends on how
    /// much of the frame slot a transmission consumed.
    pub fn set(&mut self, nominal: u32, tolerance: u32) {
        *self = MarkSpace::new(self.kind, nominal, tolerance);
    }

    /// The nominal duration, which is also what the encoders transmit
    pub fn nominal(&self) -> u32 {
        self.nominal
    }

    /// Event of the same kind with a duration inside the window
    pub fn matches(&self, event: &PulseEvent) -> bool {
        self.kind == event.kind && self.min <= event.duration && event.duration <= self.max
    }

    /// Event of the same kind no longer than the window allows
    pub fn greater_than(&self, event: &PulseEvent) -> bool {
        self.kind == event.kind && event.duration <= self.max
    }

    /// Event of the same kind no shorter than the window allows
    pub fn less_than(&self, event: &PulseEvent) -> bool {
        self.kind == event.kind && event.duration >= self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window() {
        let ms = MarkSpace::new(PulseKind::Pulse, 9000, 25);

        assert!(ms.matches(&PulseEvent::pulse(9000)));
        assert!(ms.matches(&PulseEvent::pulse(6750)));
        assert!(ms.matches(&PulseEvent::pulse(11250)));
        assert!(!ms.matches(&PulseEvent::pulse(6749)));
        assert!(!ms.matches(&PulseEvent::pulse(11251)));
    }

    #[test]
    fn kind_mismatch() {
        let ms = MarkSpace::new(PulseKind::Space, 4500, 25);

        assert!(ms.matches(&PulseEvent::space(4500)));
        assert!(!ms.matches(&PulseEvent::pulse(4500)));
        assert!(!ms.matches(&PulseEvent::timeout(4500)));
        assert!(!ms.greater_than(&PulseEvent::pulse(10)));
        assert!(!ms.less_than(&PulseEvent::pulse(1 << 24)));
    }

    #[test]
    fn min_clamped_to_zero() {
        let ms = MarkSpace::new(PulseKind::Space, 100, 200);

        assert!(ms.matches(&PulseEvent::space(0)));
        assert!(ms.matches(&PulseEvent::space(300)));
        assert!(!ms.matches(&PulseEvent::space(301)));
    }

    #[test]
    fn half_open_bounds() {
        let ms = MarkSpace::new(PulseKind::Space, 1000, 35);

        assert!(ms.greater_than(&PulseEvent::space(0)));
        assert!(ms.greater_than(&PulseEvent::space(1350)));
        assert!(!ms.greater_than(&PulseEvent::space(1351)));

        assert!(ms.less_than(&PulseEvent::space(650)));
        assert!(ms.less_than(&PulseEvent::space(1 << 24)));
        assert!(!ms.less_than(&PulseEvent::space(649)));
    }

    #[test]
    fn rewrite() {
        let mut ms = MarkSpace::new(PulseKind::Space, 45000, 35);

        ms.set(24000, 35);

        assert_eq!(ms.nominal(), 24000);
        assert!(ms.matches(&PulseEvent::space(24000)));
        assert!(!ms.matches(&PulseEvent::space(45000)));
    }
}
