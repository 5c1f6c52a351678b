//! Monotonic frame clock

use std::time::Duration;

/// Seconds since the frame loop started. Never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct ElapsedTime(f32);

impl ElapsedTime {
    pub const ZERO: ElapsedTime = ElapsedTime(0.0);

    pub fn secs(self) -> f32 {
        self.0
    }
}

/// Frame clock fed by the host's clock once per frame
///
/// The host reports time since loop start (for Bevy, `Time<Real>::elapsed`).
/// A host value that goes backwards is ignored so consumers only ever see a
/// non-decreasing elapsed time.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    elapsed: ElapsedTime,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the host time `now` and return the committed elapsed time
    pub fn advance(&mut self, now: Duration) -> ElapsedTime {
        let secs = now.as_secs_f32();
        if secs.is_finite() && secs > self.elapsed.0 {
            self.elapsed = ElapsedTime(secs);
        } else if secs < self.elapsed.0 {
            tracing::debug!(
                host = secs,
                kept = self.elapsed.0,
                "Host clock went backwards, keeping previous elapsed time"
            );
        }
        self.frame += 1;
        self.elapsed
    }

    pub fn elapsed(&self) -> ElapsedTime {
        self.elapsed
    }

    /// Number of frames advanced so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.elapsed(), ElapsedTime::ZERO);

        let t1 = clock.advance(Duration::from_millis(16));
        let t2 = clock.advance(Duration::from_millis(33));
        assert!(t2 > t1);
        assert!((t2.secs() - 0.033).abs() < 1e-6);

        // Host clock jitter backwards must not rewind
        let t3 = clock.advance(Duration::from_millis(20));
        assert_eq!(t3, t2);
        assert_eq!(clock.frame(), 3);
    }
}
