//! Self-contained timers - callers feed elapsed or delta time, timers decide

use super::easing::Easing;

/// Throttled timer - minimum interval between fires
#[derive(Debug, Clone, Copy)]
pub struct Throttled {
    min_interval: f32,
    time_since_last: f32,
}

impl Throttled {
    /// Create throttled timer with minimum interval
    pub fn new(min_interval: f32) -> Self {
        Self {
            min_interval,
            time_since_last: 0.0,
        }
    }

    /// Attempt to fire, returns true if enough time has passed
    pub fn try_tick(&mut self, delta: f32) -> bool {
        self.time_since_last += delta;

        if self.time_since_last >= self.min_interval {
            self.time_since_last = 0.0;
            true
        } else {
            false
        }
    }

    /// Time accumulated towards the next fire
    pub fn pending(&self) -> f32 {
        self.time_since_last
    }
}

/// One eased 0 → 1 ramp placed on a timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub start: f32,
    pub duration: f32,
    pub easing: Easing,
}

impl Tween {
    pub fn new(start: f32, duration: f32, easing: Easing) -> Self {
        Self {
            start,
            duration,
            easing,
        }
    }

    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// Eased progress at timeline time `t`
    pub fn progress(&self, t: f32) -> f32 {
        if t <= self.start {
            return 0.0;
        }
        if self.duration <= 0.0 || t >= self.end() {
            return 1.0;
        }
        self.easing.evaluate((t - self.start) / self.duration)
    }
}
