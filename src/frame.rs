use crate::core::Clock;

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    pub time: f32,
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }
}

/// Infinite iterator that yields frame information
/// Use this in a loop: `for frame in frames { ... }`
#[derive(Debug, Default)]
pub struct FrameIterator {
    frame_number: u64,
    clock: Clock,
}

impl FrameIterator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Restarts numbering and timing from now
    pub fn reset(&mut self) {
        self.frame_number = 0;
        self.clock.reset();
    }
}

impl Iterator for FrameIterator {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        // Unclamped: animations advance by the real time since the last frame
        let delta = self.clock.tick();
        let info = FrameInfo::new(self.frame_number, self.clock.elapsed(), delta);
        self.frame_number += 1;
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_numbered() {
        let mut frames = FrameIterator::new();
        let first = frames.next().unwrap();
        let second = frames.next().unwrap();
        assert_eq!(first.number, 0);
        assert_eq!(second.number, 1);
        assert!(second.time >= first.time);
    }

    #[test]
    fn long_stall_is_reported_in_full() {
        let mut frames = FrameIterator::new();
        frames.next();
        std::thread::sleep(std::time::Duration::from_millis(150));
        let after_stall = frames.next().unwrap();
        assert!(after_stall.delta >= 0.15, "delta {}", after_stall.delta);
    }

    #[test]
    fn reset_restarts_numbering() {
        let mut frames = FrameIterator::new();
        frames.next();
        frames.next();
        frames.reset();
        assert_eq!(frames.frame_number(), 0);
    }
}
