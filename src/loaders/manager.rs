use crate::error::LoadError;

/// Counts outstanding loads and signals once when all have resolved.
/// Failed items count as resolved.
#[derive(Debug, Default)]
pub struct LoadingManager {
    started: usize,
    finished: usize,
    failed: usize,
    complete: bool,
    on_load_taken: bool,
}

impl LoadingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_start(&mut self, label: &str) {
        self.started += 1;
        log::info!("Loading {} ({}/{})", label, self.finished, self.started);
    }

    pub fn item_end(&mut self, label: &str) {
        self.finished += 1;
        log::info!("Loaded {} ({}/{})", label, self.finished, self.started);
        if self.finished >= self.started {
            self.complete = true;
        }
    }

    /// Reports the failure and resolves the item
    pub fn item_error(&mut self, label: &str, error: &LoadError) {
        self.failed += 1;
        log::error!("Failed to load {}: {}", label, error);
        self.item_end(label);
    }

    /// True once every started item has resolved. Stays true.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Returns true exactly once, after completion
    pub fn take_on_load(&mut self) -> bool {
        if self.complete && !self.on_load_taken {
            self.on_load_taken = true;
            true
        } else {
            false
        }
    }

    /// (finished, started)
    pub fn progress(&self) -> (usize, usize) {
        (self.finished, self.started)
    }

    pub fn failed(&self) -> usize {
        self.failed
    }
}
