// ABOUTME: Test double for the Reporter trait that records failures without failing the test
// ABOUTME: Used to assert on assertion behavior itself

#[cfg(test)]
mod mock_test;

use parking_lot::Mutex;

use crate::report::{Failure, Reporter};

/// Reporter that only records what it is given.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    failures: Mutex<Vec<Failure>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<Failure> {
        self.failures.lock().clone()
    }

    /// Rendered messages, in report order.
    pub fn messages(&self) -> Vec<String> {
        self.failures.lock().iter().map(Failure::message).collect()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.lock().len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.lock().is_empty()
    }

    pub fn clear(&self) {
        self.failures.lock().clear();
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, failure: Failure) {
        self.failures.lock().push(failure);
    }
}
