// ABOUTME: The reporting handle consumed by assertions and the failure record they hand over
// ABOUTME: TestReporter collects failures during a test and fails it when dropped

use parking_lot::Mutex;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, Once};
use verity_logging::{error, warn};

use crate::assert::CallerFilter;

/// Separator between trace entries in a rendered failure.
const TRACE_SEPARATOR: &str = "\n\t\t\t";

/// A single failed assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    assertion: &'static str,
    summary: String,
    location: &'static Location<'static>,
    trace: Vec<String>,
}

impl Failure {
    /// Build a failure record. An empty trace falls back to the assertion's
    /// call site so the failure always points somewhere.
    pub fn new(
        assertion: &'static str,
        summary: impl Into<String>,
        location: &'static Location<'static>,
        mut trace: Vec<String>,
    ) -> Self {
        if trace.is_empty() {
            trace.push(format!("{}:{}", location.file(), location.line()));
        }
        Self {
            assertion,
            summary: summary.into(),
            location,
            trace,
        }
    }

    /// Name of the assertion that failed, e.g. `"equal"`.
    pub fn assertion(&self) -> &'static str {
        self.assertion
    }

    /// The comparison part of the message, e.g. `1 != 2`.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Where the assertion was called.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Filtered caller entries, innermost first.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// The full rendered message.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n Error Trace:   {}",
            self.summary,
            self.trace.join(TRACE_SEPARATOR)
        )
    }
}

/// A sink for non-fatal assertion failures.
///
/// Reporting must not abort the caller: the assertion returns normally after
/// `report` and the test keeps running.
pub trait Reporter {
    fn report(&self, failure: Failure);

    /// Filter applied to the caller trace of failures sent to this reporter.
    fn caller_filter(&self) -> &CallerFilter {
        CallerFilter::standard()
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, failure: Failure) {
        (**self).report(failure)
    }

    fn caller_filter(&self) -> &CallerFilter {
        (**self).caller_filter()
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&self, failure: Failure) {
        (**self).report(failure)
    }

    fn caller_filter(&self) -> &CallerFilter {
        (**self).caller_filter()
    }
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn report(&self, failure: Failure) {
        (**self).report(failure)
    }

    fn caller_filter(&self) -> &CallerFilter {
        (**self).caller_filter()
    }
}

/// Per-test failure log for plain `#[test]` functions.
///
/// Failures are logged and collected as they happen. When the reporter is
/// dropped with failures still recorded, it panics with all of them, which
/// fails the test after its body has run to completion.
///
/// ```should_panic
/// use verity::{TestReporter, equal, is_true};
///
/// let t = TestReporter::new();
/// equal(&t, 1 + 1, 3);
/// is_true(&t, false);
/// assert_eq!(t.failure_count(), 2);
/// // `t` panics here, listing both failures
/// ```
#[derive(Debug)]
pub struct TestReporter {
    failures: Mutex<Vec<Failure>>,
    filter: Option<CallerFilter>,
}

/// Install the process-wide test subscriber the first time a reporter is built.
fn install_test_logging() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if let Err(e) = verity_logging::init_test_logging() {
            warn!(error = %format!("{e:#}"), "Assertion failures will not be logged");
        }
    });
}

impl TestReporter {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Use `filter` instead of the standard one for this reporter's traces.
    pub fn with_filter(filter: CallerFilter) -> Self {
        Self::build(Some(filter))
    }

    fn build(filter: Option<CallerFilter>) -> Self {
        install_test_logging();
        Self {
            failures: Mutex::new(Vec::new()),
            filter,
        }
    }

    pub fn failed(&self) -> bool {
        !self.failures.lock().is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.lock().len()
    }

    pub fn failures(&self) -> Vec<Failure> {
        self.failures.lock().clone()
    }

    /// Remove and return the recorded failures. The reporter will not panic
    /// on drop for failures taken this way.
    pub fn take_failures(&self) -> Vec<Failure> {
        std::mem::take(&mut *self.failures.lock())
    }
}

impl Default for TestReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TestReporter {
    fn report(&self, failure: Failure) {
        error!(
            assertion = failure.assertion(),
            location = %failure.location(),
            "{failure}"
        );
        self.failures.lock().push(failure);
    }

    fn caller_filter(&self) -> &CallerFilter {
        match &self.filter {
            Some(filter) => filter,
            None => CallerFilter::standard(),
        }
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        let failures = std::mem::take(self.failures.get_mut());
        if failures.is_empty() || std::thread::panicking() {
            return;
        }

        let rendered: Vec<String> = failures.iter().map(Failure::message).collect();
        panic!(
            "{} assertion(s) failed:\n\n{}",
            failures.len(),
            rendered.join("\n\n")
        );
    }
}
