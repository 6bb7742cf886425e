// ABOUTME: Public API for verity, non-fatal test assertions with filtered caller traces
// ABOUTME: Re-exports the assertion functions, the caller reporter, and the reporting handles

//! Assertions that report instead of panicking.
//!
//! Every assertion takes a [`Reporter`] and, on failure, hands it a [`Failure`]
//! whose message carries both values and the call chain that led to the
//! assertion, with verity's own frames and the harness plumbing removed.
//!
//! ```
//! use verity::mock::RecordingReporter;
//! use verity::{equal, equal_clean_string, is_nil};
//!
//! let r = RecordingReporter::new();
//! equal(&r, vec![1, 2], vec![1, 2]);
//! equal_clean_string(&r, "a b\nc", "a\tb c");
//! is_nil(&r, None::<u8>);
//! assert!(r.is_clean());
//!
//! equal(&r, 1, 2);
//! assert!(r.messages()[0].starts_with("1 != 2\n Error Trace:"));
//! ```

pub mod assert;
pub mod error;
pub mod mock;
pub mod report;

#[cfg(test)]
mod caller_tests;

pub use assert::{
    CallerFilter, CallerInfo, Nilable, Verdict, caller_info, caller_info_with, clean_string, equal,
    equal_clean_string, is_false, is_nil, is_true, not_equal, not_nil,
};
pub use error::ConfigError;
pub use report::{Failure, Reporter, TestReporter};
