// ABOUTME: Non-fatal assertion functions that report failures with a filtered caller trace
// ABOUTME: Each check is one comparison; failures go to the Reporter and execution continues

pub mod caller;
mod nil;

pub use caller::{CallerFilter, CallerInfo, Verdict, caller_info, caller_info_with};
pub use nil::Nilable;

use regex::Regex;
use std::borrow::Cow;
use std::fmt::{Debug, Display};
use std::panic::Location;
use std::sync::OnceLock;

use crate::report::{Failure, Reporter};

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Remove every run of whitespace from `s`.
pub fn clean_string(s: &str) -> Cow<'_, str> {
    whitespace().replace_all(s, "")
}

#[track_caller]
fn fail<R: Reporter + ?Sized>(reporter: &R, assertion: &'static str, summary: String) {
    let location = Location::caller();
    let trace = caller_info_with(reporter.caller_filter()).collect();
    reporter.report(Failure::new(assertion, summary, location, trace));
}

/// Report a failure unless `a == b`.
#[track_caller]
pub fn equal<R, A, B>(reporter: &R, a: A, b: B)
where
    R: Reporter + ?Sized,
    A: PartialEq<B> + Debug,
    B: Debug,
{
    if a != b {
        fail(reporter, "equal", format!("{a:?} != {b:?}"));
    }
}

/// Report a failure if `a == b`.
#[track_caller]
pub fn not_equal<R, A, B>(reporter: &R, a: A, b: B)
where
    R: Reporter + ?Sized,
    A: PartialEq<B> + Debug,
    B: Debug,
{
    if a == b {
        fail(reporter, "not_equal", format!("{a:?} == {b:?}"));
    }
}

/// Compare two strings with all whitespace removed.
///
/// Handy for generated text (rendered templates, pretty-printed JSON) where
/// only the layout differs.
#[track_caller]
pub fn equal_clean_string<R, A, B>(reporter: &R, a: A, b: B)
where
    R: Reporter + ?Sized,
    A: AsRef<str> + Display,
    B: AsRef<str> + Display,
{
    if clean_string(a.as_ref()) != clean_string(b.as_ref()) {
        fail(reporter, "equal_clean_string", format!("{a} != {b}"));
    }
}

#[track_caller]
pub fn is_true<R: Reporter + ?Sized>(reporter: &R, value: bool) {
    if !value {
        fail(reporter, "is_true", format!("{value} should be true"));
    }
}

#[track_caller]
pub fn is_false<R: Reporter + ?Sized>(reporter: &R, value: bool) {
    if value {
        fail(reporter, "is_false", format!("{value} should be false"));
    }
}

#[track_caller]
pub fn is_nil<R, V>(reporter: &R, value: V)
where
    R: Reporter + ?Sized,
    V: Nilable + Debug,
{
    if !value.is_nil() {
        fail(reporter, "is_nil", format!("{value:?} should be nil"));
    }
}

#[track_caller]
pub fn not_nil<R, V>(reporter: &R, value: V)
where
    R: Reporter + ?Sized,
    V: Nilable + Debug,
{
    if value.is_nil() {
        fail(reporter, "not_nil", format!("{value:?} should be not nil"));
    }
}
