// ABOUTME: Live-stack tests for the caller reporter, run from outside the internal directories
// ABOUTME: Checks call-site attribution, filtering, repeatability, and the frame limit

#[cfg(test)]
mod tests {
    use crate::assert::{CallerFilter, caller_info, caller_info_with, equal};
    use crate::mock::RecordingReporter;

    fn line_of(entry: &str) -> u32 {
        entry
            .rsplit(':')
            .next()
            .and_then(|line| line.parse().ok())
            .unwrap_or_else(|| panic!("entry without line: {entry}"))
    }

    #[inline(never)]
    fn nested_helper() -> (Vec<String>, u32) {
        (caller_info().collect(), line!())
    }

    #[test]
    fn test_first_entry_is_call_site() {
        let (callers, line): (Vec<String>, u32) = (caller_info().collect(), line!());

        assert!(!callers.is_empty());
        assert!(callers[0].contains("caller_tests.rs:"), "callers: {callers:?}");
        assert_eq!(line_of(&callers[0]), line);
    }

    #[test]
    fn test_harness_shim_is_not_reported() {
        let callers: Vec<String> = caller_info().collect();
        assert_eq!(callers.len(), 1, "callers: {callers:?}");
    }

    #[test]
    fn test_internal_frames_are_excluded() {
        let callers: Vec<String> = caller_info().collect();
        for entry in &callers {
            assert!(!entry.contains("/assert/"), "internal frame leaked: {entry}");
            assert!(!entry.contains("/library/core/"), "std frame leaked: {entry}");
        }
    }

    #[test]
    fn test_nested_helper_is_innermost() {
        let (callers, helper_line) = nested_helper();
        let caller_line = line!() - 1;

        assert_eq!(callers.len(), 2, "callers: {callers:?}");
        assert_eq!(line_of(&callers[0]), helper_line);
        assert_eq!(line_of(&callers[1]), caller_line);
    }

    #[test]
    fn test_repeated_calls_differ_only_in_own_line() {
        let first: Vec<String> = caller_info().collect();
        let second: Vec<String> = caller_info().collect();

        assert_eq!(first.len(), second.len());
        assert_eq!(line_of(&second[0]), line_of(&first[0]) + 1);
        assert_eq!(first[1..], second[1..]);
    }

    #[test]
    fn test_walk_stops_at_harness() {
        let callers: Vec<String> = caller_info().collect();
        assert!(
            callers.iter().all(|entry| !entry.contains("library/test/")),
            "callers: {callers:?}"
        );
    }

    #[test]
    fn test_walk_is_fused() {
        let mut callers = caller_info();
        while callers.next().is_some() {}
        assert!(callers.next().is_none());
        assert!(callers.next().is_none());
    }

    #[test]
    fn test_max_frames() {
        let filter = CallerFilter::default().with_max_frames(1);
        let callers: Vec<String> = caller_info_with(&filter).collect();
        assert_eq!(callers.len(), 1);

        let filter = CallerFilter::default().with_max_frames(0);
        assert_eq!(caller_info_with(&filter).count(), 0);
    }

    #[test]
    fn test_std_frames_can_be_kept() {
        let filtered: Vec<String> = caller_info().collect();
        let filter = CallerFilter::default().keep_std_frames(true);
        let unfiltered: Vec<String> = caller_info_with(&filter).collect();

        assert!(unfiltered.len() >= filtered.len());
    }

    #[test]
    fn test_spawned_thread_stops_at_thread_entry() {
        let callers = std::thread::spawn(|| caller_info().collect::<Vec<String>>())
            .join()
            .unwrap();

        // The spawned closure is the thread's entry point, not a shim
        assert_eq!(callers.len(), 1, "callers: {callers:?}");
        assert!(callers[0].contains("caller_tests.rs:"), "callers: {callers:?}");
        assert!(callers.iter().all(|entry| !entry.contains("library/std/")));
    }

    #[test]
    fn test_assertion_trace_starts_at_test() {
        let r = RecordingReporter::new();
        let line = line!() + 1;
        equal(&r, [1, 2], [2, 1]);

        let failures = r.failures();
        let failure = &failures[0];
        assert_eq!(failure.summary(), "[1, 2] != [2, 1]");
        assert!(failure.trace()[0].contains("caller_tests.rs:"));
        assert_eq!(line_of(&failure.trace()[0]), line);
        assert!(failure.message().contains("\n Error Trace:   "));
    }
}
