// ABOUTME: Tests for RecordingReporter; this file is also the passthrough exception of the caller filter
// ABOUTME: Frames from here are reported even though the mock directory is internal

#[cfg(test)]
mod tests {
    use crate::assert::{caller_info, equal, is_nil, is_true};
    use crate::mock::RecordingReporter;

    #[test]
    fn test_recorder_starts_clean() {
        let r = RecordingReporter::new();
        assert!(r.is_clean());
        assert_eq!(r.failure_count(), 0);
        assert!(r.messages().is_empty());
    }

    #[test]
    fn test_recorder_keeps_report_order() {
        let r = RecordingReporter::new();
        equal(&r, 1, 2);
        is_true(&r, false);
        is_nil(&r, Some("x"));

        let names: Vec<_> = r.failures().iter().map(|f| f.assertion()).collect();
        assert_eq!(names, vec!["equal", "is_true", "is_nil"]);

        r.clear();
        assert!(r.is_clean());
    }

    #[test]
    fn test_passthrough_file_frames_are_reported() {
        let (callers, line): (Vec<String>, u32) = (caller_info().collect(), line!());

        assert!(!callers.is_empty());
        assert!(
            callers[0].ends_with(&format!("mock_test.rs:{line}")),
            "callers: {callers:?}"
        );
    }

    #[test]
    fn test_failure_trace_points_into_passthrough_file() {
        let r = RecordingReporter::new();
        equal(&r, "left", "right");

        let failures = r.failures();
        let failure = &failures[0];
        assert!(
            failure.trace()[0].contains("mock_test.rs:"),
            "trace: {:?}",
            failure.trace()
        );
        assert!(failure.trace().iter().all(|entry| !entry.contains("caller.rs")));
    }
}
