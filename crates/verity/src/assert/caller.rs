// ABOUTME: Caller-stack reporter that turns the live call chain into `path:line` entries
// ABOUTME: Skips verity's own frames and std glue, and stops at the test harness entry point

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ffi::OsStr;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use verity_logging::trace;

use crate::error::{ConfigError, Result};

/// Symbol suffix of the frame that captures the stack. Everything up to and
/// including it belongs to the unwinder and is never reported.
const ORIGIN_SYMBOL: &str = "assert::caller::capture";

/// Decides which frames of a captured stack end up in a failure trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallerFilter {
    /// Parent directory names whose files are considered assertion internals.
    pub internal_dirs: Vec<String>,

    /// File names that are always reported, even inside an internal directory.
    pub passthrough_files: Vec<String>,

    /// Symbol name fragments marking the harness frame that invoked the test.
    pub dispatch_markers: Vec<String>,

    /// Skip frames compiled from the Rust standard library.
    pub skip_std_frames: bool,

    /// Upper bound on reported entries.
    pub max_frames: Option<usize>,
}

impl Default for CallerFilter {
    fn default() -> Self {
        Self {
            internal_dirs: vec!["assert".to_string(), "mock".to_string()],
            passthrough_files: vec!["mock_test.rs".to_string()],
            dispatch_markers: vec!["__rust_begin_short_backtrace".to_string()],
            skip_std_frames: true,
            max_frames: None,
        }
    }
}

/// What to do with a single resolved frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Report the frame as the contained `path:line` entry.
    Keep(String),
    /// Leave the frame out and continue walking.
    Skip,
    /// End the walk without reporting the frame.
    Stop,
}

impl CallerFilter {
    /// The filter used by [`caller_info`] and by reporters that do not
    /// override [`Reporter::caller_filter`](crate::Reporter::caller_filter).
    pub fn standard() -> &'static CallerFilter {
        static STANDARD: OnceLock<CallerFilter> = OnceLock::new();
        STANDARD.get_or_init(CallerFilter::default)
    }

    /// Parse a filter from TOML. Missing keys keep their defaults.
    ///
    /// ```
    /// let filter = verity::CallerFilter::from_toml("max_frames = 3").unwrap();
    /// assert_eq!(filter.max_frames, Some(3));
    /// assert!(filter.skip_std_frames);
    /// ```
    pub fn from_toml(source: &str) -> Result<Self> {
        let filter: CallerFilter = toml::from_str(source)?;
        filter.validate()?;
        Ok(filter)
    }

    /// Reject settings that would make the walk meaningless.
    pub fn validate(&self) -> Result<()> {
        if let Some(index) = self.dispatch_markers.iter().position(String::is_empty) {
            return Err(ConfigError::EmptyDispatchMarker { index });
        }
        if let Some(index) = self.internal_dirs.iter().position(String::is_empty) {
            return Err(ConfigError::EmptyDirectory { index });
        }
        Ok(())
    }

    pub fn with_internal_dir(mut self, dir: impl Into<String>) -> Self {
        self.internal_dirs.push(dir.into());
        self
    }

    pub fn with_passthrough_file(mut self, file: impl Into<String>) -> Self {
        self.passthrough_files.push(file.into());
        self
    }

    pub fn with_dispatch_marker(mut self, marker: impl Into<String>) -> Self {
        self.dispatch_markers.push(marker.into());
        self
    }

    pub fn keep_std_frames(mut self, keep: bool) -> Self {
        self.skip_std_frames = !keep;
        self
    }

    pub fn with_max_frames(mut self, max: usize) -> Self {
        self.max_frames = Some(max);
        self
    }

    /// Whether `symbol` is the harness routine that dispatched the test.
    pub fn is_dispatch(&self, symbol: &str) -> bool {
        self.dispatch_markers
            .iter()
            .any(|marker| symbol.contains(marker.as_str()))
    }

    /// Decide the fate of one resolved frame.
    ///
    /// Frames whose path has no parent directory are kept: there is nothing
    /// to match against the internal directory list.
    pub fn classify(&self, file: &Path, line: u32, symbol: Option<&str>) -> Verdict {
        if symbol.is_some_and(|name| self.is_dispatch(name)) {
            return Verdict::Stop;
        }

        if self.skip_std_frames && is_std_path(file) {
            return Verdict::Skip;
        }

        let file_name = file.file_name().and_then(OsStr::to_str);
        let dir_name = file
            .parent()
            .and_then(Path::file_name)
            .and_then(OsStr::to_str);

        if let (Some(file_name), Some(dir_name)) = (file_name, dir_name) {
            let internal = self.internal_dirs.iter().any(|dir| dir == dir_name);
            let passthrough = self.passthrough_files.iter().any(|f| f == file_name);
            if internal && !passthrough {
                return Verdict::Skip;
            }
        }

        Verdict::Keep(format!("{}:{}", file.display(), line))
    }
}

/// Whether a path points into the precompiled standard library.
fn is_std_path(file: &Path) -> bool {
    let path = file.to_string_lossy().replace('\\', "/");
    path.starts_with("/rustc/")
        || ["/library/core/", "/library/std/", "/library/alloc/"]
            .iter()
            .any(|segment| path.contains(segment))
}

/// For a closure symbol such as `app::run::{{closure}}`, the path of the
/// function that defines it.
fn closure_parent(symbol: &str) -> Option<&str> {
    let (parent, last) = symbol.rsplit_once("::")?;
    (last == "{{closure}}" || last.starts_with("{closure#")).then_some(parent)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    /// Still inside the unwinder; looking for the capture frame.
    Seeking,
    Walking,
    Done,
}

#[derive(Debug)]
struct ResolvedSymbol {
    file: Option<PathBuf>,
    line: Option<u32>,
    name: Option<String>,
}

/// Lazily resolved caller trace, innermost call first.
///
/// The raw stack is captured when the value is created; symbols are resolved
/// one frame at a time as the iterator advances. It cannot be restarted and is
/// tied to the thread that captured it.
#[derive(Debug)]
pub struct CallerInfo<'f> {
    frames: std::vec::IntoIter<backtrace::Frame>,
    pending: VecDeque<String>,
    filter: &'f CallerFilter,
    state: WalkState,
    emitted: usize,
    /// Symbol of the most recently kept frame.
    last_kept: Option<String>,
    _thread_bound: PhantomData<*const ()>,
}

impl<'f> CallerInfo<'f> {
    fn new(frames: Vec<backtrace::Frame>, filter: &'f CallerFilter) -> Self {
        Self {
            frames: frames.into_iter(),
            pending: VecDeque::new(),
            filter,
            state: WalkState::Seeking,
            emitted: 0,
            last_kept: None,
            _thread_bound: PhantomData,
        }
    }

    fn finish(&mut self, reason: &'static str) {
        if self.state != WalkState::Done {
            trace!(entries = self.emitted + self.pending.len(), reason, "Caller walk finished");
            self.state = WalkState::Done;
        }
    }

    fn step(&mut self, frame: &backtrace::Frame) {
        let mut symbols = Vec::new();
        backtrace::resolve_frame(frame, |symbol| {
            symbols.push(ResolvedSymbol {
                file: symbol.filename().map(Path::to_path_buf),
                line: symbol.lineno(),
                name: symbol.name().map(|name| format!("{name:#}")),
            });
        });

        if symbols.is_empty() {
            if self.state == WalkState::Walking {
                self.finish("unresolved frame");
            }
            return;
        }

        // Inlined calls resolve to several symbols, innermost first
        for symbol in symbols {
            match self.state {
                WalkState::Seeking => {
                    if symbol
                        .name
                        .as_deref()
                        .is_some_and(|name| name.ends_with(ORIGIN_SYMBOL))
                    {
                        self.state = WalkState::Walking;
                    }
                }
                WalkState::Walking => {
                    let (Some(file), Some(line), Some(name)) =
                        (symbol.file, symbol.line, symbol.name)
                    else {
                        self.finish("unresolved frame");
                        return;
                    };
                    // A closure calling the function it is defined in, like the
                    // harness shim around a #[test] fn, repeats that frame
                    if self
                        .last_kept
                        .as_deref()
                        .is_some_and(|kept| closure_parent(&name) == Some(kept))
                    {
                        continue;
                    }
                    match self.filter.classify(&file, line, Some(&name)) {
                        Verdict::Keep(entry) => {
                            self.pending.push_back(entry);
                            self.last_kept = Some(name);
                        }
                        Verdict::Skip => {}
                        Verdict::Stop => {
                            self.finish("harness dispatch");
                            return;
                        }
                    }
                }
                WalkState::Done => return,
            }
        }
    }
}

impl Iterator for CallerInfo<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if self
                .filter
                .max_frames
                .is_some_and(|max| self.emitted >= max)
            {
                self.pending.clear();
                self.finish("frame limit");
                return None;
            }

            if let Some(entry) = self.pending.pop_front() {
                self.emitted += 1;
                return Some(entry);
            }

            if self.state == WalkState::Done {
                return None;
            }

            match self.frames.next() {
                Some(frame) => self.step(&frame),
                None => self.finish("end of stack"),
            }
        }
    }
}

impl FusedIterator for CallerInfo<'_> {}

#[inline(never)]
fn capture() -> Vec<backtrace::Frame> {
    let mut frames = Vec::new();
    backtrace::trace(|frame| {
        frames.push(frame.clone());
        true
    });
    frames
}

/// Describe the current call chain as `path:line` entries using the standard
/// filter.
#[inline(never)]
pub fn caller_info() -> CallerInfo<'static> {
    CallerInfo::new(capture(), CallerFilter::standard())
}

/// Like [`caller_info`], with a caller-supplied filter.
#[inline(never)]
pub fn caller_info_with(filter: &CallerFilter) -> CallerInfo<'_> {
    CallerInfo::new(capture(), filter)
}
