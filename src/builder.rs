use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::engine::EngineOptions;
use crate::error::FindError;
use crate::matcher::FileMatcher;
use crate::options::{build_options, wildcard_to_regex, RawFlags, SearchOptions};
use crate::results::Results;
use crate::stream::{self, Search};
use crate::traits::Matcher;

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a search.
///
/// Created via [`parfind::search()`](crate::search). Configure with chained
/// builder methods, then either [`spawn()`](SearchBuilder::spawn) to stream
/// matches as they are found, or [`run()`](SearchBuilder::run) to block until
/// the search completes.
///
/// # Example
///
/// ```rust,ignore
/// let results = parfind::search()
///     .root("src")
///     .name("*.rs")
///     .content("unsafe")
///     .max_depth(4)
///     .threads(8)
///     .collect_paths(true)
///     .run()?;
/// ```
pub struct SearchBuilder {
    root:           PathBuf,
    options:        SearchOptions,
    matcher:        Option<Box<dyn Matcher>>,
    threads:        usize,
    collect_paths:  bool,
    collect_errors: bool,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            root:           PathBuf::from("."),
            options:        build_options(&RawFlags::default()),
            matcher:        None,
            threads:        num_cpus(),
            collect_paths:  false,
            collect_errors: false,
        }
    }
}

impl SearchBuilder {
    // ── Root ──────────────────────────────────────────────────────────────

    /// Directory to search. Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = path.into();
        self
    }

    // ── Criteria ──────────────────────────────────────────────────────────

    /// Replace all criteria with ones built from flag-shaped input.
    pub fn flags(mut self, flags: &RawFlags) -> Self {
        self.options = build_options(flags);
        self
    }

    /// Replace all criteria with prepared [`SearchOptions`].
    pub fn options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Wildcard the whole file name must match (`*` any run, `?` one
    /// character). An empty pattern removes the name constraint.
    pub fn name(mut self, pattern: &str) -> Self {
        self.options.name_pattern = if pattern.is_empty() {
            String::new()
        } else {
            wildcard_to_regex(pattern)
        };
        self
    }

    /// Raw regular expression for the file name, used as given. Anchor it
    /// yourself if it must cover the whole name. An invalid expression makes
    /// [`spawn()`](SearchBuilder::spawn) fail.
    pub fn name_regex(mut self, regex: impl Into<String>) -> Self {
        self.options.name_pattern = regex.into();
        self
    }

    /// Substring the file contents must contain.
    pub fn content(mut self, pattern: impl Into<String>) -> Self {
        self.options.content_pattern = pattern.into();
        self
    }

    /// Minimum file size in bytes, inclusive.
    pub fn min_size(mut self, bytes: u64) -> Self {
        self.options.size_min = Some(bytes);
        self
    }

    /// Maximum file size in bytes, inclusive.
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.options.size_max = Some(bytes);
        self
    }

    /// Maximum depth. `1` lists only the root directory, `2` the root and
    /// its children, and so on. `0` means unlimited, which is the default.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = Some(depth).filter(|&d| d > 0);
        self
    }

    /// Case-insensitive name and content matching.
    pub fn ignore_case(mut self, yes: bool) -> Self {
        self.options.ignore_case = yes;
        self
    }

    /// Set a custom matcher.
    ///
    /// It replaces the name, size and content predicates; the depth limit
    /// still applies since it governs traversal, not matching.
    pub fn with_matcher(mut self, m: impl Matcher + 'static) -> Self {
        self.matcher = Some(Box::new(m));
        self
    }

    // ── Execution ─────────────────────────────────────────────────────────

    /// Number of walker threads.
    ///
    /// Defaults to the number of logical CPU cores. `0` lets the walker
    /// pick on its own.
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    /// Collect paths received by [`Search::wait`] into [`Results::paths`].
    ///
    /// Disabled by default. Always enable it with [`run()`](SearchBuilder::run)
    /// if the paths themselves are wanted, not just the count.
    pub fn collect_paths(mut self, yes: bool) -> Self {
        self.collect_paths = yes;
        self
    }

    /// Collect non-fatal errors into [`Results::errors`].
    ///
    /// Disabled by default; errors are logged through `tracing` either way.
    pub fn collect_errors(mut self, yes: bool) -> Self {
        self.collect_errors = yes;
        self
    }

    /// The criteria as currently configured.
    pub fn search_options(&self) -> &SearchOptions {
        &self.options
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Start the search in the background and return the match stream.
    ///
    /// # Errors
    ///
    /// [`FindError::PatternTranslation`] for an invalid raw name regex,
    /// [`FindError::Spawn`] if the walk thread cannot be started.
    /// Traversal problems never fail here; see [`Results::errors`].
    pub fn spawn(self) -> Result<Search, FindError> {
        let matcher: Arc<dyn Matcher> = match self.matcher {
            Some(m) => Arc::from(m),
            None    => Arc::new(FileMatcher::new(&self.options)?),
        };

        debug!(
            root = %self.root.display(),
            threads = self.threads,
            collect_paths = self.collect_paths,
            collect_errors = self.collect_errors,
            "spawning search"
        );

        let (sink, matches, diagnostics) = stream::channel(self.collect_errors);
        let opts = EngineOptions {
            root:    self.root,
            options: Arc::new(self.options),
            threads: self.threads,
            matcher,
            sink,
        };

        Search::start(opts, matches, diagnostics, self.collect_paths)
    }

    /// Execute the search and block until it completes.
    ///
    /// # Errors
    ///
    /// Same as [`spawn()`](SearchBuilder::spawn), plus
    /// [`FindError::WalkerPanicked`].
    pub fn run(self) -> Result<Results, FindError> {
        self.spawn()?.wait()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Get the logical CPU count, with a safe fallback.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
