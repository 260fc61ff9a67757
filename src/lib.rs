//! # parfind
//!
//! Parallel filesystem search with streamed results.
//!
//! Give parfind a root directory and any mix of predicates (a wildcard file
//! name, an inclusive size range, a content substring, a depth limit, case
//! folding) and it walks the tree on a bounded thread pool, handing each
//! matching path to you the moment it is found.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let search = parfind::search()
//!     .root("/srv/data")
//!     .name("*.csv")
//!     .min_size(1024)
//!     .ignore_case(true)
//!     .spawn()?;
//!
//! for path in &search {
//!     println!("{}", path.display());
//! }
//!
//! let results = search.wait()?;
//! println!("Found {} matching files in {:.3}s",
//!     results.matches,
//!     results.stats.duration.as_secs_f64()
//! );
//! # Ok::<(), parfind::FindError>(())
//! ```
//!
//! # How a search runs
//!
//! Every subdirectory becomes work for the pool as soon as it is seen. Every
//! other entry (regular files, and symlinks, which are never followed) is
//! stat'ed and run through the [`Matcher`]. Matches go through a zero-capacity
//! channel, so a slow consumer slows the walk down instead of piling up
//! results. The stream ends exactly once, after the last worker is done.
//!
//! Unreadable directories and files never abort a search. They are logged
//! through `tracing`, and collected into [`Results::errors`] on request.
//!
//! Content matching reads each candidate file whole; bound it with
//! [`max_size`](SearchBuilder::max_size) when very large files are possible.
//!
//! # Flag-shaped input
//!
//! Front ends that speak `find`-style flags (`-1` for "unbounded") can build
//! [`RawFlags`], which also deserializes from config files:
//!
//! ```rust
//! use parfind::{build_options, RawFlags};
//!
//! let options = build_options(&RawFlags {
//!     name:  "report_??.txt".into(),
//!     depth: 2,
//!     ..RawFlags::default()
//! });
//! assert_eq!(options.name_pattern, r"^report_..\.txt$");
//! assert_eq!(options.max_depth, Some(2));
//! assert_eq!(options.size_min, None);
//! ```

#![forbid(unsafe_code)]

mod builder;
mod engine;
mod entry;
mod error;
mod matcher;
mod options;
mod results;
mod stream;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::SearchBuilder;
pub use entry::{Candidate, EntryKind};
pub use error::FindError;
pub use matcher::{matches, FileMatcher};
pub use options::{build_options, wildcard_to_regex, RawFlags, SearchOptions};
pub use results::{Results, ScanStats};
pub use stream::Search;
pub use traits::Matcher;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a search.
///
/// # Example
///
/// ```rust,no_run
/// let results = parfind::search()
///     .root("docs")
///     .name("*.md")
///     .collect_paths(true)
///     .run()?;
///
/// for path in &results.paths {
///     println!("{}", path.display());
/// }
/// # Ok::<(), parfind::FindError>(())
/// ```
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
