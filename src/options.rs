use serde::Deserialize;

// ---------------------------------------------------------------------------
// RawFlags
// ---------------------------------------------------------------------------

/// Flag-shaped search input, as a command line or config file provides it.
///
/// Negative sizes and non-positive depths mean "unbounded", matching the
/// conventions of classic `find`-style flags. Every field is optional when
/// deserializing; keys are kebab-case (`min-size`, `ignore-case`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawFlags {
    /// Wildcard file name pattern (`*` and `?`). Empty = any name.
    pub name: String,

    /// Substring the file contents must contain. Empty = any contents.
    pub content: String,

    /// Minimum size in bytes, inclusive. Negative = unbounded.
    pub min_size: i64,

    /// Maximum size in bytes, inclusive. Negative = unbounded.
    pub max_size: i64,

    /// Maximum directory depth. `-1` or `0` = unbounded.
    pub depth: i64,

    /// Case-insensitive name and content matching.
    pub ignore_case: bool,
}

impl Default for RawFlags {
    fn default() -> Self {
        Self {
            name:        String::new(),
            content:     String::new(),
            min_size:    -1,
            max_size:    -1,
            depth:       -1,
            ignore_case: false,
        }
    }
}

// ---------------------------------------------------------------------------
// SearchOptions
// ---------------------------------------------------------------------------

/// The compiled-down search criteria handed to the walker and matcher.
///
/// Built once per search by [`build_options`] (or the builder) and never
/// mutated afterwards; descending into a subdirectory produces a copy one
/// level deeper via [`descend`](SearchOptions::descend).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Regular expression the whole file name must match. Empty = any name.
    pub name_pattern: String,

    /// Inclusive lower size bound in bytes.
    pub size_min: Option<u64>,

    /// Inclusive upper size bound in bytes.
    pub size_max: Option<u64>,

    /// Substring the file contents must contain. Empty = any contents.
    pub content_pattern: String,

    /// Directories at this depth or deeper are not listed. `None` = unbounded.
    pub max_depth: Option<usize>,

    /// Depth of the directory being listed. Root = 0.
    pub current_depth: usize,

    /// Applies to both name and content matching.
    pub ignore_case: bool,
}

impl SearchOptions {
    /// Options for a child directory: identical, one level deeper.
    pub fn descend(&self) -> Self {
        Self {
            current_depth: self.current_depth + 1,
            ..self.clone()
        }
    }

    /// `true` once this level may no longer list its directory.
    pub fn depth_exhausted(&self) -> bool {
        self.depth_exhausted_at(0)
    }

    /// Same check for a directory `offset` levels below this one, without
    /// materialising the intermediate copies.
    pub(crate) fn depth_exhausted_at(&self, offset: usize) -> bool {
        matches!(self.max_depth, Some(max) if self.current_depth + offset >= max)
    }

    /// `true` when no name, size or content predicate is set.
    pub fn is_unconstrained(&self) -> bool {
        self.name_pattern.is_empty()
            && self.size_min.is_none()
            && self.size_max.is_none()
            && self.content_pattern.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Translate a shell-style wildcard into an anchored regular expression.
///
/// `*` matches any run of characters, `?` exactly one; everything else is
/// literal. Escaping happens before substitution so the inserted `.*` and `.`
/// stay live.
///
/// ```rust
/// assert_eq!(parfind::wildcard_to_regex("*.txt"), r"^.*\.txt$");
/// assert_eq!(parfind::wildcard_to_regex("a?c"), "^a.c$");
/// ```
pub fn wildcard_to_regex(pattern: &str) -> String {
    let escaped = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    format!("^{escaped}$")
}

/// Turn raw flags into [`SearchOptions`] at depth 0.
///
/// Never fails: wildcard translation escapes everything it doesn't
/// substitute, so every produced pattern is a valid regex.
pub fn build_options(flags: &RawFlags) -> SearchOptions {
    let name_pattern = if flags.name.is_empty() {
        String::new()
    } else {
        wildcard_to_regex(&flags.name)
    };

    SearchOptions {
        name_pattern,
        size_min:        u64::try_from(flags.min_size).ok(),
        size_max:        u64::try_from(flags.max_size).ok(),
        content_pattern: flags.content.clone(),
        max_depth:       usize::try_from(flags.depth).ok().filter(|&d| d > 0),
        current_depth:   0,
        ignore_case:     flags.ignore_case,
    }
}
