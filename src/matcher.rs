use std::path::Path;

use memchr::memmem::Finder;
use regex::{Regex, RegexBuilder};

use crate::entry::Candidate;
use crate::error::FindError;
use crate::options::SearchOptions;
use crate::traits::Matcher;

// ---------------------------------------------------------------------------
// FileMatcher
// ---------------------------------------------------------------------------

/// The name/size/content predicates of a [`SearchOptions`], compiled once.
///
/// All predicates that are set must pass; unset ones never reject. They run
/// cheapest first: name, then size, then content (which reads the file).
///
/// Content matching loads the whole file into memory. There is no size cap,
/// so pair a content pattern with `size_max` when huge files are possible.
/// Only regular files (directly or through a symlink) have their contents
/// read; FIFOs, sockets and devices never match a content pattern, since
/// reading them can block forever.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    name:         Option<Regex>,
    size_min:     Option<u64>,
    size_max:     Option<u64>,
    content:      Option<Finder<'static>>,
    fold_content: bool,
}

impl FileMatcher {
    /// Compile the predicates of `options`.
    ///
    /// # Errors
    ///
    /// [`FindError::PatternTranslation`] if `name_pattern` is not a valid
    /// regular expression. Patterns produced by
    /// [`wildcard_to_regex`](crate::wildcard_to_regex) always compile.
    pub fn new(options: &SearchOptions) -> Result<Self, FindError> {
        let name = if options.name_pattern.is_empty() {
            None
        } else {
            let re = RegexBuilder::new(&options.name_pattern)
                .case_insensitive(options.ignore_case)
                .build()
                .map_err(|source| FindError::PatternTranslation {
                    pattern: options.name_pattern.clone(),
                    source,
                })?;
            Some(re)
        };

        // Plain substring search, linear in the file size. With case folding
        // the needle is lowercased here and the contents at read time.
        let content = if options.content_pattern.is_empty() {
            None
        } else if options.ignore_case {
            Some(Finder::new(options.content_pattern.to_lowercase().as_bytes()).into_owned())
        } else {
            Some(Finder::new(options.content_pattern.as_bytes()).into_owned())
        };

        Ok(Self {
            name,
            size_min: options.size_min,
            size_max: options.size_max,
            content,
            fold_content: options.ignore_case,
        })
    }

    /// Full-string match of the file name. Anchoring is the pattern's job:
    /// wildcard translation adds `^` and `$`.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.as_ref().map_or(true, |re| re.is_match(name))
    }

    /// Inclusive size bounds.
    pub fn matches_size(&self, size: u64) -> bool {
        self.size_min.map_or(true, |min| size >= min)
            && self.size_max.map_or(true, |max| size <= max)
    }

    /// Substring containment over the file's full contents.
    ///
    /// Anything that does not resolve to a regular file is a non-match.
    /// Case-folded contents are lowercased after lossy UTF-8 decoding, so
    /// invalid sequences never match a valid needle.
    ///
    /// # Errors
    ///
    /// [`FindError::ContentRead`] if the file cannot be stat'ed or read,
    /// dangling symlinks included.
    pub fn matches_content(&self, path: &Path) -> Result<bool, FindError> {
        let Some(finder) = &self.content else {
            return Ok(true);
        };
        let read_error = |source| FindError::ContentRead {
            path: path.to_path_buf(),
            source,
        };

        if !std::fs::metadata(path).map_err(read_error)?.is_file() {
            return Ok(false);
        }
        let bytes = std::fs::read(path).map_err(read_error)?;

        if self.fold_content {
            let folded = String::from_utf8_lossy(&bytes).to_lowercase();
            Ok(finder.find(folded.as_bytes()).is_some())
        } else {
            Ok(finder.find(&bytes).is_some())
        }
    }
}

impl Matcher for FileMatcher {
    fn is_match(&self, candidate: &Candidate) -> bool {
        self.evaluate(candidate).unwrap_or(false)
    }

    fn evaluate(&self, candidate: &Candidate) -> Result<bool, FindError> {
        if !self.matches_name(&candidate.name) || !self.matches_size(candidate.size) {
            return Ok(false);
        }
        self.matches_content(&candidate.path)
    }
}

// ---------------------------------------------------------------------------
// One-shot evaluation
// ---------------------------------------------------------------------------

/// Evaluate a single candidate against `options`.
///
/// Fail-closed: an invalid name pattern or an unreadable file is a non-match.
/// Searching many files should build one [`FileMatcher`] instead, which
/// compiles the patterns once.
pub fn matches(candidate: &Candidate, options: &SearchOptions) -> bool {
    FileMatcher::new(options)
        .map(|m| m.is_match(candidate))
        .unwrap_or(false)
}
