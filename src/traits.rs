use crate::entry::Candidate;
use crate::error::FindError;

/// Determines whether a candidate is a match.
///
/// [`FileMatcher`](crate::FileMatcher) is the built-in implementation driven
/// by [`SearchOptions`](crate::SearchOptions). Implement this trait for
/// anything else: extension lists, modification times, magic bytes.
///
/// # Thread Safety
///
/// `Send + Sync` are required: one matcher is shared by every walker thread
/// and called concurrently on different candidates.
///
/// # Example
///
/// ```rust
/// use parfind::{Candidate, Matcher};
///
/// struct ExtensionMatcher(String);
///
/// impl Matcher for ExtensionMatcher {
///     fn is_match(&self, candidate: &Candidate) -> bool {
///         candidate.path
///             .extension()
///             .map(|e| e.eq_ignore_ascii_case(&self.0))
///             .unwrap_or(false)
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    /// Returns `true` if this candidate should be published.
    fn is_match(&self, candidate: &Candidate) -> bool;

    /// Like [`is_match`](Matcher::is_match), but surfaces the non-fatal error
    /// that made a candidate fail, so the walker can report it.
    ///
    /// An `Err` always counts as a non-match. The default never fails.
    fn evaluate(&self, candidate: &Candidate) -> Result<bool, FindError> {
        Ok(self.is_match(candidate))
    }
}
