//! Revision tags stamped onto documents on every write.
//!
//! A revision has the textual form `"<generation>-<token>"`, where the generation counts
//! writes to the same document and the token is a fresh UUID v4.

use std::fmt;
use uuid::Uuid;

/// Separator between the generation number and the opaque token.
pub const REVISION_SEPARATOR: char = '-';

/// A parsed revision tag.
///
/// Revisions are stored on records as plain strings; this type is used to build the next
/// revision and to inspect the generation of an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    generation: u64,
    token: String,
}

impl Revision {
    /// Creates the revision that follows `previous`.
    ///
    /// The generation is one more than the generation of `previous`, or `1` when there is
    /// no previous revision. The token is always freshly generated.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let first = Revision::next(None);
    /// assert_eq!(first.generation(), 1);
    ///
    /// let second = Revision::next(Some(&first.to_string()));
    /// assert_eq!(second.generation(), 2);
    /// ```
    pub fn next(previous: Option<&str>) -> Self {
        let generation = previous
            .map(generation_of)
            .unwrap_or(0)
            .saturating_add(1);

        Self {
            generation,
            token: Uuid::new_v4().to_string(),
        }
    }

    /// Returns the generation number of this revision.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the opaque token of this revision.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.generation, REVISION_SEPARATOR, self.token)
    }
}

impl From<Revision> for String {
    fn from(revision: Revision) -> Self {
        revision.to_string()
    }
}

/// Parses the generation number from a revision string.
///
/// The whole digit run before the first separator is read, so `"10-abc"` yields `10`.
/// A missing, empty, non-numeric or overflowing prefix yields `0`.
pub fn generation_of(revision: &str) -> u64 {
    let prefix = match revision.split_once(REVISION_SEPARATOR) {
        Some((prefix, _)) => prefix,
        None => revision,
    };

    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }

    prefix.parse::<u64>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_revision_starts_at_one() {
        let revision = Revision::next(None);

        assert_eq!(revision.generation(), 1);
        assert!(revision.to_string().starts_with("1-"));
        assert!(Uuid::parse_str(revision.token()).is_ok());
    }

    #[test]
    fn next_revision_increments_generation_and_changes_token() {
        let first = Revision::next(None);
        let second = Revision::next(Some(&first.to_string()));

        assert_eq!(second.generation(), 2);
        assert_ne!(first.token(), second.token());
    }

    #[test]
    fn multi_digit_generations_are_parsed_whole() {
        assert_eq!(generation_of("10-xyz"), 10);
        assert_eq!(Revision::next(Some("10-xyz")).generation(), 11);
        assert_eq!(generation_of("123"), 123);
    }

    #[test]
    fn malformed_prefixes_count_as_generation_zero() {
        assert_eq!(generation_of(""), 0);
        assert_eq!(generation_of("-abc"), 0);
        assert_eq!(generation_of("abc-def"), 0);
        assert_eq!(generation_of("+5-def"), 0);
        assert_eq!(generation_of("99999999999999999999999-x"), 0);
        assert_eq!(Revision::next(Some("abc-def")).generation(), 1);
    }
}
