//! Genre labels excluded from candidate edge generation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A fixed set of genre labels that never justify a candidate edge.
///
/// Supplied by configuration; the default is empty. Matching is exact and
/// case-sensitive, the same way genres are compared between books.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UntrackedGenres(HashSet<String>);

impl UntrackedGenres {
    /// An empty set: every genre is tracked.
    pub fn none() -> Self {
        Self(HashSet::new())
    }

    pub fn new<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(genres.into_iter().map(Into::into).collect())
    }

    pub fn is_untracked(&self, genre: &str) -> bool {
        self.0.contains(genre)
    }

    pub fn is_tracked(&self, genre: &str) -> bool {
        !self.is_untracked(genre)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let untracked = UntrackedGenres::default();
        assert_eq!(untracked, UntrackedGenres::none());
        assert!(untracked.is_tracked("Fiction"));
    }

    #[test]
    fn test_exact_label_match() {
        let untracked = UntrackedGenres::new(["Fiction"]);
        assert!(untracked.is_untracked("Fiction"));
        assert!(untracked.is_tracked("Science Fiction"));
    }

    #[test]
    fn test_none_tracks_everything() {
        let untracked = UntrackedGenres::none();
        assert!(untracked.is_empty());
        assert!(untracked.is_tracked("Fiction"));
    }

    #[test]
    fn test_case_sensitive() {
        let untracked = UntrackedGenres::new(["Fantasy"]);
        assert!(untracked.is_untracked("Fantasy"));
        assert!(untracked.is_tracked("fantasy"));
    }

    #[test]
    fn test_deserialize_from_list() {
        let untracked: UntrackedGenres = serde_json::from_str(r#"["Horror", "Romance"]"#).unwrap();
        assert_eq!(untracked.len(), 2);
        assert!(untracked.is_untracked("Horror"));
    }
}
