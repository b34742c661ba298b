//! A single book and its genre labels.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A book record: unique title plus the genres it was shelved under.
///
/// Genres keep their source order (the rare-genre scan depends on it) but
/// repeated labels are dropped, so the list behaves as a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    title: String,
    genres: Vec<String>,
    #[serde(skip)]
    genre_set: HashSet<String>,
}

impl Item {
    pub fn new<I, S>(title: impl Into<String>, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut genre_set = HashSet::new();
        let mut ordered = Vec::new();
        for genre in genres {
            let genre = genre.into();
            if genre_set.insert(genre.clone()) {
                ordered.push(genre);
            }
        }
        Self {
            title: title.into(),
            genres: ordered,
            genre_set,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Genres in stored order.
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genre_set.contains(genre)
    }

    pub fn genre_count(&self) -> usize {
        self.genres.len()
    }
}

/// Wire shape of one book. Extra fields (author, year, description) are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct BookRecord {
    pub title: String,
    pub genres: Vec<String>,
}

impl From<BookRecord> for Item {
    fn from(record: BookRecord) -> Self {
        Item::new(record.title, record.genres)
    }
}
