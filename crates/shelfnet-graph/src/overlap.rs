//! Pairwise genre overlap between two books.

use shelfnet_catalog::Item;
use shelfnet_core::UntrackedGenres;

/// `|A ∩ B| / min(|A|, |B|)`, or 0 when either book has no genres.
pub fn overlap(a: &Item, b: &Item) -> f64 {
    let shared = a.genres().iter().filter(|g| b.has_genre(g)).count();
    ratio(shared, a.genre_count(), b.genre_count())
}

/// Tracked genres both books carry, in `a`'s genre order.
pub fn shared_genres<'a>(a: &'a Item, b: &Item, untracked: &UntrackedGenres) -> Vec<&'a str> {
    a.genres()
        .iter()
        .filter(|g| untracked.is_tracked(g) && b.has_genre(g))
        .map(String::as_str)
        .collect()
}

fn ratio(shared: usize, len_a: usize, len_b: usize) -> f64 {
    let smaller = len_a.min(len_b);
    if smaller == 0 {
        return 0.0;
    }
    shared as f64 / smaller as f64
}
