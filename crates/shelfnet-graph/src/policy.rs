//! Edge admission policies: which candidate pairs become graph edges.

use std::collections::HashSet;

use tracing::debug;

use crate::frequency::GenreFrequencyIndex;
use crate::overlap::overlap;
use shelfnet_catalog::{Item, ItemCatalog};
use shelfnet_core::config::{PolicyKind, DEFAULT_PERCENTILE};
use shelfnet_core::{Error, PolicySettings, Result, UntrackedGenres};

/// A proposed connection justified by one shared genre.
#[derive(Debug, Clone, Copy)]
pub struct CandidateEdge<'a> {
    pub source: &'a Item,
    pub target: &'a Item,
    pub genre: &'a str,
}

/// A pair the policy let through, with the genre that justified it if any.
#[derive(Debug, Clone, Copy)]
pub struct AdmittedEdge<'a> {
    pub source: &'a Item,
    pub target: &'a Item,
    pub genre: Option<&'a str>,
}

impl<'a> From<CandidateEdge<'a>> for AdmittedEdge<'a> {
    fn from(candidate: CandidateEdge<'a>) -> Self {
        Self {
            source: candidate.source,
            target: candidate.target,
            genre: Some(candidate.genre),
        }
    }
}

/// Decides which pairs of a catalog are connected.
pub trait EdgeAdmission {
    /// Admit edges for `catalog`. Genre-based policies record every
    /// candidate into `frequencies`, which must be fresh for this batch.
    fn admit<'a>(
        &self,
        catalog: &'a ItemCatalog,
        untracked: &UntrackedGenres,
        frequencies: &mut GenreFrequencyIndex,
    ) -> Result<Vec<AdmittedEdge<'a>>>;
}

/// Every (pair, shared tracked genre) candidate, recorded into `frequencies`.
///
/// Pairs are visited as `(i, j)` with `i` before `j` in catalog order, and
/// genres in `i`'s stored order.
pub fn propose_candidates<'a>(
    catalog: &'a ItemCatalog,
    untracked: &UntrackedGenres,
    frequencies: &mut GenreFrequencyIndex,
) -> Vec<CandidateEdge<'a>> {
    let items = catalog.items();
    let mut candidates = Vec::new();

    for (i, source) in items.iter().enumerate() {
        for target in &items[i + 1..] {
            for genre in source.genres() {
                if untracked.is_untracked(genre) || !target.has_genre(genre) {
                    continue;
                }
                frequencies.record(genre);
                candidates.push(CandidateEdge {
                    source,
                    target,
                    genre,
                });
            }
        }
    }

    debug!(
        "Proposed {} candidate edges over {} genres",
        candidates.len(),
        frequencies.distinct()
    );
    candidates
}

/// Genres justifying fewer than `percentile` of all candidates; the first
/// such genre in scan order wins the pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RareGenreFirstMatch {
    pub percentile: f64,
}

impl Default for RareGenreFirstMatch {
    fn default() -> Self {
        Self {
            percentile: DEFAULT_PERCENTILE,
        }
    }
}

impl EdgeAdmission for RareGenreFirstMatch {
    fn admit<'a>(
        &self,
        catalog: &'a ItemCatalog,
        untracked: &UntrackedGenres,
        frequencies: &mut GenreFrequencyIndex,
    ) -> Result<Vec<AdmittedEdge<'a>>> {
        let candidates = propose_candidates(catalog, untracked, frequencies);
        let bound = frequencies.percentile_bound(self.percentile);

        let mut connected: HashSet<(&str, &str)> = HashSet::new();
        let admitted: Vec<AdmittedEdge<'a>> = candidates
            .into_iter()
            .filter(|c| (frequencies.count(c.genre) as f64) < bound)
            .filter(|c| connected.insert((c.source.title(), c.target.title())))
            .map(AdmittedEdge::from)
            .collect();

        debug!("Rare genres (< {:.2}): admitted {} edges", bound, admitted.len());
        Ok(admitted)
    }
}

/// Genres whose candidate count lies strictly within one sample standard
/// deviation of the median count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypicalGenreBand;

impl EdgeAdmission for TypicalGenreBand {
    fn admit<'a>(
        &self,
        catalog: &'a ItemCatalog,
        untracked: &UntrackedGenres,
        frequencies: &mut GenreFrequencyIndex,
    ) -> Result<Vec<AdmittedEdge<'a>>> {
        let candidates = propose_candidates(catalog, untracked, frequencies);
        let (lower, upper) = frequencies.median_stdev_bounds()?;

        let admitted: Vec<AdmittedEdge<'a>> = candidates
            .into_iter()
            .filter(|c| {
                let count = frequencies.count(c.genre) as f64;
                lower < count && count < upper
            })
            .map(AdmittedEdge::from)
            .collect();

        debug!(
            "Typical genres ({:.2}, {:.2}): admitted {} candidates",
            lower,
            upper,
            admitted.len()
        );
        Ok(admitted)
    }
}

/// Pairs whose whole-genre-list overlap reaches `required_weight`.
///
/// Untracked genres still count here: the ratio is taken over each book's
/// full genre list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapThreshold {
    pub required_weight: f64,
}

impl OverlapThreshold {
    pub fn new(required_weight: f64) -> Result<Self> {
        let required_weight = PolicySettings::overlap(required_weight).required_weight()?;
        Ok(Self { required_weight })
    }
}

impl EdgeAdmission for OverlapThreshold {
    fn admit<'a>(
        &self,
        catalog: &'a ItemCatalog,
        _untracked: &UntrackedGenres,
        _frequencies: &mut GenreFrequencyIndex,
    ) -> Result<Vec<AdmittedEdge<'a>>> {
        let items = catalog.items();
        let mut admitted = Vec::new();

        for (i, source) in items.iter().enumerate() {
            for target in &items[i + 1..] {
                if overlap(source, target) >= self.required_weight {
                    admitted.push(AdmittedEdge {
                        source,
                        target,
                        genre: None,
                    });
                }
            }
        }

        debug!(
            "Overlap >= {:.2}: admitted {} edges",
            self.required_weight,
            admitted.len()
        );
        Ok(admitted)
    }
}

/// The configured admission policy, resolved once from settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdmissionPolicy {
    RareGenreFirstMatch(RareGenreFirstMatch),
    TypicalGenreBand(TypicalGenreBand),
    OverlapThreshold(OverlapThreshold),
}

impl AdmissionPolicy {
    /// Validate settings and build the matching policy.
    pub fn from_settings(settings: &PolicySettings) -> Result<Self> {
        let policy = match settings.kind()? {
            PolicyKind::RareGenreFirstMatch => Self::RareGenreFirstMatch(RareGenreFirstMatch {
                percentile: settings.percentile_or_default()?,
            }),
            PolicyKind::TypicalGenreBand => Self::TypicalGenreBand(TypicalGenreBand),
            PolicyKind::OverlapThreshold => Self::OverlapThreshold(OverlapThreshold {
                required_weight: settings.required_weight()?,
            }),
        };
        Ok(policy)
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::RareGenreFirstMatch(_) => PolicyKind::RareGenreFirstMatch,
            Self::TypicalGenreBand(_) => PolicyKind::TypicalGenreBand,
            Self::OverlapThreshold(_) => PolicyKind::OverlapThreshold,
        }
    }

    /// Whether the policy fills the genre frequency index.
    pub fn uses_frequencies(&self) -> bool {
        !matches!(self, Self::OverlapThreshold(_))
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::RareGenreFirstMatch(RareGenreFirstMatch::default())
    }
}

impl std::fmt::Display for AdmissionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RareGenreFirstMatch(p) => write!(f, "{} (p={})", self.kind(), p.percentile),
            Self::TypicalGenreBand(_) => write!(f, "{}", self.kind()),
            Self::OverlapThreshold(p) => write!(f, "{} (w={})", self.kind(), p.required_weight),
        }
    }
}

impl EdgeAdmission for AdmissionPolicy {
    fn admit<'a>(
        &self,
        catalog: &'a ItemCatalog,
        untracked: &UntrackedGenres,
        frequencies: &mut GenreFrequencyIndex,
    ) -> Result<Vec<AdmittedEdge<'a>>> {
        match self {
            Self::RareGenreFirstMatch(p) => p.admit(catalog, untracked, frequencies),
            Self::TypicalGenreBand(p) => p.admit(catalog, untracked, frequencies),
            Self::OverlapThreshold(p) => p.admit(catalog, untracked, frequencies),
        }
    }
}

impl TryFrom<&PolicySettings> for AdmissionPolicy {
    type Error = Error;

    fn try_from(settings: &PolicySettings) -> Result<Self> {
        Self::from_settings(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(books: &[(&str, &str)]) -> ItemCatalog {
        ItemCatalog::from_items(
            books
                .iter()
                .map(|(title, genres)| Item::new(*title, genres.split_whitespace()))
                .collect(),
        )
        .unwrap()
    }

    fn pairs(edges: &[AdmittedEdge<'_>]) -> Vec<(String, String, Option<String>)> {
        edges
            .iter()
            .map(|e| {
                (
                    e.source.title().to_string(),
                    e.target.title().to_string(),
                    e.genre.map(str::to_string),
                )
            })
            .collect()
    }

    #[test]
    fn test_candidates_once_per_unordered_pair() {
        let catalog = catalog(&[("A", "x y"), ("B", "y x"), ("C", "x")]);
        let mut frequencies = GenreFrequencyIndex::new();
        let candidates = propose_candidates(&catalog, &UntrackedGenres::none(), &mut frequencies);

        let seen: Vec<(&str, &str, &str)> = candidates
            .iter()
            .map(|c| (c.source.title(), c.target.title(), c.genre))
            .collect();
        assert_eq!(
            seen,
            [
                ("A", "B", "x"),
                ("A", "B", "y"),
                ("A", "C", "x"),
                ("B", "C", "x"),
            ]
        );
        assert_eq!(frequencies.count("x"), 3);
        assert_eq!(frequencies.count("y"), 1);
        assert_eq!(frequencies.total(), 4);
    }

    #[test]
    fn test_candidates_skip_untracked() {
        let catalog = catalog(&[("A", "Fiction x"), ("B", "Fiction x")]);
        let mut frequencies = GenreFrequencyIndex::new();
        let candidates =
            propose_candidates(&catalog, &UntrackedGenres::new(["Fiction"]), &mut frequencies);
        assert_eq!(candidates.len(), 1);
        assert_eq!(frequencies.count("Fiction"), 0);
    }

    #[test]
    fn test_rare_first_match_uses_scan_order() {
        // Twelve filler pairs on "common" keep the 10% bound above 1, so both
        // "r1" and "r2" are rare; A lists r2 first, so r2 wins the A-B pair.
        let mut books = vec![Item::new("A", ["r2", "r1"]), Item::new("B", ["r1", "r2"])];
        for i in 0..5 {
            books.push(Item::new(format!("F{}", i), ["common"]));
        }
        let catalog = ItemCatalog::from_items(books).unwrap();

        let mut frequencies = GenreFrequencyIndex::new();
        let edges = RareGenreFirstMatch::default()
            .admit(&catalog, &UntrackedGenres::none(), &mut frequencies)
            .unwrap();

        // 10 common pairs + r2 + r1 = 12 candidates, bound 1.2
        assert_eq!(frequencies.total(), 12);
        assert_eq!(
            pairs(&edges),
            [("A".to_string(), "B".to_string(), Some("r2".to_string()))]
        );
    }

    #[test]
    fn test_rare_nothing_when_single_genre() {
        let catalog = catalog(&[("A", "x"), ("B", "x"), ("C", "x")]);
        let mut frequencies = GenreFrequencyIndex::new();
        let edges = RareGenreFirstMatch::default()
            .admit(&catalog, &UntrackedGenres::none(), &mut frequencies)
            .unwrap();
        assert!(edges.is_empty());
        assert_eq!(frequencies.count("x"), 3);
    }

    #[test]
    fn test_band_admits_parallel_genres() {
        // counts: x=1 (A-B), y=1 (A-B), z=3 (C-D, C-E, D-E) -> median 1, stdev ~1.15
        let catalog = catalog(&[
            ("A", "x y"),
            ("B", "x y"),
            ("C", "z"),
            ("D", "z"),
            ("E", "z"),
        ]);
        let mut frequencies = GenreFrequencyIndex::new();
        let edges = TypicalGenreBand
            .admit(&catalog, &UntrackedGenres::none(), &mut frequencies)
            .unwrap();

        let (lower, upper) = frequencies.median_stdev_bounds().unwrap();
        assert_eq!(
            pairs(&edges),
            [
                ("A".to_string(), "B".to_string(), Some("x".to_string())),
                ("A".to_string(), "B".to_string(), Some("y".to_string())),
            ]
        );
        for edge in &edges {
            let count = frequencies.count(edge.genre.unwrap()) as f64;
            assert!(lower < count && count < upper);
        }
    }

    #[test]
    fn test_band_single_genre_fails() {
        let catalog = catalog(&[("A", "x"), ("B", "x"), ("C", "x")]);
        let mut frequencies = GenreFrequencyIndex::new();
        let result = TypicalGenreBand.admit(&catalog, &UntrackedGenres::none(), &mut frequencies);
        assert!(matches!(result, Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_overlap_threshold() {
        let catalog = catalog(&[("A", "x y"), ("B", "x y"), ("C", "z")]);
        let mut frequencies = GenreFrequencyIndex::new();
        let edges = OverlapThreshold::new(0.9)
            .unwrap()
            .admit(&catalog, &UntrackedGenres::none(), &mut frequencies)
            .unwrap();
        assert_eq!(pairs(&edges), [("A".to_string(), "B".to_string(), None)]);
        assert!(frequencies.is_empty());
    }

    #[test]
    fn test_overlap_threshold_counts_untracked_genres() {
        // Fiction is shared but untracked; the whole-list ratio is still 1/2.
        let catalog = catalog(&[("A", "Fiction x"), ("B", "Fiction y"), ("C", "z")]);
        let untracked = UntrackedGenres::new(["Fiction"]);
        let mut frequencies = GenreFrequencyIndex::new();

        let edges = OverlapThreshold::new(0.5)
            .unwrap()
            .admit(&catalog, &untracked, &mut frequencies)
            .unwrap();
        assert_eq!(pairs(&edges), [("A".to_string(), "B".to_string(), None)]);

        let edges = OverlapThreshold::new(0.51)
            .unwrap()
            .admit(&catalog, &untracked, &mut frequencies)
            .unwrap();
        assert!(edges.is_empty());
    }

    #[test]
    fn test_from_settings() {
        let policy = AdmissionPolicy::from_settings(&PolicySettings::overlap(0.5)).unwrap();
        assert_eq!(
            policy,
            AdmissionPolicy::OverlapThreshold(OverlapThreshold {
                required_weight: 0.5
            })
        );
        assert!(!policy.uses_frequencies());

        let policy =
            AdmissionPolicy::from_settings(&PolicySettings::named("median-with-one-std")).unwrap();
        assert_eq!(policy.kind(), PolicyKind::TypicalGenreBand);

        let mut settings = PolicySettings::named("uncommon-genres");
        settings.percentile = Some(0.25);
        assert_eq!(
            AdmissionPolicy::try_from(&settings).unwrap(),
            AdmissionPolicy::RareGenreFirstMatch(RareGenreFirstMatch { percentile: 0.25 })
        );
    }

    #[test]
    fn test_from_settings_invalid() {
        for settings in [
            PolicySettings::named("overlap-threshold"),
            PolicySettings::named("random"),
            PolicySettings::overlap(-0.1),
        ] {
            assert!(matches!(
                AdmissionPolicy::from_settings(&settings),
                Err(Error::InvalidConfiguration(_))
            ));
        }
    }
}
