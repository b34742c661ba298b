//! Shelfnet Graph — genre co-occurrence graphs over a book catalog.
//!
//! Candidate edges come from genres two books share. An admission policy
//! decides which of them become edges, then isolated books are pruned.

pub mod builder;
pub mod frequency;
pub mod graph;
pub mod overlap;
pub mod policy;

pub use builder::{BuildReport, GraphBuilder, GraphSequence, PeriodGraph};
pub use frequency::GenreFrequencyIndex;
pub use graph::{BookGraph, GraphEdge, GraphStats};
pub use overlap::{overlap, shared_genres};
pub use policy::{
    AdmissionPolicy, AdmittedEdge, EdgeAdmission, OverlapThreshold, RareGenreFirstMatch,
    TypicalGenreBand,
};
