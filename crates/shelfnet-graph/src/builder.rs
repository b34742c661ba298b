//! Graph building: nodes, admission, pruning, and per-period sequences.

use tracing::{debug, info, warn};

use crate::frequency::GenreFrequencyIndex;
use crate::graph::{BookGraph, GraphEdge};
use crate::overlap::overlap;
use crate::policy::{AdmissionPolicy, EdgeAdmission};
use shelfnet_catalog::{Batch, ItemCatalog};
use shelfnet_core::{Result, ShelfnetConfig, UntrackedGenres};

/// Outcome of building one batch.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub graph: BookGraph,
    /// Candidate edges proposed (0 for policies without genre candidates).
    pub candidates: usize,
    /// Edges or candidates the policy admitted, before pair collapsing.
    pub admitted: usize,
    /// Isolated books removed from the graph.
    pub pruned: usize,
    /// Genre frequencies of this batch, most frequent first.
    pub genre_frequencies: Vec<(String, usize)>,
}

/// A finished graph tagged with its display period.
#[derive(Debug, Clone)]
pub struct PeriodGraph {
    pub period: i32,
    pub batch: String,
    pub report: BuildReport,
}

impl PeriodGraph {
    pub fn graph(&self) -> &BookGraph {
        &self.report.graph
    }
}

/// Graphs in batch order, one per period. No edges cross periods.
#[derive(Debug, Clone, Default)]
pub struct GraphSequence {
    periods: Vec<PeriodGraph>,
}

impl GraphSequence {
    /// Label `reports` with consecutive periods starting at `base_period`.
    pub fn from_reports<I>(reports: I, base_period: i32) -> Self
    where
        I: IntoIterator<Item = (String, BuildReport)>,
    {
        let periods = reports
            .into_iter()
            .zip(base_period..)
            .map(|((batch, report), period)| PeriodGraph {
                period,
                batch,
                report,
            })
            .collect();
        Self { periods }
    }

    /// Wrap already-labelled periods, e.g. after skipping failed batches.
    pub fn from_periods(periods: Vec<PeriodGraph>) -> Self {
        Self { periods }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeriodGraph> {
        self.periods.iter()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&PeriodGraph> {
        self.periods.get(position)
    }
}

impl<'a> IntoIterator for &'a GraphSequence {
    type Item = &'a PeriodGraph;
    type IntoIter = std::slice::Iter<'a, PeriodGraph>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds book graphs with a fixed admission policy and genre filter.
#[derive(Debug, Clone)]
pub struct GraphBuilder<P: EdgeAdmission = AdmissionPolicy> {
    policy: P,
    untracked: UntrackedGenres,
}

impl GraphBuilder<AdmissionPolicy> {
    /// Resolve the configured policy once.
    pub fn from_config(config: &ShelfnetConfig) -> Result<Self> {
        let policy = AdmissionPolicy::from_settings(&config.policy)?;
        Ok(Self::new(policy, config.untracked_genres.clone()))
    }
}

impl<P: EdgeAdmission> GraphBuilder<P> {
    pub fn new(policy: P, untracked: UntrackedGenres) -> Self {
        Self { policy, untracked }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn untracked(&self) -> &UntrackedGenres {
        &self.untracked
    }

    /// Build the finished graph for one batch.
    pub fn build(&self, catalog: &ItemCatalog) -> Result<BookGraph> {
        self.build_with_report(catalog).map(|report| report.graph)
    }

    /// Build one batch and keep the bookkeeping alongside the graph.
    pub fn build_with_report(&self, catalog: &ItemCatalog) -> Result<BuildReport> {
        let mut graph = BookGraph::new();
        for item in catalog {
            graph.add_node(item.title());
        }

        // Scoped to this call so batches never share counts.
        let mut frequencies = GenreFrequencyIndex::new();
        let admitted = self
            .policy
            .admit(catalog, &self.untracked, &mut frequencies)?;

        let admitted_count = admitted.len();
        for edge in admitted {
            graph.add_edge(GraphEdge {
                source: edge.source.title().to_string(),
                target: edge.target.title().to_string(),
                genres: edge.genre.map(str::to_string).into_iter().collect(),
                weight: overlap(edge.source, edge.target),
            })?;
        }

        let pruned = graph.remove_isolated();
        debug!(
            "Built graph: {} admitted, {} pruned, {} nodes, {} edges",
            admitted_count,
            pruned,
            graph.node_count(),
            graph.edge_count()
        );

        Ok(BuildReport {
            graph,
            candidates: frequencies.total(),
            admitted: admitted_count,
            pruned,
            genre_frequencies: frequencies.ranked(),
        })
    }

    /// Build every batch independently. One result per batch, in input
    /// order; the caller decides whether a failure aborts the rest.
    pub fn build_each(&self, batches: &[Batch]) -> Vec<Result<BuildReport>> {
        batches
            .iter()
            .map(|batch| {
                let result = self.build_with_report(&batch.catalog);
                match &result {
                    Ok(report) => info!(
                        "Batch {}: {} books -> {} nodes, {} edges",
                        batch.name,
                        batch.catalog.len(),
                        report.graph.node_count(),
                        report.graph.edge_count()
                    ),
                    Err(e) => warn!("Batch {} failed: {}", batch.name, e),
                }
                result
            })
            .collect()
    }

    /// Build every batch in order, stopping at the first failure.
    pub fn build_sequence(&self, batches: &[Batch], base_period: i32) -> Result<GraphSequence> {
        let mut reports = Vec::with_capacity(batches.len());
        for batch in batches {
            let report = self.build_with_report(&batch.catalog).map_err(|e| {
                warn!("Batch {} failed, aborting sequence: {}", batch.name, e);
                e
            })?;
            reports.push((batch.name.clone(), report));
        }
        info!("Built sequence of {} graphs", reports.len());
        Ok(GraphSequence::from_reports(reports, base_period))
    }
}
