//! Parallel batch building on blocking worker tasks.

use std::sync::Arc;

use tracing::{debug, error};

use shelfnet_catalog::Batch;
use shelfnet_core::Result;
use shelfnet_graph::{BuildReport, GraphBuilder};

/// Build each batch on its own blocking task. Results come back in input
/// order; each task owns its batch and frequency index.
pub async fn build_parallel(
    builder: Arc<GraphBuilder>,
    batches: Vec<Batch>,
) -> anyhow::Result<Vec<(String, Result<BuildReport>)>> {
    let handles: Vec<_> = batches
        .into_iter()
        .map(|batch| {
            let builder = builder.clone();
            tokio::task::spawn_blocking(move || {
                debug!("Building batch {} ({} books)", batch.name, batch.catalog.len());
                let result = builder.build_with_report(&batch.catalog);
                (batch.name, result)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(outcome) => results.push(outcome),
            Err(e) => {
                error!("Batch worker panicked: {}", e);
                return Err(anyhow::anyhow!("batch worker failed: {}", e));
            }
        }
    }
    Ok(results)
}
