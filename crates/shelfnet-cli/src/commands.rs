//! `build` and `genres` commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::args::Options;
use crate::workers;
use shelfnet_catalog::{load_batches, Batch};
use shelfnet_core::ShelfnetConfig;
use shelfnet_graph::policy::propose_candidates;
use shelfnet_graph::{GenreFrequencyIndex, GraphBuilder, GraphSequence, PeriodGraph};
use shelfnet_render::{FrameRenderer, Renderer};

/// Config file (if given) with environment overrides on top, then CLI flags.
pub fn load_config(options: &Options) -> anyhow::Result<ShelfnetConfig> {
    let mut config = match &options.config {
        Some(path) => {
            let mut config = ShelfnetConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        // SHELFNET_DATA_DIR is applied by from_env
        None => ShelfnetConfig::from_env("data")?,
    };

    if let Some(dir) = &options.batches {
        config.data_paths.batches_dir = Some(dir.clone());
    }
    if let Some(output) = &options.output {
        config.data_paths.output = output.clone();
    }
    Ok(config)
}

fn load_input(config: &ShelfnetConfig) -> anyhow::Result<Vec<Batch>> {
    let batches = match &config.data_paths.batches_dir {
        Some(dir) => load_batches(dir)
            .with_context(|| format!("Failed to load batches from {}", dir.display()))?,
        None => {
            let path = &config.data_paths.books_file;
            vec![Batch::load(path)
                .with_context(|| format!("Failed to load books from {}", path.display()))?]
        }
    };
    Ok(batches)
}

/// Load, build every batch, render frames, write them out.
pub async fn build(options: &Options) -> anyhow::Result<()> {
    let config = load_config(options)?;
    let builder = GraphBuilder::from_config(&config).context("Invalid policy configuration")?;
    info!("Admission policy: {}", builder.policy());

    let batches = load_input(&config)?;
    let renderer = FrameRenderer::new(builder.policy());
    let results = workers::build_parallel(Arc::new(builder), batches).await?;

    let mut periods = Vec::with_capacity(results.len());
    for ((name, result), period) in results.into_iter().zip(config.base_year..) {
        match result {
            Ok(report) => {
                let stats = report.graph.stats();
                info!(
                    "{} ({}): {} nodes, {} edges, {} pruned",
                    period, name, stats.node_count, stats.edge_count, report.pruned
                );
                periods.push(PeriodGraph {
                    period,
                    batch: name,
                    report,
                });
            }
            Err(e) if options.skip_failed => {
                warn!("Skipping batch {} ({}): {}", name, period, e);
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("Batch {} failed", name)));
            }
        }
    }

    let sequence = GraphSequence::from_periods(periods);
    let animation = renderer.render(&sequence)?;
    FrameRenderer::write_file(&animation, &config.data_paths.output)?;
    Ok(())
}

/// Print each batch's genre frequencies, most frequent first.
pub fn genres(options: &Options) -> anyhow::Result<()> {
    let config = load_config(options)?;
    for batch in load_input(&config)? {
        let mut frequencies = GenreFrequencyIndex::new();
        propose_candidates(&batch.catalog, &config.untracked_genres, &mut frequencies);

        let ranked: serde_json::Map<String, serde_json::Value> = frequencies
            .ranked()
            .into_iter()
            .map(|(genre, count)| (genre, count.into()))
            .collect();
        println!("{}:", batch.name);
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_books(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("books.json");
        std::fs::write(
            &path,
            r#"{"books": [
                {"title": "A", "genres": ["Fiction", "x", "y"]},
                {"title": "B", "genres": ["Fiction", "x", "y"]},
                {"title": "C", "genres": ["Fiction", "z"]}
            ]}"#,
        )
        .unwrap();
        path
    }

    fn write_config(dir: &std::path::Path, books: &std::path::Path) -> PathBuf {
        let path = dir.join("shelfnet.json");
        let config = serde_json::json!({
            "data_paths": {
                "books_file": books,
                "output": dir.join("out/network.json"),
            },
            "policy": {"method": "overlap-threshold", "required_weight": 0.9},
            "untracked_genres": ["Fiction"],
            "base_year": 1999,
        });
        std::fs::write(&path, config.to_string()).unwrap();
        path
    }

    #[test]
    fn test_cli_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let books = write_books(dir.path());
        let options = Options {
            config: Some(write_config(dir.path(), &books)),
            output: Some(dir.path().join("elsewhere.json")),
            ..Options::default()
        };
        let config = load_config(&options).unwrap();
        assert_eq!(config.data_paths.output, dir.path().join("elsewhere.json"));
        assert_eq!(config.data_paths.books_file, books);
    }

    #[test]
    fn test_without_config_file_uses_data_dir() {
        if std::env::var_os("SHELFNET_DATA_DIR").is_some() {
            return;
        }
        let options = Options {
            batches: Some(PathBuf::from("years")),
            ..Options::default()
        };
        let config = load_config(&options).unwrap();
        assert_eq!(config.data_paths.books_file, PathBuf::from("data/books.json"));
        assert_eq!(config.data_paths.batches_dir, Some(PathBuf::from("years")));
    }

    #[tokio::test]
    async fn test_build_writes_frames() {
        let dir = tempfile::tempdir().unwrap();
        let books = write_books(dir.path());
        let options = Options {
            config: Some(write_config(dir.path(), &books)),
            ..Options::default()
        };

        build(&options).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("out/network.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["frames"][0]["name"], 1999);
        assert_eq!(json["frames"][0]["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(json["frames"][0]["edges"][0]["source"], "A");
    }

    #[tokio::test]
    async fn test_build_bad_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelfnet.json");
        std::fs::write(&path, r#"{"policy": {"method": "overlap-threshold"}}"#).unwrap();
        let options = Options {
            config: Some(path),
            ..Options::default()
        };
        assert!(build(&options).await.is_err());
    }
}
