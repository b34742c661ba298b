//! Renderer interface and the JSON frame renderer.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::types::*;
use shelfnet_core::{Error, Result};
use shelfnet_graph::{GraphSequence, PeriodGraph};

/// Something that turns a finished graph sequence into a visual artifact.
pub trait Renderer {
    type Output;

    fn render(&self, sequence: &GraphSequence) -> Result<Self::Output>;
}

/// Builds one animation frame per period, with a slider step for each.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    title: String,
    policy: String,
    slider_prefix: String,
    top_genres: usize,
}

impl FrameRenderer {
    pub fn new(policy: impl std::fmt::Display) -> Self {
        Self {
            title: "Literary Genre Network".to_string(),
            policy: policy.to_string(),
            slider_prefix: "Year: ".to_string(),
            top_genres: 10,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// How many of the most frequent genres each frame lists.
    pub fn with_top_genres(mut self, top_genres: usize) -> Self {
        self.top_genres = top_genres;
        self
    }

    pub fn frame(&self, period: &PeriodGraph) -> Frame {
        let graph = period.graph();
        let nodes = graph
            .nodes()
            .map(|id| NodeFrame {
                id: id.to_string(),
                degree: graph.degree(id).unwrap_or(0),
            })
            .collect();
        let edges = graph
            .edges()
            .map(|e| EdgeFrame {
                source: e.source.clone(),
                target: e.target.clone(),
                genres: e.genres.clone(),
                weight: e.weight,
            })
            .collect();
        let top_genres = period
            .report
            .genre_frequencies
            .iter()
            .take(self.top_genres)
            .map(|(genre, count)| GenreCount {
                genre: genre.clone(),
                count: *count,
            })
            .collect();

        Frame {
            name: period.period,
            batch: period.batch.clone(),
            nodes,
            edges,
            top_genres,
        }
    }

    /// Serialize an animation as pretty JSON.
    pub fn write_json(animation: &Animation, writer: impl Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, animation)?;
        Ok(())
    }

    pub fn write_file(animation: &Animation, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        Self::write_json(animation, std::io::BufWriter::new(file))?;
        info!(
            "Wrote {} frames to {}",
            animation.frames.len(),
            path.display()
        );
        Ok(())
    }
}

impl Renderer for FrameRenderer {
    type Output = Animation;

    fn render(&self, sequence: &GraphSequence) -> Result<Animation> {
        if sequence.is_empty() {
            return Err(Error::InsufficientData("no graphs to render".into()));
        }

        let frames: Vec<Frame> = sequence.iter().map(|period| self.frame(period)).collect();
        let steps = frames
            .iter()
            .map(|frame| SliderStep {
                label: frame.name.to_string(),
                frame: frame.name,
            })
            .collect();

        Ok(Animation {
            title: self.title.clone(),
            policy: self.policy.clone(),
            slider_prefix: self.slider_prefix.clone(),
            generated_at: chrono::Utc::now(),
            frames,
            steps,
        })
    }
}
