//! Frame types consumed by the plotting front end.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A book in one frame. `degree` drives node colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFrame {
    pub id: String,
    pub degree: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeFrame {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    pub weight: f64,
}

/// One period of the animation.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Period label, e.g. the year. Display only.
    pub name: i32,
    pub batch: String,
    pub nodes: Vec<NodeFrame>,
    pub edges: Vec<EdgeFrame>,
    #[serde(rename = "topGenres")]
    pub top_genres: Vec<GenreCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// A slider step that jumps to the frame with the same label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderStep {
    pub label: String,
    pub frame: i32,
}

/// The whole animation: frames in period order plus slider metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Animation {
    pub title: String,
    pub policy: String,
    #[serde(rename = "sliderPrefix")]
    pub slider_prefix: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    pub frames: Vec<Frame>,
    pub steps: Vec<SliderStep>,
}
