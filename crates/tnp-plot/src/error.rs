//! Error types for the plotter

use std::path::PathBuf;

use thiserror::Error;
use tnp_render::RenderError;
use tnp_root::RootError;

/// Plotter error type. Every variant is fatal for the run.
#[derive(Error, Debug)]
pub enum PlotterError {
    /// Malformed JSON or a missing required field
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Well-formed JSON with unusable values
    #[error("invalid config: {0}")]
    ConfigValidation(String),

    /// Input ROOT file does not exist
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Directory missing inside an input file
    #[error("folder '{folder}' not found in {}", file.display())]
    FolderNotFound {
        /// File that was searched
        file: PathBuf,
        /// Requested directory path
        folder: String,
    },

    /// colorMap/markerMap shorter than the input list
    #[error(
        "plot '{plot}': the {map} has {have} entries but {need} inputs are defined"
    )]
    InsufficientStyleMap {
        /// Plot name
        plot: String,
        /// `colorMap` or `markerMap`
        map: &'static str,
        /// Entries present
        have: usize,
        /// Entries required
        need: usize,
    },

    /// Output file type other than svg/png/pdf
    #[error("unsupported output file type: '{0}'")]
    UnsupportedFormat(String),

    /// ROOT format error while reading an input
    #[error("ROOT error: {0}")]
    Root(#[from] RootError),

    /// Export failure
    #[error("render error: {0}")]
    Render(RenderError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RenderError> for PlotterError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::UnsupportedFormat(ext) => Self::UnsupportedFormat(ext),
            other => Self::Render(other),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PlotterError>;
