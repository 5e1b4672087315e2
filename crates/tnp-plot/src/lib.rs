//! # tnp-plot
//!
//! Overlay plots of Tag-and-Probe results, driven by a JSON config.
//!
//! Each plot block names a set of inputs (ROOT file, directory, object name
//! or `"all"`), axis ranges, colors, markers and decorations. Objects are
//! grouped (one group in exact-name mode, one group per object name in
//! wildcard mode), drawn in ROOT style and written as SVG, PNG or PDF.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use tnp_plot::{RunOptions, run};
//!
//! let summary = run(Path::new("plots.json"), &RunOptions::default()).unwrap();
//! println!("{} files written", summary.files.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod resolve;
pub mod style;

pub use config::{Config, PlotConfig};
pub use error::{PlotterError, Result};
pub use pipeline::{RunOptions, RunSummary, run, run_config};
pub use resolve::{Group, ResolvedObject, resolve_inputs};
pub use style::RootStyle;
