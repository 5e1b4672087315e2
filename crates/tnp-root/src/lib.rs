//! # tnp-root
//!
//! Native ROOT file reader (and a small writer) for the Tag-and-Probe plotter.
//!
//! Reads TH1D/TH1F, TH2D/TH2F, TGraph/TGraphErrors/TGraphAsymmErrors and
//! TEfficiency objects from nested directories of `.root` files without
//! requiring Python or external ROOT libraries. Supports zlib, LZ4, ZSTD, and
//! XZ compression.
//!
//! ## Example
//!
//! ```no_run
//! use tnp_root::{RootFile, RootObject};
//!
//! let f = RootFile::open("TnP_fit.root").unwrap();
//! let dir = f.directory("tpTree/Glb_pt").unwrap();
//! for key in dir.entries() {
//!     match f.read_object(key).unwrap() {
//!         RootObject::Efficiency(e) => {
//!             let g = e.painted_graph().unwrap();
//!             println!("{}: {} points", key.name, g.len());
//!         }
//!         other => println!("{} ({})", key.name, other.kind()),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod datasource;
pub mod decompress;
pub mod directory;
pub mod efficiency;
pub mod error;
pub mod file;
pub mod graph;
pub mod histogram;
pub mod key;
pub mod objects;
pub mod rbuffer;
pub mod wbuffer;
pub mod writer;

pub use directory::Directory;
pub use efficiency::{Efficiency, EfficiencyHistograms, Interval, StatOption};
pub use error::{Result, RootError};
pub use file::RootFile;
pub use graph::Graph;
pub use histogram::{Axis, Histogram, Histogram2D};
pub use key::{Key, KeyInfo};
pub use objects::{RootObject, SUPPORTED_CLASSES};
pub use writer::{RootFileBuilder, Storage};
