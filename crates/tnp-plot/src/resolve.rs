//! Matching config inputs against ROOT file contents.

use std::path::PathBuf;

use tnp_root::{RootError, RootFile, RootObject};
use tracing::{debug, info, warn};

use crate::config::{Input, PlotConfig};
use crate::error::{PlotterError, Result};

/// Group key used when inputs name their object exactly.
pub const EXACT_GROUP: &str = "histo";

/// An object read from an input, owned in memory.
#[derive(Debug, Clone)]
pub struct ResolvedObject {
    /// Position of the producing input in sorted input order.
    pub input_index: usize,
    /// Key of the producing input.
    pub input_key: String,
    /// Source file.
    pub file: PathBuf,
    /// Source directory.
    pub folder: String,
    /// ROOT class name.
    pub class_name: String,
    /// Decoded object.
    pub object: RootObject,
}

/// Objects drawn together on one canvas.
#[derive(Debug, Clone)]
pub struct Group {
    /// `"histo"`, or the object name in wildcard mode.
    pub key: String,
    /// Objects in input order.
    pub objects: Vec<ResolvedObject>,
}

/// Whether a directory entry can be selected at all.
///
/// Names with `=` are parameter-encoded fit results; directories and 2D
/// histograms are never overlaid.
pub fn is_selectable(name: &str, class_name: &str) -> bool {
    !name.contains('=')
        && !matches!(class_name, "TDirectory" | "TDirectoryFile")
        && !class_name.starts_with("TH2")
}

/// Resolve every input of a plot, in sorted input-key order.
///
/// Groups keep first-seen order; objects inside a group keep input order.
pub fn resolve_inputs(plot: &PlotConfig) -> Result<Vec<Group>> {
    let mut groups: Vec<Group> = Vec::new();
    for (index, (key, input)) in plot.inputs.iter().enumerate() {
        let found = resolve_input(index, key, input, &mut groups)?;
        if found == 0 && !input.is_wildcard() {
            warn!(
                file = %input.filename.display(),
                folder = %input.folder,
                object = %input.plot,
                "object not found"
            );
        }
    }
    Ok(groups)
}

fn open(input: &Input) -> Result<RootFile> {
    if !input.filename.exists() {
        return Err(PlotterError::FileNotFound(input.filename.clone()));
    }
    RootFile::open(&input.filename).map_err(|e| match e {
        RootError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            PlotterError::FileNotFound(input.filename.clone())
        }
        other => PlotterError::Root(other),
    })
}

/// Resolve one input into `groups`; returns the number of objects added.
fn resolve_input(
    index: usize,
    input_key: &str,
    input: &Input,
    groups: &mut Vec<Group>,
) -> Result<usize> {
    let file = open(input)?;
    let dir = file.directory(&input.folder).map_err(|e| match e {
        RootError::KeyNotFound(_) | RootError::NotADirectory { .. } => {
            PlotterError::FolderNotFound { file: input.filename.clone(), folder: input.folder.clone() }
        }
        other => PlotterError::Root(other),
    })?;

    let wildcard = input.is_wildcard();
    let mut added = 0;
    for key in dir.entries() {
        if !wildcard && key.name != input.plot {
            continue;
        }
        if !is_selectable(&key.name, &key.class_name) {
            debug!(name = %key.name, class = %key.class_name, "skipping entry");
            continue;
        }
        let object = match file.read_object(key) {
            Ok(obj) => obj,
            Err(RootError::UnsupportedClass(class)) => {
                warn!(name = %key.name, %class, "skipping object of unsupported class");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        info!("Load plot '{}': {} ({})", input.folder, key.name, key.class_name);

        let group_key = if wildcard { key.name.as_str() } else { EXACT_GROUP };
        let resolved = ResolvedObject {
            input_index: index,
            input_key: input_key.to_string(),
            file: input.filename.clone(),
            folder: input.folder.clone(),
            class_name: key.class_name.clone(),
            object,
        };
        match groups.iter_mut().find(|g| g.key == group_key) {
            Some(group) => group.objects.push(resolved),
            None => groups.push(Group { key: group_key.to_string(), objects: vec![resolved] }),
        }
        added += 1;
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectable_entries() {
        assert!(is_selectable("fit_eff", "TEfficiency"));
        assert!(is_selectable("probe_pt", "TH1D"));
        assert!(!is_selectable("pt_bin0__eta_bin0=0.5", "TCanvas"));
        assert!(!is_selectable("a=b", "TH1D"));
        assert!(!is_selectable("fit_eff_plots", "TDirectoryFile"));
        assert!(!is_selectable("sub", "TDirectory"));
        assert!(!is_selectable("eta_pt", "TH2F"));
        assert!(!is_selectable("eta_pt", "TH2D"));
    }
}
