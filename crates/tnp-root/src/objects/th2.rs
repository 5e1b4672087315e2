//! TH2D and TH2F deserialization.
//!
//! `TH2` adds fScalefactor, fTsumwy, fTsumwy2, fTsumwxy after the TH1 base;
//! cells are stored with flows, global bin = ix + (nx + 2) * iy.

use super::ObjectReader;
use super::th1::{Precision, read_contents, read_th1_base};
use crate::error::{Result, RootError};
use crate::histogram::Histogram2D;

pub(crate) fn read_th2(r: &mut ObjectReader<'_>, precision: Precision) -> Result<Histogram2D> {
    let (_ver, end) = r.read_version()?;

    let (_th2_ver, th2_end) = r.read_version()?;
    let base = read_th1_base(r)?;
    r.seek_end(th2_end)?;

    let raw = read_contents(r, precision, base.n_cells)?;
    r.seek_end(end)?;

    let (nx, ny) = (base.x.n_bins(), base.y.n_bins());
    if base.n_cells != (nx + 2) * (ny + 2) {
        return Err(RootError::Deserialization(format!(
            "{}: fNcells {} does not match {nx}x{ny} bins",
            base.name, base.n_cells
        )));
    }

    let strip_flows = |cells: &[f64]| -> Vec<f64> {
        (1..=ny).flat_map(|iy| (1..=nx).map(move |ix| cells[ix + (nx + 2) * iy])).collect()
    };

    let mut h = Histogram2D::new(base.name, base.title, base.x, base.y);
    h.z_title = base.z.title;
    h.content = strip_flows(&raw);
    h.sumw2 = (base.sumw2.len() == base.n_cells).then(|| strip_flows(&base.sumw2));
    h.entries = base.entries;
    Ok(h)
}
