//! TH1D and TH1F deserialization, plus the TH1/TAxis pieces shared with TH2.
//!
//! ROOT TH1D/TH1F serialization layout:
//! ```text
//! TH1D (or TH1F)
//!   ├─ TH1 (base, byte-counted)
//!   │    ├─ TNamed (name, title)
//!   │    ├─ TAttLine, TAttFill, TAttMarker (byte-counted, skipped)
//!   │    ├─ fNcells (i32)
//!   │    ├─ fXaxis, fYaxis, fZaxis (TAxis)
//!   │    ├─ fBarOffset, fBarWidth (i16)
//!   │    ├─ fEntries, fTsumw, fTsumw2, fTsumwx, fTsumwx2 (f64)
//!   │    ├─ fMaximum, fMinimum (v >= 2), fNormFactor (v >= 3)
//!   │    ├─ fContour, fSumw2 (TArrayD: u32 n + n×f64)
//!   │    └─ fOption, fFunctions, fBuffer, ... (skipped via byte count)
//!   └─ TArrayD / TArrayF (fNcells bin contents, flows included)
//! ```

use super::ObjectReader;
use crate::error::{Result, RootError};
use crate::histogram::{Axis, Histogram};

/// Storage type of the bin-content array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Precision {
    /// `TArrayD`.
    Double,
    /// `TArrayF`.
    Float,
}

/// The TH1 base-class fields a reader needs.
pub(crate) struct Th1Base {
    pub name: String,
    pub title: String,
    pub n_cells: usize,
    pub x: Axis,
    pub y: Axis,
    pub z: Axis,
    pub entries: f64,
    pub sumw2: Vec<f64>,
}

/// Read a complete TH1D/TH1F.
pub(crate) fn read_th1(r: &mut ObjectReader<'_>, precision: Precision) -> Result<Histogram> {
    let (_ver, end) = r.read_version()?;
    let base = read_th1_base(r)?;
    let raw = read_contents(r, precision, base.n_cells)?;
    r.seek_end(end)?;

    let n = base.x.n_bins();
    if base.n_cells != n + 2 {
        return Err(RootError::Deserialization(format!(
            "{}: fNcells {} does not match {} x bins",
            base.name, base.n_cells, n
        )));
    }

    let sumw2 = (base.sumw2.len() == base.n_cells).then(|| base.sumw2[1..=n].to_vec());
    Ok(Histogram {
        name: base.name,
        title: base.title,
        y_title: base.y.title,
        x_axis: base.x,
        bin_content: raw[1..=n].to_vec(),
        sumw2,
        underflow: raw[0],
        overflow: raw[n + 1],
        entries: base.entries,
    })
}

/// Read the TH1 base class (version header included).
pub(crate) fn read_th1_base(r: &mut ObjectReader<'_>) -> Result<Th1Base> {
    let (ver, end) = r.read_version()?;
    if end.is_none() {
        return Err(RootError::Deserialization(format!(
            "TH1 v{ver} without byte count is not supported"
        )));
    }

    let (name, title) = r.read_tnamed()?;
    r.skip_versioned()?; // TAttLine
    r.skip_versioned()?; // TAttFill
    r.skip_versioned()?; // TAttMarker

    let n_cells = usize::try_from(r.read_i32()?)
        .map_err(|_| RootError::Deserialization(format!("{name}: negative fNcells")))?;

    let x = read_taxis(r)?;
    let y = read_taxis(r)?;
    let z = read_taxis(r)?;

    let _bar_offset = r.read_i16()?;
    let _bar_width = r.read_i16()?;
    let entries = r.read_f64()?;
    r.skip(4 * 8)?; // fTsumw, fTsumw2, fTsumwx, fTsumwx2
    if ver >= 2 {
        r.skip(2 * 8)?; // fMaximum, fMinimum
    }
    if ver >= 3 {
        r.skip(8)?; // fNormFactor
    }

    let _contour = r.read_tarray_d()?;
    let sumw2 = r.read_tarray_d()?;
    r.seek_end(end)?;

    Ok(Th1Base { name, title, n_cells, x, y, z, entries, sumw2 })
}

/// Read a TAxis into its binning and title.
pub(crate) fn read_taxis(r: &mut ObjectReader<'_>) -> Result<Axis> {
    let (_ver, end) = r.read_version()?;
    let (_name, title) = r.read_tnamed()?;
    r.skip_versioned()?; // TAttAxis

    let n_bins = r.read_i32()?.max(0) as usize;
    let x_min = r.read_f64()?;
    let x_max = r.read_f64()?;
    let xbins = r.read_tarray_d()?;
    r.seek_end(end)?;

    if xbins.len() == n_bins + 1 {
        Ok(Axis::variable(xbins, title))
    } else {
        Ok(Axis::uniform(n_bins, x_min, x_max, title))
    }
}

/// Read the trailing `TArrayD`/`TArrayF` of bin contents.
pub(crate) fn read_contents(r: &mut ObjectReader<'_>, precision: Precision, n_cells: usize) -> Result<Vec<f64>> {
    let n = r.read_u32()? as usize;
    if n != n_cells {
        return Err(RootError::Deserialization(format!(
            "bin array size {n} != fNcells {n_cells}"
        )));
    }
    match precision {
        Precision::Double => r.read_array_f64(n),
        Precision::Float => r.read_array_f32(n),
    }
}
