//! TGraph, TGraphErrors and TGraphAsymmErrors deserialization.
//!
//! ```text
//! TGraph v4
//!   ├─ TNamed, TAttLine, TAttFill, TAttMarker
//!   ├─ fNpoints (i32)
//!   ├─ fX, fY        (flag byte + fNpoints×f64)
//!   ├─ fFunctions    (TList*)
//!   ├─ fHistogram    (TH1F*, frame histogram carrying the axis titles)
//!   └─ fMinimum, fMaximum
//! TGraphErrors      = TGraph + fEX, fEY
//! TGraphAsymmErrors = TGraph + fEXlow, fEXhigh, fEYlow, fEYhigh
//! ```

use super::{ObjectReader, RootObject};
use crate::error::{Result, RootError};
use crate::graph::Graph;

pub(crate) fn read_graph(r: &mut ObjectReader<'_>, class_name: &str) -> Result<Graph> {
    if class_name == "TGraph" {
        return read_tgraph(r);
    }

    let (_ver, end) = r.read_version()?;
    let mut g = read_tgraph(r)?;
    let n = g.len();
    match class_name {
        "TGraphErrors" => {
            let ex = r.read_counted_f64(n)?;
            let ey = r.read_counted_f64(n)?;
            g.ex_low = ex.clone();
            g.ex_high = ex;
            g.ey_low = ey.clone();
            g.ey_high = ey;
        }
        "TGraphAsymmErrors" => {
            g.ex_low = r.read_counted_f64(n)?;
            g.ex_high = r.read_counted_f64(n)?;
            g.ey_low = r.read_counted_f64(n)?;
            g.ey_high = r.read_counted_f64(n)?;
        }
        other => return Err(RootError::UnsupportedClass(other.to_string())),
    }
    r.seek_end(end)?;
    Ok(g)
}

fn read_tgraph(r: &mut ObjectReader<'_>) -> Result<Graph> {
    let (_ver, end) = r.read_version()?;
    let (name, title) = r.read_tnamed()?;
    r.skip_versioned()?; // TAttLine
    r.skip_versioned()?; // TAttFill
    r.skip_versioned()?; // TAttMarker

    let n = r.read_i32()?.max(0) as usize;
    let x = r.read_counted_f64(n)?;
    let y = r.read_counted_f64(n)?;

    let mut g = Graph::from_points(name, x, y);
    g.title = title;

    r.skip_pointer()?; // fFunctions
    if let Some(RootObject::Hist1D(frame)) = r.read_object_pointer()? {
        g.x_title = frame.x_axis.title;
        g.y_title = frame.y_title;
    }
    r.seek_end(end)?;
    Ok(g)
}
