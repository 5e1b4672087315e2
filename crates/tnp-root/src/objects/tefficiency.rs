//! TEfficiency deserialization.
//!
//! ```text
//! TEfficiency v2
//!   ├─ TNamed, TAttLine, TAttFill, TAttMarker
//!   ├─ fBeta_alpha, fBeta_beta (f64)
//!   ├─ fBeta_bin_params        (vector<pair<double,double>>, byte-counted)
//!   ├─ fConfLevel              (f64)
//!   ├─ fFunctions              (TList*)
//!   ├─ fPassedHistogram        (TH1*)
//!   ├─ fStatisticOption        (i32)
//!   ├─ fTotalHistogram         (TH1*)
//!   └─ fWeight                 (f64)
//! ```

use super::{ObjectReader, RootObject};
use crate::efficiency::{Efficiency, EfficiencyHistograms, StatOption};
use crate::error::{Result, RootError};

pub(crate) fn read_tefficiency(r: &mut ObjectReader<'_>) -> Result<Efficiency> {
    let (_ver, end) = r.read_version()?;
    let (name, title) = r.read_tnamed()?;
    r.skip_versioned()?; // TAttLine
    r.skip_versioned()?; // TAttFill
    r.skip_versioned()?; // TAttMarker

    let beta_alpha = r.read_f64()?;
    let beta_beta = r.read_f64()?;

    let (_vec_ver, vec_end) = r.read_version()?;
    let n_params = r.read_u32()? as usize;
    let mut bin_priors = Vec::with_capacity(n_params.min(4096));
    for _ in 0..n_params {
        bin_priors.push((r.read_f64()?, r.read_f64()?));
    }
    r.seek_end(vec_end)?;

    let conf_level = r.read_f64()?;
    r.skip_pointer()?; // fFunctions
    let passed = r.read_object_pointer()?;
    let stat_code = r.read_i32()?;
    let total = r.read_object_pointer()?;
    let weight = r.read_f64()?;
    r.seek_end(end)?;

    let histograms = match (passed, total) {
        (Some(RootObject::Hist1D(passed)), Some(RootObject::Hist1D(total))) => {
            EfficiencyHistograms::OneD { passed, total }
        }
        (Some(RootObject::Hist2D(passed)), Some(RootObject::Hist2D(total))) => {
            EfficiencyHistograms::TwoD { passed, total }
        }
        _ => {
            return Err(RootError::Deserialization(format!(
                "{name}: passed/total histograms missing or of mismatched dimension"
            )));
        }
    };

    let statistic = StatOption::from_code(stat_code).unwrap_or_else(|| {
        tracing::warn!(%name, stat_code, "unknown statistic option, using Clopper-Pearson");
        StatOption::ClopperPearson
    });

    Ok(Efficiency {
        name,
        title,
        histograms,
        statistic,
        conf_level,
        beta_alpha,
        beta_beta,
        bin_priors,
        weight,
    })
}
