//! JSON plot configuration.
//!
//! ```json
//! {
//!   "muonId": {
//!     "comment": "Tight ID efficiency vs pT",
//!     "inputs": {
//!       "a_data": { "filename": "data.root", "plot": "fit_eff", "folder": "tpTree/Tight_pt/fit_eff_plots",
//!                   "legendEntry": "Data", "label": "p_{T}" }
//!     },
//!     "plot": { "x": [0, 100, "p_{T} [GeV]"], "y": [0.8, 1.05, "Efficiency"],
//!               "colorMap": [1, 632], "markerMap": [20, 21],
//!               "caption": "13 TeV", "logo": ["CMS", "Preliminary"], "legendTitle": "Tight ID" },
//!     "output": { "directory": "plots", "fileType": ["png", "pdf"], "filenamePlot": "tight_id_pt" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tnp_render::ImageFormat;
use tnp_render::color::{Color, named_index, root_color};

use crate::error::{PlotterError, Result};

/// Wildcard object name / output stem.
pub const ALL: &str = "all";

/// All plots of a config file, iterated in name order.
pub type Config = BTreeMap<String, PlotConfig>;

/// One plot block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotConfig {
    /// Free text printed while processing.
    #[serde(default)]
    pub comment: String,
    /// Inputs by key; the key order fixes color/marker assignment.
    pub inputs: BTreeMap<String, Input>,
    /// Axis, style and label settings.
    pub plot: PlotStyle,
    /// Where and how to save.
    pub output: Output,
}

/// One object source.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// ROOT file path.
    pub filename: PathBuf,
    /// Object name, or `"all"` for every eligible object in the folder.
    pub plot: String,
    /// `/`-separated directory inside the file; empty for the top directory.
    pub folder: String,
    /// Legend text (TLatex).
    pub legend_entry: String,
    /// Axis label. Read but not drawn.
    pub label: String,
}

impl Input {
    /// Whether this input selects every object of its folder.
    pub fn is_wildcard(&self) -> bool {
        self.plot == ALL
    }
}

/// One element of an axis array: the bounds are numbers, the title a string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AxisItem {
    /// Range bound.
    Number(f64),
    /// Title.
    Text(String),
}

/// A validated `[min, max, "title"]` axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Title (TLatex).
    pub title: String,
}

impl AxisSpec {
    fn parse(name: &str, items: &[AxisItem]) -> Result<Self> {
        match items {
            [AxisItem::Number(min), AxisItem::Number(max), AxisItem::Text(title), ..] => {
                Ok(Self { min: *min, max: *max, title: title.clone() })
            }
            _ => Err(PlotterError::ConfigValidation(format!(
                "axis '{name}' must be [min, max, \"title\"], got {} element(s)",
                items.len()
            ))),
        }
    }
}

/// A color as written in the config.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ColorCode {
    /// ROOT color index (`632` = kRed).
    Index(i32),
    /// `"#RRGGBB"` or a ROOT name such as `"kAzure+2"`.
    Name(String),
}

impl ColorCode {
    /// Resolve to RGB.
    pub fn to_color(&self) -> Result<Color> {
        match self {
            Self::Index(i) => Ok(root_color(*i)),
            Self::Name(s) => Color::parse_hex(s)
                .or_else(|| named_index(s).map(root_color))
                .ok_or_else(|| PlotterError::ConfigValidation(format!("unknown color '{s}'"))),
        }
    }
}

/// Axis and decoration settings of a plot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotStyle {
    /// X axis array.
    pub x: Vec<AxisItem>,
    /// Y axis array.
    pub y: Vec<AxisItem>,
    /// Z axis array; only 2D efficiencies need it.
    #[serde(default)]
    pub z: Option<Vec<AxisItem>>,
    /// Colors by input position.
    pub color_map: Vec<ColorCode>,
    /// ROOT marker styles by input position.
    pub marker_map: Vec<i32>,
    /// Top-right caption.
    pub caption: String,
    /// Experiment label and its subtitle.
    pub logo: Vec<String>,
    /// Text above the legend.
    pub legend_title: String,
}

impl PlotStyle {
    /// Validated x axis.
    pub fn x_axis(&self) -> Result<AxisSpec> {
        AxisSpec::parse("x", &self.x)
    }

    /// Validated y axis.
    pub fn y_axis(&self) -> Result<AxisSpec> {
        AxisSpec::parse("y", &self.y)
    }

    /// Validated z axis, an error if absent.
    pub fn z_axis(&self) -> Result<AxisSpec> {
        match &self.z {
            Some(items) => AxisSpec::parse("z", items),
            None => Err(PlotterError::ConfigValidation(
                "2D objects need a 'z' axis [min, max, \"title\"]".into(),
            )),
        }
    }

    /// All colors resolved to RGB.
    pub fn colors(&self) -> Result<Vec<Color>> {
        self.color_map.iter().map(ColorCode::to_color).collect()
    }
}

/// Output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    /// Target directory, created if missing.
    pub directory: PathBuf,
    /// Extensions to write.
    pub file_type: Vec<String>,
    /// Literal file stem, or `"all"` to use the group key.
    pub filename_plot: String,
}

impl Output {
    /// Requested formats; an unknown extension is an error.
    pub fn formats(&self) -> Result<Vec<ImageFormat>> {
        self.file_type
            .iter()
            .map(|t| ImageFormat::from_extension(t).map_err(PlotterError::from))
            .collect()
    }

    /// File stem for a group.
    pub fn stem<'a>(&'a self, group_key: &'a str) -> &'a str {
        if self.filename_plot == ALL { group_key } else { &self.filename_plot }
    }
}

impl PlotConfig {
    /// Check everything that does not depend on file contents.
    pub fn validate(&self) -> Result<()> {
        self.plot.x_axis()?;
        self.plot.y_axis()?;
        if let Some(z) = &self.plot.z {
            AxisSpec::parse("z", z)?;
        }
        self.plot.colors()?;
        if self.plot.logo.len() != 2 {
            return Err(PlotterError::ConfigValidation(format!(
                "'logo' must hold exactly 2 texts, got {}",
                self.plot.logo.len()
            )));
        }
        if self.output.file_type.is_empty() {
            return Err(PlotterError::ConfigValidation("'fileType' is empty".into()));
        }
        Ok(())
    }
}

/// Parse a config document.
pub fn from_str(json: &str) -> Result<Config> {
    let config: Config = serde_json::from_str(json)?;
    for (name, plot) in &config {
        plot.validate().map_err(|e| match e {
            PlotterError::ConfigValidation(msg) => {
                PlotterError::ConfigValidation(format!("plot '{name}': {msg}"))
            }
            other => other,
        })?;
    }
    Ok(config)
}

/// Read and parse a config file.
pub fn load(path: &Path) -> Result<Config> {
    let json = std::fs::read_to_string(path)?;
    from_str(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r##"{
        "b_plot": {
            "comment": "second",
            "inputs": {
                "z": {"filename": "z.root", "plot": "all", "folder": "", "legendEntry": "Z", "label": ""},
                "a": {"filename": "a.root", "plot": "eff", "folder": "d", "legendEntry": "A", "label": "x", "extra": 1}
            },
            "plot": {"x": [0, 10, "p_{T}"], "y": [0.5, 1.05, "#varepsilon"],
                     "colorMap": [1, "#ff0000", "kAzure+2"], "markerMap": [20, 21],
                     "caption": "c", "logo": ["CMS", "Preliminary"], "legendTitle": "t"},
            "output": {"directory": "out", "fileType": ["png"], "filenamePlot": "all"}
        },
        "a_plot": {
            "inputs": {},
            "plot": {"x": [0, 1, "x"], "y": [0, 1, "y"], "z": [0.0, 1.0, "eff"], "colorMap": [], "markerMap": [],
                     "caption": "", "logo": ["", ""], "legendTitle": ""},
            "output": {"directory": "out", "fileType": ["svg"], "filenamePlot": "fixed"}
        }
    }"##;

    #[test]
    fn parses_sorted_plots_and_inputs() {
        let config = from_str(MINIMAL).unwrap();
        let names: Vec<&str> = config.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a_plot", "b_plot"]);

        let b = &config["b_plot"];
        let keys: Vec<&str> = b.inputs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "z"]);
        assert!(b.inputs["z"].is_wildcard());
        assert!(!b.inputs["a"].is_wildcard());
        assert_eq!(b.inputs["a"].legend_entry, "A");
        assert_eq!(config["a_plot"].comment, "");
    }

    #[test]
    fn axes_and_colors() {
        let config = from_str(MINIMAL).unwrap();
        let b = &config["b_plot"].plot;
        assert_eq!(b.x_axis().unwrap(), AxisSpec { min: 0.0, max: 10.0, title: "p_{T}".into() });
        assert_eq!(b.y_axis().unwrap().max, 1.05);
        assert!(matches!(b.z_axis(), Err(PlotterError::ConfigValidation(_))));
        assert_eq!(config["a_plot"].plot.z_axis().unwrap().title, "eff");

        let colors = b.colors().unwrap();
        assert_eq!(colors[0], Color::BLACK);
        assert_eq!(colors[1], Color::rgb(255, 0, 0));
        assert_eq!(colors[2], root_color(862));
    }

    #[test]
    fn output_stem_and_formats() {
        let config = from_str(MINIMAL).unwrap();
        let out = &config["b_plot"].output;
        assert_eq!(out.stem("eff_pt"), "eff_pt");
        assert_eq!(config["a_plot"].output.stem("eff_pt"), "fixed");
        assert_eq!(out.formats().unwrap(), vec![ImageFormat::Png]);
    }

    #[test]
    fn unknown_file_type_is_unsupported_format() {
        let mut out = from_str(MINIMAL).unwrap()["b_plot"].output.clone();
        out.file_type.push("gif".into());
        assert!(matches!(out.formats(), Err(PlotterError::UnsupportedFormat(e)) if e == "gif"));
    }

    #[test]
    fn validation_errors() {
        let short_axis = MINIMAL.replace(r#""x": [0, 10, "p_{T}"]"#, r#""x": [0, 10]"#);
        let err = from_str(&short_axis).unwrap_err();
        assert!(
            matches!(&err, PlotterError::ConfigValidation(m) if m.contains("b_plot") && m.contains("'x'")),
            "{err}"
        );

        let bad_logo = MINIMAL.replace(r#"["CMS", "Preliminary"]"#, r#"["CMS"]"#);
        assert!(matches!(from_str(&bad_logo), Err(PlotterError::ConfigValidation(_))));

        let bad_color = MINIMAL.replace(r##""#ff0000""##, r#""mauve""#);
        assert!(matches!(from_str(&bad_color), Err(PlotterError::ConfigValidation(_))));

        let no_types = MINIMAL.replace(r#"["svg"]"#, "[]");
        assert!(matches!(from_str(&no_types), Err(PlotterError::ConfigValidation(_))));
    }

    #[test]
    fn malformed_json_and_missing_fields_are_config_errors() {
        assert!(matches!(from_str("{ not json"), Err(PlotterError::Config(_))));
        let missing = MINIMAL.replace(r#""legendEntry": "A", "#, "");
        assert!(matches!(from_str(&missing), Err(PlotterError::Config(_))));
    }
}
