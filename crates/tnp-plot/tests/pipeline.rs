//! End-to-end runs over ROOT files written with the builder.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Value, json};
use tnp_plot::config;
use tnp_plot::{PlotterError, RunOptions, RunSummary, run, run_config};
use tnp_root::{Axis, Efficiency, Histogram, Histogram2D, RootFileBuilder};

const FOLDER: &str = "tpTree/Tight_pt/fit_eff_plots";

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let dir = std::env::temp_dir().join(format!("tnp_plot_{}_{}", std::process::id(), nanos));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn hist(name: &str, contents: &[f64]) -> Histogram {
    let mut h = Histogram::new(name, name, Axis::uniform(contents.len(), 0.0, 100.0, "p_{T}"));
    h.bin_content = contents.to_vec();
    h
}

fn efficiency(passed: &[f64], total: &[f64]) -> Efficiency {
    Efficiency::new_1d("fit_eff", "", hist("passed", passed), hist("total", total))
}

/// A fit output file: one efficiency, one mass histogram and the entries the
/// resolver must never pick.
fn write_fit_file(path: &Path, passed: &[f64]) {
    let mut eta_pt = Histogram2D::new(
        "eta_pt",
        "",
        Axis::uniform(2, -2.4, 2.4, "#eta"),
        Axis::uniform(2, 0.0, 100.0, "p_{T}"),
    );
    *eta_pt.at_mut(0, 0) = 1.0;
    RootFileBuilder::new(path.file_name().unwrap().to_string_lossy())
        .mkdir(&format!("{FOLDER}/sub"))
        .add_efficiency(FOLDER, &efficiency(passed, &[10.0, 20.0, 0.0, 40.0]))
        .add_hist1d(FOLDER, &hist("probe_mass", &[3.0, 12.0, 7.0, 1.0]))
        .add_hist1d(FOLDER, &hist("pt_bin0__eta_bin0=0.5", &[1.0]))
        .add_hist2f(FOLDER, &eta_pt)
        .add_raw(FOLDER, "TCanvas", "fit_canvas", "", vec![0u8; 16])
        .write(path)
        .unwrap();
}

struct Fixture {
    dir: PathBuf,
    data: PathBuf,
    mc: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = temp_dir();
        let data = dir.join("data.root");
        let mc = dir.join("mc.root");
        write_fit_file(&data, &[9.0, 18.0, 0.0, 39.0]);
        write_fit_file(&mc, &[10.0, 19.0, 0.0, 40.0]);
        Self { dir, data, mc }
    }

    fn out(&self) -> PathBuf {
        self.dir.join("plots")
    }

    fn input(file: &Path, plot: &str, legend: &str) -> Value {
        json!({
            "filename": file.to_string_lossy(),
            "plot": plot,
            "folder": FOLDER,
            "legendEntry": legend,
            "label": "p_{T}"
        })
    }

    fn plot(&self, inputs: Value, colors: Value, markers: Value, types: Value, stem: &str) -> Value {
        json!({
            "comment": "Tight ID efficiency vs pT",
            "inputs": inputs,
            "plot": {
                "x": [0, 100, "p_{T} [GeV]"],
                "y": [0.8, 1.05, "Efficiency"],
                "colorMap": colors,
                "markerMap": markers,
                "caption": "13 TeV",
                "logo": ["CMS", "Preliminary"],
                "legendTitle": "Tight ID"
            },
            "output": {
                "directory": self.out().to_string_lossy(),
                "fileType": types,
                "filenamePlot": stem
            }
        })
    }

    fn overlay(&self) -> Value {
        self.plot(
            json!({
                "a_data": Self::input(&self.data, "fit_eff", "Data"),
                "b_mc": Self::input(&self.mc, "fit_eff", "MC")
            }),
            json!([1, "kRed+1"]),
            json!([20, 24]),
            json!(["svg"]),
            "tight_pt",
        )
    }
}

fn run_json(doc: &Value, fast: bool) -> Result<RunSummary, PlotterError> {
    let config = config::from_str(&doc.to_string())?;
    run_config(&config, &RunOptions { fast, ..Default::default() })
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn exact_name_overlays_all_inputs_in_one_group() {
    let fx = Fixture::new();
    let summary = run_json(&json!({ "tight": fx.overlay() }), true).unwrap();

    let out = fx.out().join("tight_pt.svg");
    assert_eq!(summary.plots, 1);
    assert_eq!(summary.groups, 1);
    assert_eq!(summary.files, vec![out.clone()]);

    let svg = read(&out);
    assert!(svg.contains(">Data</text>"));
    assert!(svg.contains(">MC</text>"));
    assert!(svg.contains(">Tight ID</text>"));
    // black data markers, kRed+1 open circles for MC
    assert!(svg.contains("#000000"));
    assert!(svg.contains("#cc0000"));
}

#[test]
fn per_input_canvases_unless_fast() {
    let fx = Fixture::new();
    let summary = run_json(&json!({ "tight": fx.overlay() }), false).unwrap();

    let inputs = fx.out().join("inputs");
    assert_eq!(
        summary.files,
        vec![
            fx.out().join("tight_pt.svg"),
            inputs.join("tight_pt_a_data.svg"),
            inputs.join("tight_pt_b_mc.svg"),
        ]
    );
    // a single object never gets a legend
    assert!(!read(&inputs.join("tight_pt_a_data.svg")).contains(">Data</text>"));
}

#[test]
fn wildcard_makes_one_group_per_name() {
    let fx = Fixture::new();
    let plot = fx.plot(
        json!({ "data": Fixture::input(&fx.data, "all", "Data") }),
        json!([1]),
        json!([20]),
        json!(["svg"]),
        "all",
    );
    let summary = run_json(&json!({ "everything": plot }), true).unwrap();

    assert_eq!(summary.groups, 2);
    assert_eq!(
        summary.files,
        vec![fx.out().join("fit_eff.svg"), fx.out().join("probe_mass.svg")]
    );
    for skipped in ["eta_pt", "sub", "fit_canvas", "pt_bin0__eta_bin0=0.5"] {
        assert!(!fx.out().join(format!("{skipped}.svg")).exists(), "{skipped} was drawn");
    }
    assert!(read(&fx.out().join("probe_mass.svg")).contains(">Efficiency</text>"));
}

#[test]
fn wildcard_groups_collect_objects_across_inputs() {
    let fx = Fixture::new();
    let plot = fx.plot(
        json!({
            "a": Fixture::input(&fx.data, "all", "Data"),
            "b": Fixture::input(&fx.mc, "all", "MC")
        }),
        json!([1, 2]),
        json!([20, 21]),
        json!(["svg"]),
        "all",
    );
    let config = config::from_str(&json!({ "p": plot }).to_string()).unwrap();
    let groups = tnp_plot::resolve_inputs(&config["p"]).unwrap();

    let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["fit_eff", "probe_mass"]);
    for g in &groups {
        let inputs: Vec<&str> = g.objects.iter().map(|o| o.input_key.as_str()).collect();
        assert_eq!(inputs, vec!["a", "b"]);
    }
}

#[test]
fn short_color_map_aborts_before_output() {
    let fx = Fixture::new();
    let mut plot = fx.overlay();
    plot["plot"]["colorMap"] = json!([1]);
    let err = run_json(&json!({ "tight": plot }), true).unwrap_err();

    assert!(matches!(
        err,
        PlotterError::InsufficientStyleMap { map: "colorMap", have: 1, need: 2, .. }
    ));
    assert!(!fx.out().exists());
}

#[test]
fn short_marker_map_aborts_before_output() {
    let fx = Fixture::new();
    let mut plot = fx.overlay();
    plot["plot"]["markerMap"] = json!([20]);
    let err = run_json(&json!({ "tight": plot }), true).unwrap_err();
    assert!(matches!(err, PlotterError::InsufficientStyleMap { map: "markerMap", .. }));
    assert!(!fx.out().exists());
}

#[test]
fn missing_file_and_folder_are_fatal() {
    let fx = Fixture::new();
    let missing = fx.dir.join("nope.root");
    let mut plot = fx.overlay();
    plot["inputs"]["b_mc"]["filename"] = json!(missing.to_string_lossy());
    match run_json(&json!({ "tight": plot }), true) {
        Err(PlotterError::FileNotFound(p)) => assert_eq!(p, missing),
        other => panic!("expected FileNotFound, got {other:?}"),
    }

    let mut plot = fx.overlay();
    plot["inputs"]["a_data"]["folder"] = json!("tpTree/Loose_pt");
    match run_json(&json!({ "tight": plot }), true) {
        Err(PlotterError::FolderNotFound { folder, .. }) => assert_eq!(folder, "tpTree/Loose_pt"),
        other => panic!("expected FolderNotFound, got {other:?}"),
    }
}

#[test]
fn absent_object_draws_nothing() {
    let fx = Fixture::new();
    let mut plot = fx.overlay();
    plot["inputs"]["a_data"]["plot"] = json!("no_such_eff");
    plot["inputs"]["b_mc"]["plot"] = json!("no_such_eff");
    let summary = run_json(&json!({ "tight": plot }), true).unwrap();
    assert_eq!(summary.groups, 0);
    assert!(summary.files.is_empty());
}

#[test]
fn unsupported_file_type_names_the_extension() {
    let fx = Fixture::new();
    let mut plot = fx.overlay();
    plot["output"]["fileType"] = json!(["svg", "gif"]);
    match run_json(&json!({ "tight": plot }), true) {
        Err(PlotterError::UnsupportedFormat(ext)) => assert_eq!(ext, "gif"),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
    assert!(!fx.out().join("tight_pt.svg").exists());
}

#[test]
fn rerun_overwrites_with_identical_content() {
    let fx = Fixture::new();
    let doc = json!({ "tight": fx.overlay() });
    run_json(&doc, true).unwrap();
    let first = read(&fx.out().join("tight_pt.svg"));
    run_json(&doc, true).unwrap();
    assert_eq!(first, read(&fx.out().join("tight_pt.svg")));
}

#[test]
fn raster_and_vector_outputs() {
    let fx = Fixture::new();
    let mut plot = fx.overlay();
    plot["output"]["fileType"] = json!(["png", "pdf"]);
    let summary = run_json(&json!({ "tight": plot }), true).unwrap();
    assert_eq!(summary.files.len(), 2);

    let png = std::fs::read(fx.out().join("tight_pt.png")).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    let pdf = std::fs::read(fx.out().join("tight_pt.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn two_dimensional_efficiency_needs_z_axis() {
    let fx = Fixture::new();
    let path = fx.dir.join("eff2d.root");
    let axis = || Axis::uniform(2, 0.0, 2.0, "");
    let mut total = Histogram2D::new("total", "", axis(), axis());
    let mut passed = Histogram2D::new("passed", "", axis(), axis());
    *total.at_mut(0, 0) = 10.0;
    *passed.at_mut(0, 0) = 9.0;
    RootFileBuilder::new("eff2d.root")
        .mkdir(FOLDER)
        .add_efficiency(FOLDER, &Efficiency::new_2d("eta_pt_eff", "", passed, total))
        .write(&path)
        .unwrap();

    let mut plot = fx.plot(
        json!({ "data": Fixture::input(&path, "eta_pt_eff", "Data") }),
        json!([1]),
        json!([20]),
        json!(["svg"]),
        "all",
    );
    let err = run_json(&json!({ "map": plot.clone() }), true).unwrap_err();
    assert!(matches!(err, PlotterError::ConfigValidation(_)));

    plot["plot"]["z"] = json!([0.0, 1.0, "Efficiency"]);
    let summary = run_json(&json!({ "map": plot }), true).unwrap();
    assert_eq!(summary.files, vec![fx.out().join("histo.svg")]);
}

#[test]
fn run_reads_the_config_file() {
    let fx = Fixture::new();
    let config_path = fx.dir.join("plots.json");
    std::fs::write(&config_path, json!({ "tight": fx.overlay() }).to_string()).unwrap();
    let summary = run(&config_path, &RunOptions { fast: true, ..Default::default() }).unwrap();
    assert_eq!(summary.files, vec![fx.out().join("tight_pt.svg")]);

    std::fs::write(&config_path, "{ \"tight\": ").unwrap();
    assert!(matches!(
        run(&config_path, &RunOptions::default()),
        Err(PlotterError::Config(_))
    ));
}
