//! Integration tests: read a fixture file assembled outside this crate's writer.

use approx::assert_relative_eq;
use std::path::PathBuf;
use tnp_root::{EfficiencyHistograms, RootFile, RootObject, StatOption};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[derive(serde::Deserialize)]
struct Expected {
    top_keys: Vec<(String, String)>,
    mass: HistogramExpected,
    efficiency: EfficiencyExpected,
}

#[derive(serde::Deserialize)]
struct HistogramExpected {
    path: String,
    title: String,
    x_title: String,
    y_title: String,
    bin_edges: Vec<f64>,
    bin_content: Vec<f64>,
    sumw2: Vec<f64>,
    underflow: f64,
    overflow: f64,
    entries: f64,
}

#[derive(serde::Deserialize)]
struct EfficiencyExpected {
    path: String,
    title: String,
    bin_edges: Vec<f64>,
    passed: Vec<f64>,
    total: Vec<f64>,
    x_title: String,
    statistic: i32,
    conf_level: f64,
}

fn load_expected() -> Expected {
    let path = fixture_path("tnp_fixture_expected.json");
    let text = std::fs::read_to_string(&path).expect("tnp_fixture_expected.json not found");
    serde_json::from_str(&text).expect("failed to parse expected JSON")
}

fn open_fixture() -> RootFile {
    let path = fixture_path("tnp_fixture.root");
    assert!(
        path.exists(),
        "fixture missing: run `python3 tests/fixtures/generate_root_fixtures.py`"
    );
    RootFile::open(&path).expect("failed to open ROOT file")
}

#[test]
fn fixture_header_and_keys() {
    let expected = load_expected();
    let f = open_fixture();
    assert_eq!(f.version(), 63004);
    assert!(!f.is_large());
    assert_eq!(f.begin(), 100);

    let keys: Vec<(String, String)> =
        f.list_keys().unwrap().into_iter().map(|k| (k.name, k.class_name)).collect();
    assert_eq!(keys, expected.top_keys);

    let tight = f.directory("tpTree/Tight_pt").unwrap();
    let names: Vec<&str> = tight.entries().iter().map(|k| k.name.as_str()).collect();
    assert_eq!(names, vec!["fit_eff"]);
}

#[test]
fn fixture_th1f_with_sumw2() {
    let expected = load_expected().mass;
    let f = open_fixture();
    let RootObject::Hist1D(h) = f.get_object(&expected.path).unwrap() else {
        panic!("expected TH1F");
    };
    assert_eq!(h.title, expected.title);
    assert_eq!(h.x_axis.title, expected.x_title);
    assert_eq!(h.y_title, expected.y_title);
    assert_eq!(h.x_axis.edges, expected.bin_edges);
    assert!(h.x_axis.is_uniform());
    assert_eq!(h.bin_content, expected.bin_content);
    assert_eq!(h.sumw2.as_deref(), Some(expected.sumw2.as_slice()));
    assert_eq!(h.underflow, expected.underflow);
    assert_eq!(h.overflow, expected.overflow);
    assert_eq!(h.entries, expected.entries);
    assert_relative_eq!(h.bin_error(2), 130.0f64.sqrt());
}

#[test]
fn fixture_compressed_tefficiency() {
    let expected = load_expected().efficiency;
    let f = open_fixture();
    let dir = f.directory("tpTree/Tight_pt").unwrap();
    let key = dir.find_key("fit_eff").unwrap();
    // stored zlib-compressed
    assert!(key.n_bytes - u32::from(key.key_len) < key.obj_len);

    let RootObject::Efficiency(e) = f.get_object(&expected.path).unwrap() else {
        panic!("expected TEfficiency");
    };
    assert_eq!(e.title, expected.title);
    assert_eq!(Some(e.statistic), StatOption::from_code(expected.statistic));
    assert_relative_eq!(e.conf_level, expected.conf_level);
    let EfficiencyHistograms::OneD { passed, total } = &e.histograms else {
        panic!("expected 1D efficiency");
    };
    assert_eq!(passed.name, "fit_eff_passed");
    assert_eq!(total.name, "fit_eff_total");
    assert_eq!(total.x_axis.edges, expected.bin_edges);
    assert!(!total.x_axis.is_uniform());
    assert_eq!(passed.bin_content, expected.passed);
    assert_eq!(total.bin_content, expected.total);

    let g = e.painted_graph().unwrap();
    assert_eq!(g.x_title, expected.x_title);
    assert_eq!(g.x, vec![15.0, 30.0, 70.0]);
    assert_relative_eq!(g.y[0], 0.9);
    assert_relative_eq!(g.y[2], 0.75);
}
