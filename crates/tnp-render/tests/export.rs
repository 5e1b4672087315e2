use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tnp_render::canvas::Canvas;
use tnp_render::color::{K_BLUE, root_color};
use tnp_render::config::RenderConfig;
use tnp_render::font::FontHandle;
use tnp_render::primitives::{LineStyle, MarkerStyle, Style};
use tnp_render::{ImageFormat, RenderError, render_to_bytes, render_to_file};

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let dir = std::env::temp_dir().join(format!("tnp_render_{}_{}", std::process::id(), nanos));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn sample_canvas() -> Canvas {
    let mut c = Canvas::with_fonts(200.0, 120.0, Arc::new(FontHandle::empty()));
    c.rect(10.0, 10.0, 180.0, 100.0, &Style::stroked(root_color(1), 1.0));
    c.polyline(&[(20.0, 100.0), (100.0, 40.0), (180.0, 30.0)], &LineStyle::solid(root_color(K_BLUE), 2.0));
    c.marker(100.0, 40.0, &MarkerStyle::root(20, root_color(K_BLUE), 1.0));
    c
}

#[test]
fn svg_bytes_are_the_document() {
    let bytes = render_to_bytes(&sample_canvas(), ImageFormat::Svg, &RenderConfig::default()).unwrap();
    let svg = String::from_utf8(bytes).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("<polyline"));
}

#[cfg(feature = "png")]
#[test]
fn png_is_scaled_by_dpi() {
    let config = RenderConfig { dpi: 144, ..Default::default() };
    let bytes = render_to_bytes(&sample_canvas(), ImageFormat::Png, &config).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    // IHDR width/height, big-endian
    let w = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
    let h = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
    assert_eq!((w, h), (400, 240));
}

#[cfg(feature = "pdf")]
#[test]
fn pdf_has_header() {
    let bytes = render_to_bytes(&sample_canvas(), ImageFormat::Pdf, &RenderConfig::default()).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn files_are_written_by_extension() {
    let dir = temp_dir();
    let canvas = sample_canvas();
    let svg = dir.join("plot.svg");
    render_to_file(&canvas, &svg, &RenderConfig::default()).unwrap();
    assert!(std::fs::read_to_string(&svg).unwrap().contains("</svg>"));

    let bad = dir.join("plot.gif");
    assert!(matches!(
        render_to_file(&canvas, &bad, &RenderConfig::default()),
        Err(RenderError::UnsupportedFormat(e)) if e == "gif"
    ));
    assert!(!bad.exists());
}
