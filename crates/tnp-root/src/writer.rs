//! Minimal ROOT file writer.
//!
//! Produces uncompressed, small-format (32-bit seek) files holding nested
//! `TDirectoryFile`s and the object classes the reader decodes. Object
//! pointers use ROOT's class tags, so the second histogram of the same class
//! inside one object (e.g. the total histogram of a `TEfficiency`) is written
//! as a class reference.
//!
//! ```text
//!   0  file header, zero-padded to BEGIN
//! 100  top directory record: TKey("TFile") + name + title + TDirectory
//!      per directory: subdirectory records, object records, key list
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::directory::{
    DirectoryHeader, NBYTES_KEYS_OFFSET, SEEK_KEYS_OFFSET, SMALL_DIRECTORY_LEN,
};
use crate::efficiency::{Efficiency, EfficiencyHistograms};
use crate::error::Result;
use crate::file::ROOT_MAGIC;
use crate::graph::Graph;
use crate::histogram::{Axis, Histogram, Histogram2D};
use crate::key::{KEY_VERSION_SMALL, Key};
use crate::rbuffer::{CLASS_MASK, MAP_OFFSET, NEW_CLASS_TAG};
use crate::wbuffer::WBuffer;

/// Offset of the top directory record.
const BEGIN: usize = 100;
/// File format version written into the header (ROOT 6.24).
const FILE_VERSION: u32 = 62400;
/// TDirectory streamer version for small files.
const DIRECTORY_VERSION: u16 = 5;
/// Fixed key timestamp (2024-01-01 00:00:00) so output is reproducible.
const DATIME: u32 = (29 << 26) | (1 << 22) | (1 << 17);
/// ROOT's "unset" value for fMinimum/fMaximum.
const UNSET: f64 = -1111.0;

const HEADER_END_OFFSET: usize = 12;
const HEADER_NBYTES_NAME_OFFSET: usize = 28;

/// Storage type for histogram contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// `TH1D` / `TH2D`.
    Double,
    /// `TH1F` / `TH2F`.
    Float,
}

#[derive(Debug, Clone)]
struct StoredObject {
    class_name: String,
    name: String,
    title: String,
    cycle: u16,
    payload: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
struct DirNode {
    name: String,
    subdirs: Vec<DirNode>,
    objects: Vec<StoredObject>,
}

/// Builder for an in-memory ROOT file.
///
/// ```
/// use tnp_root::{Axis, Histogram, RootFile, RootFileBuilder};
///
/// let mut h = Histogram::new("pt", "probe p_{T}", Axis::uniform(4, 0.0, 100.0, "p_{T} [GeV]"));
/// h.bin_content = vec![1.0, 4.0, 9.0, 2.0];
/// let bytes = RootFileBuilder::new("fit.root").add_hist1d("tpTree/muon", &h).to_bytes();
///
/// let f = RootFile::from_bytes(bytes, "fit.root").unwrap();
/// let dir = f.directory("tpTree/muon").unwrap();
/// assert_eq!(dir.entries()[0].name, "pt");
/// ```
#[derive(Debug, Clone)]
pub struct RootFileBuilder {
    file_name: String,
    root: DirNode,
}

impl RootFileBuilder {
    /// New empty file; `file_name` is recorded in the top directory record.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self { file_name: file_name.into(), root: DirNode::default() }
    }

    /// Create a (possibly nested) directory.
    pub fn mkdir(&mut self, path: &str) -> &mut Self {
        self.dir_mut(path);
        self
    }

    /// Add a 1D histogram as `TH1D`.
    pub fn add_hist1d(&mut self, dir: &str, h: &Histogram) -> &mut Self {
        self.add_hist1(dir, h, Storage::Double)
    }

    /// Add a 1D histogram with the given storage type.
    pub fn add_hist1(&mut self, dir: &str, h: &Histogram, storage: Storage) -> &mut Self {
        let class = th1_class(storage);
        self.add_streamed(dir, class, &h.name, &h.title, |w| w.write_th1(h, storage))
    }

    /// Add a 2D histogram as `TH2F`.
    pub fn add_hist2f(&mut self, dir: &str, h: &Histogram2D) -> &mut Self {
        self.add_hist2(dir, h, Storage::Float)
    }

    /// Add a 2D histogram with the given storage type.
    pub fn add_hist2(&mut self, dir: &str, h: &Histogram2D, storage: Storage) -> &mut Self {
        let class = th2_class(storage);
        self.add_streamed(dir, class, &h.name, &h.title, |w| w.write_th2(h, storage))
    }

    /// Add a graph as `TGraphAsymmErrors`.
    pub fn add_graph(&mut self, dir: &str, g: &Graph) -> &mut Self {
        self.add_streamed(dir, "TGraphAsymmErrors", &g.name, &g.title, |w| w.write_graph(g))
    }

    /// Add a `TEfficiency`.
    pub fn add_efficiency(&mut self, dir: &str, e: &Efficiency) -> &mut Self {
        self.add_streamed(dir, "TEfficiency", &e.name, &e.title, |w| w.write_efficiency(e))
    }

    /// Add an opaque object record with a caller-provided payload.
    pub fn add_raw(
        &mut self,
        dir: &str,
        class_name: &str,
        name: &str,
        title: &str,
        payload: Vec<u8>,
    ) -> &mut Self {
        let node = self.dir_mut(dir);
        let cycle = next_cycle(node, name);
        node.objects.push(StoredObject {
            class_name: class_name.to_string(),
            name: name.to_string(),
            title: title.to_string(),
            cycle,
            payload,
        });
        self
    }

    fn add_streamed(
        &mut self,
        dir: &str,
        class_name: &str,
        name: &str,
        title: &str,
        body: impl FnOnce(&mut ObjectWriter),
    ) -> &mut Self {
        let key_len = Key::small_header_len(class_name, name, title) as usize;
        let mut w = ObjectWriter::new(key_len);
        body(&mut w);
        self.add_raw(dir, class_name, name, title, w.buf.into_inner())
    }

    fn dir_mut(&mut self, path: &str) -> &mut DirNode {
        let mut node = &mut self.root;
        for part in path.split('/').filter(|s| !s.is_empty()) {
            let idx = match node.subdirs.iter().position(|d| d.name == part) {
                Some(i) => i,
                None => {
                    node.subdirs.push(DirNode { name: part.to_string(), ..DirNode::default() });
                    node.subdirs.len() - 1
                }
            };
            node = &mut node.subdirs[idx];
        }
        node
    }

    /// Serialize the whole file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = WBuffer::new();
        write_file_header(&mut w);

        let title = "";
        let key_len = Key::small_header_len("TFile", &self.file_name, title);
        let name_len = WBuffer::string_len(&self.file_name) + WBuffer::string_len(title);
        let nbytes_name = key_len as usize + name_len;
        let obj_len = (name_len + SMALL_DIRECTORY_LEN) as u32;
        Key {
            n_bytes: key_len as u32 + obj_len,
            version: KEY_VERSION_SMALL,
            obj_len,
            datime: DATIME,
            key_len,
            cycle: 1,
            seek_key: BEGIN as u64,
            seek_pdir: 0,
            class_name: "TFile".into(),
            name: self.file_name.clone(),
            title: title.into(),
        }
        .write(&mut w);
        w.write_string(&self.file_name);
        w.write_string(title);

        let streamer_pos = w.len();
        DirectoryHeader {
            version: DIRECTORY_VERSION,
            nbytes_keys: 0,
            nbytes_name: nbytes_name as u32,
            seek_dir: BEGIN as u64,
            seek_parent: 0,
            seek_keys: 0,
        }
        .write(&mut w, DATIME);

        let (seek_keys, nbytes_keys) = write_directory(&mut w, &self.root, BEGIN as u64);
        w.patch_u32(streamer_pos + NBYTES_KEYS_OFFSET, nbytes_keys);
        w.patch_u32(streamer_pos + SEEK_KEYS_OFFSET, seek_keys);

        let end = w.len() as u32;
        w.patch_u32(HEADER_END_OFFSET, end);
        w.patch_u32(HEADER_NBYTES_NAME_OFFSET, nbytes_name as u32);
        w.into_inner()
    }

    /// Serialize and write to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes())?;
        tracing::debug!(path = %path.display(), "wrote ROOT file");
        Ok(())
    }
}

fn next_cycle(node: &DirNode, name: &str) -> u16 {
    node.objects.iter().filter(|o| o.name == name).map(|o| o.cycle).max().unwrap_or(0) + 1
}

fn th1_class(storage: Storage) -> &'static str {
    match storage {
        Storage::Double => "TH1D",
        Storage::Float => "TH1F",
    }
}

fn th2_class(storage: Storage) -> &'static str {
    match storage {
        Storage::Double => "TH2D",
        Storage::Float => "TH2F",
    }
}

fn write_file_header(w: &mut WBuffer) {
    w.write_bytes(ROOT_MAGIC);
    w.write_u32(FILE_VERSION);
    w.write_u32(BEGIN as u32);
    w.write_u32(0); // fEND, patched
    w.write_u32(0); // fSeekFree
    w.write_u32(0); // fNbytesFree
    w.write_u32(0); // nfree
    w.write_u32(0); // fNbytesName, patched
    w.write_u8(4); // fUnits
    w.write_u32(0); // fCompress: uncompressed
    w.write_u32(0); // fSeekInfo
    w.write_u32(0); // fNbytesInfo
    w.write_u16(1); // UUID version
    w.write_bytes(&[0u8; 16]);
    w.write_bytes(&vec![0u8; BEGIN - w.len()]);
}

/// Write a directory's children and key list; returns `(seek_keys, nbytes_keys)`.
fn write_directory(w: &mut WBuffer, dir: &DirNode, seek_dir: u64) -> (u32, u32) {
    let mut keys = Vec::with_capacity(dir.subdirs.len() + dir.objects.len());

    for sub in &dir.subdirs {
        let key_len = Key::small_header_len("TDirectoryFile", &sub.name, "");
        let key = Key {
            n_bytes: key_len as u32 + SMALL_DIRECTORY_LEN as u32,
            version: KEY_VERSION_SMALL,
            obj_len: SMALL_DIRECTORY_LEN as u32,
            datime: DATIME,
            key_len,
            cycle: 1,
            seek_key: w.len() as u64,
            seek_pdir: seek_dir,
            class_name: "TDirectoryFile".into(),
            name: sub.name.clone(),
            title: String::new(),
        };
        key.write(w);

        let streamer_pos = w.len();
        DirectoryHeader {
            version: DIRECTORY_VERSION,
            nbytes_keys: 0,
            nbytes_name: key_len as u32,
            seek_dir: key.seek_key,
            seek_parent: seek_dir,
            seek_keys: 0,
        }
        .write(w, DATIME);

        let (seek_keys, nbytes_keys) = write_directory(w, sub, key.seek_key);
        w.patch_u32(streamer_pos + NBYTES_KEYS_OFFSET, nbytes_keys);
        w.patch_u32(streamer_pos + SEEK_KEYS_OFFSET, seek_keys);
        keys.push(key);
    }

    for obj in &dir.objects {
        let key_len = Key::small_header_len(&obj.class_name, &obj.name, &obj.title);
        let key = Key {
            n_bytes: key_len as u32 + obj.payload.len() as u32,
            version: KEY_VERSION_SMALL,
            obj_len: obj.payload.len() as u32,
            datime: DATIME,
            key_len,
            cycle: obj.cycle,
            seek_key: w.len() as u64,
            seek_pdir: seek_dir,
            class_name: obj.class_name.clone(),
            name: obj.name.clone(),
            title: obj.title.clone(),
        };
        key.write(w);
        w.write_bytes(&obj.payload);
        keys.push(key);
    }

    let list_pos = w.len();
    let list_key_len = Key::small_header_len("TDirectory", &dir.name, "");
    let body_len: u32 = 4 + keys.iter().map(|k| k.key_len as u32).sum::<u32>();
    Key {
        n_bytes: list_key_len as u32 + body_len,
        version: KEY_VERSION_SMALL,
        obj_len: body_len,
        datime: DATIME,
        key_len: list_key_len,
        cycle: 1,
        seek_key: list_pos as u64,
        seek_pdir: seek_dir,
        class_name: "TDirectory".into(),
        name: dir.name.clone(),
        title: String::new(),
    }
    .write(w);
    w.write_u32(keys.len() as u32);
    for key in &keys {
        key.write(w);
    }

    (list_pos as u32, (w.len() - list_pos) as u32)
}

/// Streams one object, tracking the class tags it has written.
struct ObjectWriter {
    buf: WBuffer,
    key_len: usize,
    classes: HashMap<&'static str, u32>,
}

impl ObjectWriter {
    fn new(key_len: usize) -> Self {
        Self { buf: WBuffer::new(), key_len, classes: HashMap::new() }
    }

    /// Write `[bcnt][class tag]` followed by `body`.
    fn write_pointer(&mut self, class: &'static str, body: impl FnOnce(&mut Self)) {
        let pos = self.buf.begin_counted();
        match self.classes.get(class) {
            Some(&offset) => self.buf.write_u32(offset | CLASS_MASK),
            None => {
                let tag_pos = self.buf.len();
                self.buf.write_u32(NEW_CLASS_TAG);
                self.buf.write_cstring(class);
                self.classes.insert(class, (tag_pos + self.key_len) as u32 + MAP_OFFSET);
            }
        }
        body(self);
        self.buf.end_counted(pos);
    }

    fn write_null_pointer(&mut self) {
        self.buf.write_u32(0);
    }

    fn write_att_line(&mut self) {
        let pos = self.buf.begin_versioned(2);
        self.buf.write_i16(602); // fLineColor
        self.buf.write_i16(1); // fLineStyle
        self.buf.write_i16(1); // fLineWidth
        self.buf.end_counted(pos);
    }

    fn write_att_fill(&mut self) {
        let pos = self.buf.begin_versioned(2);
        self.buf.write_i16(0); // fFillColor
        self.buf.write_i16(1001); // fFillStyle
        self.buf.end_counted(pos);
    }

    fn write_att_marker(&mut self) {
        let pos = self.buf.begin_versioned(2);
        self.buf.write_i16(1); // fMarkerColor
        self.buf.write_i16(1); // fMarkerStyle
        self.buf.write_f32(1.0); // fMarkerSize
        self.buf.end_counted(pos);
    }

    fn write_atts(&mut self) {
        self.write_att_line();
        self.write_att_fill();
        self.write_att_marker();
    }

    fn write_att_axis(&mut self) {
        let pos = self.buf.begin_versioned(4);
        self.buf.write_i32(510); // fNdivisions
        self.buf.write_i16(1); // fAxisColor
        self.buf.write_i16(1); // fLabelColor
        self.buf.write_i16(42); // fLabelFont
        self.buf.write_f32(0.005); // fLabelOffset
        self.buf.write_f32(0.035); // fLabelSize
        self.buf.write_f32(0.03); // fTickLength
        self.buf.write_f32(1.0); // fTitleOffset
        self.buf.write_f32(0.035); // fTitleSize
        self.buf.write_i16(1); // fTitleColor
        self.buf.write_i16(42); // fTitleFont
        self.buf.end_counted(pos);
    }

    fn write_taxis(&mut self, name: &str, axis: &Axis) {
        let pos = self.buf.begin_versioned(10);
        self.buf.write_tnamed(name, &axis.title);
        self.write_att_axis();
        self.buf.write_i32(axis.n_bins() as i32);
        self.buf.write_f64(axis.min());
        self.buf.write_f64(axis.max());
        if axis.is_uniform() {
            self.buf.write_tarray_d(&[]);
        } else {
            self.buf.write_tarray_d(&axis.edges);
        }
        self.buf.write_i32(0); // fFirst
        self.buf.write_i32(0); // fLast
        self.buf.write_u16(0); // fBits2
        self.buf.write_u8(0); // fTimeDisplay
        self.buf.write_string(""); // fTimeFormat
        self.write_null_pointer(); // fLabels
        self.write_null_pointer(); // fModLabs
        self.buf.end_counted(pos);
    }

    fn write_empty_list(&mut self) {
        let pos = self.buf.begin_versioned(5);
        self.buf.write_tobject();
        self.buf.write_string("");
        self.buf.write_i32(0);
        self.buf.end_counted(pos);
    }

    /// TH1 base class; `cells`/`sumw2` include flow bins.
    fn write_th1_base(&mut self, h: &Th1Fields<'_>) {
        let pos = self.buf.begin_versioned(8);
        self.buf.write_tnamed(h.name, h.title);
        self.write_atts();
        self.buf.write_i32(h.cells.len() as i32);
        self.write_taxis("xaxis", h.x);
        self.write_taxis("yaxis", h.y);
        self.write_taxis("zaxis", h.z);
        self.buf.write_i16(0); // fBarOffset
        self.buf.write_i16(1000); // fBarWidth
        self.buf.write_f64(h.entries);
        let tsumw: f64 = h.cells.iter().sum();
        let tsumw2: f64 = if h.sumw2.is_empty() { tsumw } else { h.sumw2.iter().sum() };
        self.buf.write_f64(tsumw);
        self.buf.write_f64(tsumw2);
        self.buf.write_f64(h.tsumwx);
        self.buf.write_f64(h.tsumwx2);
        self.buf.write_f64(UNSET); // fMaximum
        self.buf.write_f64(UNSET); // fMinimum
        self.buf.write_f64(0.0); // fNormFactor
        self.buf.write_tarray_d(&[]); // fContour
        self.buf.write_tarray_d(h.sumw2);
        self.buf.write_string(""); // fOption
        self.write_empty_list(); // fFunctions
        self.buf.write_i32(0); // fBufferSize
        self.buf.write_counted_f64(&[]); // fBuffer
        self.buf.write_i32(0); // fBinStatErrOpt
        self.buf.write_i32(2); // fStatOverflows
        self.buf.end_counted(pos);
    }

    fn write_contents(&mut self, cells: &[f64], storage: Storage) {
        self.buf.write_u32(cells.len() as u32);
        for &v in cells {
            match storage {
                Storage::Double => self.buf.write_f64(v),
                Storage::Float => self.buf.write_f32(v as f32),
            }
        }
    }

    fn write_th1(&mut self, h: &Histogram, storage: Storage) {
        let n = h.n_bins();
        let mut cells = Vec::with_capacity(n + 2);
        cells.push(h.underflow);
        cells.extend_from_slice(&h.bin_content);
        cells.push(h.overflow);

        let sumw2 = match &h.sumw2 {
            Some(w2) => {
                let mut v = Vec::with_capacity(n + 2);
                v.push(0.0);
                v.extend_from_slice(w2);
                v.push(0.0);
                v
            }
            None => Vec::new(),
        };

        let (mut sx, mut sx2) = (0.0, 0.0);
        for (i, &c) in h.bin_content.iter().enumerate() {
            let x = h.x_axis.center(i);
            sx += c * x;
            sx2 += c * x * x;
        }

        let y = Axis::uniform(1, 0.0, 1.0, h.y_title.clone());
        let z = Axis::uniform(1, 0.0, 1.0, "");
        let pos = self.buf.begin_versioned(3);
        self.write_th1_base(&Th1Fields {
            name: &h.name,
            title: &h.title,
            x: &h.x_axis,
            y: &y,
            z: &z,
            cells: &cells,
            sumw2: &sumw2,
            entries: h.entries,
            tsumwx: sx,
            tsumwx2: sx2,
        });
        self.write_contents(&cells, storage);
        self.buf.end_counted(pos);
    }

    fn write_th2(&mut self, h: &Histogram2D, storage: Storage) {
        let (nx, ny) = (h.nx(), h.ny());
        let with_flows = |inner: &[f64]| -> Vec<f64> {
            let mut out = vec![0.0; (nx + 2) * (ny + 2)];
            for iy in 0..ny {
                for ix in 0..nx {
                    out[(ix + 1) + (nx + 2) * (iy + 1)] = inner[iy * nx + ix];
                }
            }
            out
        };
        let cells = with_flows(&h.content);
        let sumw2 = h.sumw2.as_deref().map(with_flows).unwrap_or_default();
        let z = Axis::uniform(1, 0.0, 1.0, h.z_title.clone());

        let pos = self.buf.begin_versioned(4);
        let th2 = self.buf.begin_versioned(5);
        self.write_th1_base(&Th1Fields {
            name: &h.name,
            title: &h.title,
            x: &h.x_axis,
            y: &h.y_axis,
            z: &z,
            cells: &cells,
            sumw2: &sumw2,
            entries: h.entries,
            tsumwx: 0.0,
            tsumwx2: 0.0,
        });
        self.buf.write_f64(1.0); // fScalefactor
        self.buf.write_f64(0.0); // fTsumwy
        self.buf.write_f64(0.0); // fTsumwy2
        self.buf.write_f64(0.0); // fTsumwxy
        self.buf.end_counted(th2);
        self.write_contents(&cells, storage);
        self.buf.end_counted(pos);
    }

    fn write_graph(&mut self, g: &Graph) {
        let pos = self.buf.begin_versioned(3);
        let graph = self.buf.begin_versioned(4);
        self.buf.write_tnamed(&g.name, &g.title);
        self.write_atts();
        self.buf.write_i32(g.len() as i32);
        self.buf.write_counted_f64(&g.x);
        self.buf.write_counted_f64(&g.y);
        self.write_pointer("TList", |w| w.write_empty_list()); // fFunctions
        if g.x_title.is_empty() && g.y_title.is_empty() {
            self.write_null_pointer(); // fHistogram
        } else {
            let (lo, hi, _, _) = g.bounds().unwrap_or((0.0, 1.0, 0.0, 1.0));
            let mut frame = Histogram::new(&g.name, &g.title, Axis::uniform(100, lo, hi, g.x_title.clone()));
            frame.y_title = g.y_title.clone();
            self.write_pointer("TH1F", |w| w.write_th1(&frame, Storage::Float));
        }
        self.buf.write_f64(UNSET); // fMinimum
        self.buf.write_f64(UNSET); // fMaximum
        self.buf.end_counted(graph);
        self.buf.write_counted_f64(&g.ex_low);
        self.buf.write_counted_f64(&g.ex_high);
        self.buf.write_counted_f64(&g.ey_low);
        self.buf.write_counted_f64(&g.ey_high);
        self.buf.end_counted(pos);
    }

    fn write_efficiency(&mut self, e: &Efficiency) {
        let pos = self.buf.begin_versioned(2);
        self.buf.write_tnamed(&e.name, &e.title);
        self.write_atts();
        self.buf.write_f64(e.beta_alpha);
        self.buf.write_f64(e.beta_beta);

        let params = self.buf.begin_versioned(6);
        self.buf.write_u32(e.bin_priors.len() as u32);
        for &(a, b) in &e.bin_priors {
            self.buf.write_f64(a);
            self.buf.write_f64(b);
        }
        self.buf.end_counted(params);

        self.buf.write_f64(e.conf_level);
        self.write_null_pointer(); // fFunctions
        match &e.histograms {
            EfficiencyHistograms::OneD { passed, total } => {
                self.write_pointer("TH1D", |w| w.write_th1(passed, Storage::Double));
                self.buf.write_i32(e.statistic.code());
                self.write_pointer("TH1D", |w| w.write_th1(total, Storage::Double));
            }
            EfficiencyHistograms::TwoD { passed, total } => {
                self.write_pointer("TH2D", |w| w.write_th2(passed, Storage::Double));
                self.buf.write_i32(e.statistic.code());
                self.write_pointer("TH2D", |w| w.write_th2(total, Storage::Double));
            }
        }
        self.buf.write_f64(e.weight);
        self.buf.end_counted(pos);
    }
}

/// Inputs to the TH1 base-class streamer.
struct Th1Fields<'a> {
    name: &'a str,
    title: &'a str,
    x: &'a Axis,
    y: &'a Axis,
    z: &'a Axis,
    cells: &'a [f64],
    sumw2: &'a [f64],
    entries: f64,
    tsumwx: f64,
    tsumwx2: f64,
}
