//! ROOT object deserialization dispatch.
//!
//! Every object is read through an [`ObjectReader`], which wraps an
//! [`RBuffer`] with the per-object class map that ROOT uses for tagged
//! object pointers: the first occurrence of a class writes its name, later
//! occurrences refer back to the buffer offset of that name.

mod tefficiency;
mod tgraph;
mod th1;
mod th2;

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use crate::efficiency::Efficiency;
use crate::error::{Result, RootError};
use crate::graph::Graph;
use crate::histogram::{Histogram, Histogram2D};
use crate::rbuffer::{BYTE_COUNT_MASK, CLASS_MASK, MAP_OFFSET, NEW_CLASS_TAG, RBuffer};

/// Class names this reader can decode.
pub const SUPPORTED_CLASSES: &[&str] = &[
    "TH1D",
    "TH1F",
    "TH2D",
    "TH2F",
    "TGraph",
    "TGraphErrors",
    "TGraphAsymmErrors",
    "TEfficiency",
];

/// A decoded plottable object.
#[derive(Debug, Clone, PartialEq)]
pub enum RootObject {
    /// `TH1D` / `TH1F`.
    Hist1D(Histogram),
    /// `TH2D` / `TH2F`.
    Hist2D(Histogram2D),
    /// `TGraph`, `TGraphErrors`, `TGraphAsymmErrors`.
    Graph(Graph),
    /// `TEfficiency`.
    Efficiency(Efficiency),
}

impl RootObject {
    /// Object name.
    pub fn name(&self) -> &str {
        match self {
            RootObject::Hist1D(h) => &h.name,
            RootObject::Hist2D(h) => &h.name,
            RootObject::Graph(g) => &g.name,
            RootObject::Efficiency(e) => &e.name,
        }
    }

    /// Object title.
    pub fn title(&self) -> &str {
        match self {
            RootObject::Hist1D(h) => &h.title,
            RootObject::Hist2D(h) => &h.title,
            RootObject::Graph(g) => &g.title,
            RootObject::Efficiency(e) => &e.title,
        }
    }

    /// Short kind label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RootObject::Hist1D(_) => "hist1d",
            RootObject::Hist2D(_) => "hist2d",
            RootObject::Graph(_) => "graph",
            RootObject::Efficiency(_) => "efficiency",
        }
    }
}

/// Read an object from a decompressed key payload, given its class name.
///
/// `key_len` is the length of the key header that preceded the payload on
/// disk; class-tag offsets are relative to the start of that header.
pub fn read_object(payload: &[u8], class_name: &str, key_len: usize) -> Result<RootObject> {
    let mut r = ObjectReader::new(payload, key_len);
    read_by_class(&mut r, class_name)
}

fn read_by_class(r: &mut ObjectReader<'_>, class_name: &str) -> Result<RootObject> {
    match class_name {
        "TH1D" => th1::read_th1(r, th1::Precision::Double).map(RootObject::Hist1D),
        "TH1F" => th1::read_th1(r, th1::Precision::Float).map(RootObject::Hist1D),
        "TH2D" => th2::read_th2(r, th1::Precision::Double).map(RootObject::Hist2D),
        "TH2F" => th2::read_th2(r, th1::Precision::Float).map(RootObject::Hist2D),
        "TGraph" | "TGraphErrors" | "TGraphAsymmErrors" => {
            tgraph::read_graph(r, class_name).map(RootObject::Graph)
        }
        "TEfficiency" => tefficiency::read_tefficiency(r).map(RootObject::Efficiency),
        _ => Err(RootError::UnsupportedClass(class_name.to_string())),
    }
}

/// Header of a streamed object pointer.
enum Pointer {
    /// Null pointer.
    Null,
    /// Reference to an object already read from this buffer.
    Reference,
    /// A new object of `class` follows; `end` is its byte-count end.
    Object { class: String, end: Option<usize> },
}

/// An [`RBuffer`] plus the class map of the object being read.
pub(crate) struct ObjectReader<'a> {
    buf: RBuffer<'a>,
    key_len: usize,
    classes: HashMap<usize, String>,
}

impl<'a> ObjectReader<'a> {
    pub(crate) fn new(payload: &'a [u8], key_len: usize) -> Self {
        Self { buf: RBuffer::new(payload), key_len, classes: HashMap::new() }
    }

    fn read_pointer_header(&mut self) -> Result<Pointer> {
        let start = self.buf.pos();
        let raw = self.buf.read_u32()?;
        if raw == 0 {
            return Ok(Pointer::Null);
        }

        let (tag, tag_pos, end) = if raw & BYTE_COUNT_MASK != 0 && raw != NEW_CLASS_TAG {
            let tag_pos = self.buf.pos();
            let end = start + 4 + (raw & !BYTE_COUNT_MASK) as usize;
            (self.buf.read_u32()?, tag_pos, Some(end))
        } else {
            (raw, start, None)
        };

        if tag == NEW_CLASS_TAG {
            let class = self.buf.read_cstring()?;
            self.classes.insert(tag_pos + self.key_len + MAP_OFFSET as usize, class.clone());
            return Ok(Pointer::Object { class, end });
        }

        if tag & CLASS_MASK != 0 {
            let offset = (tag & !CLASS_MASK) as usize;
            let class = self.classes.get(&offset).cloned().ok_or_else(|| {
                RootError::Deserialization(format!(
                    "class reference {offset} at offset {start} does not name a known class"
                ))
            })?;
            return Ok(Pointer::Object { class, end });
        }

        self.buf.seek_end(end)?;
        Ok(Pointer::Reference)
    }

    /// Read a tagged object pointer.
    ///
    /// Returns `None` for null pointers, back-references and byte-counted
    /// objects of classes this reader does not decode.
    pub(crate) fn read_object_pointer(&mut self) -> Result<Option<RootObject>> {
        match self.read_pointer_header()? {
            Pointer::Null | Pointer::Reference => Ok(None),
            Pointer::Object { class, end } => match read_by_class(self, &class) {
                Ok(obj) => {
                    self.buf.seek_end(end)?;
                    Ok(Some(obj))
                }
                Err(RootError::UnsupportedClass(_)) if end.is_some() => {
                    tracing::trace!(class = %class, "skipping embedded object");
                    self.buf.seek_end(end)?;
                    Ok(None)
                }
                Err(e) => Err(e),
            },
        }
    }

    /// Skip a tagged object pointer, still registering any new class name.
    pub(crate) fn skip_pointer(&mut self) -> Result<()> {
        match self.read_pointer_header()? {
            Pointer::Null | Pointer::Reference => Ok(()),
            Pointer::Object { end: Some(end), .. } => self.buf.set_pos(end),
            Pointer::Object { class, end: None } => Err(RootError::Deserialization(format!(
                "cannot skip embedded {class} without byte count"
            ))),
        }
    }

    /// Skip a byte-counted base class or member (e.g. `TAttLine`).
    pub(crate) fn skip_versioned(&mut self) -> Result<()> {
        let (_ver, end) = self.buf.read_version()?;
        self.buf.seek_end(end)
    }
}

impl<'a> Deref for ObjectReader<'a> {
    type Target = RBuffer<'a>;

    fn deref(&self) -> &RBuffer<'a> {
        &self.buf
    }
}

impl DerefMut for ObjectReader<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}
