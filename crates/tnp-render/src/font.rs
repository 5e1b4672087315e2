use std::sync::Arc;

use ab_glyph::FontVec;
use usvg::fontdb;

use crate::primitives::{FontStyle, FontWeight};

/// `font-family` written on every SVG text element. Helvetica is what ROOT's
/// fonts 4x/6x map to; the rest are metric-compatible stand-ins.
pub const FONT_FAMILY: &str = "Helvetica, Arial, 'Liberation Sans', 'DejaVu Sans', sans-serif";

const FAMILIES: [fontdb::Family<'static>; 5] = [
    fontdb::Family::Name("Helvetica"),
    fontdb::Family::Name("Arial"),
    fontdb::Family::Name("Liberation Sans"),
    fontdb::Family::Name("DejaVu Sans"),
    fontdb::Family::SansSerif,
];

/// System font database plus parsed faces used for text measurement.
///
/// Faces are optional: on a machine without a sans-serif font, measurement
/// falls back to an average-advance estimate.
pub struct FontHandle {
    db: Arc<fontdb::Database>,
    regular: Option<FontVec>,
    bold: Option<FontVec>,
    italic: Option<FontVec>,
    bold_italic: Option<FontVec>,
}

impl FontHandle {
    /// Load the fonts installed on this system.
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self::from_database(db)
    }

    /// No fonts at all; every measurement uses the estimate.
    pub fn empty() -> Self {
        Self::from_database(fontdb::Database::new())
    }

    pub fn from_database(db: fontdb::Database) -> Self {
        let regular = load_face(&db, FontWeight::Regular, FontStyle::Normal);
        if regular.is_none() {
            tracing::debug!(faces = db.len(), "no sans-serif face found, estimating text widths");
        }
        Self {
            bold: load_face(&db, FontWeight::Bold, FontStyle::Normal),
            italic: load_face(&db, FontWeight::Regular, FontStyle::Italic),
            bold_italic: load_face(&db, FontWeight::Bold, FontStyle::Italic),
            regular,
            db: Arc::new(db),
        }
    }

    /// Shared database, handed to usvg by the PNG and PDF exporters.
    pub fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.db)
    }

    /// Whether a regular face was found; without one widths are estimated.
    pub fn has_faces(&self) -> bool {
        self.regular.is_some()
    }

    pub fn select(&self, weight: FontWeight, style: FontStyle) -> Option<&FontVec> {
        let exact = match (weight, style) {
            (FontWeight::Bold, FontStyle::Italic) => self.bold_italic.as_ref(),
            (FontWeight::Bold, FontStyle::Normal) => self.bold.as_ref(),
            (FontWeight::Regular, FontStyle::Italic) => self.italic.as_ref(),
            (FontWeight::Regular, FontStyle::Normal) => self.regular.as_ref(),
        };
        exact.or(self.regular.as_ref())
    }
}

fn load_face(db: &fontdb::Database, weight: FontWeight, style: FontStyle) -> Option<FontVec> {
    let query = fontdb::Query {
        families: &FAMILIES,
        weight: match weight {
            FontWeight::Bold => fontdb::Weight::BOLD,
            FontWeight::Regular => fontdb::Weight::NORMAL,
        },
        stretch: fontdb::Stretch::Normal,
        style: match style {
            FontStyle::Italic => fontdb::Style::Italic,
            FontStyle::Normal => fontdb::Style::Normal,
        },
    };
    let id = db.query(&query)?;
    db.with_face_data(id, |data, index| FontVec::try_from_vec_and_index(data.to_vec(), index).ok())
        .flatten()
}
