use std::path::Path;

#[cfg(feature = "pdf")]
pub mod pdf;
#[cfg(feature = "png")]
pub mod png;

/// Image formats the exporters can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
    Pdf,
}

impl ImageFormat {
    /// Parse a file extension or `fileType` string (case-insensitive,
    /// leading dot allowed).
    pub fn from_extension(ext: &str) -> crate::Result<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            _ => Err(crate::RenderError::UnsupportedFormat(ext.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::from_extension(ext)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderError;

    #[test]
    fn parses_known_extensions() {
        assert_eq!(ImageFormat::from_extension("PNG").unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::from_extension(".pdf").unwrap(), ImageFormat::Pdf);
        assert_eq!(ImageFormat::from_path(Path::new("out/eff.svg")).unwrap(), ImageFormat::Svg);
    }

    #[test]
    fn rejects_unknown_extensions() {
        assert!(matches!(
            ImageFormat::from_extension("gif"),
            Err(RenderError::UnsupportedFormat(e)) if e == "gif"
        ));
        assert!(ImageFormat::from_path(Path::new("noext")).is_err());
    }
}
