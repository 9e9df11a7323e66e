//! Extension-based format detection.

use std::path::Path;

use strum::{AsRefStr, Display, EnumIter, IntoStaticStr};

/// Format branch selected for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ContentFormat {
    /// `.json`
    Json,
    /// `.pdf`
    Pdf,
    /// `.vsdx`
    Vsdx,
    /// Anything else.
    Unstructured,
}

impl ContentFormat {
    /// Selects the format from the extension of `name`'s last path segment.
    ///
    /// Matching is case-sensitive: `report.PDF` is unstructured.
    pub fn from_name(name: &str) -> Self {
        match Path::new(name).extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            Some("pdf") => Self::Pdf,
            Some("vsdx") => Self::Vsdx,
            _ => Self::Unstructured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(ContentFormat::from_name("a.json"), ContentFormat::Json);
        assert_eq!(ContentFormat::from_name("dir/b.pdf"), ContentFormat::Pdf);
        assert_eq!(ContentFormat::from_name("c.tar.vsdx"), ContentFormat::Vsdx);
        assert_eq!(ContentFormat::from_name("d.bin"), ContentFormat::Unstructured);
    }

    #[test]
    fn case_sensitive() {
        assert_eq!(ContentFormat::from_name("a.JSON"), ContentFormat::Unstructured);
        assert_eq!(ContentFormat::from_name("b.Pdf"), ContentFormat::Unstructured);
    }

    #[test]
    fn names_without_extension() {
        assert_eq!(ContentFormat::from_name("README"), ContentFormat::Unstructured);
        assert_eq!(ContentFormat::from_name(".pdf"), ContentFormat::Unstructured);
        assert_eq!(ContentFormat::from_name("v1.pdf/notes"), ContentFormat::Unstructured);
        assert_eq!(ContentFormat::from_name(""), ContentFormat::Unstructured);
    }
}
