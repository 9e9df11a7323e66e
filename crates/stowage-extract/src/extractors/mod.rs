mod html;
mod json;
mod office;
mod pdf;
mod unstructured;
mod vsdx;

pub use html::HtmlExtractor;
pub use json::JsonExtractor;
pub use office::{OfficeExtractor, OfficeFormat};
pub use pdf::PdfExtractor;
pub use unstructured::UnstructuredExtractor;
pub use vsdx::VsdxExtractor;

use std::io::{Cursor, Read};
use std::path::Path;

use stowage_core::{Error, Result};
use zip::ZipArchive;

/// Reads the staged file, mapping I/O failures to parse errors.
fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        Error::parse(format!("cannot read staged file '{}'", path.display())).with_source(e)
    })
}

/// Reads a UTF-8 entry of a zip package; a missing entry yields `None`.
fn read_zip_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
    package: &str,
) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(Error::parse(format!("cannot open '{name}' in {package} package"))
                .with_source(e));
        }
    };

    let mut xml = String::new();
    file.read_to_string(&mut xml).map_err(|e| {
        Error::parse(format!("cannot read '{name}' in {package} package")).with_source(e)
    })?;
    Ok(Some(xml))
}
