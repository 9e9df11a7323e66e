//! Office Open XML extractor (Word, PowerPoint, Excel).
//!
//! All three formats are zip packages told apart by their main part:
//! `word/document.xml`, `ppt/slides/slideN.xml` or `xl/workbook.xml`.

use std::io::Cursor;
use std::path::Path;

use calamine::{Reader as _, open_workbook_auto_from_rs};
use quick_xml::Reader;
use quick_xml::events::Event;
use stowage_core::{Document, Error, Result, keys};
use zip::ZipArchive;

use super::{read_file, read_zip_entry};
use crate::{Extractor, TRACING_TARGET};

const WORD_DOCUMENT: &str = "word/document.xml";
const SLIDES_DIR: &str = "ppt/slides/";
const WORKBOOK: &str = "xl/workbook.xml";

/// Office package kinds recognized by [`OfficeExtractor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeFormat {
    /// Word document (`.docx`).
    Docx,
    /// PowerPoint presentation (`.pptx`).
    Pptx,
    /// Excel workbook (`.xlsx`).
    Xlsx,
}

impl OfficeFormat {
    /// Identifies the package kind of a zip payload.
    pub fn detect(data: &[u8]) -> Option<Self> {
        let archive = ZipArchive::new(Cursor::new(data)).ok()?;
        let mut format = None;
        for name in archive.file_names() {
            if name == WORD_DOCUMENT {
                return Some(Self::Docx);
            }
            if name == WORKBOOK {
                return Some(Self::Xlsx);
            }
            if slide_number(name).is_some() {
                format = Some(Self::Pptx);
            }
        }
        format
    }

    /// MIME type of the format.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

/// Extracts text from Office packages.
///
/// Word documents become one document. Presentations yield one document per
/// slide and workbooks one per sheet, each carrying `page` and `total_pages`;
/// sheets also carry `page_name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfficeExtractor;

impl OfficeExtractor {
    /// Creates the extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extracts from an in-memory package, detecting its kind.
    pub fn extract_bytes(&self, data: &[u8], name_hint: &str) -> Result<Vec<Document>> {
        let format = OfficeFormat::detect(data).ok_or_else(|| {
            Error::parse(format!("'{name_hint}' is not a Word, PowerPoint or Excel package"))
        })?;

        let documents = match format {
            OfficeFormat::Docx => docx(data)?,
            OfficeFormat::Pptx => pptx(data)?,
            OfficeFormat::Xlsx => xlsx(data)?,
        };

        tracing::debug!(
            target: TRACING_TARGET,
            object = name_hint,
            format = ?format,
            documents = documents.len(),
            "Extracted Office package"
        );

        Ok(documents
            .into_iter()
            .map(|document| document.with_metadata(keys::CONTENT_TYPE, format.content_type()))
            .collect())
    }
}

impl Extractor for OfficeExtractor {
    fn extract(&self, path: &Path, name_hint: &str) -> Result<Vec<Document>> {
        self.extract_bytes(&read_file(path)?, name_hint)
    }
}

fn open(data: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>> {
    ZipArchive::new(Cursor::new(data))
        .map_err(|e| Error::parse(format!("invalid Office package: {e}")).with_source(e))
}

fn docx(data: &[u8]) -> Result<Vec<Document>> {
    let mut archive = open(data)?;
    let xml = read_zip_entry(&mut archive, WORD_DOCUMENT, "Word")?.unwrap_or_default();
    Ok(vec![Document::new(paragraph_text(&xml)?)])
}

fn pptx(data: &[u8]) -> Result<Vec<Document>> {
    let mut archive = open(data)?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_owned())))
        .collect();
    slides.sort_unstable_by_key(|(n, _)| *n);

    let total_pages = slides.len();
    let mut documents = Vec::with_capacity(total_pages);
    for (position, (_, entry)) in slides.iter().enumerate() {
        let xml = read_zip_entry(&mut archive, entry, "PowerPoint")?.unwrap_or_default();
        documents.push(
            Document::new(paragraph_text(&xml)?)
                .with_metadata(keys::PAGE, position + 1)
                .with_metadata(keys::TOTAL_PAGES, total_pages),
        );
    }
    Ok(documents)
}

fn xlsx(data: &[u8]) -> Result<Vec<Document>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| Error::parse(format!("invalid Excel workbook: {e}")))?;

    let sheets = workbook.sheet_names().to_vec();
    let total_pages = sheets.len();
    let mut documents = Vec::with_capacity(total_pages);

    for (position, sheet) in sheets.iter().enumerate() {
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| Error::parse(format!("cannot read sheet '{sheet}': {e}")))?;

        let rows: Vec<String> = range
            .rows()
            .map(|row| row.iter().map(ToString::to_string).collect::<Vec<_>>())
            .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
            .map(|cells| cells.join(" | "))
            .collect();

        documents.push(
            Document::new(rows.join("\n"))
                .with_metadata(keys::PAGE, position + 1)
                .with_metadata(keys::TOTAL_PAGES, total_pages)
                .with_metadata(keys::PAGE_NAME, sheet.as_str()),
        );
    }
    Ok(documents)
}

/// Parses `N` out of `ppt/slides/slideN.xml`.
fn slide_number(entry: &str) -> Option<u32> {
    entry
        .strip_prefix(SLIDES_DIR)?
        .strip_prefix("slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Concatenates `<t>` runs, one line per `<p>` paragraph.
///
/// Word (`w:`) and DrawingML (`a:`) share these local names.
fn paragraph_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);

    let mut in_text = false;
    let mut paragraph = String::new();
    let mut lines = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::Text(e)) if in_text => {
                paragraph.push_str(&e.unescape().map_err(xml_error)?);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let line = paragraph.trim();
                    if !line.is_empty() {
                        lines.push(line.to_owned());
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    let rest = paragraph.trim();
    if !rest.is_empty() {
        lines.push(rest.to_owned());
    }
    Ok(lines.join("\n"))
}

fn xml_error(err: quick_xml::Error) -> Error {
    Error::parse(format!("malformed Office XML: {err}")).with_source(err)
}
