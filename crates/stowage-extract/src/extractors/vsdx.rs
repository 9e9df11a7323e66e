//! Visio (VSDX) diagram extractor.
//!
//! A VSDX file is a zip package. Drawing pages live in
//! `visio/pages/pageN.xml`; shape text sits in `<Text>` elements. Page names
//! are listed by `visio/pages/pages.xml`, each `<Page>` pointing at its part
//! through a relationship id resolved by `visio/pages/_rels/pages.xml.rels`.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use stowage_core::{Document, Error, Result, keys};
use zip::ZipArchive;

use super::{read_file, read_zip_entry};
use crate::{Extractor, TRACING_TARGET};

const PAGES_DIR: &str = "visio/pages/";
const PAGES_INDEX: &str = "visio/pages/pages.xml";
const PAGES_RELS: &str = "visio/pages/_rels/pages.xml.rels";

/// Extracts shape text, emitting one document per drawing page.
///
/// Documents carry `source` (the object name), `page` and, when the package
/// names its pages, `page_name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VsdxExtractor;

impl VsdxExtractor {
    /// Creates the extractor.
    pub fn new() -> Self {
        Self
    }

    /// Returns true if `data` is a zip package containing Visio pages.
    pub fn is_vsdx(data: &[u8]) -> bool {
        ZipArchive::new(Cursor::new(data))
            .map(|archive| archive.file_names().any(|name| name.starts_with(PAGES_DIR)))
            .unwrap_or(false)
    }

    /// Extracts from an in-memory package.
    pub fn extract_bytes(&self, data: &[u8], name_hint: &str) -> Result<Vec<Document>> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::parse(format!("invalid VSDX package: {e}")).with_source(e))?;

        let mut pages: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| page_number(name).map(|n| (n, name.to_owned())))
            .collect();
        pages.sort_unstable_by_key(|(n, _)| *n);

        let index = match read_zip_entry(&mut archive, PAGES_INDEX, "VSDX")? {
            Some(xml) => page_index(&xml)?,
            None => Vec::new(),
        };
        let targets = match read_zip_entry(&mut archive, PAGES_RELS, "VSDX")? {
            Some(xml) => relationship_targets(&xml)?,
            None => HashMap::new(),
        };
        let names = PageNames::new(index, &targets);

        let mut documents = Vec::with_capacity(pages.len());
        for (position, (_, entry)) in pages.iter().enumerate() {
            let Some(xml) = read_zip_entry(&mut archive, entry, "VSDX")? else {
                continue;
            };

            let mut document = Document::new(shape_text(&xml)?)
                .with_metadata(keys::SOURCE, name_hint)
                .with_metadata(keys::PAGE, position + 1);
            if let Some(name) = names.get(entry, position) {
                document.metadata_mut().insert(keys::PAGE_NAME, name);
            }
            documents.push(document);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            object = name_hint,
            pages = documents.len(),
            "Extracted VSDX pages"
        );
        Ok(documents)
    }
}

impl Extractor for VsdxExtractor {
    fn extract(&self, path: &Path, name_hint: &str) -> Result<Vec<Document>> {
        self.extract_bytes(&read_file(path)?, name_hint)
    }
}

/// Parses `N` out of `visio/pages/pageN.xml`.
fn page_number(entry: &str) -> Option<u32> {
    entry
        .strip_prefix(PAGES_DIR)?
        .strip_prefix("page")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// A `<Page>` of the page index.
#[derive(Debug, Default)]
struct IndexedPage {
    name: String,
    rel_id: Option<String>,
}

/// Page names keyed by part, with positional fallback for packages that
/// ship no relationships.
struct PageNames {
    by_part: HashMap<String, String>,
    by_position: Vec<String>,
}

impl PageNames {
    fn new(index: Vec<IndexedPage>, targets: &HashMap<String, String>) -> Self {
        let mut by_part = HashMap::new();
        let mut by_position = Vec::with_capacity(index.len());
        for page in index {
            let part = page
                .rel_id
                .as_ref()
                .and_then(|id| targets.get(id))
                .map(|target| part_name(target));
            match part {
                Some(part) => {
                    by_part.insert(part, page.name);
                }
                None => by_position.push(page.name),
            }
        }
        Self { by_part, by_position }
    }

    fn get(&self, entry: &str, position: usize) -> Option<&str> {
        if !self.by_part.is_empty() {
            return self.by_part.get(entry).map(String::as_str);
        }
        self.by_position.get(position).map(String::as_str)
    }
}

/// Resolves a relationship target against `visio/pages/`.
fn part_name(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_owned(),
        None => format!("{PAGES_DIR}{}", target.trim_start_matches("./")),
    }
}

/// Collects every `<Page>` with its `Name` (or `NameU`) and `<Rel r:id>`.
fn page_index(xml: &str) -> Result<Vec<IndexedPage>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages: Vec<IndexedPage> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Page" => {
                let mut page = IndexedPage::default();
                let mut name_u = None;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().map_err(xml_error)?;
                    match attr.key.local_name().as_ref() {
                        b"Name" => page.name = value.into_owned(),
                        b"NameU" => name_u = Some(value.into_owned()),
                        _ => {}
                    }
                }
                if page.name.is_empty() {
                    page.name = name_u.unwrap_or_default();
                }
                pages.push(page);
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Rel" => {
                let Some(page) = pages.last_mut() else {
                    continue;
                };
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"id" {
                        let value = attr.unescape_value().map_err(xml_error)?;
                        page.rel_id = Some(value.into_owned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }
    Ok(pages)
}

/// Maps relationship ids to their targets.
fn relationship_targets(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut targets = HashMap::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let (mut id, mut target) = (None, None);
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().map_err(xml_error)?;
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(value.into_owned()),
                        b"Target" => target = Some(value.into_owned()),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }
    Ok(targets)
}

/// Joins the text of every `<Text>` element, one shape per line.
fn shape_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut current = String::new();
    let mut shapes = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"Text" => {
                depth += 1;
            }
            Ok(Event::Text(e)) if depth > 0 => {
                let text = e.unescape().map_err(xml_error)?;
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(text.trim());
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"Text" && depth > 0 => {
                depth -= 1;
                if depth == 0 && !current.trim().is_empty() {
                    shapes.push(std::mem::take(&mut current));
                }
                current.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    Ok(shapes.join("\n"))
}

fn xml_error(err: quick_xml::Error) -> Error {
    Error::parse(format!("malformed VSDX XML: {err}")).with_source(err)
}
