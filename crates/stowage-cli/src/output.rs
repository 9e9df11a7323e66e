//! JSON Lines output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use stowage_core::Document;

/// Writes one JSON document per line to `path`, or stdout when `None`.
pub fn write_documents(documents: &[Document], path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create '{}'", path.display()))?;
            write_jsonl(documents, BufWriter::new(file))
                .with_context(|| format!("failed to write '{}'", path.display()))
        }
        None => write_jsonl(documents, BufWriter::new(io::stdout().lock()))
            .context("failed to write to stdout"),
    }
}

fn write_jsonl(documents: &[Document], mut writer: impl Write) -> anyhow::Result<()> {
    for document in documents {
        serde_json::to_writer(&mut writer, document)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
