//! PDF loading with per-page text extraction

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{LoadedDocument, PageRecord};

/// Typographic characters and ligatures that PDF fonts commonly emit,
/// with the plain-text replacement used for chunking and prompting
const CHAR_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2010}', "-"),   // Hyphen
    ('\u{2011}', "-"),   // Non-breaking hyphen
    ('\u{2013}', "-"),   // En dash
    ('\u{2014}', "--"),  // Em dash
    ('\u{2018}', "'"),   // Left single quote
    ('\u{2019}', "'"),   // Right single quote
    ('\u{201C}', "\""),  // Left double quote
    ('\u{201D}', "\""),  // Right double quote
    ('\u{2022}', "* "),  // Bullet
    ('\u{2026}', "..."), // Ellipsis
    ('\u{00A0}', " "),   // Non-breaking space
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

/// Normalize extracted PDF text
///
/// Drops NUL bytes, maps typographic characters to ASCII, trims each line and
/// collapses runs of blank lines into a single paragraph break.
pub fn cleanup_pdf_text(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\0' {
            continue;
        }
        match CHAR_REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => normalized.push_str(to),
            None => normalized.push(c),
        }
    }

    let mut lines: Vec<&str> = Vec::new();
    for line in normalized.lines().map(str::trim) {
        if line.is_empty() {
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push("");
            }
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Loads a PDF from disk into page records
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentLoader;

impl DocumentLoader {
    /// Create a loader
    pub fn new() -> Self {
        Self
    }

    /// Load the PDF at `path`
    ///
    /// Fails with a load error if the file is missing, unreadable, not a PDF,
    /// has no pages, or yields no text on any page.
    pub fn load(&self, path: &Path) -> Result<LoadedDocument> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(Error::load(display, "file does not exist"));
        }

        let data = std::fs::read(path)
            .map_err(|e| Error::load(display.clone(), format!("failed to read file: {}", e)))?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| display.clone());

        let mut document = self.load_bytes(&data).map_err(|e| match e {
            Error::Load { message, .. } => Error::load(display.clone(), message),
            other => other,
        })?;
        document.filename = filename;

        tracing::info!(
            "Loaded {} ({} pages, {} with text, {} chars)",
            document.filename,
            document.total_pages,
            document.pages.len(),
            document.char_count()
        );

        Ok(document)
    }

    /// Load a PDF already in memory
    pub fn load_bytes(&self, data: &[u8]) -> Result<LoadedDocument> {
        if data.is_empty() {
            return Err(Error::load("<memory>", "file is empty"));
        }

        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::load("<memory>", format!("not a readable PDF: {}", e)))?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(Error::load("<memory>", "PDF has no pages"));
        }
        let total_pages = page_numbers.len() as u32;

        let mut pages = Vec::with_capacity(page_numbers.len());
        for page_number in page_numbers {
            match doc.extract_text(&[page_number]) {
                Ok(raw) => {
                    let text = cleanup_pdf_text(&raw);
                    if !text.is_empty() {
                        pages.push(PageRecord::new(page_number, text));
                    }
                }
                Err(e) => {
                    tracing::debug!("Could not extract text from page {}: {}", page_number, e);
                }
            }
        }

        if pages.is_empty() {
            tracing::warn!("Per-page extraction produced no text, falling back to pdf-extract");
            let text = cleanup_pdf_text(&Self::extract_whole_document(data)?);
            if text.is_empty() {
                return Err(Error::load(
                    "<memory>",
                    "PDF has no extractable text (it may be image-based or encrypted)",
                ));
            }
            pages.push(PageRecord::new(1, text));
        }

        Ok(LoadedDocument {
            filename: String::new(),
            pages,
            total_pages,
        })
    }

    /// Whole-document extraction with pdf-extract, which copes with some
    /// font encodings lopdf cannot decode
    fn extract_whole_document(data: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed inputs
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(Error::load("<memory>", format!("text extraction failed: {}", e))),
            Err(_) => Err(Error::load("<memory>", "text extraction crashed on this PDF")),
        }
    }
}
