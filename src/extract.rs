//! Upload validation and plain-text extraction for PDF/DOC/DOCX/TXT files.
//!
//! Files are held fully in memory for the life of the request; the 5 MB cap
//! in `validate` is the only backpressure.

use anyhow::{anyhow, bail, Context, Result};
use axum::extract::Multipart;
use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::error::ApiError;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TXT: &str = "text/plain";

const ALLOWED_MIME_TYPES: &[&str] = &[MIME_PDF, MIME_DOC, MIME_DOCX, MIME_TXT];

/// Placeholder returned when a supported file yields no text, so downstream
/// prompts always have content.
pub const EMPTY_EXTRACTION_PLACEHOLDER: &str = "No extractable text found. The file might be \
    empty, corrupted, or image-based. Please upload a text-based PDF/DOC/DOCX/TXT.";

/// An uploaded file buffered in memory. Request-scoped.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Validate type and size against the upload policy. Returns the exact
/// client-facing reason on rejection.
pub fn validate(file: &UploadedFile, max_size_mb: usize) -> Result<(), String> {
    if file.size() > max_size_mb * 1024 * 1024 {
        return Err(format!("File size exceeds {max_size_mb}MB limit."));
    }
    if !ALLOWED_MIME_TYPES.contains(&file.mime.as_str()) {
        return Err("Unsupported file type. Allowed: PDF, DOC, DOCX, TXT.".to_string());
    }
    Ok(())
}

/// Extract plain text from a supported file buffer.
pub fn extract_text(bytes: &[u8], mime: &str) -> Result<String> {
    if bytes.is_empty() {
        bail!("File buffer is empty.");
    }

    let extracted = match mime {
        MIME_PDF => extract_pdf(bytes)?,
        MIME_DOC | MIME_DOCX => extract_docx(bytes)?,
        MIME_TXT => String::from_utf8_lossy(bytes).into_owned(),
        other => bail!("Unsupported MIME type: {other}"),
    };

    if extracted.trim().is_empty() {
        return Ok(EMPTY_EXTRACTION_PLACEHOLDER.to_string());
    }
    Ok(extracted.trim().to_string())
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| anyhow!("PDF extraction failed: {e}"))?;

    let cleaned: String = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if cleaned.is_empty() {
        // Scanned or image-only document: return a notice instead of failing
        return Ok("[Extraction Notice] No extractable text found in PDF. The document may be \
            image-based (scanned) or uses embedded fonts that prevent text extraction."
            .to_string());
    }
    Ok(cleaned)
}

/// Read the text nodes of `word/document.xml` inside the OOXML container.
fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).context("failed to open document archive")?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("missing word/document.xml in document")?
        .read_to_string(&mut xml)
        .context("failed to read document XML")?;

    let mut reader = XmlReader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = true,
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_node {
                    let value = e.unescape().map_err(|err| anyhow!(err))?.into_owned();
                    output.push_str(&value);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = false,
                b"w:p" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(anyhow!("failed to parse document XML: {err}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(output.trim().to_string())
}

/// Drain a multipart request into one uploaded file plus its text fields.
/// The first part carrying a filename wins; text parts become fields.
pub async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(Option<UploadedFile>, HashMap<String, String>), ApiError> {
    let mut file: Option<UploadedFile> = None;
    let mut fields: HashMap<String, String> = HashMap::new();

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart request: {e}")))?
    {
        if let Some(filename) = part.file_name().map(|s| s.to_string()) {
            let mime = part
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let bytes = part
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read uploaded file: {e}")))?;
            if file.is_none() {
                file = Some(UploadedFile {
                    name: filename,
                    mime,
                    bytes: bytes.to_vec(),
                });
            }
        } else if let Some(name) = part.name().map(|s| s.to_string()) {
            let value = part
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read form field: {e}")))?;
            fields.insert(name, value);
        }
    }

    Ok((file, fields))
}
