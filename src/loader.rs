//! Multi-format document loading.
//!
//! Turns files on disk into [`Document`]s: plain-text formats are read
//! directly, PDFs go through `pdf-extract`, and OOXML containers (docx,
//! xlsx) are unzipped and their text runs pulled out with `quick-xml`.
//! The document's `source` is always the base filename.
//!
//! Any unreadable or unrecognized file fails with
//! [`PipelineError::UnsupportedFormat`] naming the offending file.

use std::io::Read;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::PipelineError;
use crate::models::Document;

/// Maximum decompressed bytes read from a single ZIP entry (zip-bomb guard).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;
/// Maximum worksheets processed per xlsx.
const XLSX_MAX_SHEETS: usize = 100;

/// Load every path into a [`Document`]. Directories are walked recursively;
/// hidden files are skipped. Order follows the input path order (directory
/// entries are sorted for determinism).
pub fn load_paths(paths: &[PathBuf]) -> Result<Vec<Document>, PipelineError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| !file_name(p).starts_with('.'))
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }

    files.iter().map(|p| load_file(p)).collect()
}

/// Load a single file, dispatching on its extension.
pub fn load_file(path: &Path) -> Result<Document, PipelineError> {
    let source = file_name(path);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let bytes = std::fs::read(path).map_err(|e| PipelineError::UnsupportedFormat {
        file: source.clone(),
        reason: e.to_string(),
    })?;

    let text = extract_text(&bytes, &ext, &source)?;
    Ok(Document { source, text })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Extract plain UTF-8 text from raw file bytes.
pub fn extract_text(bytes: &[u8], ext: &str, file: &str) -> Result<String, PipelineError> {
    match ext {
        "txt" | "md" | "csv" | "json" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "pdf" => pdf_extract::extract_text_from_mem(bytes).map_err(|e| unsupported(file, e)),
        "docx" => extract_docx(bytes).map_err(|e| unsupported(file, e)),
        "xlsx" => extract_xlsx(bytes).map_err(|e| unsupported(file, e)),
        // Modern ".xls" files are often xlsx containers in disguise; the
        // legacy BIFF binary format is not handled.
        "xls" => extract_xlsx(bytes)
            .map_err(|_| unsupported(file, "legacy binary xls is not supported")),
        other => Err(unsupported(
            file,
            format!("unrecognized extension '.{other}'"),
        )),
    }
}

fn unsupported(file: &str, reason: impl ToString) -> PipelineError {
    PipelineError::UnsupportedFormat {
        file: file.to_string(),
        reason: reason.to_string(),
    }
}

fn open_zip(bytes: &[u8]) -> Result<zip::ZipArchive<std::io::Cursor<&[u8]>>, String> {
    zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| e.to_string())
}

fn read_zip_entry(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
    name: &str,
) -> Result<Vec<u8>, String> {
    let entry = archive.by_name(name).map_err(|e| e.to_string())?;
    let mut out = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut out)
        .map_err(|e| e.to_string())?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(format!("ZIP entry {name} exceeds size limit"));
    }
    Ok(out)
}

fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let mut archive = open_zip(bytes)?;
    let xml = read_zip_entry(&mut archive, "word/document.xml")?;
    collect_text_elements(&xml)
}

fn extract_xlsx(bytes: &[u8]) -> Result<String, String> {
    let mut archive = open_zip(bytes)?;
    let shared = match read_zip_entry(&mut archive, "xl/sharedStrings.xml") {
        Ok(xml) => read_shared_strings(&xml)?,
        Err(_) => Vec::new(), // workbook without shared strings
    };

    let mut sheets: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    sheets.sort_by_key(|name| {
        name.trim_start_matches("xl/worksheets/sheet")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });
    if sheets.is_empty() {
        return Err("no worksheets found".to_string());
    }

    let mut out = String::new();
    for name in sheets.into_iter().take(XLSX_MAX_SHEETS) {
        let xml = read_zip_entry(&mut archive, &name)?;
        let cells = extract_sheet_cells(&xml, &shared)?;
        if !out.is_empty() && !cells.is_empty() {
            out.push('\n');
        }
        out.push_str(&cells);
    }
    Ok(out)
}

/// Collect the text content of every `<w:t>`/`<a:t>` element, inserting a
/// space between runs so adjacent paragraphs do not fuse into one word.
fn collect_text_elements(xml: &[u8]) -> Result<String, String> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_t = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                in_t = e.local_name().as_ref() == b"t";
            }
            Ok(quick_xml::events::Event::Text(te)) if in_t => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_t = false;
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

fn read_shared_strings(xml: &[u8]) -> Result<Vec<String>, String> {
    let mut strings = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_si = false;
    let mut in_t = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => in_si = true,
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(te)) if in_t => {
                strings.push(te.unescape().unwrap_or_default().into_owned());
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"si" => in_si = false,
                b"t" => in_t = false,
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

fn extract_sheet_cells(xml: &[u8], shared: &[String]) -> Result<String, String> {
    let mut cells: Vec<String> = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_v = false;
    let mut cell_is_shared = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"c" {
                    cell_is_shared = e.attributes().any(|a| {
                        a.as_ref()
                            .map(|a| a.key.as_ref() == b"t" && a.value.as_ref() == b"s")
                            .unwrap_or(false)
                    });
                } else if e.local_name().as_ref() == b"v" {
                    in_v = true;
                }
            }
            Ok(quick_xml::events::Event::Text(te)) if in_v => {
                let v = te.unescape().unwrap_or_default();
                let s = v.trim();
                if !s.is_empty() {
                    if cell_is_shared {
                        if let Ok(i) = s.parse::<usize>() {
                            if let Some(text) = shared.get(i) {
                                cells.push(text.clone());
                            }
                        }
                    } else {
                        cells.push(s.to_string());
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"v" {
                    in_v = false;
                } else if e.local_name().as_ref() == b"c" {
                    cell_is_shared = false;
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }
    Ok(cells.join(" "))
}
