use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use timetable_core::ai::{ChatSession, CommandProvider, ImportSession, ImportSource};
use timetable_core::{AppConfig, FileStateRepository, SchoolService};

use crate::render;

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// A document is sent as bytes; anything without a known document type is
/// read as text. `-` reads text from stdin.
fn read_source(file: &str, mime: Option<String>) -> Result<ImportSource> {
    if file == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(ImportSource::Text(text));
    }
    let path = Path::new(file);
    let mime_type = mime.or_else(|| mime_for(path).map(str::to_string));
    match mime_type {
        Some(mime_type) if !mime_type.starts_with("text/") => {
            let bytes = fs::read(path).with_context(|| format!("Could not read {}", file))?;
            Ok(ImportSource::Document { bytes, mime_type })
        }
        _ => {
            let text = fs::read_to_string(path).with_context(|| format!("Could not read {}", file))?;
            Ok(ImportSource::Text(text))
        }
    }
}

/// `CODE=Real Name` pairs.
fn parse_mappings(raw: &[String]) -> Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|m| {
            let (code, name) = m
                .split_once('=')
                .ok_or_else(|| anyhow!("Mapping must look like CODE=Name, got '{}'", m))?;
            Ok((code.trim().to_string(), name.trim().to_string()))
        })
        .collect()
}

pub fn import(
    service: &SchoolService<FileStateRepository>,
    config: &AppConfig,
    file: &str,
    mime: Option<String>,
    map: &[String],
    dry_run: bool,
) -> Result<()> {
    let provider = CommandProvider::from_config(&config.ai)?;
    let source = read_source(file, mime)?;
    let mappings = parse_mappings(map)?;
    let state = service.state()?;

    let mut session = ImportSession::new();
    println!("Extracting timetable...");
    let result = session.run(&provider, &source)?;
    let unresolved = result.unresolved_codes(&state.entities);
    render::import_review(result, &unresolved);

    let unmapped: Vec<&str> = unresolved
        .iter()
        .copied()
        .filter(|code| !mappings.contains_key(*code))
        .collect();
    if !unmapped.is_empty() {
        println!("Without --map these stay as raw codes: {}", unmapped.join(", "));
    }

    if dry_run {
        session.cancel();
        println!("Dry run: nothing saved.");
        return Ok(());
    }

    let merged = session.finalize(&state.entities, &mappings)?;
    let added = merged.len() - state.entities.len();
    service.apply(|state| -> Result<()> {
        state.entities = merged;
        Ok(())
    })?;
    println!("Imported {} new teachers and classes.", added);
    Ok(())
}

pub fn ask(service: &SchoolService<FileStateRepository>, config: &AppConfig, question: &str) -> Result<()> {
    if question.trim().is_empty() {
        bail!("Question is required.");
    }
    let provider = CommandProvider::from_config(&config.ai)?;
    let state = service.state()?;
    let mut chat = ChatSession::new(&state.school_name);
    let reply = chat.ask(&provider, &state, question);
    println!("{}", reply.text);
    Ok(())
}
