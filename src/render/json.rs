//! Change-tracking JSON.
//!
//! Records every symbol and standalone doc comment with its position, plus a
//! SHA-256 of each file so external tools can tell what changed between runs.

use crate::diag::{DocError, Location};
use crate::lines::LinePair;
use crate::model::ItemKind;
use crate::parser::ParsedFile;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::SystemTime;

/// One symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackId {
    pub filename: String,
    pub order: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub line_start: usize,
    pub line_end: usize,
    pub signature: String,
    pub body: String,
    pub doc: String,
}

/// One input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackFile {
    pub order: usize,
    /// Standalone doc comments with their position among the file's items
    pub docs: Vec<(usize, String)>,
    pub symbols: Vec<String>,
    pub hash: String,
    pub mtime: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Track {
    pub filenames: IndexMap<String, TrackFile>,
    pub ids: IndexMap<String, TrackId>,
}

/// Tracks of every file merged, with a hash over all of them.
#[derive(Debug, Clone, Serialize)]
pub struct TrackFull {
    #[serde(flatten)]
    pub track: Track,
    pub hash_algo: String,
    pub combined_hash: String,
    /// Stamp of the youngest file
    pub mtime: String,
}

/// `YYYY-MM-DD HH:MM:SS GMT+0000`
pub fn mtime_to_utc(time: SystemTime) -> String {
    let utc: DateTime<Utc> = time.into();
    utc.format("%Y-%m-%d %H:%M:%S GMT%z").to_string()
}

fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Track of one file; `order` is its position on the command line.
pub fn track(file: &ParsedFile, order: usize, mtime: SystemTime) -> Track {
    let mut entry = TrackFile {
        order,
        docs: Vec::new(),
        symbols: Vec::new(),
        hash: sha256_hex(&file.content),
        mtime: mtime_to_utc(mtime),
    };
    let mut ids = IndexMap::new();
    let mut count = 0;

    for item in &file.items {
        match item.kind {
            ItemKind::Symbol(ref sym) => {
                let lines = file.lines.lines(&item.span);
                let name = file.slice(&sym.id).to_string();
                let id = TrackId {
                    filename: file.filename.clone(),
                    order: count,
                    name: name.clone(),
                    kind: sym.kind.as_str().to_string(),
                    line_start: lines.start,
                    line_end: lines.end,
                    signature: file.slice(&sym.signature).to_string(),
                    body: file.slice(&sym.body).to_string(),
                    doc: sym.doc.as_ref().map(|d| file.slice(d).to_string()).unwrap_or_default(),
                };
                entry.symbols.push(name.clone());
                ids.insert(name, id);
            }
            ItemKind::DocComment => entry.docs.push((count, file.slice(&item.span).to_string())),
            _ => continue,
        }
        count += 1;
    }

    let mut filenames = IndexMap::new();
    filenames.insert(file.filename.clone(), entry);
    Track { filenames, ids }
}

/// Merge per-file tracks in order. The same id or filename twice is an error.
pub fn merge(tracks: Vec<Track>) -> anyhow::Result<TrackFull> {
    let mut merged = Track::default();
    let mut combined = String::new();
    let mut mtime = String::new();

    for track in tracks {
        for (filename, entry) in track.filenames {
            if merged.filenames.contains_key(&filename) {
                anyhow::bail!("'{}' was given more than once", filename);
            }
            combined.push_str(&filename);
            combined.push_str(&entry.hash);
            if entry.mtime > mtime {
                mtime = entry.mtime.clone();
            }
            merged.filenames.insert(filename, entry);
        }
        for (name, id) in track.ids {
            if let Some(first) = merged.ids.get(&name) {
                return Err(DocError::DuplicateSymbol {
                    first: first.filename.clone(),
                    second: Location::new(
                        &id.filename,
                        Some(&name),
                        LinePair {
                            start: id.line_start,
                            end: id.line_end,
                        },
                    ),
                    name,
                }
                .into());
            }
            merged.ids.insert(name, id);
        }
    }

    Ok(TrackFull {
        track: merged,
        hash_algo: "SHA256".to_string(),
        combined_hash: sha256_hex(&combined),
        mtime,
    })
}
