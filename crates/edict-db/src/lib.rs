//! Load EDICT-style dictionaries into an in-memory lexicon.
//!
//! This crate ingests the flat `edict2`/`enamdict` record format: one entry
//! per line, `SURFACE [READING]? /gloss/gloss/.../`, UTF-8 text. Every
//! kanji spelling and every kana reading of a line becomes a lookup key for
//! the same shared [`DictionaryEntry`], so a query by either spelling
//! recovers the complete headword/reading sets and identity-based
//! deduplication downstream stays correct. Callers choose between a
//! memory-mapped file and an owned buffer at load time via [`LoadMode`].
//!
//! Parsing is best effort: these corpora are large and occasionally messy,
//! so a line that does not match the record shape is skipped, never fatal.
//!
//! # Example
//! ```no_run
//! use edict_db::{Lexicon, LoadMode};
//!
//! # fn main() -> anyhow::Result<()> {
//! let lexicon = Lexicon::load("data/edict2", LoadMode::Mmap)?;
//! for entry in lexicon.lookup("日本") {
//!     println!("{:?} [{:?}]: {}", entry.headwords, entry.readings, entry.glosses);
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p edict-db --example stats -- <file>`.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use memmap2::Mmap;
use tracing::debug;

use edict_types::{DictionaryEntry, WordClassSet};

/// Strategy for reading a dictionary file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file and parse straight out of the mapping.
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

/// Read-only mapping from surface form to the entries spelled that way.
///
/// Homographs are the norm, not the exception: each key maps to an ordered
/// sequence of entries, in file order, and the same [`Arc`] appears under
/// every spelling of its line.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    entries: HashMap<String, Vec<Arc<DictionaryEntry>>>,
    entry_count: usize,
}

impl Lexicon {
    /// Load and parse a dictionary file.
    pub fn load(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        match mode {
            LoadMode::Mmap => {
                let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
                let map = unsafe { Mmap::map(&file) }
                    .with_context(|| format!("mmap {}", path.display()))?;
                let text = std::str::from_utf8(&map)
                    .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
                Ok(Self::parse(text))
            }
            LoadMode::Owned => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("read {}", path.display()))?;
                Ok(Self::parse(&text))
            }
        }
    }

    /// Parse dictionary text into a lexicon, skipping malformed lines.
    pub fn parse(text: &str) -> Self {
        let mut entries: HashMap<String, Vec<Arc<DictionaryEntry>>> = HashMap::new();
        let mut entry_count = 0usize;
        let mut skipped = 0usize;

        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            let Some((headwords, readings, glosses)) = parse_line(line) else {
                skipped += 1;
                continue;
            };
            let classes = WordClassSet::from_glosses(&glosses);
            let entry = Arc::new(DictionaryEntry {
                headwords,
                readings,
                glosses,
                classes,
            });
            for key in entry.headwords.iter().chain(entry.readings.iter()) {
                entries
                    .entry(key.clone())
                    .or_default()
                    .push(Arc::clone(&entry));
            }
            entry_count += 1;
        }

        if skipped > 0 {
            debug!("skipped {skipped} unparsable dictionary lines");
        }
        debug!("parsed {entry_count} entries under {} keys", entries.len());

        Self {
            entries,
            entry_count,
        }
    }

    /// Entries spelled exactly `surface`, or an empty slice.
    pub fn lookup(&self, surface: &str) -> &[Arc<DictionaryEntry>] {
        self.entries
            .get(surface)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct surface forms indexed.
    pub fn surface_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of entry lines parsed.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split one record line into `(headwords, readings, glosses)`.
///
/// Lines with a bracketed reading list carry kanji spellings up front;
/// lines without one are kana-only and get an empty headword set. The
/// gloss text between the first and last slash is rejoined with `"; "`.
fn parse_line(line: &str) -> Option<(Vec<String>, Vec<String>, String)> {
    let (surface, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();

    let (reading, rest) = match rest.strip_prefix('[') {
        Some(inner) => {
            let (reading, tail) = inner.split_once(']')?;
            (Some(reading), tail.trim_start())
        }
        None => (None, rest),
    };

    let body = rest.strip_prefix('/')?;
    let body = &body[..body.rfind('/')?];
    let glosses = body.replace('/', "; ");

    let surfaces = split_spellings(surface);
    if surfaces.is_empty() {
        return None;
    }

    match reading {
        Some(reading) => {
            let readings = split_spellings(reading);
            if readings.is_empty() {
                return None;
            }
            Some((surfaces, readings, glosses))
        }
        None => Some((Vec::new(), surfaces, glosses)),
    }
}

/// Split a `;`-separated spelling list, dropping parenthesized markers
/// such as the frequency tag in `行く(P)`; they are metadata, not part of
/// the spelling.
fn split_spellings(list: &str) -> Vec<String> {
    let stripped = strip_markers(list);
    stripped
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_markers(list: &str) -> String {
    let mut out = String::with_capacity(list.len());
    let mut depth = 0usize;
    for c in list.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
