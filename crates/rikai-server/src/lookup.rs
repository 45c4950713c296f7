//! The lookup coordinator: text in, deduplicated gloss entries out.

use std::collections::HashSet;
use std::sync::Arc;

use edict_db::Lexicon;
use edict_deinflect::RuleTable;
use edict_types::DictionaryEntry;

use crate::extract::TextSource;
use crate::fragments::subfragments;

/// Which lexicon produced the hits. At most one of the two passes yields
/// results for a given query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LookupSource {
    Words,
    Names,
}

/// One matched entry plus the deinflection trail that reached it. The
/// trail is empty for exact and name matches.
#[derive(Clone, Debug)]
pub struct LookupHit {
    pub entry: Arc<DictionaryEntry>,
    pub reasons: Vec<String>,
}

/// Ordered, deduplicated result of one query.
#[derive(Clone, Debug)]
pub struct LookupResult {
    pub source: LookupSource,
    pub hits: Vec<LookupHit>,
}

impl LookupResult {
    pub fn empty() -> Self {
        Self {
            source: LookupSource::Words,
            hits: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Read-only lookup state over the word lexicon, the name lexicon, and
/// the deinflection rules.
///
/// Each source is optional: the three files load independently, and a
/// query issued before a source is available simply cannot match against
/// it. An empty result is the only "not loaded" signal the core gives;
/// callers that care track load completion themselves.
#[derive(Clone, Default)]
pub struct LookupService {
    words: Option<Arc<Lexicon>>,
    names: Option<Arc<Lexicon>>,
    rules: Option<Arc<RuleTable>>,
}

impl LookupService {
    pub fn new(
        words: Option<Arc<Lexicon>>,
        names: Option<Arc<Lexicon>>,
        rules: Option<Arc<RuleTable>>,
    ) -> Self {
        Self {
            words,
            names,
            rules,
        }
    }

    /// True once the word lexicon and the rule table are available.
    pub fn ready(&self) -> bool {
        self.words.is_some() && self.rules.is_some()
    }

    /// Look up the word starting at the beginning of `text`.
    ///
    /// Subfragments are tried longest first; for each one, every
    /// deinflection candidate is queried and entries whose class mask
    /// intersects the candidate's are kept. An entry reached along two
    /// paths is reported once, with the trail that found it first. When
    /// the word pass comes up empty the name lexicon is scanned instead,
    /// without deinflection or class filtering.
    pub fn lookup(&self, text: &str) -> LookupResult {
        let mut hits = Vec::new();
        let mut seen: HashSet<*const DictionaryEntry> = HashSet::new();

        if let (Some(words), Some(rules)) = (&self.words, &self.rules) {
            for fragment in subfragments(text) {
                for candidate in rules.deinflect(fragment) {
                    for entry in words.lookup(&candidate.word) {
                        if !entry.classes.intersects(candidate.classes) {
                            continue;
                        }
                        if !seen.insert(Arc::as_ptr(entry)) {
                            continue;
                        }
                        hits.push(LookupHit {
                            entry: Arc::clone(entry),
                            reasons: candidate.reasons.iter().map(|r| r.to_string()).collect(),
                        });
                    }
                }
            }
        }
        if !hits.is_empty() {
            return LookupResult {
                source: LookupSource::Words,
                hits,
            };
        }

        if let Some(names) = &self.names {
            for fragment in subfragments(text) {
                for entry in names.lookup(fragment) {
                    if !seen.insert(Arc::as_ptr(entry)) {
                        continue;
                    }
                    hits.push(LookupHit {
                        entry: Arc::clone(entry),
                        reasons: Vec::new(),
                    });
                }
            }
        }
        LookupResult {
            source: LookupSource::Names,
            hits,
        }
    }
}

/// Glue for embedders: resolve a screen point to text, then look it up.
pub fn lookup_at_point(
    service: &LookupService,
    source: &impl TextSource,
    x: f32,
    y: f32,
) -> LookupResult {
    match source.text_at_point(x, y) {
        Some(text) => service.lookup(&text),
        None => LookupResult::empty(),
    }
}
