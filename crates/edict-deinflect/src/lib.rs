//! Rule-based deinflection of conjugated Japanese words.
//!
//! The rule data (`deinflect.dat`, the Rikaichan format) is a list of
//! suffix rewrites: replace `from` with `to` at the end of a word, subject
//! to a word-class constraint, and record a human-readable reason. Chaining
//! rules walks an inflected surface form back to candidate citation forms,
//! e.g. 食べられなかった → 食べられない → 食べられる → 食べる.
//!
//! # How it works
//! 1. Seed a FIFO worklist with the identity candidate
//!    `(word, all classes, no reasons)`.
//! 2. Pop a candidate, yield it, then scan every rule: a rule fires when
//!    its source mask intersects the candidate's mask and the candidate
//!    ends with the rule's suffix.
//! 3. Each firing appends a new candidate (suffix replaced, mask narrowed
//!    to the rule's result classes, reason trail extended) to the back of
//!    the worklist, so expansion is breadth first by rule depth.
//!
//! Reaching the same word along different rule chains keeps both
//! candidates; deduplication belongs to the lookup layer, which works on
//! dictionary entries, not candidates. A fixed expansion cap keeps
//! pathological rule cycles finite.
//!
//! # Example
//! ```no_run
//! use edict_db::{Lexicon, LoadMode};
//! use edict_deinflect::RuleTable;
//!
//! # fn main() -> anyhow::Result<()> {
//! let lexicon = Lexicon::load("data/edict2", LoadMode::Mmap)?;
//! let rules = RuleTable::load("data/deinflect.dat")?;
//! for candidate in rules.deinflect("食べられない") {
//!     for entry in lexicon.lookup(&candidate.word) {
//!         if entry.classes.intersects(candidate.classes) {
//!             println!("{} ({})", candidate.word, candidate.reasons.join(" "));
//!         }
//!     }
//! }
//! # Ok(()) }
//! ```

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use edict_types::WordClassSet;

/// Upper bound on worklist expansion per word. Typical inputs stay far
/// below this; the cap only matters if a rule set contains a cycle.
const MAX_EXPANSIONS: usize = 512;

#[derive(Clone, Debug, Eq, PartialEq)]
struct Rule {
    from: String,
    to: String,
    source: WordClassSet,
    result: WordClassSet,
    reason: usize,
}

/// Parsed deinflection rules plus their shared reason strings.
#[derive(Clone, Debug, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
    reasons: Vec<String>,
}

/// A possible citation form for a surface word.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Candidate<'a> {
    pub word: String,
    /// Classes the word may belong to; lexicon entries must intersect this.
    pub classes: WordClassSet,
    /// Rule names applied to reach this form, outermost last.
    pub reasons: Vec<&'a str>,
}

impl RuleTable {
    /// Load a rule file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// Parse rule-file text.
    ///
    /// The first line is a version header and is ignored. After that, a
    /// line without tabs appends to the implicit, order-indexed reason
    /// table; a four-field tab-separated line is a rule whose reason field
    /// indexes a reason defined on an earlier line. The packed mask splits
    /// as low byte = classes the rule consumes, next byte = classes it
    /// produces. Unusable lines are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut reasons: Vec<String> = Vec::new();
        let mut rules = Vec::new();

        for (lineno, line) in text.lines().enumerate().skip(1) {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            match fields.as_slice() {
                [reason] => reasons.push((*reason).to_string()),
                [from, to, packed, reason] => {
                    let (Ok(packed), Ok(reason)) =
                        (packed.parse::<u32>(), reason.parse::<usize>())
                    else {
                        warn!("deinflect line {}: unparsable numeric field", lineno + 1);
                        continue;
                    };
                    if reason >= reasons.len() {
                        warn!("deinflect line {}: reason {reason} not yet defined", lineno + 1);
                        continue;
                    }
                    rules.push(Rule {
                        from: (*from).to_string(),
                        to: (*to).to_string(),
                        source: WordClassSet::from_bits((packed & 0xff) as u8),
                        result: WordClassSet::from_bits((packed >> 8) as u8),
                        reason,
                    });
                }
                _ => warn!("deinflect line {}: unexpected field count", lineno + 1),
            }
        }

        Self { rules, reasons }
    }

    /// Lazily enumerate candidate citation forms for `word`.
    ///
    /// The identity candidate comes first; after that, candidates appear
    /// in breadth-first order of rule application. The iterator is finite
    /// and single pass.
    pub fn deinflect<'a>(&'a self, word: &str) -> Deinflections<'a> {
        let mut queue = VecDeque::new();
        queue.push_back(Candidate {
            word: word.to_string(),
            classes: WordClassSet::ALL,
            reasons: Vec::new(),
        });
        Deinflections {
            table: self,
            queue,
            expanded: 0,
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn reason_count(&self) -> usize {
        self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Worklist iterator produced by [`RuleTable::deinflect`].
pub struct Deinflections<'a> {
    table: &'a RuleTable,
    queue: VecDeque<Candidate<'a>>,
    expanded: usize,
}

impl<'a> Iterator for Deinflections<'a> {
    type Item = Candidate<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let candidate = self.queue.pop_front()?;
        if self.expanded < MAX_EXPANSIONS {
            self.expanded += 1;
            for rule in &self.table.rules {
                if !candidate.classes.intersects(rule.source) {
                    continue;
                }
                let Some(stem) = candidate.word.strip_suffix(&rule.from) else {
                    continue;
                };
                let mut word = String::with_capacity(stem.len() + rule.to.len());
                word.push_str(stem);
                word.push_str(&rule.to);
                let mut reasons = candidate.reasons.clone();
                reasons.push(self.table.reasons[rule.reason].as_str());
                self.queue.push_back(Candidate {
                    word,
                    classes: rule.result,
                    reasons,
                });
            }
        }
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Masks follow the file convention: low byte consumed, next byte produced.
    const TO_ICHIDAN_FROM_ANY: u32 = (0x01 << 8) | 0xff;
    const TO_I_ADJECTIVE_FROM_ANY: u32 = (0x04 << 8) | 0xff;
    const TO_ICHIDAN_FROM_I_ADJECTIVE: u32 = (0x01 << 8) | 0x04;

    fn sample_table() -> RuleTable {
        let text = format!(
            "deinflect v1\n\
             negative\n\
             past\n\
             passive or potential\n\
             られない\tる\t{TO_ICHIDAN_FROM_ANY}\t2\n\
             なかった\tない\t{TO_I_ADJECTIVE_FROM_ANY}\t1\n\
             ない\tる\t{TO_ICHIDAN_FROM_I_ADJECTIVE}\t0\n"
        );
        RuleTable::parse(&text)
    }

    #[test]
    fn parses_reasons_and_rules() {
        let table = sample_table();
        assert_eq!(table.reason_count(), 3);
        assert_eq!(table.rule_count(), 3);
    }

    #[test]
    fn skips_forward_reason_references_and_bad_numbers() {
        let text = "header\n\
                    early\n\
                    ます\tる\t511\t5\n\
                    ます\tる\tnot-a-number\t0\n\
                    ます\tる\t511\t0\n";
        let table = RuleTable::parse(text);
        assert_eq!(table.rule_count(), 1);
    }

    #[test]
    fn identity_candidate_comes_first() {
        let table = sample_table();
        let first = table.deinflect("食べる").next().unwrap();
        assert_eq!(first.word, "食べる");
        assert_eq!(first.classes, WordClassSet::ALL);
        assert!(first.reasons.is_empty());
    }

    #[test]
    fn chains_rules_breadth_first_with_reason_trails() {
        let table = sample_table();
        let candidates: Vec<_> = table.deinflect("食べなかった").collect();
        assert_eq!(candidates.len(), 3);

        assert_eq!(candidates[0].word, "食べなかった");
        assert_eq!(candidates[0].reasons.len(), 0);

        assert_eq!(candidates[1].word, "食べない");
        assert_eq!(candidates[1].classes, WordClassSet::I_ADJECTIVE);
        assert_eq!(candidates[1].reasons, vec!["past"]);

        assert_eq!(candidates[2].word, "食べる");
        assert_eq!(candidates[2].classes, WordClassSet::ICHIDAN);
        assert_eq!(candidates[2].reasons, vec!["past", "negative"]);
    }

    #[test]
    fn class_constraint_blocks_mismatched_rules() {
        let table = sample_table();
        // 食べられない matches られない directly, producing an ichidan
        // candidate; the ない rule must not fire on that result because it
        // requires an い-adjective source.
        let words: Vec<String> = table
            .deinflect("食べられない")
            .map(|c| c.word)
            .collect();
        assert_eq!(words, vec!["食べられない", "食べる", "食べられる"]);
    }

    #[test]
    fn distinct_paths_to_same_word_are_kept() {
        let text = "header\n\
                    negative\n\
                    archaic negative\n\
                    ん\tる\t511\t0\n\
                    ん\tる\t511\t1\n";
        let table = RuleTable::parse(text);
        let candidates: Vec<_> = table.deinflect("読まん").collect();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[1].word, candidates[2].word);
        assert_eq!(candidates[1].reasons, vec!["negative"]);
        assert_eq!(candidates[2].reasons, vec!["archaic negative"]);
    }

    #[test]
    fn cyclic_rules_terminate_at_the_cap() {
        let text = "header\n\
                    loop\n\
                    る\tる\t511\t0\n";
        let table = RuleTable::parse(text);
        let count = table.deinflect("食べる").count();
        assert_eq!(count, MAX_EXPANSIONS + 1);
    }
}
