//! Shared types that mirror the EDICT flat-file dictionary conventions.
//!
//! The goal is to expose the fields a lookup front end needs while keeping
//! the crate free of any loader or service concerns. [`DictionaryEntry`]
//! holds one parsed record; [`WordClassSet`] is the coarse grammatical
//! classification used to decide which deinflection rules may apply to a
//! surface form and which entries a deinflected candidate may match.
//!
//! ```rust
//! use edict_types::WordClassSet;
//!
//! let classes = WordClassSet::from_glosses("(v1,vt) to eat");
//! assert!(classes.intersects(WordClassSet::ICHIDAN));
//! assert!(classes.intersects(WordClassSet::OTHER));
//! assert!(!classes.intersects(WordClassSet::GODAN));
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Bitmask over the word classes relevant to deinflection.
///
/// The bit layout matches the packed integers in `deinflect.dat`: the low
/// byte of a rule's mask is the class the rule consumes, the next byte the
/// class it produces. [`WordClassSet::OTHER`] is set on every dictionary
/// entry so that non-conjugating words (nouns and the like) stay reachable
/// from the identity candidate, whose mask is [`WordClassSet::ALL`].
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct WordClassSet(u8);

impl WordClassSet {
    /// 一段 ("ru") verbs, marked `v1` in glosses.
    pub const ICHIDAN: Self = Self(1 << 0);
    /// 五段 ("u") verbs, markers starting with `v5`.
    pub const GODAN: Self = Self(1 << 1);
    /// い-adjectives, marked `adj-i`.
    pub const I_ADJECTIVE: Self = Self(1 << 2);
    /// The irregular verb 来る, marked `vk`.
    pub const KURU: Self = Self(1 << 3);
    /// する verbs, markers starting with `vs`.
    pub const SURU: Self = Self(1 << 4);
    /// Everything else; always set so plain words match the seed candidate.
    pub const OTHER: Self = Self(1 << 7);
    /// All classes at once; the mask of an unprocessed surface form.
    pub const ALL: Self = Self(0xff);

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Reinterpret a raw byte from a rule file as a class set.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when the two sets share at least one class.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Derive the class set of an entry from its raw gloss text.
    ///
    /// The markers are searched as plain substrings; the rare false
    /// positives this admits only make an entry matchable by more rules,
    /// never fewer.
    pub fn from_glosses(glosses: &str) -> Self {
        let mut classes = Self::OTHER;
        if glosses.contains("v1") {
            classes |= Self::ICHIDAN;
        }
        if glosses.contains("v5") {
            classes |= Self::GODAN;
        }
        if glosses.contains("adj-i") {
            classes |= Self::I_ADJECTIVE;
        }
        if glosses.contains("vk") {
            classes |= Self::KURU;
        }
        if glosses.contains("vs") {
            classes |= Self::SURU;
        }
        classes
    }
}

impl BitOr for WordClassSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for WordClassSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for WordClassSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for WordClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(WordClassSet, &str); 6] = [
            (WordClassSet::ICHIDAN, "ichidan"),
            (WordClassSet::GODAN, "godan"),
            (WordClassSet::I_ADJECTIVE, "adj-i"),
            (WordClassSet::KURU, "kuru"),
            (WordClassSet::SURU, "suru"),
            (WordClassSet::OTHER, "other"),
        ];
        let mut first = true;
        for (flag, name) in NAMES {
            if self.intersects(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("(empty)")?;
        }
        Ok(())
    }
}

/// One dictionary record: the full spelling sets of a sense plus its raw
/// gloss text. Immutable once parsed; a lexicon indexes the same shared
/// record under every one of its spellings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DictionaryEntry {
    /// Kanji spellings, in file order. Empty for kana-only words.
    pub headwords: Vec<String>,
    /// Kana spellings, in file order. Never empty.
    pub readings: Vec<String>,
    /// Gloss fields rejoined with `"; "`, markers left embedded.
    pub glosses: String,
    /// Classes derived from the gloss markers; always includes `OTHER`.
    pub classes: WordClassSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gloss_markers_set_expected_flags() {
        let classes = WordClassSet::from_glosses("(v5k,vi) to go; (P)");
        assert!(classes.intersects(WordClassSet::GODAN));
        assert!(classes.intersects(WordClassSet::OTHER));
        assert!(!classes.intersects(WordClassSet::ICHIDAN));

        let plain = WordClassSet::from_glosses("(n) paper");
        assert_eq!(plain, WordClassSet::OTHER);
    }

    #[test]
    fn intersection_requires_shared_bits() {
        let a = WordClassSet::ICHIDAN | WordClassSet::SURU;
        assert!(a.intersects(WordClassSet::ALL));
        assert!(!a.intersects(WordClassSet::GODAN));
        assert!(!WordClassSet::empty().intersects(WordClassSet::ALL));
    }

    #[test]
    fn packed_rule_masks_split_into_source_and_result() {
        // Low byte consumes, next byte produces, as in deinflect.dat.
        let packed: u32 = (0x01 << 8) | 0xff;
        let source = WordClassSet::from_bits((packed & 0xff) as u8);
        let result = WordClassSet::from_bits((packed >> 8) as u8);
        assert_eq!(source, WordClassSet::ALL);
        assert_eq!(result, WordClassSet::ICHIDAN);
    }

    #[test]
    fn debug_lists_flag_names() {
        let classes = WordClassSet::ICHIDAN | WordClassSet::OTHER;
        assert_eq!(format!("{classes:?}"), "ichidan|other");
        assert_eq!(format!("{:?}", WordClassSet::empty()), "(empty)");
    }
}
