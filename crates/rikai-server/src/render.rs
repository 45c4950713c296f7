//! Turn lookup hits into display-ready records.

use serde::Serialize;

use crate::lookup::LookupResult;

/// One formatted definition block: the term, how it was derived, and its
/// numbered senses.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RenderedEntry {
    pub headwords: Vec<String>,
    pub readings: Vec<String>,
    /// Space-joined deinflection trail, when the match was inflected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub senses: Vec<String>,
}

/// Format every hit of a lookup, in result order.
pub fn render(result: &LookupResult) -> Vec<RenderedEntry> {
    result
        .hits
        .iter()
        .map(|hit| RenderedEntry {
            headwords: hit.entry.headwords.clone(),
            readings: hit.entry.readings.clone(),
            reason: if hit.reasons.is_empty() {
                None
            } else {
                Some(hit.reasons.join(" "))
            },
            senses: split_senses(&hit.entry.glosses),
        })
        .collect()
}

/// Split a raw gloss string into numbered senses.
///
/// Glosses equal to the frequency marker `(P)` or starting with an `EntL`
/// sequence identifier are artifacts of the file format and are dropped. A
/// gloss opening with a parenthesized numeral starts a new sense, except
/// when it numbers the very first gloss; everything up to the next numeral
/// stays in the current sense, rejoined with `"; "`.
pub fn split_senses(glosses: &str) -> Vec<String> {
    let mut senses = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for gloss in glosses.split("; ") {
        if gloss == "(P)" || gloss.starts_with("EntL") {
            continue;
        }
        let (numbered, meaning) = strip_leading_tags(gloss);
        if numbered && !current.is_empty() {
            senses.push(current.join("; "));
            current.clear();
        }
        current.push(meaning);
    }
    if !current.is_empty() {
        senses.push(current.join("; "));
    }
    senses
}

/// Strip leading parenthesized tags (part-of-speech, sense numbers, usage
/// notes) from a gloss, reporting whether one of them was a sense numeral.
fn strip_leading_tags(gloss: &str) -> (bool, &str) {
    let mut rest = gloss;
    let mut numbered = false;
    while let Some(tail) = rest.strip_prefix('(') {
        let Some((tag, after)) = tail.split_once(") ") else {
            break;
        };
        if !tag.is_empty() && tag.bytes().all(|b| b.is_ascii_digit()) {
            numbered = true;
        }
        rest = after;
    }
    (numbered, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_numbered_senses_and_drops_artifacts() {
        let senses = split_senses("(v1) (1) to eat; (2) to drink; (P); EntL1234567X");
        assert_eq!(senses, vec!["to eat", "to drink"]);
    }

    #[test]
    fn unnumbered_glosses_stay_in_one_sense() {
        let senses = split_senses("(n) god; deity; (P)");
        assert_eq!(senses, vec!["god; deity"]);
    }

    #[test]
    fn glosses_between_numerals_join_the_open_sense() {
        let senses = split_senses("(adj-i) (1) high; tall; (2) expensive; high-priced");
        assert_eq!(senses, vec!["high; tall", "expensive; high-priced"]);
    }

    #[test]
    fn tag_without_trailing_space_is_kept_as_text() {
        let (numbered, meaning) = strip_leading_tags("(uk)");
        assert!(!numbered);
        assert_eq!(meaning, "(uk)");
    }

    #[test]
    fn artifact_only_glosses_render_to_nothing() {
        assert!(split_senses("(P); EntL1234567X").is_empty());
    }
}
