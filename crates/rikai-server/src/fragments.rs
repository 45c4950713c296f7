//! Candidate substring generation for longest-match-first lookup.

/// Yield every prefix of the leading Japanese-script run of `text`,
/// longest first.
///
/// Only the maximal run of word-script characters at the very start of the
/// text is considered; text beginning with anything else yields nothing.
/// Longest-first order gives the lookup layer its longest-match semantics
/// for free.
pub fn subfragments(text: &str) -> impl Iterator<Item = &str> {
    let end = text
        .char_indices()
        .find_map(|(i, c)| (!is_word_script(c)).then_some(i))
        .unwrap_or(text.len());
    let run = &text[..end];
    let mut stops: Vec<usize> = run.char_indices().map(|(i, c)| i + c.len_utf8()).collect();
    std::iter::from_fn(move || stops.pop().map(|stop| &run[..stop]))
}

/// Characters that can be part of a Japanese word.
fn is_word_script(c: char) -> bool {
    matches!(c,
        '\u{25cb}'                  // white circle, used to redact characters
        | '\u{3004}'..='\u{30ff}'   // iteration mark, hiragana, katakana
        | '\u{3400}'..='\u{4dbf}'   // CJK unified ideographs extension A
        | '\u{4e00}'..='\u{9fff}'   // CJK unified ideographs
        | '\u{f900}'..='\u{faff}'   // CJK compatibility ideographs
        | '\u{ff66}'..='\u{ff9f}'   // halfwidth katakana
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_prefixes_longest_first() {
        let fragments: Vec<&str> = subfragments("食べられない").collect();
        assert_eq!(
            fragments,
            vec!["食べられない", "食べられな", "食べられ", "食べら", "食べ", "食"]
        );
    }

    #[test]
    fn run_stops_at_first_non_word_character() {
        let fragments: Vec<&str> = subfragments("食べた。そして").collect();
        assert_eq!(fragments, vec!["食べた", "食べ", "食"]);
    }

    #[test]
    fn non_japanese_start_yields_nothing() {
        assert_eq!(subfragments("Hello").count(), 0);
        assert_eq!(subfragments("1日").count(), 0);
        assert_eq!(subfragments("").count(), 0);
    }

    #[test]
    fn redaction_circles_count_as_word_script() {
        let fragments: Vec<&str> = subfragments("〇〇規制").collect();
        assert_eq!(fragments, vec!["〇〇規制", "〇〇規", "〇〇", "〇"]);
    }

    #[test]
    fn iteration_mark_and_halfwidth_katakana_are_word_script() {
        let fragments: Vec<&str> = subfragments("人々").collect();
        assert_eq!(fragments, vec!["人々", "人"]);
        assert_eq!(subfragments("ｱｲｳ").count(), 3);
    }
}
