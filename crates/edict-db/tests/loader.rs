use std::path::PathBuf;
use std::sync::Arc;

use edict_db::{Lexicon, LoadMode};
use edict_types::WordClassSet;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("edict")
}

#[test]
fn indexes_entry_under_every_spelling() {
    let lexicon = Lexicon::load(fixture_path(), LoadMode::Owned).expect("load fixture");

    let by_kanji = lexicon.lookup("日本");
    assert_eq!(by_kanji.len(), 1);
    let by_kana = lexicon.lookup("にっぽん");
    assert_eq!(by_kana.len(), 1);

    // Both keys resolve to the same shared record with full spelling sets.
    assert!(Arc::ptr_eq(&by_kanji[0], &by_kana[0]));
    assert_eq!(by_kanji[0].headwords, vec!["日本"]);
    assert_eq!(by_kanji[0].readings, vec!["にほん", "にっぽん"]);
}

#[test]
fn strips_frequency_markers_from_keys() {
    let lexicon = Lexicon::load(fixture_path(), LoadMode::Owned).expect("load fixture");
    let entries = lexicon.lookup("行く");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].headwords, vec!["行く", "往く"]);
    assert_eq!(entries[0].readings, vec!["いく", "ゆく"]);
    assert!(lexicon.lookup("行く(P)").is_empty());
}

#[test]
fn kana_only_entries_have_empty_headword_set() {
    let lexicon = Lexicon::load(fixture_path(), LoadMode::Owned).expect("load fixture");
    let entries = lexicon.lookup("あやかし");
    assert_eq!(entries.len(), 1);
    assert!(entries[0].headwords.is_empty());
    assert_eq!(entries[0].readings, vec!["あやかし"]);
}

#[test]
fn homographs_keep_separate_entries_in_file_order() {
    let lexicon = Lexicon::load(fixture_path(), LoadMode::Owned).expect("load fixture");
    let entries = lexicon.lookup("かみ");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].headwords, vec!["神"]);
    assert_eq!(entries[1].headwords, vec!["紙"]);
}

#[test]
fn derives_class_masks_from_gloss_markers() {
    let lexicon = Lexicon::load(fixture_path(), LoadMode::Owned).expect("load fixture");

    assert!(
        lexicon.lookup("食べる")[0]
            .classes
            .intersects(WordClassSet::ICHIDAN)
    );
    assert!(
        lexicon.lookup("行く")[0]
            .classes
            .intersects(WordClassSet::GODAN)
    );
    assert!(
        lexicon.lookup("高い")[0]
            .classes
            .intersects(WordClassSet::I_ADJECTIVE)
    );
    assert!(
        lexicon.lookup("来る")[0]
            .classes
            .intersects(WordClassSet::KURU)
    );
    assert!(
        lexicon.lookup("する")[0]
            .classes
            .intersects(WordClassSet::SURU)
    );
    // Plain nouns still carry the default flag.
    assert_eq!(lexicon.lookup("神")[0].classes, WordClassSet::OTHER);
}

#[test]
fn malformed_lines_are_skipped_not_fatal() {
    let lexicon = Lexicon::load(fixture_path(), LoadMode::Owned).expect("load fixture");
    assert_eq!(lexicon.entry_count(), 9);
    assert!(lexicon.lookup("broken").is_empty());
}

#[test]
fn mmap_and_owned_modes_agree() {
    let owned = Lexicon::load(fixture_path(), LoadMode::Owned).expect("owned load");
    let mapped = Lexicon::load(fixture_path(), LoadMode::Mmap).expect("mmap load");
    assert_eq!(owned.entry_count(), mapped.entry_count());
    assert_eq!(owned.surface_count(), mapped.surface_count());
    assert_eq!(
        owned.lookup("食べる")[0].glosses,
        mapped.lookup("食べる")[0].glosses
    );
}
